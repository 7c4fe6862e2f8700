use std::path::{Path, PathBuf};
use std::process::ExitCode;

use axisc::error::AxisError;
use axisc::parser::ast::Mode;
use axisc::pipeline;
use clap::Parser;

/// AXIS - a small systems language with script and compile modes.
///
/// Commands:
///   run      Execute a script (mode script) - interpreted
///   build    Compile to binary (mode compile) - native ELF
///
/// Examples:
///   axisc run script.axis
///   axisc build prog.axis -o prog
///   axisc prog.axis          # auto-detect mode
#[derive(Parser)]
#[command(name = "axisc", about = "AXIS - System Programming Language with Script and Compile modes")]
struct Cli {
    /// Command: run, build, or omit for auto-detect
    command: Option<String>,

    /// Input source file (.axis)
    input: Option<String>,

    /// Output binary file (build mode only)
    #[arg(short, long)]
    output: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Disable hex dump
    #[arg(long = "no-hex")]
    no_hex: bool,

    /// Generate ELF64 executable (Linux)
    #[arg(long)]
    elf: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::Builder::new().filter_level(level).init();

    // command resolution mirrors the reference driver: an explicit `run`/
    // `build` subcommand consumes `input` as the file; anything else
    // (including a bare filename) is treated as the input itself.
    let (force_run, force_build, input_file) = match cli.command.as_deref() {
        Some("run") => (true, false, cli.input.clone()),
        Some("build") => (false, true, cli.input.clone()),
        Some(other) => (false, false, Some(other.to_string())),
        None => (false, false, None),
    };

    let Some(input_file) = input_file else {
        eprintln!("Usage: axisc [run|build] <input.axis> [-o out] [-v] [--no-hex] [--elf]");
        return ExitCode::FAILURE;
    };

    if !Path::new(&input_file).exists() {
        eprintln!("Error: Input file not found: {input_file}");
        return ExitCode::FAILURE;
    }

    match run(&cli, &input_file, force_run, force_build) {
        Ok(code) => exit_code(code),
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, input_file: &str, force_run: bool, force_build: bool) -> Result<i32, AxisError> {
    let source = std::fs::read_to_string(input_file)?;
    let program = pipeline::parse_source(&source)?;

    if force_run {
        let code = pipeline::run_script(&program, true)?;
        return Ok(code);
    }

    if force_build || program.mode == Mode::Compile {
        let output_path = match &cli.output {
            Some(o) => PathBuf::from(o),
            None => PathBuf::from(Path::new(input_file).file_stem().unwrap_or_default()),
        };

        let out = pipeline::compile(program)?;

        if !cli.no_hex {
            pipeline::dump_hex(&out.machine_code);
        }
        if cli.verbose {
            pipeline::dump_verbose(&out);
        }

        pipeline::write_output(&out, &output_path, cli.elf, cli.verbose)?;
        return Ok(0);
    }

    let code = pipeline::run_script(&program, false)?;
    Ok(code)
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from((code & 0xFF) as u8)
}
