//! End-to-end scenarios driving the built `axisc` binary, mirroring the six
//! end-to-end scenarios laid out by the specification: straight-line
//! arithmetic, a `while`/`when`-style loop, string output, stdin handling
//! with `read_failed()`, and script-mode interpretation producing no ELF
//! file.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn axisc() -> Command {
    Command::cargo_bin("axisc").expect("binary built")
}

#[test]
fn scenario_1_straight_line_arithmetic_compiles_and_runs_to_exit_30() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("add.axis");
    fs::write(
        &src,
        "func main() -> i32:\n    x: i32 = 10\n    y: i32 = 20\n    give x + y\n",
    )
    .unwrap();
    let out = dir.path().join("add");

    axisc()
        .args(["build", src.to_str().unwrap(), "-o", out.to_str().unwrap(), "--elf", "--no-hex"])
        .assert()
        .success();

    assert!(out.exists());
    let perms = fs::metadata(&out).unwrap().permissions();
    use std::os::unix::fs::PermissionsExt;
    assert_ne!(perms.mode() & 0o111, 0, "binary should be executable");

    let status = std::process::Command::new(&out).status().unwrap();
    assert_eq!(status.code(), Some(30));
}

#[test]
fn scenario_2_loop_with_when_break_compiles_and_runs_to_exit_1() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("loop.axis");
    fs::write(
        &src,
        "func main() -> i32:\n    i: i32 = 0\n    while i < 3:\n        i = i + 1\n        when i == 3:\n            give 1\n    give 0\n",
    )
    .unwrap();
    let out = dir.path().join("loop");

    axisc()
        .args(["build", src.to_str().unwrap(), "-o", out.to_str().unwrap(), "--elf", "--no-hex"])
        .assert()
        .success();

    let status = std::process::Command::new(&out).status().unwrap();
    assert_eq!(status.code(), Some(1));
}

#[test]
fn scenario_3_writeln_string_prints_to_stdout_and_exits_0() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("hello.axis");
    fs::write(&src, "func main() -> i32:\n    writeln(\"hello\")\n    give 0\n").unwrap();
    let out = dir.path().join("hello");

    axisc()
        .args(["build", src.to_str().unwrap(), "-o", out.to_str().unwrap(), "--elf", "--no-hex"])
        .assert()
        .success();

    let output = std::process::Command::new(&out).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "hello\n");
}

#[test]
fn scenario_4_readln_and_read_failed_handle_present_and_empty_stdin() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("echo.axis");
    fs::write(
        &src,
        "func main() -> i32:\n    n: i32 = readln()\n    when read_failed():\n        give 1\n    writeln(n * 2)\n    give 0\n",
    )
    .unwrap();
    let out = dir.path().join("echo");

    axisc()
        .args(["build", src.to_str().unwrap(), "-o", out.to_str().unwrap(), "--elf", "--no-hex"])
        .assert()
        .success();

    use std::io::Write;
    use std::process::Stdio;

    let mut child = std::process::Command::new(&out)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"21\n").unwrap();
    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "42\n");

    let mut child = std::process::Command::new(&out)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    drop(child.stdin.take());
    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn scenario_5_script_mode_interprets_and_writes_no_file() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("script.axis");
    fs::write(
        &src,
        "mode script\nwriteln(\"hi\")\nx: i32 = 5\nwriteln(x * x)\n",
    )
    .unwrap();

    axisc()
        .current_dir(dir.path())
        .args(["run", src.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::eq("hi\n25\n"));

    assert!(!dir.path().join("script").exists());
}

#[test]
fn mode_mismatch_warns_then_interprets_anyway() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("mismatch.axis");
    fs::write(&src, "mode compile\nfunc main() -> i32:\n    writeln(\"ran anyway\")\n    give 0\n").unwrap();

    axisc()
        .args(["run", src.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Interpreting anyway"));
}

#[test]
fn auto_detect_mode_without_a_command_runs_script_sources() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("auto.axis");
    fs::write(&src, "mode script\ngive 9\n").unwrap();

    axisc().args([src.to_str().unwrap()]).assert().code(9);
}

#[test]
fn missing_input_file_is_an_error() {
    axisc().args(["run", "does-not-exist.axis"]).assert().failure();
}
