//! # AXIS
//!
//! An ahead-of-time compiler and interpreter for AXIS, a small statically
//! typed imperative language with two run modes:
//!
//! - `mode script` sources are executed directly by the tree-walking
//!   [`interpreter`].
//! - `mode compile` sources are lowered to a textual x86-64 assembly IR by
//!   [`codegen`], assembled to machine code by [`encoder`], and linked into
//!   a freestanding ELF64 executable by [`elf`] — no external assembler or
//!   linker involved.
//!
//! ## Pipeline
//!
//! 1. **Lexer** ([`lexer`]) - tokenizes source text, synthesizing
//!    Python-style `Indent`/`Dedent`/`Newline` tokens.
//! 2. **Parser** ([`parser`]) - builds a typed AST.
//! 3. **Semantic analyzer** ([`semantic`]) - type-checks and assigns stack
//!    frame layout.
//! 4. **Code generator** ([`codegen`]) - lowers the AST to assembly text.
//! 5. **Encoder** ([`encoder`]) - assembles the text into x86-64 machine
//!    code, relaxing jump forms to a fixed point.
//! 6. **ELF writer** ([`elf`]) - wraps the machine code and string data in
//!    a minimal ELF64 executable image.
//!
//! [`pipeline`] orchestrates all of the above; see `main.rs` for the CLI
//! that drives it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use axisc::pipeline;
//!
//! let source = std::fs::read_to_string("prog.axis").unwrap();
//! let program = pipeline::parse_source(&source).unwrap();
//! let out = pipeline::compile(program).unwrap();
//! println!("generated {} bytes of machine code", out.machine_code.len());
//! ```

pub mod codegen;
pub mod elf;
pub mod encoder;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod semantic;
