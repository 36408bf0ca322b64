#![warn(clippy::pedantic)]

//! # dbasic compiler CLI
//!
//! Drives the pipeline in [`dbasic_compiler`] end to end: reads a source
//! file, runs it through lexing/parsing/resolving/type-checking, and emits
//! one of three things depending on `-t`/`--type`:
//!
//! * `c` — writes generated C source to `outfile`.
//! * `asm` — writes prettified x86-64 assembly to `outfile`.
//! * `binary` (default) — pipes prettified assembly into `gcc -xassembler -`
//!   and writes a linked executable.
//!
//! ## Exit codes
//! * 0 — success.
//! * 1 — usage, compile, or toolchain failure. In `binary` mode, the
//!   sub-process's own exit code is propagated instead.

mod parser;

use clap::Parser;
use dbasic_compiler::{compile, prettify_asm, Target};
use parser::{Cli, OutputType};
use std::io::Write as _;
use std::path::PathBuf;
use std::process::{self, Command, Stdio};

fn main() {
    let args = Cli::parse();

    let filter = if args.debug { "trace" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("{e}");
        process::exit(1);
    }
}

fn run(args: &Cli) -> anyhow::Result<()> {
    let outfile = resolve_outfile(args)?;

    let source = std::fs::read_to_string(&args.infile)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", args.infile.display()))?;

    match args.output_type {
        OutputType::C => {
            let c = compile(&source, Target::C)?;
            std::fs::write(&outfile, c)
                .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", outfile.display()))?;
        }
        OutputType::Asm => {
            let asm = compile(&source, Target::Asm)?;
            std::fs::write(&outfile, prettify_asm(&asm))
                .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", outfile.display()))?;
        }
        OutputType::Binary => {
            let asm = compile(&source, Target::Asm)?;
            let status = invoke_toolchain(&prettify_asm(&asm), &outfile, args.gccargs.as_deref())?;
            process::exit(status);
        }
    }
    Ok(())
}

/// Mirrors the original tool's default-output-path rule: without `-o`, the
/// input file must carry an extension, which is replaced with `.asm`/`.c`,
/// or dropped entirely for `binary`.
fn resolve_outfile(args: &Cli) -> anyhow::Result<PathBuf> {
    if let Some(outfile) = &args.outfile {
        return Ok(outfile.clone());
    }
    if args.infile.extension().is_none() {
        anyhow::bail!("infile needs to have a file-extension");
    }
    let mut outfile = args.infile.clone();
    match args.output_type {
        OutputType::Binary => {
            outfile.set_extension("");
        }
        OutputType::Asm => {
            outfile.set_extension("asm");
        }
        OutputType::C => {
            outfile.set_extension("c");
        }
    }
    Ok(outfile)
}

/// Pipes `asm` into `gcc -o <outfile> -xassembler -`, forwarding `gccargs`
/// (split on whitespace) before the output path. Returns the child's exit
/// code so the driver can propagate it as its own.
fn invoke_toolchain(asm: &str, outfile: &std::path::Path, gccargs: Option<&str>) -> anyhow::Result<i32> {
    let mut cmd = Command::new("gcc");
    cmd.arg("-o").arg(outfile).arg("-xassembler").arg("-");
    if let Some(extra) = gccargs {
        cmd.args(extra.split_whitespace());
    }
    cmd.stdin(Stdio::piped());

    let mut child = cmd
        .spawn()
        .map_err(|e| anyhow::anyhow!("failed to invoke gcc: {e}"))?;
    child
        .stdin
        .take()
        .expect("stdin was piped")
        .write_all(asm.as_bytes())
        .map_err(|e| anyhow::anyhow!("failed to write assembly to gcc: {e}"))?;
    let status = child
        .wait()
        .map_err(|e| anyhow::anyhow!("failed waiting on gcc: {e}"))?;
    Ok(status.code().unwrap_or(1))
}
