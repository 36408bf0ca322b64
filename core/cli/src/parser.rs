//! Command line argument parsing for the dbasic compiler.
//!
//! This module defines the CLI interface using `clap`. The `Cli` struct
//! captures all command line flags and arguments passed to the `dbc` binary.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// What kind of output `dbc` should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lower")]
pub(crate) enum OutputType {
    /// x86-64 AT&T assembly text.
    Asm,
    /// Portable C source text.
    C,
    /// A linked executable, produced by piping assembly through the system's
    /// C toolchain.
    Binary,
}

/// Command line interface for the `dbc` compiler.
///
/// Translates a single dbasic source file to assembly, C, or a linked
/// binary. Unlike the teacher's phase-flag CLI, every invocation always
/// runs the whole front half of the pipeline (lex, parse, resolve,
/// type-check); `-t`/`--type` only selects which backend receives the
/// checked AST.
#[derive(Parser)]
#[command(
    name = "dbc",
    author,
    version,
    about = "dbasic compiler CLI (dbc)",
    long_about = "Compiles a single dbasic source file to x86-64 assembly, C source, or a linked binary. \
Binary mode pipes the generated assembly through the system C toolchain (gcc)."
)]
pub(crate) struct Cli {
    /// Path to the source file to compile. Must have a file extension.
    pub(crate) infile: PathBuf,

    /// Output path. Defaults to the input file's stem with `.asm`/`.c`
    /// appended, or no extension at all for `binary`.
    #[clap(short = 'o', long = "outfile")]
    pub(crate) outfile: Option<PathBuf>,

    /// Type of output to generate.
    #[clap(short = 't', long = "type", value_enum, default_value_t = OutputType::Binary)]
    pub(crate) output_type: OutputType,

    /// Enable parser trace output (raises tracing verbosity to `trace`).
    #[clap(long = "debug", action = clap::ArgAction::SetTrue)]
    pub(crate) debug: bool,

    /// Additional whitespace-split arguments forwarded to the C toolchain.
    /// Only takes effect when `--type binary` is used.
    #[clap(short = 'g', long = "gccargs")]
    pub(crate) gccargs: Option<String>,
}

impl std::fmt::Display for OutputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputType::Asm => write!(f, "asm"),
            OutputType::C => write!(f, "c"),
            OutputType::Binary => write!(f, "binary"),
        }
    }
}
