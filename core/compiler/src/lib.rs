//! Pipeline facade: one function per phase, plus a convenience function that
//! runs the whole thing to a chosen target.
//!
//! Mirrors the original tool's `cli.py`, which just inlines these same calls
//! in `main`, and the teacher repository's orchestration crate that exposes
//! `parse`/`type_check`/`codegen` as the public pipeline API. Each phase
//! function takes the previous phase's output and returns either the next
//! artifact or a stage-specific error; this crate does no error translation
//! of its own — every error variant already carries what a caller needs to
//! print. `anyhow` stays out of this crate on purpose: it is a library
//! boundary, and `thiserror` enums compose better for a caller that wants to
//! match on which phase failed. The CLI wraps [`CompileError`] in `anyhow`
//! only at the point where a message is finally printed.

pub use dbasic_ast::Program;
pub use dbasic_lexer::{LexError, Token};
pub use dbasic_parser::ParseError;
pub use dbasic_resolver::ResolverError;
pub use dbasic_type_checker::TypeCheckError;

use thiserror::Error;

/// Tokenizes `source`, the first phase of the pipeline.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let lexer = dbasic_lexer::Lexer::new(source)?;
    let mut tokens = Vec::new();
    let mut l = lexer;
    while let Some(tok) = l.next() {
        tokens.push(tok);
    }
    Ok(tokens)
}

/// Parses `source` into an (unannotated) AST.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    dbasic_parser::parse(source)
}

/// Resolves variables/scopes and interns string constants, in place.
pub fn resolve(program: &mut Program) -> Result<(), ResolverError> {
    dbasic_resolver::resolve(program)
}

/// Type-checks and annotates every expression with its inferred type, in place.
pub fn type_check(program: &mut Program) -> Result<(), TypeCheckError> {
    dbasic_type_checker::type_check(program)
}

/// Emits portable C source for a fully annotated program.
#[must_use]
pub fn emit_c(program: &Program) -> String {
    dbasic_codegen_c::emit_c(program)
}

/// Emits x86-64 AT&T assembly for a fully annotated program.
#[must_use]
pub fn emit_asm(program: &Program) -> String {
    dbasic_codegen_asm::emit_asm(program)
}

/// Post-processes assembly text for readability. Purely cosmetic.
#[must_use]
pub fn prettify_asm(asm: &str) -> String {
    dbasic_codegen_asm::prettify(asm)
}

/// Selects which backend [`compile`] should target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    C,
    Asm,
}

/// Any error the pipeline's front half (through type checking) can raise.
/// Code generation itself cannot fail: it only runs over an already-checked
/// program.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Resolve(#[from] ResolverError),
    #[error(transparent)]
    TypeCheck(#[from] TypeCheckError),
}

/// Runs the full pipeline — parse, resolve, type-check, emit — and returns
/// the generated target source text.
pub fn compile(source: &str, target: Target) -> Result<String, CompileError> {
    let mut program = parse(source)?;
    resolve(&mut program)?;
    type_check(&mut program)?;
    let output = match target {
        Target::C => emit_c(&program),
        Target::Asm => emit_asm(&program),
    };
    tracing::info!(?target, "compiler: pipeline completed");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_to_c() {
        let out = compile("FUNC main()\nRETURN 0\nEND\n", Target::C).unwrap();
        assert!(out.contains("int main()"));
    }

    #[test]
    fn compiles_to_asm() {
        let out = compile("FUNC main()\nRETURN 0\nEND\n", Target::Asm).unwrap();
        assert!(out.contains("main:"));
    }

    #[test]
    fn propagates_parse_errors() {
        let err = compile("FUNC main(\nRETURN 0\nEND\n", Target::C).unwrap_err();
        assert!(matches!(err, CompileError::Parse(_)));
    }

    #[test]
    fn propagates_resolver_errors() {
        let err = compile("FUNC main()\nRETURN x\nEND\n", Target::C).unwrap_err();
        assert!(matches!(err, CompileError::Resolve(_)));
    }

    #[test]
    fn propagates_type_errors() {
        let src = "FUNC main()\nIF 1 THEN\nRETURN 0\nEND\nRETURN 0\nEND\n";
        let err = compile(src, Target::C).unwrap_err();
        assert!(matches!(err, CompileError::TypeCheck(_)));
    }

    #[test]
    fn lex_phase_tokenizes_standalone() {
        let tokens = lex("FUNC main()\nRETURN 0\nEND\n").unwrap();
        assert!(!tokens.is_empty());
    }
}
