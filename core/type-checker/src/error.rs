use dbasic_ast::Type;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TypeCheckError {
    #[error("line {line}: both operands of a binary operation must have the same type")]
    OperandTypeMismatch { line: u32 },

    #[error("line {line}: cannot use a void-typed value in a binary operation")]
    VoidOperand { line: u32 },

    #[error("line {line}: arithmetic operands must be INT")]
    NonIntOperand { line: u32 },

    #[error("line {line}: {construct} condition must be BOOL")]
    NonBoolCondition { line: u32, construct: &'static str },

    #[error("line {line}: return type mismatch: function returns {expected:?}, found {found:?}")]
    ReturnTypeMismatch {
        line: u32,
        expected: Option<Type>,
        found: Option<Type>,
    },

    #[error("line {line}: cannot assign {found:?} to `{name}` of declared type {expected:?}")]
    AssignTypeMismatch {
        line: u32,
        name: String,
        expected: Option<Type>,
        found: Option<Type>,
    },

    #[error("line {line}: argument {index} of `{func}` expects {expected:?}, found {found:?}")]
    ArgumentTypeMismatch {
        line: u32,
        func: String,
        index: usize,
        expected: Option<Type>,
        found: Option<Type>,
    },

    #[error("line {line}: builtin `{name}` expects {expected} arguments, found {found}")]
    BuiltinArity {
        line: u32,
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: print requires at least one argument")]
    PrintMissingFormat { line: u32 },

    #[error("line {line}: print's first argument must be a string literal")]
    PrintFirstArgNotString { line: u32 },
}

impl TypeCheckError {
    #[must_use]
    pub fn line(&self) -> u32 {
        match self {
            TypeCheckError::OperandTypeMismatch { line }
            | TypeCheckError::VoidOperand { line }
            | TypeCheckError::NonIntOperand { line }
            | TypeCheckError::NonBoolCondition { line, .. }
            | TypeCheckError::ReturnTypeMismatch { line, .. }
            | TypeCheckError::AssignTypeMismatch { line, .. }
            | TypeCheckError::ArgumentTypeMismatch { line, .. }
            | TypeCheckError::BuiltinArity { line, .. }
            | TypeCheckError::PrintMissingFormat { line }
            | TypeCheckError::PrintFirstArgNotString { line } => *line,
        }
    }
}
