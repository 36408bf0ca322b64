use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ResolverError {
    #[error("line {line}: redefinition of global variable `{name}`")]
    DuplicateGlobal { line: u32, name: String },

    #[error("line {line}: global variable `{name}` must be initialized with a constant")]
    NonConstGlobalInitializer { line: u32, name: String },

    #[error("line {line}: redefinition of function `{name}`")]
    DuplicateFunction { line: u32, name: String },

    #[error("line {line}: variable `{name}` is not defined before use")]
    UndeclaredVariable { line: u32, name: String },

    #[error("line {line}: function calls can only take 6 arguments, found {count}")]
    TooManyArguments { line: u32, count: usize },

    #[error("line {line}: redefinition of local variable `{name}`")]
    DuplicateLocal { line: u32, name: String },

    #[error("line {line}: function `{name}` must end with a return statement")]
    MissingReturn { line: u32, name: String },

    #[error("program has no `main` function")]
    MissingMain,
}

impl ResolverError {
    #[must_use]
    pub fn line(&self) -> Option<u32> {
        match self {
            ResolverError::DuplicateGlobal { line, .. }
            | ResolverError::NonConstGlobalInitializer { line, .. }
            | ResolverError::DuplicateFunction { line, .. }
            | ResolverError::UndeclaredVariable { line, .. }
            | ResolverError::TooManyArguments { line, .. }
            | ResolverError::DuplicateLocal { line, .. }
            | ResolverError::MissingReturn { line, .. } => Some(*line),
            ResolverError::MissingMain => None,
        }
    }
}
