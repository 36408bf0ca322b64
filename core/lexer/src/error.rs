use thiserror::Error;

/// Everything that can go wrong while tokenizing source text.
#[derive(Debug, Clone, Error)]
pub enum LexError {
    #[error("line {line}: unknown token starting at {prefix:?}")]
    UnknownToken { line: u32, prefix: String },
}

impl LexError {
    #[must_use]
    pub fn line(&self) -> u32 {
        match self {
            LexError::UnknownToken { line, .. } => *line,
        }
    }
}
