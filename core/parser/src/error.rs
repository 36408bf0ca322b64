use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("line {line}: expected {expected}, found {found}")]
    Unexpected {
        line: u32,
        expected: String,
        found: String,
    },

    #[error("line {line}: unexpected end of input, expected {expected}")]
    UnexpectedEof { line: u32, expected: String },

    #[error(transparent)]
    Lex(#[from] dbasic_lexer::LexError),
}

impl ParseError {
    #[must_use]
    pub fn line(&self) -> u32 {
        match self {
            ParseError::Unexpected { line, .. } => *line,
            ParseError::UnexpectedEof { line, .. } => *line,
            ParseError::Lex(e) => e.line(),
        }
    }
}
