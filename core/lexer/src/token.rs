use std::fmt;

/// A single lexical token: its kind, an optional lexeme, and the 1-based
/// source line it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Option<String>,
    pub line: u32,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, value: Option<String>, line: u32) -> Self {
        Token { kind, value, line }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{:?}({v:?})@{}", self.kind, self.line),
            None => write!(f, "{:?}@{}", self.kind, self.line),
        }
    }
}

/// The closed set of token kinds. `Type`, `Id`, `Const`, `Str` carry their
/// lexeme in [`Token::value`]; every other kind is a fixed keyword or symbol
/// and carries no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    If,
    Then,
    Else,
    End,
    While,
    Do,
    Return,
    Func,
    Global,
    /// `value` is the type keyword lexeme (`INT` or `BOOL`).
    Type,
    Comma,
    LParen,
    RParen,
    Plus,
    Minus,
    Star,
    Slash,
    EqEq,
    Eq,
    Ge,
    Le,
    Gt,
    Lt,
    Ne,
    Amp,
    Pipe,
    Id,
    Const,
    Str,
    Nl,
}

/// Keyword lexeme -> kind, tried before identifier matching.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("IF", TokenKind::If),
    ("THEN", TokenKind::Then),
    ("ELSE", TokenKind::Else),
    ("END", TokenKind::End),
    ("WHILE", TokenKind::While),
    ("DO", TokenKind::Do),
    ("RETURN", TokenKind::Return),
    ("FUNC", TokenKind::Func),
    ("GLOBAL", TokenKind::Global),
];

/// Type keywords, tried after ordinary keywords but before the identifier
/// fallback — matched exactly like [`KEYWORDS`] except the lexeme itself is
/// kept as the token's value.
pub const TYPE_KEYWORDS: &[&str] = &["INT", "BOOL"];

/// Symbol lexeme -> kind. Multi-character symbols are listed before any
/// single-character symbol that is a prefix of them, so a naive
/// longest-is-earlier scan never misreads `==` as `=` followed by `=`.
pub const SYMBOLS: &[(&str, TokenKind)] = &[
    (">=", TokenKind::Ge),
    ("<=", TokenKind::Le),
    ("!=", TokenKind::Ne),
    ("==", TokenKind::EqEq),
    ("=", TokenKind::Eq),
    (">", TokenKind::Gt),
    ("<", TokenKind::Lt),
    (",", TokenKind::Comma),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("&", TokenKind::Amp),
    ("|", TokenKind::Pipe),
];
