//! Tokenizer for dbasic source text.
//!
//! [`Lexer::new`] eagerly scans the whole source string into a token vector;
//! [`Lexer::peek`]/[`Lexer::next`] then walk that vector with a cursor. The
//! source text itself is scanned once with a byte cursor and matched via
//! `&str` slices rather than by repeatedly truncating a `String`.

mod error;
mod token;

pub use error::LexError;
pub use token::{Token, TokenKind, KEYWORDS, SYMBOLS, TYPE_KEYWORDS};

pub struct Lexer {
    tokens: Vec<Token>,
    pos: usize,
}

impl Lexer {
    /// Tokenizes `source` in full, returning an error on the first
    /// unrecognized character sequence.
    pub fn new(source: &str) -> Result<Self, LexError> {
        Ok(Lexer {
            tokens: tokenize(source)?,
            pos: 0,
        })
    }

    /// Looks `k` tokens ahead of the cursor without consuming anything.
    /// `peek(0)` is the next token `next()` would return.
    #[must_use]
    pub fn peek(&self, k: usize) -> Option<&Token> {
        self.tokens.get(self.pos + k)
    }

    /// Consumes and returns the next token, or `None` once exhausted.
    pub fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut line: u32 = 1;
    let mut rest = source;

    while !rest.is_empty() {
        if let Some((word, kind)) = KEYWORDS.iter().find(|(word, _)| rest.starts_with(word)) {
            tokens.push(Token::new(*kind, None, line));
            rest = &rest[word.len()..];
            continue;
        }

        if let Some((sym, kind)) = SYMBOLS.iter().find(|(sym, _)| rest.starts_with(sym)) {
            tokens.push(Token::new(*kind, None, line));
            rest = &rest[sym.len()..];
            continue;
        }

        if let Some(word) = TYPE_KEYWORDS.iter().find(|word| rest.starts_with(*word)) {
            tokens.push(Token::new(TokenKind::Type, Some((*word).to_string()), line));
            rest = &rest[word.len()..];
            continue;
        }

        if let Some(n) = match_const(rest) {
            tokens.push(Token::new(TokenKind::Const, Some(rest[..n].to_string()), line));
            rest = &rest[n..];
            continue;
        }

        if let Some(n) = match_ident(rest) {
            tokens.push(Token::new(TokenKind::Id, Some(rest[..n].to_string()), line));
            rest = &rest[n..];
            continue;
        }

        if let Some((content, total)) = match_string(rest) {
            tracing::trace!(line, %content, "lexer: string literal");
            tokens.push(Token::new(TokenKind::Str, Some(content), line));
            rest = &rest[total..];
            continue;
        }

        let mut chars = rest.chars();
        match chars.next() {
            Some('\n') => {
                if !matches!(tokens.last(), Some(t) if t.kind == TokenKind::Nl) {
                    tokens.push(Token::new(TokenKind::Nl, None, line));
                }
                line += 1;
                rest = chars.as_str();
                continue;
            }
            Some(' ' | '\t' | '\r') => {
                rest = chars.as_str();
                continue;
            }
            _ => {}
        }

        let prefix: String = rest.chars().take(20).collect();
        return Err(LexError::UnknownToken { line, prefix });
    }

    tokens.push(Token::new(TokenKind::Nl, None, line));
    tracing::debug!(count = tokens.len(), "lexer: tokens produced");
    Ok(tokens)
}

/// `TRUE`/`FALSE` are lexed as ordinary `CONST` tokens here; the parser (per
/// the expression-precedence rules) is responsible for folding them into
/// boolean constants with the corrected value mapping.
fn match_const(rest: &str) -> Option<usize> {
    for word in ["TRUE", "FALSE"] {
        if rest.starts_with(word) {
            return Some(word.len());
        }
    }
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    (digits > 0).then_some(digits)
}

fn match_ident(rest: &str) -> Option<usize> {
    let letters = rest.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    (letters > 0).then_some(letters)
}

/// `^"([^"]*)"` — no escape processing, may span lines (the original
/// tokenizer compiles this regex with `MULTILINE`, which only affects `^`/`$`
/// anchors and has no bearing here since we anchor at the cursor ourselves).
fn match_string(rest: &str) -> Option<(String, usize)> {
    let mut chars = rest.char_indices();
    let (_, first) = chars.next()?;
    if first != '"' {
        return None;
    }
    for (i, c) in chars {
        if c == '"' {
            return Some((rest[1..i].to_string(), i + 1));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src).unwrap();
        let mut out = Vec::new();
        while let Some(tok) = lexer.next() {
            out.push(tok.kind);
        }
        out
    }

    #[test]
    fn keyword_and_symbol_ordering() {
        let mut lexer = Lexer::new("a >= b\n").unwrap();
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Id);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Ge);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Id);
    }

    #[test]
    fn consecutive_newlines_coalesce() {
        let toks = kinds("\n\n\n");
        assert_eq!(toks, vec![TokenKind::Nl]);
    }

    #[test]
    fn final_newline_always_appended() {
        let toks = kinds("GLOBAL INT x = 1");
        assert_eq!(toks.last(), Some(&TokenKind::Nl));
    }

    #[test]
    fn true_false_lex_as_const() {
        let mut lexer = Lexer::new("TRUE FALSE\n").unwrap();
        let t = lexer.next().unwrap();
        assert_eq!(t.kind, TokenKind::Const);
        assert_eq!(t.value.as_deref(), Some("TRUE"));
        let f = lexer.next().unwrap();
        assert_eq!(f.value.as_deref(), Some("FALSE"));
    }

    #[test]
    fn string_literal_strips_quotes() {
        let mut lexer = Lexer::new("\"hello world\"\n").unwrap();
        let t = lexer.next().unwrap();
        assert_eq!(t.kind, TokenKind::Str);
        assert_eq!(t.value.as_deref(), Some("hello world"));
    }

    #[test]
    fn unknown_token_reports_line() {
        let err = Lexer::new("GLOBAL INT x = 1\n@\n").unwrap_err();
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn peek_does_not_consume() {
        let lexer = Lexer::new("IF x THEN\n").unwrap();
        assert_eq!(lexer.peek(0).unwrap().kind, TokenKind::If);
        assert_eq!(lexer.peek(0).unwrap().kind, TokenKind::If);
        assert_eq!(lexer.peek(1).unwrap().kind, TokenKind::Id);
    }
}
