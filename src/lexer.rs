use logos::Logos;
use std::fmt;

use crate::source::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"\s+")] // Skip whitespace
#[logos(skip r";[^\n]*")] // Skip comments; only '\n' ends one
pub enum TokenKind {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    // Anything up to the next delimiter. Numbers, booleans and symbols are
    // told apart later, by the parser.
    #[regex(r"[^\s();]+", |lex| lex.slice().to_string())]
    Atom(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Atom(word) => write!(f, "{}", word),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

// Helper function to tokenize a string directly (useful for tests and parser).
// The atom rule is a catch-all, so lexing is total and cannot fail; a slice
// logos rejects anyway is kept verbatim as an atom.
pub fn tokenize(input: &str) -> Vec<Token> {
    TokenKind::lexer(input)
        .spanned()
        .map(|(result, range)| {
            let kind =
                result.unwrap_or_else(|()| TokenKind::Atom(input[range.clone()].to_string()));
            Token {
                kind,
                span: Span::new(range.start, range.end),
            }
        })
        .collect()
}
