//! Lexical terminals of the source language.
//!
//! `TokenKind` is the closed set the parser dispatches on; `Token` carries
//! the lexeme text and its source span. Tokens are immutable once built.

/// Kinds of tokens produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Unsigned,
    Ident,
    Str,
    // keywords
    Println,
    Print,
    Readint,
    While,
    Swap,
    Break,
    // operators and punctuation
    Assign,
    Semicolon,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    /// Unrecognized character. Not fatal by itself; a parser rule that
    /// requires a different kind rejects it with a syntax error.
    Error,
}

impl TokenKind {
    /// Reclassify an identifier lexeme as a keyword, if it is one.
    pub fn keyword(lexeme: &str) -> Option<TokenKind> {
        let kind = match lexeme {
            "println" => TokenKind::Println,
            "print" => TokenKind::Print,
            "readint" => TokenKind::Readint,
            "while" => TokenKind::While,
            "swap" => TokenKind::Swap,
            "break" => TokenKind::Break,
            _ => return None,
        };
        Some(kind)
    }

    /// Display image used in diagnostics, e.g. `expecting ";"`.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Eof => "<EOF>",
            TokenKind::Unsigned => "<UNSIGNED>",
            TokenKind::Ident => "<ID>",
            TokenKind::Str => "<STRING>",
            TokenKind::Println => "\"println\"",
            TokenKind::Print => "\"print\"",
            TokenKind::Readint => "\"readint\"",
            TokenKind::While => "\"while\"",
            TokenKind::Swap => "\"swap\"",
            TokenKind::Break => "\"break\"",
            TokenKind::Assign => "\"=\"",
            TokenKind::Semicolon => "\";\"",
            TokenKind::LeftParen => "\"(\"",
            TokenKind::RightParen => "\")\"",
            TokenKind::LeftBrace => "\"{\"",
            TokenKind::RightBrace => "\"}\"",
            TokenKind::Comma => "\",\"",
            TokenKind::Plus => "\"+\"",
            TokenKind::Minus => "\"-\"",
            TokenKind::Star => "\"*\"",
            TokenKind::Slash => "\"/\"",
            TokenKind::Error => "<ERROR>",
        }
    }
}

/// One lexical unit with its source span (1-based lines and columns).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub begin_line: usize,
    pub begin_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}
