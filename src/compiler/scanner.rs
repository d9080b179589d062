//! Character stream to token stream.
//!
//! The scanner works line by line, the way the target expects its listing:
//! whenever the cursor crosses into a fresh physical line, that line is first
//! echoed into the output as a comment, so every instruction appears below
//! the source that produced it. End of line is surfaced to the tokenizer as
//! a synthetic `\n` so maximal-munch rules terminate naturally.
//
//  Lexical items:
//
//      Unsigned ::= [0-9]+
//      Ident    ::= [A-Za-z][A-Za-z0-9]*     (keywords carved out afterwards)
//      Str      ::= '"' [^"\n]* '"'          (quotes kept in the lexeme)
//      Punct    ::= = ; ( ) { } , + - * /    (single-byte tokens)
//      `//` outside a string literal discards the rest of the line.

use std::io::Write;

use super::emit::Emitter;
use super::token::{Token, TokenKind};
use crate::error::{CompileError, CompileResult};

pub struct Scanner<'a> {
    lines: Vec<&'a str>,
    /// Chars of the line the cursor is on.
    chars: Vec<char>,
    /// Index of the next physical line to load.
    next_line: usize,
    /// 1-based number of the current line, 0 before the first refill.
    line: usize,
    /// 1-based column of `current` within the line.
    col: usize,
    current: Option<char>,
    trace: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, trace: bool) -> Self {
        Self {
            lines: source.lines().collect(),
            chars: Vec::new(),
            next_line: 0,
            line: 0,
            col: 0,
            // a synthetic line break forces the first refill
            current: Some('\n'),
            trace,
        }
    }

    /// Move the cursor one char forward, refilling (and echoing) the next
    /// physical line when the current one is spent.
    fn bump<W: Write>(&mut self, out: &mut Emitter<W>) -> CompileResult<()> {
        loop {
            if self.col < self.chars.len() {
                self.current = Some(self.chars[self.col]);
                self.col += 1;
                return Ok(());
            }
            if self.col == self.chars.len() && self.line > 0 {
                // synthetic break at the end of the physical line
                self.current = Some('\n');
                self.col += 1;
                return Ok(());
            }
            let Some(text) = self.lines.get(self.next_line) else {
                self.current = None;
                return Ok(());
            };
            out.comment(text)?;
            self.chars = text.chars().collect();
            self.next_line += 1;
            self.line = self.next_line;
            self.col = 0;
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.col).copied()
    }

    /// Produce exactly one token, consuming as many chars as it spans.
    /// Keeps returning the end-of-input token once the source is exhausted.
    pub fn next_token<W: Write>(&mut self, out: &mut Emitter<W>) -> CompileResult<Token> {
        loop {
            while self.current.is_some_and(|c| c.is_whitespace()) {
                self.bump(out)?;
            }
            // `//` outside a string literal truncates the physical line
            if self.current == Some('/') && self.peek_char() == Some('/') {
                self.col = self.chars.len() + 1;
                self.current = Some('\n');
                continue;
            }
            break;
        }

        let token = match self.current {
            None => Token {
                kind: TokenKind::Eof,
                lexeme: "<EOF>".into(),
                begin_line: self.line,
                begin_column: self.col,
                end_line: self.line,
                end_column: self.col,
            },
            Some(c) if c.is_ascii_digit() => self.number(out)?,
            Some('"') => self.string_literal(out)?,
            Some(c) if c.is_ascii_alphabetic() => self.identifier(out)?,
            Some(c) => self.punctuation(c, out)?,
        };

        // token trace appears as comments in the output listing
        if self.trace {
            out.comment(&format!(
                "kind={:?} begin={}:{} end={}:{} image={}",
                token.kind,
                token.begin_line,
                token.begin_column,
                token.end_line,
                token.end_column,
                token.lexeme
            ))?;
        }
        Ok(token)
    }

    /// Consume a maximal run of chars matching `pred`, starting at the
    /// cursor. Returns the run and the position of its last char.
    fn run<W, F>(&mut self, pred: F, out: &mut Emitter<W>) -> CompileResult<(String, usize, usize)>
    where
        W: Write,
        F: Fn(char) -> bool,
    {
        let mut lexeme = String::new();
        let (mut end_line, mut end_column) = (self.line, self.col);
        while let Some(c) = self.current.filter(|&c| pred(c)) {
            lexeme.push(c);
            end_line = self.line;
            end_column = self.col;
            self.bump(out)?;
        }
        Ok((lexeme, end_line, end_column))
    }

    fn number<W: Write>(&mut self, out: &mut Emitter<W>) -> CompileResult<Token> {
        let (begin_line, begin_column) = (self.line, self.col);
        let (lexeme, end_line, end_column) = self.run(|c| c.is_ascii_digit(), out)?;
        Ok(Token {
            kind: TokenKind::Unsigned,
            lexeme,
            begin_line,
            begin_column,
            end_line,
            end_column,
        })
    }

    fn identifier<W: Write>(&mut self, out: &mut Emitter<W>) -> CompileResult<Token> {
        let (begin_line, begin_column) = (self.line, self.col);
        let (lexeme, end_line, end_column) = self.run(|c| c.is_ascii_alphanumeric(), out)?;
        let kind = TokenKind::keyword(&lexeme).unwrap_or(TokenKind::Ident);
        Ok(Token {
            kind,
            lexeme,
            begin_line,
            begin_column,
            end_line,
            end_column,
        })
    }

    /// Copy a string literal verbatim, quotes included. The literal must
    /// close before the end of its physical line.
    fn string_literal<W: Write>(&mut self, out: &mut Emitter<W>) -> CompileResult<Token> {
        let (begin_line, begin_column) = (self.line, self.col);
        let mut lexeme = String::from('"');
        loop {
            self.bump(out)?;
            match self.current {
                None | Some('\n') => {
                    return Err(CompileError::UnterminatedString {
                        line: begin_line,
                        column: begin_column,
                    });
                }
                Some('"') => {
                    lexeme.push('"');
                    let (end_line, end_column) = (self.line, self.col);
                    self.bump(out)?;
                    return Ok(Token {
                        kind: TokenKind::Str,
                        lexeme,
                        begin_line,
                        begin_column,
                        end_line,
                        end_column,
                    });
                }
                Some(c) => lexeme.push(c),
            }
        }
    }

    fn punctuation<W: Write>(&mut self, c: char, out: &mut Emitter<W>) -> CompileResult<Token> {
        let kind = match c {
            '=' => TokenKind::Assign,
            ';' => TokenKind::Semicolon,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            ',' => TokenKind::Comma,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            _ => TokenKind::Error,
        };
        let token = Token {
            kind,
            lexeme: c.to_string(),
            begin_line: self.line,
            begin_column: self.col,
            end_line: self.line,
            end_column: self.col,
        };
        self.bump(out)?;
        Ok(token)
    }
}
