//! Lookahead buffer between the scanner and the parser.
//!
//! Scanned-but-unconsumed tokens sit in a FIFO addressed by index, so the
//! parser can peek arbitrarily far ahead without re-lexing and without ever
//! dropping a token. One production needs this: telling the chained
//! assignment `ident = ident = ...` apart from `ident = expr` takes two
//! tokens of lookahead.

use std::collections::VecDeque;
use std::io::Write;

use super::emit::Emitter;
use super::scanner::Scanner;
use super::token::{Token, TokenKind};
use crate::error::CompileResult;

pub struct TokenStream<'a> {
    scanner: Scanner<'a>,
    buf: VecDeque<Token>,
}

impl<'a> TokenStream<'a> {
    pub fn new(scanner: Scanner<'a>) -> Self {
        Self {
            scanner,
            buf: VecDeque::new(),
        }
    }

    /// Extend the buffer until it holds at least `n` tokens. The scanner
    /// keeps yielding end-of-input tokens, so this always terminates.
    fn fill<W: Write>(&mut self, n: usize, out: &mut Emitter<W>) -> CompileResult<()> {
        while self.buf.len() < n {
            let token = self.scanner.next_token(out)?;
            self.buf.push_back(token);
        }
        Ok(())
    }

    /// Token `k` positions ahead without consuming anything: `peek(1)` is
    /// the current token, `peek(2)` the one after it, and so on.
    pub fn peek<W: Write>(
        &mut self,
        k: usize,
        out: &mut Emitter<W>,
    ) -> CompileResult<&Token> {
        debug_assert!(k >= 1, "peek distance is 1-based");
        self.fill(k, out)?;
        Ok(&self.buf[k - 1])
    }

    /// Kind of the token `k` positions ahead.
    pub fn peek_kind<W: Write>(
        &mut self,
        k: usize,
        out: &mut Emitter<W>,
    ) -> CompileResult<TokenKind> {
        Ok(self.peek(k, out)?.kind)
    }

    /// Consume the current token and hand it to the caller.
    pub fn advance<W: Write>(
        &mut self,
        out: &mut Emitter<W>,
    ) -> CompileResult<Token> {
        self.fill(1, out)?;
        Ok(self.buf.pop_front().expect("buffer filled"))
    }
}
