//! Recursive-descent parser fused with the code generator.
//!
//! One recognizer per grammar rule; each both validates syntax and emits the
//! machine code for its construct, so there is no intermediate tree. Every
//! expression rule leaves exactly one value net on the target machine's
//! evaluation stack; every statement rule leaves it unchanged.
//
//  Grammar (informal):
//
//      program    ::= statement* EOF
//      statement  ::= assignment | println | print | "{" statement* "}"
//                   | readint | while | break ";" | swap | ";"
//      assignment ::= ID "=" assignTail ";"
//      assignTail ::= ID "=" assignTail | expr
//      expr       ::= term (("+"|"-") term)*
//      term       ::= factor (("*"|"/") factor)*
//      factor     ::= UNSIGNED | ID | "(" expr ")" | "+" factor | "-" factor

use std::io::Write;

use super::Options;
use super::emit::Emitter;
use super::scanner::Scanner;
use super::stream::TokenStream;
use super::symbols::{LabelAllocator, SymbolTable};
use super::token::{Token, TokenKind};
use crate::error::{CompileError, CompileResult};

pub struct Parser<'a, W: Write> {
    stream: TokenStream<'a>,
    symbols: SymbolTable,
    labels: LabelAllocator,
    out: Emitter<W>,
}

impl<'a, W: Write> Parser<'a, W> {
    pub fn new(source: &'a str, out: W, options: &Options) -> Self {
        Self {
            stream: TokenStream::new(Scanner::new(source, options.trace_tokens)),
            symbols: SymbolTable::new(),
            labels: LabelAllocator::new(),
            out: Emitter::new(out),
        }
    }

    /// Start symbol. After the last statement the input must be spent; then
    /// a halt is emitted and every registered name gets its storage.
    pub fn program(&mut self) -> CompileResult<()> {
        self.statement_list(None)?;
        if self.peek_kind(1)? != TokenKind::Eof {
            return Err(self.syntax_error("statement or end of input"));
        }
        self.out.blank()?;
        self.out.op1("halt")?;
        self.symbols.dump(&mut self.out)?;
        Ok(())
    }

    // ── token plumbing ────────────────────────────────────────────────

    fn peek(&mut self, k: usize) -> CompileResult<&Token> {
        self.stream.peek(k, &mut self.out)
    }

    fn peek_kind(&mut self, k: usize) -> CompileResult<TokenKind> {
        self.stream.peek_kind(k, &mut self.out)
    }

    fn advance(&mut self) -> CompileResult<Token> {
        self.stream.advance(&mut self.out)
    }

    /// Consume the current token if it has the expected kind, otherwise
    /// fail with the offending lexeme and what was required instead.
    fn consume(&mut self, expected: TokenKind) -> CompileResult<Token> {
        if self.peek_kind(1)? == expected {
            self.advance()
        } else {
            Err(self.syntax_error(expected.describe()))
        }
    }

    fn syntax_error(&mut self, expected: &str) -> CompileError {
        match self.peek(1) {
            Ok(token) => CompileError::UnexpectedToken {
                found: token.lexeme.clone(),
                expected: expected.to_string(),
                line: token.begin_line,
                column: token.begin_column,
            },
            Err(err) => err,
        }
    }

    // ── statements ────────────────────────────────────────────────────

    /// Zero or more statements, stopping at end of input or a block
    /// terminator. `exit` is the active break target, if any.
    fn statement_list(&mut self, exit: Option<&str>) -> CompileResult<()> {
        loop {
            match self.peek_kind(1)? {
                TokenKind::Ident
                | TokenKind::Println
                | TokenKind::Print
                | TokenKind::Semicolon
                | TokenKind::LeftBrace
                | TokenKind::Readint
                | TokenKind::While
                | TokenKind::Break
                | TokenKind::Swap => self.statement(exit)?,
                TokenKind::Eof | TokenKind::RightBrace => return Ok(()),
                _ => return Err(self.syntax_error("statement or end of input")),
            }
        }
    }

    fn statement(&mut self, exit: Option<&str>) -> CompileResult<()> {
        match self.peek_kind(1)? {
            TokenKind::Ident => self.assignment(),
            TokenKind::Println => self.println_statement(),
            TokenKind::Print => self.print_statement(),
            TokenKind::Semicolon => self.null_statement(),
            TokenKind::LeftBrace => self.compound_statement(exit),
            TokenKind::Readint => self.readint_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::Break => self.break_statement(exit),
            TokenKind::Swap => self.swap_statement(),
            _ => Err(self.syntax_error("statement")),
        }
    }

    /// `target = ...;` — the target's address goes on the stack first, the
    /// tail leaves one value, `stav` stores it.
    fn assignment(&mut self) -> CompileResult<()> {
        let target = self.consume(TokenKind::Ident)?;
        self.symbols.register(&target.lexeme);
        self.out.op2("pc", &target.lexeme)?;
        self.consume(TokenKind::Assign)?;
        self.assignment_tail()?;
        self.out.op1("stav")?;
        self.consume(TokenKind::Semicolon)?;
        Ok(())
    }

    /// Right side of an assignment. Two tokens of lookahead decide between
    /// another chained target (`b = ...`) and a plain expression. For a
    /// chain, the inner value is duplicated and rotated under this target's
    /// address before the store, so the same value remains on top for the
    /// enclosing assignment: `a = b = c = e;` stores `e` into every target,
    /// right to left.
    fn assignment_tail(&mut self) -> CompileResult<()> {
        if self.peek_kind(1)? == TokenKind::Ident && self.peek_kind(2)? == TokenKind::Assign {
            let target = self.consume(TokenKind::Ident)?;
            self.symbols.register(&target.lexeme);
            self.out.op2("pc", &target.lexeme)?;
            self.consume(TokenKind::Assign)?;
            self.assignment_tail()?;
            self.out.op1("dupe")?;
            self.out.op1("rot")?;
            self.out.op1("stav")?;
        } else {
            self.expr()?;
        }
        Ok(())
    }

    fn println_statement(&mut self) -> CompileResult<()> {
        self.consume(TokenKind::Println)?;
        self.consume(TokenKind::LeftParen)?;
        if self.peek_kind(1)? != TokenKind::RightParen {
            self.print_arg()?;
        }
        // trailing newline, argument or not
        self.out.op2("pc", "'\\n'")?;
        self.out.op1("aout")?;
        self.consume(TokenKind::RightParen)?;
        self.consume(TokenKind::Semicolon)?;
        Ok(())
    }

    fn print_statement(&mut self) -> CompileResult<()> {
        self.consume(TokenKind::Print)?;
        self.consume(TokenKind::LeftParen)?;
        self.print_arg()?;
        self.consume(TokenKind::RightParen)?;
        self.consume(TokenKind::Semicolon)?;
        Ok(())
    }

    /// A string literal gets a fresh data label, declared inline right after
    /// the output instruction; anything else is an expression printed as an
    /// integer.
    fn print_arg(&mut self) -> CompileResult<()> {
        if self.peek_kind(1)? == TokenKind::Str {
            let literal = self.advance()?;
            let label = self.labels.fresh();
            self.out.op2("pc", &label)?;
            self.out.op1("sout")?;
            self.out.dw(&format!("^{label}"), &literal.lexeme)?;
        } else {
            self.expr()?;
            self.out.op1("dout")?;
        }
        Ok(())
    }

    fn null_statement(&mut self) -> CompileResult<()> {
        self.consume(TokenKind::Semicolon)?;
        Ok(())
    }

    /// `{ ... }` — the active break target passes through unchanged, so a
    /// break nested in a block still reaches its enclosing loop's exit.
    fn compound_statement(&mut self, exit: Option<&str>) -> CompileResult<()> {
        self.consume(TokenKind::LeftBrace)?;
        self.statement_list(exit)?;
        self.consume(TokenKind::RightBrace)?;
        Ok(())
    }

    fn readint_statement(&mut self) -> CompileResult<()> {
        self.consume(TokenKind::Readint)?;
        self.consume(TokenKind::LeftParen)?;
        let target = self.consume(TokenKind::Ident)?;
        self.symbols.register(&target.lexeme);
        self.out.op2("pc", &target.lexeme)?;
        self.out.op1("din")?;
        self.out.op1("stav")?;
        self.consume(TokenKind::RightParen)?;
        self.consume(TokenKind::Semicolon)?;
        Ok(())
    }

    /// The condition is re-evaluated at the head on every iteration; `jz`
    /// falls out when it reaches zero. The body is parsed with this loop's
    /// exit label as the break target, shadowing any outer loop.
    fn while_statement(&mut self) -> CompileResult<()> {
        self.consume(TokenKind::While)?;
        let head = self.labels.fresh();
        self.out.label(&head)?;
        self.consume(TokenKind::LeftParen)?;
        self.expr()?;
        self.consume(TokenKind::RightParen)?;
        let exit = self.labels.fresh();
        self.out.op2("jz", &exit)?;
        self.statement(Some(exit.as_str()))?;
        self.out.op2("ja", &head)?;
        self.out.label(&exit)?;
        Ok(())
    }

    fn break_statement(&mut self, exit: Option<&str>) -> CompileResult<()> {
        let Some(target) = exit else {
            let token = self.peek(1)?;
            return Err(CompileError::BreakOutsideLoop {
                line: token.begin_line,
                column: token.begin_column,
            });
        };
        self.out.op2("ja", target)?;
        self.consume(TokenKind::Break)?;
        self.consume(TokenKind::Semicolon)?;
        Ok(())
    }

    /// Exchanges two variables without a temporary: with both values pushed
    /// over the opposite addresses, the two `stav`s cross-store them.
    fn swap_statement(&mut self) -> CompileResult<()> {
        self.consume(TokenKind::Swap)?;
        self.consume(TokenKind::LeftParen)?;
        let first = self.consume(TokenKind::Ident)?;
        self.consume(TokenKind::Comma)?;
        let second = self.consume(TokenKind::Ident)?;
        self.symbols.register(&first.lexeme);
        self.symbols.register(&second.lexeme);
        self.out.op2("pc", &first.lexeme)?;
        self.out.op2("p", &second.lexeme)?;
        self.out.op2("pc", &second.lexeme)?;
        self.out.op2("p", &first.lexeme)?;
        self.out.op1("stav")?;
        self.out.op1("stav")?;
        self.consume(TokenKind::RightParen)?;
        self.consume(TokenKind::Semicolon)?;
        Ok(())
    }

    // ── expressions ───────────────────────────────────────────────────

    /// Left-associative chain of `+`/`-` over terms. Net one value pushed.
    fn expr(&mut self) -> CompileResult<()> {
        self.term()?;
        loop {
            match self.peek_kind(1)? {
                TokenKind::Plus => {
                    self.advance()?;
                    self.term()?;
                    self.out.op1("add")?;
                }
                TokenKind::Minus => {
                    self.advance()?;
                    self.term()?;
                    self.out.op1("sub")?;
                }
                TokenKind::RightParen | TokenKind::Semicolon => return Ok(()),
                _ => return Err(self.syntax_error("\"+\", \"-\", \")\", or \";\"")),
            }
        }
    }

    /// Left-associative chain of `*`/`/` over factors, binding tighter than
    /// the additive chain above.
    fn term(&mut self) -> CompileResult<()> {
        self.factor()?;
        loop {
            match self.peek_kind(1)? {
                TokenKind::Star => {
                    self.advance()?;
                    self.factor()?;
                    self.out.op1("mult")?;
                }
                TokenKind::Slash => {
                    self.advance()?;
                    self.factor()?;
                    self.out.op1("div")?;
                }
                TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::RightParen
                | TokenKind::Semicolon => return Ok(()),
                _ => return Err(self.syntax_error("an operator, \")\", or \";\"")),
            }
        }
    }

    fn factor(&mut self) -> CompileResult<()> {
        match self.peek_kind(1)? {
            TokenKind::Unsigned => {
                let literal = self.advance()?;
                self.out.op2("pwc", &literal.lexeme)?;
            }
            TokenKind::Ident => {
                let name = self.advance()?;
                self.symbols.register(&name.lexeme);
                self.out.op2("p", &name.lexeme)?;
            }
            TokenKind::LeftParen => {
                self.advance()?;
                self.expr()?;
                self.consume(TokenKind::RightParen)?;
            }
            TokenKind::Plus => {
                self.advance()?;
                self.factor()?;
            }
            TokenKind::Minus => {
                self.advance()?;
                self.negated_factor()?;
            }
            _ => return Err(self.syntax_error("factor")),
        }
        Ok(())
    }

    /// Factor behind a unary `-`: the inner value is produced first, then
    /// negated. A nested `-` cancels instead of emitting two `neg`s.
    fn negated_factor(&mut self) -> CompileResult<()> {
        match self.peek_kind(1)? {
            TokenKind::Unsigned => {
                let literal = self.advance()?;
                self.out.op2("pwc", &literal.lexeme)?;
                self.out.op1("neg")?;
            }
            TokenKind::Ident => {
                let name = self.advance()?;
                self.symbols.register(&name.lexeme);
                self.out.op2("p", &name.lexeme)?;
                self.out.op1("neg")?;
            }
            TokenKind::LeftParen => {
                self.advance()?;
                self.expr()?;
                self.consume(TokenKind::RightParen)?;
                self.out.op1("neg")?;
            }
            TokenKind::Plus => {
                self.advance()?;
                self.factor()?;
                self.out.op1("neg")?;
            }
            TokenKind::Minus => {
                // double negation cancels
                self.advance()?;
                self.factor()?;
            }
            _ => return Err(self.syntax_error("factor")),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::compiler::{Options, compile_to_string};
    use crate::error::CompileError;

    fn compile_ok(src: &str) -> String {
        compile_to_string(src, &Options::default()).expect("compile ok")
    }

    fn compile_err(src: &str) -> CompileError {
        compile_to_string(src, &Options::default()).expect_err("compile should fail")
    }

    /// Instruction/declaration lines only, whitespace-normalized; echoed
    /// comments and blank separators are stripped.
    fn code_lines(src: &str) -> Vec<String> {
        compile_ok(src)
            .lines()
            .filter(|l| !l.starts_with(';') && !l.trim().is_empty())
            .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect()
    }

    #[test]
    fn test_precedence_mult_binds_tighter() {
        assert_eq!(
            code_lines("x = 1 + 2 * 3;"),
            vec![
                "pc x", "pwc 1", "pwc 2", "pwc 3", "mult", "add", "stav", "halt", "x: dw 0",
            ]
        );
    }

    #[test]
    fn test_left_associative_chains() {
        assert_eq!(
            code_lines("x = 8 / 4 / 2;"),
            vec![
                "pc x", "pwc 8", "pwc 4", "div", "pwc 2", "div", "stav", "halt", "x: dw 0",
            ]
        );
        assert_eq!(
            code_lines("x = 1 - 2 - 3;"),
            vec![
                "pc x", "pwc 1", "pwc 2", "sub", "pwc 3", "sub", "stav", "halt", "x: dw 0",
            ]
        );
    }

    #[test]
    fn test_parenthesized_expression() {
        assert_eq!(
            code_lines("x = (1 + 2) * 3;"),
            vec![
                "pc x", "pwc 1", "pwc 2", "add", "pwc 3", "mult", "stav", "halt", "x: dw 0",
            ]
        );
    }

    #[test]
    fn test_unary_minus_and_cancellation() {
        assert_eq!(
            code_lines("x = -5;"),
            vec!["pc x", "pwc 5", "neg", "stav", "halt", "x: dw 0"]
        );
        // double negation emits no neg at all
        assert_eq!(
            code_lines("x = --5;"),
            vec!["pc x", "pwc 5", "stav", "halt", "x: dw 0"]
        );
        // unary plus is a no-op
        assert_eq!(
            code_lines("x = +y;"),
            vec!["pc x", "p y", "stav", "halt", "x: dw 0", "y: dw 0"]
        );
        assert_eq!(
            code_lines("x = -(a + 1);"),
            vec![
                "pc x", "p a", "pwc 1", "add", "neg", "stav", "halt", "x: dw 0", "a: dw 0",
            ]
        );
    }

    #[test]
    fn test_chained_assignment_stores_into_every_target() {
        assert_eq!(
            code_lines("a = b = 5;"),
            vec![
                "pc a", "pc b", "pwc 5", "dupe", "rot", "stav", "stav", "halt", "a: dw 0",
                "b: dw 0",
            ]
        );
        assert_eq!(
            code_lines("a = b = c = 1 + 1;"),
            vec![
                "pc a", "pc b", "pc c", "pwc 1", "pwc 1", "add", "dupe", "rot", "stav", "dupe",
                "rot", "stav", "stav", "halt", "a: dw 0", "b: dw 0", "c: dw 0",
            ]
        );
    }

    #[test]
    fn test_swap_cross_stores_without_temporary() {
        assert_eq!(
            code_lines("swap(a, b);"),
            vec![
                "pc a", "p b", "pc b", "p a", "stav", "stav", "halt", "a: dw 0", "b: dw 0",
            ]
        );
    }

    #[test]
    fn test_readint_reads_into_address() {
        assert_eq!(
            code_lines("readint(n);"),
            vec!["pc n", "din", "stav", "halt", "n: dw 0"]
        );
    }

    #[test]
    fn test_println_without_argument_still_emits_newline() {
        assert_eq!(
            code_lines("println();"),
            vec!["pc '\\n'", "aout", "halt"]
        );
    }

    #[test]
    fn test_println_expression_argument() {
        assert_eq!(
            code_lines("println(x + 1);"),
            vec![
                "p x", "pwc 1", "add", "dout", "pc '\\n'", "aout", "halt", "x: dw 0",
            ]
        );
    }

    #[test]
    fn test_print_string_declares_inline_data_label() {
        assert_eq!(
            code_lines("print(\"hi\");"),
            vec!["pc @L0", "sout", "^@L0: dw \"hi\"", "halt"]
        );
        // string storage is separate from the zero-initialized variables
        assert_eq!(
            code_lines("print(\"hi\"); x = 1;"),
            vec![
                "pc @L0",
                "sout",
                "^@L0: dw \"hi\"",
                "pc x",
                "pwc 1",
                "stav",
                "halt",
                "x: dw 0",
            ]
        );
    }

    #[test]
    fn test_while_loop_labels_and_back_edge() {
        assert_eq!(
            code_lines("while (x) x = x - 1;"),
            vec![
                "@L0:", "p x", "jz @L1", "pc x", "p x", "pwc 1", "sub", "stav", "ja @L0", "@L1:",
                "halt", "x: dw 0",
            ]
        );
    }

    #[test]
    fn test_break_resolves_to_nearest_enclosing_loop() {
        let lines = code_lines("while (a) { while (b) { break; } break; }");
        // inner break jumps to the inner exit, outer break to the outer exit
        assert_eq!(
            lines,
            vec![
                "@L0:", "p a", "jz @L1", "@L2:", "p b", "jz @L3", "ja @L3", "ja @L2", "@L3:",
                "ja @L1", "ja @L0", "@L1:", "halt", "a: dw 0", "b: dw 0",
            ]
        );
    }

    #[test]
    fn test_break_outside_loop_is_rejected() {
        assert!(matches!(
            compile_err("break;"),
            CompileError::BreakOutsideLoop { line: 1, column: 1 }
        ));
        // a block does not make a loop
        assert!(matches!(
            compile_err("{ break; }"),
            CompileError::BreakOutsideLoop { .. }
        ));
    }

    #[test]
    fn test_symbol_registered_once_despite_many_uses() {
        let lines = code_lines("x = x + x * x; x = x;");
        let declarations: Vec<_> = lines.iter().filter(|l| l.ends_with("dw 0")).collect();
        assert_eq!(declarations, vec!["x: dw 0"]);
    }

    #[test]
    fn test_declarations_in_first_use_order() {
        let lines = code_lines("b = 1; a = b; c = 2;");
        let declarations: Vec<_> = lines
            .iter()
            .filter(|l| l.ends_with("dw 0"))
            .cloned()
            .collect();
        assert_eq!(declarations, vec!["b: dw 0", "a: dw 0", "c: dw 0"]);
    }

    #[test]
    fn test_null_statements_emit_nothing() {
        assert_eq!(code_lines(";;;"), vec!["halt"]);
    }

    #[test]
    fn test_empty_program_is_just_a_halt() {
        assert_eq!(code_lines(""), vec!["halt"]);
    }

    #[test]
    fn test_stray_close_paren_names_expectation() {
        match compile_err("x = );") {
            CompileError::UnexpectedToken {
                found, expected, ..
            } => {
                assert_eq!(found, ")");
                assert_eq!(expected, "factor");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_eof_mid_expression() {
        match compile_err("x = 1 +") {
            CompileError::UnexpectedToken { found, expected, .. } => {
                assert_eq!(found, "<EOF>");
                assert_eq!(expected, "factor");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_semicolon_after_expression() {
        match compile_err("x = 1 y = 2;") {
            CompileError::UnexpectedToken { found, expected, line, column } => {
                assert_eq!(found, "y");
                assert_eq!(expected, "\"+\", \"-\", \")\", or \";\"");
                assert_eq!((line, column), (1, 7));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unmatched_close_brace_at_top_level() {
        match compile_err("x = 1; }") {
            CompileError::UnexpectedToken { found, expected, .. } => {
                assert_eq!(found, "}");
                assert_eq!(expected, "statement or end of input");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_token_is_fatal_only_when_reached() {
        // the bad char sits behind a syntax error that fires first
        match compile_err("x = $;") {
            CompileError::UnexpectedToken { found, expected, .. } => {
                assert_eq!(found, "$");
                assert_eq!(expected, "factor");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_source_lines_echoed_before_their_code() {
        let output = compile_ok("x = 1;\ny = 2;");
        let echo_x = output.find("; x = 1;").unwrap();
        let code_x = output.find("pc        x").unwrap();
        let echo_y = output.find("; y = 2;").unwrap();
        let code_y = output.find("pc        y").unwrap();
        assert!(echo_x < code_x);
        assert!(echo_y < code_y);
    }

    #[test]
    fn test_token_trace_goes_into_the_listing() {
        let options = Options { trace_tokens: true };
        let traced = compile_to_string("x = 1;", &options).unwrap();
        assert!(traced.contains("; kind=Ident begin=1:1 end=1:1 image=x"));
        assert!(traced.contains("; kind=Unsigned"));
        // the generated instructions are unchanged
        let plain = compile_ok("x = 1;");
        let strip = |s: &str| {
            s.lines()
                .filter(|l| !l.starts_with(';'))
                .collect::<Vec<_>>()
                .join("\n")
        };
        assert_eq!(strip(&traced), strip(&plain));
    }
}
