//! Compile diagnostics shared by the scanner and the parser.
//!
//! Every detected error is fatal and synchronous: the first one aborts the
//! compilation and is surfaced with the source position it was detected at.
//! There is no recovery pass and no warning severity.

use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum CompileError {
    /// The parser required one token kind and found another.
    #[error("line {line} column {column}: scanning {found}, expecting {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        line: usize,
        column: usize,
    },

    /// A string literal ran into the end of its line (or of the input)
    /// before the closing quote.
    #[error("line {line} column {column}: string literal is missing its closing quote")]
    UnterminatedString { line: usize, column: usize },

    /// `break` with no enclosing `while` has no exit label to jump to.
    #[error("line {line} column {column}: break used outside of a loop")]
    BreakOutsideLoop { line: usize, column: usize },

    /// The output stream rejected a write mid-compilation.
    #[error("writing output: {0}")]
    Io(#[from] std::io::Error),
}
