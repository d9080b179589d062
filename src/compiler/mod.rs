//! The compiler core: a single pass from source text to stack-machine
//! assembly.
//!
//! There is no intermediate representation. The parser pulls tokens through
//! a lookahead buffer fed by the scanner and emits code for each construct
//! as it is recognized; at end of input it emits a halt and dumps the symbol
//! table as zero-initialized storage.

pub mod emit;
pub mod scanner;
pub mod stream;
pub mod symbols;
pub mod token;

mod parser;

use std::io::Write;

use crate::error::CompileResult;

/// Knobs forwarded from the command line.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Echo every scanned token into the listing as a comment.
    pub trace_tokens: bool,
}

/// Translate `source` in one pass, writing the assembly listing into `out`.
///
/// On error, everything recognized so far has already been written, so the
/// caller can keep the partial listing for diagnosis.
pub fn compile<W: Write>(source: &str, out: W, options: &Options) -> CompileResult<()> {
    parser::Parser::new(source, out, options).program()
}

/// In-memory variant used by tests and embedding callers.
pub fn compile_to_string(source: &str, options: &Options) -> CompileResult<String> {
    let mut buf = Vec::new();
    compile(source, &mut buf, options)?;
    Ok(String::from_utf8(buf).expect("listing is UTF-8"))
}
