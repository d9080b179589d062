//! Formats instructions and data declarations into the output stream.
//!
//! The target assembler is line oriented, so every method writes exactly one
//! line. Instructions are indented into a fixed operand column; `dw`
//! declarations carry their label flush left.

use std::io::{self, Write};

/// Column the mnemonic starts at.
const INDENT: &str = "          ";

pub struct Emitter<W: Write> {
    out: W,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// `; text` — used for echoed source lines and token traces.
    pub fn comment(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "; {}", text)
    }

    /// Zero-operand instruction, e.g. `stav`.
    pub fn op1(&mut self, op: &str) -> io::Result<()> {
        writeln!(self.out, "{}{}", INDENT, op)
    }

    /// One-operand instruction, e.g. `pwc 42`.
    pub fn op2(&mut self, op: &str, operand: &str) -> io::Result<()> {
        writeln!(self.out, "{}{:<10}{}", INDENT, op, operand)
    }

    /// Code label on a line of its own, e.g. `@L0:`.
    pub fn label(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.out, "{}:", label)
    }

    /// Storage declaration, e.g. `x:        dw        0`.
    pub fn dw(&mut self, label: &str, value: &str) -> io::Result<()> {
        writeln!(self.out, "{:<9} dw        {}", format!("{}:", label), value)
    }

    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }
}
