//! Names that need backing storage, and the label supply.

use std::collections::HashMap;
use std::io::Write;

use super::emit::Emitter;

/// Deduplicated, insertion-ordered set of variable names. Every name lands
/// here the first time it is used as an operand or assignment target and is
/// dumped exactly once, as zero-initialized storage, at end of compilation.
#[derive(Default)]
pub struct SymbolTable {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: a name already present is left where it first appeared.
    pub fn register(&mut self, name: &str) {
        if !self.index.contains_key(name) {
            self.index.insert(name.to_string(), self.names.len());
            self.names.push(name.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// One `dw 0` declaration per registered name, in first-use order.
    pub fn dump<W: Write>(&self, out: &mut Emitter<W>) -> std::io::Result<()> {
        for name in &self.names {
            out.dw(name, "0")?;
        }
        Ok(())
    }
}

/// Issues `@L0`, `@L1`, ... for control-flow targets and string constants.
/// The `@` prefix keeps labels out of the identifier namespace, so a label
/// can never collide with a symbol table entry.
#[derive(Default)]
pub struct LabelAllocator {
    count: usize,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> String {
        let label = format!("@L{}", self.count);
        self.count += 1;
        label
    }
}
