pub mod cli;
pub mod compiler;
pub mod error;

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::Context;
use clap::Parser;

pub fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // 1. ── Read the source ────────────────────────────────────────────
    let in_path = format!("{}.s", args.base);
    let out_path = format!("{}.a", args.base);
    let source =
        std::fs::read_to_string(&in_path).with_context(|| format!("Reading {in_path}"))?;

    // 2. ── Open the listing ───────────────────────────────────────────
    let file = File::create(&out_path).with_context(|| format!("Creating {out_path}"))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "; Output from the stackc compiler").context("Writing header")?;

    // 3. ── Compile ────────────────────────────────────────────────────
    let options = compiler::Options {
        trace_tokens: args.debug_tokens,
    };
    let result = compiler::compile(&source, &mut out, &options);

    // flush even on the error path so the partial listing survives for
    // inspection
    out.flush().with_context(|| format!("Flushing {out_path}"))?;
    result.with_context(|| format!("Compiling {in_path}"))?;

    println!("wrote {out_path}");
    Ok(())
}
