use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Base name of the program to compile: `<BASE>.s` is read and the
    /// assembly listing is written to `<BASE>.a`
    pub base: String,

    /// Write a trace of every scanned token into the listing as comments
    #[arg(long)]
    pub debug_tokens: bool,
}
