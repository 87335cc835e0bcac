//! `structview entropy` command implementation.

use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result, ensure};
use clap::Args;

use structview::{
    entropy::source_entropy,
    source::{ByteSource, FileSource},
};

/// Arguments for the `entropy` command.
#[derive(Args, Debug)]
pub struct EntropyArgs {
    /// File to analyse.
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    /// Block size in bytes.
    #[arg(long, short = 'b', default_value_t = 256)]
    pub block_size: u64,
}

/// Run the entropy command.
///
/// # Errors
///
/// Returns an error for a zero block size or if the file cannot be read.
pub async fn run(args: &EntropyArgs) -> Result<()> {
    ensure!(args.block_size > 0, "block size must be at least 1");

    let source = FileSource::open(&args.input)
        .await
        .with_context(|| format!("opening {}", args.input.display()))?;
    let blocks = source_entropy(&source, args.block_size)
        .await
        .with_context(|| format!("reading {}", args.input.display()))?;

    let out = serde_json::json!({
        "size": source.size(),
        "blockSize": args.block_size,
        "entropy": blocks,
    });

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{out}").context("writing output")?;
    Ok(())
}
