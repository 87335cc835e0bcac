//! `structview` command-line entrypoint.
//!
//! - `structview decode` - decode a binary file with a project definition
//! - `structview entropy` - per-block Shannon entropy of a file

#![forbid(unsafe_code)]

mod decode;
mod entropy;

use clap::{Parser, Subcommand};

/// Decode binary files with declarative structure definitions.
#[derive(Parser)]
#[command(name = "structview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log decoder activity (debug level) to stderr.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a binary file and print the field tree as JSON.
    ///
    /// Example: structview decode --project format.json --input firmware.bin
    Decode(decode::DecodeArgs),

    /// Print per-block entropy of a file as JSON.
    Entropy(entropy::EntropyArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout is clean JSON.
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match cli.command {
        Commands::Decode(args) => decode::run(&args).await,
        Commands::Entropy(args) => entropy::run(&args).await,
    }
}
