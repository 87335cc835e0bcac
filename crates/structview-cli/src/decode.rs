//! `structview decode` command implementation.

use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use structview::{
    config::DecoderConfig,
    decoder::StructureDecoder,
    project::Project,
    script::ScriptRegistry,
    serde::DecodedFieldOut,
    source::{ByteSource, FileSource},
};

/// Arguments for the `decode` command.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Project file (`{ mainStructure, substructures, version }`).
    #[arg(long, short = 'p')]
    pub project: PathBuf,

    /// Binary file to decode.
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    /// Maximum nesting depth of substructures and repeats.
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Cap on any single repeat count (default 65536).
    #[arg(long)]
    pub max_repeat: Option<u64>,

    /// Pretty-print the JSON output.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

impl DecodeArgs {
    fn config(&self) -> DecoderConfig {
        let mut config = DecoderConfig::new();
        if let Some(depth) = self.max_depth {
            config.set_max_depth(depth);
        }
        if let Some(max) = self.max_repeat {
            config.set_max_repeat(max);
        }
        config
    }
}

/// Run the decode command.
///
/// # Errors
///
/// Returns an error if the project or input file cannot be read, or the
/// output cannot be written.
pub async fn run(args: &DecodeArgs) -> Result<()> {
    let project = Project::open(&args.project)
        .await
        .with_context(|| format!("loading project {}", args.project.display()))?;
    let source = FileSource::open(&args.input)
        .await
        .with_context(|| format!("opening {}", args.input.display()))?;

    info!(
        fields = project.main_structure.len(),
        substructures = project.substructures.len(),
        size = source.size(),
        "decoding"
    );

    let scripts = ScriptRegistry::with_builtins();
    let decoded = StructureDecoder::new(&source, &project.substructures, &scripts)
        .with_config(args.config())
        .decode_structure(&project.main_structure)
        .await;

    let out: Vec<DecodedFieldOut> = decoded.fields.iter().map(DecodedFieldOut::from).collect();
    let json = if args.pretty {
        serde_json::to_string_pretty(&out)?
    } else {
        serde_json::to_string(&out)?
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}").context("writing output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_flags() {
        let args = DecodeArgs {
            project: PathBuf::from("p.json"),
            input: PathBuf::from("in.bin"),
            max_depth: Some(8),
            max_repeat: None,
            pretty: false,
        };
        let config = args.config();
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.max_repeat, Some(structview::config::DEFAULT_MAX_REPEAT));
    }

    #[tokio::test]
    async fn test_run_decodes_file() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("project.json");
        let input = dir.path().join("input.bin");
        std::fs::write(
            &project,
            r#"{ "mainStructure": [{ "id": "magic", "type": "uint16" }], "substructures": [] }"#,
        )
        .unwrap();
        std::fs::write(&input, [0xca, 0xfe]).unwrap();

        let args = DecodeArgs {
            project,
            input,
            max_depth: None,
            max_repeat: Some(4),
            pretty: true,
        };
        run(&args).await.unwrap();
    }

    #[tokio::test]
    async fn test_run_reports_missing_project() {
        let args = DecodeArgs {
            project: PathBuf::from("/nonexistent/project.json"),
            input: PathBuf::from("/nonexistent/input.bin"),
            max_depth: None,
            max_repeat: None,
            pretty: false,
        };
        let err = run(&args).await.unwrap_err();
        assert!(err.to_string().contains("loading project"));
    }
}
