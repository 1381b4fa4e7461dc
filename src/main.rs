//! solmark: generate documentation from Solidity build-info artifacts.
//!
//! `solmark -o docs artifacts/build-info/*.json` writes one markdown file per
//! contract, mirroring the contract's source directory under `docs/`.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use solmark::generator::{self, GeneratorConfig, DEFAULT_OUTPUT_DIR};
use solmark::parser::signature::DEFAULT_MAX_WIDTH;
use solmark::parser::DocSource;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "solmark",
    version,
    about = "Generate markdown documentation from Solidity build-info artifacts"
)]
struct Cli {
    /// Build-info files, directories containing them, or glob patterns
    #[arg(required = true)]
    files: Vec<String>,

    /// Output directory
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Only document sources under this path. Can be given multiple times.
    #[arg(long = "only-files")]
    only_files: Vec<String>,

    /// Skip sources under this path. Can be given multiple times.
    #[arg(long = "skip-files")]
    skip_files: Vec<String>,

    /// Only document this contract (`Name` or `path/File.sol:Name`)
    #[arg(long)]
    contract: Vec<String>,

    /// Output format: markdown (default), json
    #[arg(short = 'f', long, default_value = "markdown")]
    format: String,

    /// Documentation source: ast (NatSpec comments, default) or compiler
    /// (devdoc/userdoc output)
    #[arg(long, default_value = "ast")]
    docs: DocSource,

    /// Wrap signatures longer than this many characters
    #[arg(long, default_value_t = DEFAULT_MAX_WIDTH)]
    max_width: usize,

    /// Remove the output directory before generating
    #[arg(long)]
    clean: bool,

    /// Fail a contract on unknown tags or broken @inheritdoc
    #[arg(long)]
    strict: bool,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = GeneratorConfig {
        inputs: expand_globs(&cli.files)?,
        output: cli.output,
        only_files: cli.only_files,
        skip_files: cli.skip_files,
        contracts: cli.contract,
        format: cli.format,
        docs: cli.docs,
        max_width: cli.max_width,
        clean: cli.clean,
        strict: cli.strict,
    };

    let summary = generator::generate(&config)?;
    info!(
        "generated {} document(s), {} failed",
        summary.written.len(),
        summary.failed
    );
    Ok(())
}

/// Warnings by default; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,solmark={}", level)));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Expand glob patterns into a list of build-info files.
/// Also handles bare directory paths by scanning them for `*.json`.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        // Directories are scanned non-recursively, like build-info/ itself
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() && is_json(&p) {
                    files.push(p);
                }
            }
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            warn!("no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}
