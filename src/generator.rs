//! File mode: read build-infos, select contracts, write one document each.

use crate::build_info::BuildInfo;
use crate::error::Error;
use crate::parser::signature::DEFAULT_MAX_WIDTH;
use crate::parser::{ContractParser, DocSource};
use crate::render::{create_renderer, Renderer};
use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_OUTPUT_DIR: &str = "./generated-markups";

/// Everything one generation run needs, independent of the CLI.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Build-info JSON files
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    /// Source path prefixes to keep; empty keeps everything
    pub only_files: Vec<String>,
    /// Source path prefixes to drop
    pub skip_files: Vec<String>,
    /// `Name` or `path:Name`; empty keeps everything
    pub contracts: Vec<String>,
    pub format: String,
    pub docs: DocSource,
    pub max_width: usize,
    /// Remove the output directory first
    pub clean: bool,
    /// Declaration problems fail the contract
    pub strict: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: PathBuf::from(DEFAULT_OUTPUT_DIR),
            only_files: Vec::new(),
            skip_files: Vec::new(),
            contracts: Vec::new(),
            format: "markdown".to_string(),
            docs: DocSource::default(),
            max_width: DEFAULT_MAX_WIDTH,
            clean: false,
            strict: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct Summary {
    pub written: Vec<PathBuf>,
    pub failed: usize,
}

pub fn generate(config: &GeneratorConfig) -> Result<Summary> {
    if config.clean {
        clean_output(&config.output)?;
    }
    fs::create_dir_all(&config.output).with_context(|| {
        format!("failed to create output directory: {}", config.output.display())
    })?;

    let renderer = create_renderer(&config.format)?;
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut summary = Summary::default();

    for input in &config.inputs {
        let build = match BuildInfo::from_path(input) {
            Ok(build) => build,
            Err(Error::Io(err)) => {
                return Err(err).with_context(|| format!("failed to read {}", input.display()))
            }
            Err(err) => {
                warn!("skipping {}: {}", input.display(), err);
                summary.failed += 1;
                continue;
            }
        };
        let parser = ContractParser::new(&build);

        for (source, name) in build.contract_names() {
            if !is_selected(&source, &name, config) {
                continue;
            }
            if !seen.insert((source.clone(), name.clone())) {
                debug!(source = %source, name = %name, "already generated from another build-info");
                continue;
            }
            match write_contract(&parser, &source, &name, config, renderer.as_ref()) {
                Ok(path) => summary.written.push(path),
                Err(err) => {
                    warn!("skipping {}:{}: {:#}", source, name, err);
                    summary.failed += 1;
                }
            }
        }
    }

    if summary.written.is_empty() && summary.failed > 0 {
        bail!("no documentation generated: {} contract(s) failed", summary.failed);
    }
    Ok(summary)
}

fn write_contract(
    parser: &ContractParser<'_>,
    source: &str,
    name: &str,
    config: &GeneratorConfig,
    renderer: &dyn Renderer,
) -> Result<PathBuf> {
    let parsed = parser.parse_contract(source, name, config.docs, config.max_width)?;
    for problem in &parsed.problems {
        warn!("{}:{}: {}", source, name, problem);
    }
    if config.strict && !parsed.problems.is_empty() {
        bail!("{} documentation problem(s) in strict mode", parsed.problems.len());
    }

    let out_path = output_path(&config.output, source, name, renderer.file_extension());
    if let Some(dir) = out_path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let rendered = renderer.render(&parsed.info)?;
    fs::write(&out_path, rendered)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    info!("wrote {}", out_path.display());
    Ok(out_path)
}

/// `{output}/{dirname(source)}/{name}.{ext}`. Root and parent components of
/// the source path are dropped so documents never land outside `output`.
pub fn output_path(output: &Path, source: &str, name: &str, ext: &str) -> PathBuf {
    let mut path = output.to_path_buf();
    if let Some(dir) = Path::new(source).parent() {
        for component in dir.components() {
            if let Component::Normal(part) = component {
                path.push(part);
            }
        }
    }
    path.push(format!("{}.{}", name, ext));
    path
}

fn is_selected(source: &str, name: &str, config: &GeneratorConfig) -> bool {
    if !config.only_files.is_empty() && !config.only_files.iter().any(|p| path_matches(source, p)) {
        return false;
    }
    if config.skip_files.iter().any(|p| path_matches(source, p)) {
        return false;
    }
    config.contracts.is_empty()
        || config
            .contracts
            .iter()
            .any(|c| c == name || *c == format!("{}:{}", source, name))
}

/// Segment-wise prefix match: `contracts/token` matches
/// `contracts/token/ERC20.sol` but not `contracts/tokenomics.sol`.
pub fn path_matches(source: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_start_matches("./");
    Path::new(source).starts_with(Path::new(prefix))
}

fn clean_output(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    if !dir.is_dir() {
        bail!("refusing to clean {}: not a directory", dir.display());
    }
    fs::remove_dir_all(dir).with_context(|| format!("failed to remove {}", dir.display()))
}
