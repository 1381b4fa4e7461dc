//! Build-info artifact: the compiler's standard-JSON input and output.
//!
//! Hardhat writes these under `artifacts/build-info/`, Foundry under
//! `out/build-info/`. Both wrap the same solc structures.

use crate::error::{Error, Result};
use crate::parser::ast::SourceUnit;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct BuildInfo {
    #[serde(default)]
    pub input: CompilerInput,
    pub output: CompilerOutput,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompilerInput {
    #[serde(default)]
    pub sources: BTreeMap<String, InputSource>,
}

#[derive(Debug, Deserialize)]
pub struct InputSource {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompilerOutput {
    #[serde(default)]
    pub sources: BTreeMap<String, OutputSource>,
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, ContractOutput>>,
}

#[derive(Debug, Deserialize)]
pub struct OutputSource {
    #[serde(default)]
    pub id: u32,
    pub ast: Option<SourceUnit>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContractOutput {
    #[serde(default)]
    pub abi: Vec<AbiEntry>,
    pub devdoc: Option<DevDoc>,
    pub userdoc: Option<UserDoc>,
    pub evm: Option<EvmOutput>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmOutput {
    #[serde(default)]
    pub method_identifiers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
    pub state_mutability: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub internal_type: Option<String>,
    #[serde(default)]
    pub components: Vec<AbiParam>,
    #[serde(default)]
    pub indexed: bool,
}

/// Developer documentation (`devdoc`) as emitted by solc.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevDoc {
    pub author: Option<String>,
    pub title: Option<String>,
    pub details: Option<String>,
    #[serde(default)]
    pub methods: BTreeMap<String, MethodDevDoc>,
    #[serde(default)]
    pub events: BTreeMap<String, MethodDevDoc>,
    #[serde(default)]
    pub errors: BTreeMap<String, Vec<MethodDevDoc>>,
    #[serde(default)]
    pub state_variables: BTreeMap<String, StateVariableDevDoc>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MethodDevDoc {
    pub details: Option<String>,
    #[serde(default)]
    pub params: IndexMap<String, String>,
    #[serde(default)]
    pub returns: IndexMap<String, String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StateVariableDevDoc {
    pub details: Option<String>,
    #[serde(rename = "return")]
    pub return_doc: Option<String>,
    #[serde(default)]
    pub returns: IndexMap<String, String>,
}

/// User documentation (`userdoc`) as emitted by solc.
#[derive(Debug, Default, Deserialize)]
pub struct UserDoc {
    pub notice: Option<String>,
    #[serde(default)]
    pub methods: BTreeMap<String, UserNotice>,
    #[serde(default)]
    pub events: BTreeMap<String, UserNotice>,
    #[serde(default)]
    pub errors: BTreeMap<String, Vec<UserNotice>>,
}

/// Old compilers emit `"constructor": "text"` instead of an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UserNotice {
    Structured { notice: Option<String> },
    Plain(String),
}

impl UserNotice {
    pub fn notice(&self) -> Option<&str> {
        match self {
            UserNotice::Structured { notice } => notice.as_deref(),
            UserNotice::Plain(text) => Some(text),
        }
    }
}

/// `custom:*` entries of a flattened devdoc object, prefix removed.
pub fn custom_tags(extra: &BTreeMap<String, Value>) -> IndexMap<String, String> {
    extra
        .iter()
        .filter_map(|(key, value)| {
            let tag = key.strip_prefix("custom:")?;
            Some((tag.to_string(), value.as_str()?.to_string()))
        })
        .collect()
}

impl BuildInfo {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn source_unit(&self, path: &str) -> Result<&SourceUnit> {
        self.output
            .sources
            .get(path)
            .and_then(|s| s.ast.as_ref())
            .ok_or_else(|| Error::SourceNotFound(path.to_string()))
    }

    pub fn contract_output(&self, path: &str, name: &str) -> Option<&ContractOutput> {
        self.output.contracts.get(path).and_then(|c| c.get(name))
    }

    /// Every `(source path, contract name)` pair, sorted.
    ///
    /// Uses the compiler's `contracts` map when present, otherwise the
    /// contract definitions found in the ASTs.
    pub fn contract_names(&self) -> Vec<(String, String)> {
        if !self.output.contracts.is_empty() {
            return self
                .output
                .contracts
                .iter()
                .flat_map(|(path, contracts)| {
                    contracts.keys().map(move |name| (path.clone(), name.clone()))
                })
                .collect();
        }

        self.output
            .sources
            .iter()
            .filter_map(|(path, source)| source.ast.as_ref().map(|ast| (path, ast)))
            .flat_map(|(path, ast)| {
                ast.nodes.iter().filter_map(move |node| match node {
                    crate::parser::ast::AstNode::Contract(c) => {
                        Some((path.clone(), c.name.clone()))
                    }
                    _ => None,
                })
            })
            .collect()
    }

    pub fn source_texts(&self) -> SourceTexts<'_> {
        let mut by_index = HashMap::new();
        for (path, source) in &self.output.sources {
            if let Some(content) = self.input.sources.get(path).and_then(|s| s.content.as_deref()) {
                by_index.insert(source.id, content);
            }
        }
        SourceTexts { by_index }
    }
}

/// Original source buffers keyed by the compiler's file index, for
/// copying text back out by `src` location.
#[derive(Debug, Default)]
pub struct SourceTexts<'a> {
    by_index: HashMap<u32, &'a str>,
}

impl<'a> SourceTexts<'a> {
    pub fn new(by_index: HashMap<u32, &'a str>) -> Self {
        Self { by_index }
    }

    /// Slice a `start:length:fileIndex` location out of the original buffer.
    ///
    /// Offsets are bytes. Returns `None` for unknown files, out-of-range
    /// spans or spans that do not fall on character boundaries.
    pub fn slice(&self, src: &str) -> Option<&'a str> {
        let mut parts = src.split(':');
        let start: usize = parts.next()?.parse().ok()?;
        let length: usize = parts.next()?.parse().ok()?;
        let index: u32 = parts.next()?.parse().ok()?;
        let content = self.by_index.get(&index)?;
        content.get(start..start.checked_add(length)?)
    }
}
