//! Data model for resolved documentation, independent of output format.

use crate::parser::ast::ContractKind;
use indexmap::IndexMap;
use serde::Serialize;

/// License reported when the source unit has no SPDX identifier.
pub const DEFAULT_LICENSE: &str = "UNLICENSED";

/// Everything rendered for one contract.
#[derive(Debug, Clone, Serialize)]
pub struct ContractInfo {
    pub name: String,
    /// Source path as keyed in the build-info (`contracts/Token.sol`)
    pub source: String,
    pub license: String,
    pub is_abstract: bool,
    pub kind: ContractKind,
    /// Contract-level documentation and signature
    pub documentation: DocRecord,
    /// Non-empty groups in display order
    pub groups: Vec<DocGroup>,
}

impl ContractInfo {
    pub fn group(&self, kind: GroupKind) -> Option<&DocGroup> {
        self.groups.iter().find(|g| g.kind == kind)
    }
}

/// Declarations of one kind, in source order.
#[derive(Debug, Clone, Serialize)]
pub struct DocGroup {
    pub kind: GroupKind,
    pub records: Vec<DocRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Enums,
    Structs,
    Events,
    Errors,
    Constants,
    StateVariables,
    Modifiers,
    Functions,
    UsingFor,
}

impl GroupKind {
    pub fn title(&self) -> &'static str {
        match self {
            GroupKind::Enums => "Enums info",
            GroupKind::Structs => "Structs info",
            GroupKind::Events => "Events info",
            GroupKind::Errors => "Errors info",
            GroupKind::Constants => "Constants info",
            GroupKind::StateVariables => "State variables info",
            GroupKind::Modifiers => "Modifiers info",
            GroupKind::Functions => "Functions info",
            GroupKind::UsingFor => "Using-for directives info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Contract,
    Function,
    Variable,
    Event,
    Error,
    Enum,
    Struct,
    Modifier,
    UsingFor,
}

/// One documented declaration.
#[derive(Debug, Clone, Serialize)]
pub struct DocRecord {
    pub kind: DeclKind,
    /// `transfer (0xa9059cbb)`; empty for the contract itself
    pub title: String,
    /// Canonical single-string signature
    pub full_signature: String,
    /// Display form, possibly wrapped over several lines
    pub signature_lines: Vec<String>,
    pub natspec: NatSpec,
}

/// Structured NatSpec fields of one declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NatSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// @title (contracts only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<DocParam>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub returns: Vec<DocReturn>,
    /// @custom:<tag> entries, prefix removed
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub custom: IndexMap<String, String>,
}

impl NatSpec {
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.title.is_none()
            && self.notice.is_none()
            && self.dev.is_none()
            && self.params.is_empty()
            && self.returns.is_empty()
            && self.custom.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocParam {
    pub name: String,
    /// Absent for enum members
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocReturn {
    /// Absent for unnamed outputs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    pub description: String,
}
