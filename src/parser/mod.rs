//! Parser module: turns one contract of a build-info into a [`ContractInfo`].
//!
//! Documentation comes from the AST by default (NatSpec comments resolved
//! through the inheritance graph) or from the compiler's devdoc/userdoc
//! output when the AST is missing or explicitly not wanted.

pub mod ast;
pub mod devdoc;
pub mod index;
pub mod natspec;
pub mod signature;

use crate::build_info::{BuildInfo, SourceTexts};
use crate::error::{Error, Result};
use crate::model::{ContractInfo, DeclKind, DocGroup, DocRecord, GroupKind, DEFAULT_LICENSE};
use ast::{ContractKind, SourceUnit};
use index::{collect_declarations, find_contract, Declaration, NodeIndex};
use std::str::FromStr;
use tracing::debug;

/// Where declaration documentation is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocSource {
    /// NatSpec comments in the AST, with inheritance
    #[default]
    Ast,
    /// The compiler's devdoc/userdoc output
    Compiler,
}

impl FromStr for DocSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ast" => Ok(DocSource::Ast),
            "compiler" | "devdoc" => Ok(DocSource::Compiler),
            other => Err(format!("unknown docs source: {}. Use ast or compiler", other)),
        }
    }
}

/// A contract's documentation plus the declaration-level problems met
/// while building it.
#[derive(Debug)]
pub struct ParsedContract {
    pub info: ContractInfo,
    pub problems: Vec<Error>,
}

/// Parses contracts of a single build-info. The node index is built once
/// and shared by every contract of the build.
pub struct ContractParser<'a> {
    build: &'a BuildInfo,
    index: NodeIndex<'a>,
    sources: SourceTexts<'a>,
}

impl<'a> ContractParser<'a> {
    pub fn new(build: &'a BuildInfo) -> Self {
        Self {
            build,
            index: NodeIndex::new(build),
            sources: build.source_texts(),
        }
    }

    pub fn parse_contract(
        &self,
        path: &str,
        name: &str,
        docs: DocSource,
        max_width: usize,
    ) -> Result<ParsedContract> {
        let unit = self.build.source_unit(path);
        match (docs, unit) {
            (DocSource::Ast, Ok(unit)) => self.from_ast(unit, path, name, max_width),
            (DocSource::Ast, Err(_)) => {
                debug!(path, name, "no AST in build-info, using compiler docs");
                self.from_compiler_docs(None, path, name, max_width)
            }
            (DocSource::Compiler, unit) => {
                self.from_compiler_docs(unit.ok(), path, name, max_width)
            }
        }
    }

    fn from_ast(
        &self,
        unit: &'a SourceUnit,
        path: &str,
        name: &str,
        max_width: usize,
    ) -> Result<ParsedContract> {
        let contract = find_contract(unit, path, name)?;
        let members = collect_declarations(contract);
        let mut problems = members.skipped;

        let documentation = self.record(Declaration::Contract(contract), max_width, &mut problems);

        let mut groups = Vec::new();
        for (kind, decls) in [
            (GroupKind::Enums, members.enums),
            (GroupKind::Structs, members.structs),
            (GroupKind::Events, members.events),
            (GroupKind::Errors, members.errors),
            (GroupKind::Constants, members.constants),
            (GroupKind::StateVariables, members.state_variables),
            (GroupKind::Modifiers, members.modifiers),
            (GroupKind::Functions, members.functions),
            (GroupKind::UsingFor, members.using_for),
        ] {
            if decls.is_empty() {
                continue;
            }
            let mut records = Vec::with_capacity(decls.len());
            for decl in decls {
                records.push(self.record(decl, max_width, &mut problems));
            }
            groups.push(DocGroup { kind, records });
        }

        Ok(ParsedContract {
            info: ContractInfo {
                name: contract.name.clone(),
                source: path.to_string(),
                license: license(Some(unit)),
                is_abstract: contract.is_abstract,
                kind: contract.contract_kind,
                documentation,
                groups,
            },
            problems,
        })
    }

    fn record(
        &self,
        decl: Declaration<'a>,
        max_width: usize,
        problems: &mut Vec<Error>,
    ) -> DocRecord {
        let resolution = natspec::resolve(decl, &self.index, &self.sources);
        problems.extend(resolution.problems);
        DocRecord {
            kind: decl.kind(),
            title: signature::build_title(decl),
            full_signature: signature::build_signature(decl, &self.sources),
            signature_lines: signature::display_lines(decl, &self.sources, max_width),
            natspec: resolution.natspec,
        }
    }

    fn from_compiler_docs(
        &self,
        unit: Option<&'a SourceUnit>,
        path: &str,
        name: &str,
        max_width: usize,
    ) -> Result<ParsedContract> {
        let output = self
            .build
            .contract_output(path, name)
            .ok_or_else(|| Error::ContractNotFound {
                path: path.to_string(),
                name: name.to_string(),
            })?;
        let docs = devdoc::resolve_contract(output, max_width);

        // License, kind and the contract header still come from the AST
        // when there is one.
        let contract = unit.and_then(|u| find_contract(u, path, name).ok());
        let full_signature = match contract {
            Some(c) => signature::build_signature(Declaration::Contract(c), &self.sources),
            None => format!("contract {}", name),
        };

        let groups = [
            (GroupKind::Events, docs.events),
            (GroupKind::Errors, docs.errors),
            (GroupKind::StateVariables, docs.state_variables),
            (GroupKind::Functions, docs.functions),
        ]
        .into_iter()
        .filter(|(_, records)| !records.is_empty())
        .map(|(kind, records)| DocGroup { kind, records })
        .collect();

        Ok(ParsedContract {
            info: ContractInfo {
                name: name.to_string(),
                source: path.to_string(),
                license: license(unit),
                is_abstract: contract.is_some_and(|c| c.is_abstract),
                kind: contract.map_or(ContractKind::Contract, |c| c.contract_kind),
                documentation: DocRecord {
                    kind: DeclKind::Contract,
                    title: String::new(),
                    signature_lines: vec![full_signature.clone()],
                    full_signature,
                    natspec: docs.documentation,
                },
                groups,
            },
            problems: Vec::new(),
        })
    }
}

fn license(unit: Option<&SourceUnit>) -> String {
    unit.and_then(|u| u.license.clone())
        .unwrap_or_else(|| DEFAULT_LICENSE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build() -> BuildInfo {
        serde_json::from_value(json!({
            "output": {
                "sources": {
                    "contracts/Vault.sol": {"id": 0, "ast": {"nodeType": "SourceUnit", "id": 1, "license": "MIT", "nodes": [
                        {"nodeType": "ContractDefinition", "id": 10, "name": "IVault", "contractKind": "interface", "nodes": [{
                            "nodeType": "FunctionDefinition", "id": 11, "name": "deposit", "visibility": "external",
                            "functionSelector": "b6b55f25",
                            "parameters": {"parameters": [{"id": 12, "name": "amount", "typeDescriptions": {"typeString": "uint256"}}]},
                            "documentation": {"src": "", "text": "@notice Deposit funds\n@param amount How much"}
                        }]},
                        {"nodeType": "ContractDefinition", "id": 20, "name": "Vault", "contractKind": "contract",
                         "abstract": true,
                         "baseContracts": [{"baseName": {"name": "IVault"}}],
                         "documentation": {"src": "", "text": "@title Vault\n@tag oops"},
                         "nodes": [
                            {"nodeType": "FunctionDefinition", "id": 21, "name": "deposit", "visibility": "external",
                             "baseFunctions": [11], "functionSelector": "b6b55f25",
                             "parameters": {"parameters": [{"id": 22, "name": "amount", "typeDescriptions": {"typeString": "uint256"}}]}},
                            {"nodeType": "EventDefinition", "id": 23, "name": "Deposited"},
                            {"nodeType": "UserDefinedValueTypeDefinition", "id": 24, "name": "Shares"}
                         ]}
                    ]}}
                },
                "contracts": {
                    "contracts/Vault.sol": {"Vault": {
                        "abi": [{"type": "function", "name": "deposit", "stateMutability": "nonpayable",
                                 "inputs": [{"name": "amount", "type": "uint256"}], "outputs": []}],
                        "userdoc": {"methods": {"deposit(uint256)": {"notice": "Compiler notice"}}}
                    }}
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn ast_mode_groups_and_inherits() {
        let build = build();
        let parser = ContractParser::new(&build);
        let parsed = parser
            .parse_contract("contracts/Vault.sol", "Vault", DocSource::Ast, 99)
            .unwrap();
        let info = &parsed.info;
        assert_eq!(info.license, "MIT");
        assert!(info.is_abstract);
        assert_eq!(info.documentation.full_signature, "abstract contract Vault is IVault");
        assert_eq!(info.documentation.natspec.title.as_deref(), Some("Vault"));

        let kinds: Vec<_> = info.groups.iter().map(|g| g.kind).collect();
        assert_eq!(kinds, vec![GroupKind::Events, GroupKind::Functions]);

        let deposit = &info.group(GroupKind::Functions).unwrap().records[0];
        assert_eq!(deposit.title, "deposit (0xb6b55f25)");
        assert_eq!(deposit.natspec.notice.as_deref(), Some("Deposit funds"));
        assert_eq!(deposit.natspec.params[0].description, "How much");

        // the unknown tag and the value type
        assert_eq!(parsed.problems.len(), 2);
        assert!(parsed.problems.iter().all(Error::is_declaration_level));
    }

    #[test]
    fn compiler_mode_reads_devdoc() {
        let build = build();
        let parser = ContractParser::new(&build);
        let parsed = parser
            .parse_contract("contracts/Vault.sol", "Vault", DocSource::Compiler, 99)
            .unwrap();
        let deposit = &parsed.info.group(GroupKind::Functions).unwrap().records[0];
        assert_eq!(deposit.natspec.notice.as_deref(), Some("Compiler notice"));
        assert_eq!(parsed.info.license, "MIT");
        assert!(parsed.info.is_abstract);
    }

    #[test]
    fn missing_ast_falls_back_to_compiler_docs() {
        let build: BuildInfo = serde_json::from_value(json!({
            "output": {"contracts": {"A.sol": {"A": {"abi": []}}}}
        }))
        .unwrap();
        let parser = ContractParser::new(&build);
        let parsed = parser.parse_contract("A.sol", "A", DocSource::Ast, 99).unwrap();
        assert_eq!(parsed.info.license, DEFAULT_LICENSE);
        assert_eq!(parsed.info.documentation.full_signature, "contract A");
        assert!(parsed.info.groups.is_empty());
    }

    #[test]
    fn unknown_contract_is_reported() {
        let build = build();
        let parser = ContractParser::new(&build);
        let err = parser
            .parse_contract("contracts/Vault.sol", "Nope", DocSource::Ast, 99)
            .unwrap_err();
        assert!(matches!(err, Error::ContractNotFound { .. }));
    }

    #[test]
    fn docs_source_from_str() {
        assert_eq!("ast".parse::<DocSource>(), Ok(DocSource::Ast));
        assert_eq!("compiler".parse::<DocSource>(), Ok(DocSource::Compiler));
        assert!("xml".parse::<DocSource>().is_err());
    }
}
