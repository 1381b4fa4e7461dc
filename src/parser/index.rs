//! AST navigation: declaration lookup by id, contract lookup by name, and
//! the visibility policy deciding which members are documented.

use crate::build_info::BuildInfo;
use crate::error::{Error, Result};
use crate::model::DeclKind;
use crate::parser::ast::*;
use std::collections::HashMap;

/// Borrowed view of one documentable declaration.
#[derive(Debug, Clone, Copy)]
pub enum Declaration<'a> {
    Contract(&'a ContractDefinition),
    Function(&'a FunctionDefinition),
    Variable(&'a VariableDeclaration),
    Event(&'a EventDefinition),
    Error(&'a ErrorDefinition),
    Enum(&'a EnumDefinition),
    Struct(&'a StructDefinition),
    Modifier(&'a ModifierDefinition),
    UsingFor(&'a UsingForDirective),
}

/// A parameter or member the resolver can match `@param` tags against.
#[derive(Debug, Clone, Copy)]
pub struct Member<'a> {
    pub name: &'a str,
    pub type_string: Option<&'a str>,
}

impl<'a> Declaration<'a> {
    pub fn from_node(node: &'a AstNode) -> Result<Self> {
        Ok(match node {
            AstNode::Contract(c) => Declaration::Contract(c),
            AstNode::Function(f) => Declaration::Function(f),
            AstNode::Variable(v) => Declaration::Variable(v),
            AstNode::Event(e) => Declaration::Event(e),
            AstNode::Error(e) => Declaration::Error(e),
            AstNode::Enum(e) => Declaration::Enum(e),
            AstNode::Struct(s) => Declaration::Struct(s),
            AstNode::Modifier(m) => Declaration::Modifier(m),
            AstNode::UsingFor(u) => Declaration::UsingFor(u),
            AstNode::Other { node_type, id } => {
                return Err(Error::UnsupportedNodeKind {
                    node_type: node_type.clone(),
                    id: *id,
                })
            }
        })
    }

    pub fn id(&self) -> i64 {
        match *self {
            Declaration::Contract(c) => c.id,
            Declaration::Function(f) => f.id,
            Declaration::Variable(v) => v.id,
            Declaration::Event(e) => e.id,
            Declaration::Error(e) => e.id,
            Declaration::Enum(e) => e.id,
            Declaration::Struct(s) => s.id,
            Declaration::Modifier(m) => m.id,
            Declaration::UsingFor(u) => u.id,
        }
    }

    pub fn name(&self) -> &'a str {
        match *self {
            Declaration::Contract(c) => &c.name,
            Declaration::Function(f) => &f.name,
            Declaration::Variable(v) => &v.name,
            Declaration::Event(e) => &e.name,
            Declaration::Error(e) => &e.name,
            Declaration::Enum(e) => &e.name,
            Declaration::Struct(s) => &s.name,
            Declaration::Modifier(m) => &m.name,
            Declaration::UsingFor(u) => u
                .library_name
                .as_ref()
                .map(|l| l.name.as_str())
                .unwrap_or_default(),
        }
    }

    /// Human-readable label for diagnostics: `function transfer`, `constructor`.
    pub fn describe(&self) -> String {
        let kind = match *self {
            Declaration::Contract(c) => c.contract_kind.as_str(),
            Declaration::Function(f) => f.kind.as_str(),
            Declaration::Variable(_) => "variable",
            Declaration::Event(_) => "event",
            Declaration::Error(_) => "error",
            Declaration::Enum(_) => "enum",
            Declaration::Struct(_) => "struct",
            Declaration::Modifier(_) => "modifier",
            Declaration::UsingFor(_) => "using",
        };
        match self.name() {
            "" => kind.to_string(),
            name => format!("{} {}", kind, name),
        }
    }

    pub fn documentation(&self) -> Option<&'a Documentation> {
        match *self {
            Declaration::Contract(c) => c.documentation.as_ref(),
            Declaration::Function(f) => f.documentation.as_ref(),
            Declaration::Variable(v) => v.documentation.as_ref(),
            Declaration::Event(e) => e.documentation.as_ref(),
            Declaration::Error(e) => e.documentation.as_ref(),
            Declaration::Enum(e) => e.documentation.as_ref(),
            Declaration::Struct(s) => s.documentation.as_ref(),
            Declaration::Modifier(m) => m.documentation.as_ref(),
            Declaration::UsingFor(_) => None,
        }
    }

    /// Override edges: `baseFunctions` for functions and public state
    /// variables, `baseModifiers` for modifiers.
    pub fn base_ids(&self) -> &'a [i64] {
        match *self {
            Declaration::Function(f) => &f.base_functions,
            Declaration::Variable(v) => &v.base_functions,
            Declaration::Modifier(m) => &m.base_modifiers,
            _ => &[],
        }
    }

    /// Names `@param` tags are validated against: parameters, or members
    /// for enums and structs.
    pub fn members(&self) -> Vec<Member<'a>> {
        let from_vars = |vars: &'a [VariableDeclaration]| -> Vec<Member<'a>> {
            vars.iter()
                .map(|v| Member {
                    name: &v.name,
                    type_string: v.type_descriptions.type_string.as_deref(),
                })
                .collect()
        };
        match *self {
            Declaration::Function(f) => from_vars(&f.parameters.parameters),
            Declaration::Event(e) => from_vars(&e.parameters.parameters),
            Declaration::Error(e) => from_vars(&e.parameters.parameters),
            Declaration::Modifier(m) => from_vars(&m.parameters.parameters),
            Declaration::Struct(s) => from_vars(&s.members),
            Declaration::Enum(e) => e
                .members
                .iter()
                .map(|m| Member {
                    name: &m.name,
                    type_string: None,
                })
                .collect(),
            Declaration::Contract(_) | Declaration::Variable(_) | Declaration::UsingFor(_) => {
                Vec::new()
            }
        }
    }

    /// Outputs `@return` tags are matched against, positionally. A public
    /// state variable's getter returns the variable itself, unnamed.
    pub fn outputs(&self) -> Vec<Member<'a>> {
        match *self {
            Declaration::Function(f) => f
                .return_parameters
                .parameters
                .iter()
                .map(|v| Member {
                    name: &v.name,
                    type_string: v.type_descriptions.type_string.as_deref(),
                })
                .collect(),
            Declaration::Variable(v) => vec![Member {
                name: "",
                type_string: v.type_descriptions.type_string.as_deref(),
            }],
            _ => Vec::new(),
        }
    }

    pub fn kind(&self) -> DeclKind {
        match *self {
            Declaration::Contract(_) => DeclKind::Contract,
            Declaration::Function(_) => DeclKind::Function,
            Declaration::Variable(_) => DeclKind::Variable,
            Declaration::Event(_) => DeclKind::Event,
            Declaration::Error(_) => DeclKind::Error,
            Declaration::Enum(_) => DeclKind::Enum,
            Declaration::Struct(_) => DeclKind::Struct,
            Declaration::Modifier(_) => DeclKind::Modifier,
            Declaration::UsingFor(_) => DeclKind::UsingFor,
        }
    }

    pub fn is_event(&self) -> bool {
        matches!(self, Declaration::Event(_))
    }
}

/// True iff the member is part of the contract's external surface.
pub fn is_externally_visible(visibility: Visibility) -> bool {
    matches!(visibility, Visibility::Public | Visibility::External)
}

/// Id → declaration lookup over every source unit of one build.
///
/// Override and `@inheritdoc` edges are expressed as ids that may point
/// into other files, so the index spans the whole build. Built once per
/// build-info and only read afterwards.
#[derive(Debug, Default)]
pub struct NodeIndex<'a> {
    nodes: HashMap<i64, Declaration<'a>>,
    scopes: HashMap<i64, &'a ContractDefinition>,
}

impl<'a> NodeIndex<'a> {
    pub fn new(build: &'a BuildInfo) -> Self {
        Self::from_units(build.output.sources.values().filter_map(|s| s.ast.as_ref()))
    }

    pub fn from_units(units: impl IntoIterator<Item = &'a SourceUnit>) -> Self {
        let mut index = NodeIndex::default();
        for unit in units {
            for node in &unit.nodes {
                let Ok(decl) = Declaration::from_node(node) else {
                    continue;
                };
                index.nodes.insert(decl.id(), decl);
                if let Declaration::Contract(contract) = decl {
                    for child in &contract.nodes {
                        if let Ok(member) = Declaration::from_node(child) {
                            index.nodes.insert(member.id(), member);
                            index.scopes.insert(member.id(), contract);
                        }
                    }
                }
            }
        }
        index
    }

    pub fn deref(&self, id: i64) -> Option<Declaration<'a>> {
        self.nodes.get(&id).copied()
    }

    /// The contract a member is declared in, `None` for file-level items.
    pub fn scope_of(&self, id: i64) -> Option<&'a ContractDefinition> {
        self.scopes.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

pub fn find_contract<'a>(
    unit: &'a SourceUnit,
    path: &str,
    name: &str,
) -> Result<&'a ContractDefinition> {
    unit.nodes
        .iter()
        .find_map(|node| match node {
            AstNode::Contract(c) if c.name == name => Some(c),
            _ => None,
        })
        .ok_or_else(|| Error::ContractNotFound {
            path: path.to_string(),
            name: name.to_string(),
        })
}

/// The declarations of one contract, split by documentation group.
#[derive(Debug, Default)]
pub struct ContractMembers<'a> {
    pub enums: Vec<Declaration<'a>>,
    pub structs: Vec<Declaration<'a>>,
    pub events: Vec<Declaration<'a>>,
    pub errors: Vec<Declaration<'a>>,
    pub constants: Vec<Declaration<'a>>,
    pub state_variables: Vec<Declaration<'a>>,
    pub modifiers: Vec<Declaration<'a>>,
    pub functions: Vec<Declaration<'a>>,
    pub using_for: Vec<Declaration<'a>>,
    /// Body nodes of kinds that cannot be documented.
    pub skipped: Vec<Error>,
}

/// Walk a contract body in source order and keep what gets documented.
///
/// The compiler has already placed every member in `nodes`; inheritance is
/// only followed later, for documentation.
pub fn collect_declarations(contract: &ContractDefinition) -> ContractMembers<'_> {
    let mut members = ContractMembers::default();
    let mut functions: Vec<&FunctionDefinition> = Vec::new();

    for node in &contract.nodes {
        let decl = match Declaration::from_node(node) {
            Ok(decl) => decl,
            Err(err) => {
                members.skipped.push(err);
                continue;
            }
        };
        match decl {
            Declaration::Function(f) => functions.push(f),
            Declaration::Variable(v) if is_externally_visible(v.visibility) => {
                if v.constant {
                    members.constants.push(decl);
                } else {
                    members.state_variables.push(decl);
                }
            }
            Declaration::Variable(_) => {}
            Declaration::Event(_) => members.events.push(decl),
            Declaration::Error(_) => members.errors.push(decl),
            Declaration::Enum(_) => members.enums.push(decl),
            Declaration::Struct(_) => members.structs.push(decl),
            Declaration::Modifier(_) => members.modifiers.push(decl),
            Declaration::UsingFor(_) => members.using_for.push(decl),
            Declaration::Contract(c) => members.skipped.push(Error::UnsupportedNodeKind {
                node_type: "ContractDefinition".to_string(),
                id: Some(c.id),
            }),
        }
    }

    // A library whose functions are all private/internal is used by
    // linking its internal functions, so those are its surface.
    let internal_library = contract.contract_kind == ContractKind::Library
        && functions
            .iter()
            .all(|f| matches!(f.visibility(), Visibility::Private | Visibility::Internal));

    members.functions = functions
        .into_iter()
        .filter(|f| {
            if internal_library {
                f.visibility() == Visibility::Internal
            } else {
                is_externally_visible(f.visibility())
            }
        })
        .map(Declaration::Function)
        .collect();

    members
}
