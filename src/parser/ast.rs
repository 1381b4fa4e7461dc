//! Typed subset of the solc JSON AST.
//!
//! Only the node kinds that carry documentation or contribute to a
//! signature are modelled. Everything else deserializes into
//! [`AstNode::Other`], which keeps the compiler's `nodeType` so callers can
//! report what they skipped. Unknown fields are ignored throughout, so
//! function bodies and expression trees are never materialized.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of a `nodes` array (source unit or contract body).
#[derive(Debug, Clone)]
pub enum AstNode {
    Contract(ContractDefinition),
    Function(FunctionDefinition),
    Variable(VariableDeclaration),
    Event(EventDefinition),
    Error(ErrorDefinition),
    Enum(EnumDefinition),
    Struct(StructDefinition),
    Modifier(ModifierDefinition),
    UsingFor(UsingForDirective),
    Other { node_type: String, id: Option<i64> },
}

impl<'de> Deserialize<'de> for AstNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let node_type = value
            .get("nodeType")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let node = match node_type.as_str() {
            "ContractDefinition" => serde_json::from_value(value).map(AstNode::Contract),
            "FunctionDefinition" => serde_json::from_value(value).map(AstNode::Function),
            "VariableDeclaration" => serde_json::from_value(value).map(AstNode::Variable),
            "EventDefinition" => serde_json::from_value(value).map(AstNode::Event),
            "ErrorDefinition" => serde_json::from_value(value).map(AstNode::Error),
            "EnumDefinition" => serde_json::from_value(value).map(AstNode::Enum),
            "StructDefinition" => serde_json::from_value(value).map(AstNode::Struct),
            "ModifierDefinition" => serde_json::from_value(value).map(AstNode::Modifier),
            "UsingForDirective" => serde_json::from_value(value).map(AstNode::UsingFor),
            _ => Ok(AstNode::Other {
                id: value.get("id").and_then(Value::as_i64),
                node_type: node_type.clone(),
            }),
        };
        node.map_err(de::Error::custom)
    }
}

/// Treats an explicit `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceUnit {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub absolute_path: String,
    pub license: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub nodes: Vec<AstNode>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    #[default]
    Contract,
    Interface,
    Library,
}

impl ContractKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractKind::Contract => "contract",
            ContractKind::Interface => "interface",
            ContractKind::Library => "library",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    External,
    #[default]
    Internal,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::External => "external",
            Visibility::Internal => "internal",
            Visibility::Private => "private",
        }
    }
}

/// Doc comment attached to a declaration.
///
/// solc >= 0.6.3 emits a `StructuredDocumentation` node; older compilers
/// emit the stripped text as a plain string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Documentation {
    Structured(StructuredDocumentation),
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct StructuredDocumentation {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentifierPath {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptions {
    pub type_string: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeName {
    #[serde(default)]
    pub type_descriptions: TypeDescriptions,
    pub name: Option<String>,
}

/// Any expression; only the fields needed for best-effort rendering.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expression {
    #[serde(default)]
    pub node_type: String,
    #[serde(default)]
    pub src: String,
    pub name: Option<String>,
    pub value: Option<String>,
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InheritanceSpecifier {
    pub base_name: IdentifierPath,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDefinition {
    pub id: i64,
    pub name: String,
    pub canonical_name: Option<String>,
    #[serde(default)]
    pub contract_kind: ContractKind,
    #[serde(rename = "abstract", default)]
    pub is_abstract: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub base_contracts: Vec<InheritanceSpecifier>,
    #[serde(default, deserialize_with = "nullable")]
    pub nodes: Vec<AstNode>,
    pub documentation: Option<Documentation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParameterList {
    #[serde(default, deserialize_with = "nullable")]
    pub parameters: Vec<VariableDeclaration>,
}

/// Present when a declaration carries an `override` specifier.
#[derive(Debug, Clone, Deserialize)]
pub struct OverrideSpecifier {}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierInvocation {
    pub modifier_name: IdentifierPath,
    pub arguments: Option<Vec<Expression>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDefinition {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_function_kind")]
    pub kind: String,
    /// Absent on some synthetic and free-function nodes.
    pub visibility: Option<Visibility>,
    #[serde(default = "default_state_mutability")]
    pub state_mutability: String,
    #[serde(rename = "virtual", default)]
    pub is_virtual: bool,
    pub overrides: Option<OverrideSpecifier>,
    #[serde(default, deserialize_with = "nullable")]
    pub parameters: ParameterList,
    #[serde(default)]
    pub return_parameters: ParameterList,
    #[serde(default, deserialize_with = "nullable")]
    pub modifiers: Vec<ModifierInvocation>,
    #[serde(default, deserialize_with = "nullable")]
    pub base_functions: Vec<i64>,
    pub function_selector: Option<String>,
    pub documentation: Option<Documentation>,
}

impl FunctionDefinition {
    pub fn visibility(&self) -> Visibility {
        self.visibility.unwrap_or_default()
    }
}

fn default_function_kind() -> String {
    "function".to_string()
}

fn default_state_mutability() -> String {
    "nonpayable".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDeclaration {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub type_descriptions: TypeDescriptions,
    #[serde(default = "default_storage_location")]
    pub storage_location: String,
    #[serde(default)]
    pub indexed: bool,
    #[serde(default)]
    pub constant: bool,
    pub mutability: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    pub value: Option<Expression>,
    #[serde(default, deserialize_with = "nullable")]
    pub base_functions: Vec<i64>,
    pub function_selector: Option<String>,
    pub documentation: Option<Documentation>,
}

fn default_storage_location() -> String {
    "default".to_string()
}

impl VariableDeclaration {
    pub fn type_string(&self) -> &str {
        self.type_descriptions.type_string.as_deref().unwrap_or_default()
    }

    /// `mutable`, `immutable` or `constant`; pre-0.6.5 ASTs only carry the
    /// `constant` flag.
    pub fn mutability(&self) -> &str {
        match self.mutability.as_deref() {
            Some(m) => m,
            None if self.constant => "constant",
            None => "mutable",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDefinition {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub parameters: ParameterList,
    #[serde(default)]
    pub anonymous: bool,
    pub documentation: Option<Documentation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDefinition {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub parameters: ParameterList,
    pub documentation: Option<Documentation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumValue {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDefinition {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub members: Vec<EnumValue>,
    pub documentation: Option<Documentation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructDefinition {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub members: Vec<VariableDeclaration>,
    pub documentation: Option<Documentation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierDefinition {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub parameters: ParameterList,
    #[serde(rename = "virtual", default)]
    pub is_virtual: bool,
    pub overrides: Option<OverrideSpecifier>,
    #[serde(default, deserialize_with = "nullable")]
    pub base_modifiers: Vec<i64>,
    pub documentation: Option<Documentation>,
}

/// `using A for B;` entry of a `functionList` (solc >= 0.8.13).
#[derive(Debug, Clone, Deserialize)]
pub struct UsingForFunction {
    pub function: Option<IdentifierPath>,
    pub definition: Option<IdentifierPath>,
    pub operator: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsingForDirective {
    pub id: i64,
    pub library_name: Option<IdentifierPath>,
    pub function_list: Option<Vec<UsingForFunction>>,
    pub type_name: Option<TypeName>,
    #[serde(default)]
    pub global: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_node_keeps_type() {
        let node: AstNode =
            serde_json::from_value(json!({"nodeType": "PragmaDirective", "id": 1, "literals": ["solidity"]}))
                .unwrap();
        match node {
            AstNode::Other { node_type, id } => {
                assert_eq!(node_type, "PragmaDirective");
                assert_eq!(id, Some(1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn function_defaults() {
        let node: AstNode = serde_json::from_value(json!({
            "nodeType": "FunctionDefinition",
            "id": 7,
            "name": "foo",
            "body": {"nodeType": "Block", "statements": []}
        }))
        .unwrap();
        let AstNode::Function(f) = node else {
            panic!("expected function");
        };
        assert_eq!(f.kind, "function");
        assert_eq!(f.state_mutability, "nonpayable");
        assert!(f.visibility.is_none());
        assert!(f.base_functions.is_empty());
        assert!(f.overrides.is_none());
    }

    #[test]
    fn legacy_string_documentation() {
        let node: AstNode = serde_json::from_value(json!({
            "nodeType": "EventDefinition",
            "id": 3,
            "name": "Ping",
            "documentation": "@notice legacy"
        }))
        .unwrap();
        let AstNode::Event(e) = node else {
            panic!("expected event");
        };
        assert!(matches!(e.documentation, Some(Documentation::Text(ref t)) if t == "@notice legacy"));
    }

    #[test]
    fn variable_mutability_fallback() {
        let var: VariableDeclaration = serde_json::from_value(json!({
            "id": 1, "name": "MAX", "constant": true,
            "typeDescriptions": {"typeString": "uint256"}
        }))
        .unwrap();
        assert_eq!(var.mutability(), "constant");
        assert_eq!(var.type_string(), "uint256");
    }
}
