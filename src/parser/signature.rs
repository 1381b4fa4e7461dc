//! Signature reconstruction from typed AST nodes.
//!
//! Output is a pure function of node shape (plus the original source
//! buffer for expressions, which are copied verbatim rather than
//! re-printed).

use crate::build_info::SourceTexts;
use crate::error::Result;
use crate::parser::ast::*;
use crate::parser::index::Declaration;
use regex::Regex;
use std::sync::LazyLock;

/// Signatures longer than this are wrapped for display.
pub const DEFAULT_MAX_WIDTH: usize = 99;

static RE_TYPE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:struct|enum|contract) ").unwrap());

/// A callable-shaped signature split into the pieces wrapping needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParts {
    /// `function transfer`, `event Transfer`, `constructor`
    pub head: String,
    pub params: Vec<String>,
    /// Everything after the closing paren, one clause per entry:
    /// `external`, `onlyOwner`, `returns (bool)`
    pub clauses: Vec<String>,
}

impl SignatureParts {
    pub fn flat(&self) -> String {
        let mut out = format!("{}({})", self.head, self.params.join(", "));
        for clause in &self.clauses {
            out.push(' ');
            out.push_str(clause);
        }
        out
    }
}

/// Build the canonical one-string signature of a declaration.
pub fn build_signature(decl: Declaration<'_>, sources: &SourceTexts<'_>) -> String {
    match decl {
        Declaration::Function(_)
        | Declaration::Event(_)
        | Declaration::Error(_)
        | Declaration::Modifier(_) => callable_parts(decl, sources)
            .map(|parts| parts.flat())
            .unwrap_or_default(),
        Declaration::Variable(v) => variable_signature(v, sources),
        Declaration::Struct(s) => {
            let members: Vec<String> = s
                .members
                .iter()
                .map(|m| format!("\t{};", render_parameter(m, false)))
                .collect();
            format!("struct {} {{\n{}\n}}", s.name, members.join("\n"))
        }
        Declaration::Enum(e) => {
            let members: Vec<String> = e.members.iter().map(|m| format!("\t{}", m.name)).collect();
            format!("enum {} {{\n{}\n}}", e.name, members.join(",\n"))
        }
        Declaration::UsingFor(u) => using_for_signature(u),
        Declaration::Contract(c) => contract_signature(c),
    }
}

/// Like [`build_signature`] for a raw body node; kinds that are not
/// declarations of interest yield `UnsupportedNodeKind`.
pub fn build_node_signature(node: &AstNode, sources: &SourceTexts<'_>) -> Result<String> {
    Ok(build_signature(Declaration::from_node(node)?, sources))
}

/// Head/params/clauses for functions, events, errors and modifiers.
pub fn callable_parts(decl: Declaration<'_>, sources: &SourceTexts<'_>) -> Option<SignatureParts> {
    match decl {
        Declaration::Function(f) => Some(function_parts(f, sources)),
        Declaration::Event(e) => Some(SignatureParts {
            head: format!("event {}", e.name),
            params: render_parameters(&e.parameters.parameters, true),
            clauses: if e.anonymous {
                vec!["anonymous".to_string()]
            } else {
                Vec::new()
            },
        }),
        Declaration::Error(e) => Some(SignatureParts {
            head: format!("error {}", e.name),
            params: render_parameters(&e.parameters.parameters, false),
            clauses: Vec::new(),
        }),
        Declaration::Modifier(m) => {
            let mut clauses = Vec::new();
            if m.is_virtual {
                clauses.push("virtual".to_string());
            }
            if m.overrides.is_some() {
                clauses.push("override".to_string());
            }
            Some(SignatureParts {
                head: format!("modifier {}", m.name),
                params: render_parameters(&m.parameters.parameters, false),
                clauses,
            })
        }
        _ => None,
    }
}

fn function_parts(f: &FunctionDefinition, sources: &SourceTexts<'_>) -> SignatureParts {
    let kind = match f.kind.as_str() {
        "freeFunction" => "function",
        other => other,
    };
    let head = if f.name.is_empty() {
        kind.to_string()
    } else {
        format!("{} {}", kind, f.name)
    };

    let mut clauses = Vec::new();
    if let Some(visibility) = f.visibility {
        if !matches!(f.kind.as_str(), "constructor" | "freeFunction") {
            clauses.push(visibility.as_str().to_string());
        }
    }
    if f.state_mutability != "nonpayable" {
        clauses.push(f.state_mutability.clone());
    }
    for invocation in &f.modifiers {
        clauses.push(render_modifier_invocation(invocation, sources));
    }
    if f.is_virtual {
        clauses.push("virtual".to_string());
    }
    if f.overrides.is_some() {
        clauses.push("override".to_string());
    }
    if !f.return_parameters.parameters.is_empty() {
        clauses.push(format!(
            "returns ({})",
            render_parameters(&f.return_parameters.parameters, false).join(", ")
        ));
    }

    SignatureParts {
        head,
        params: render_parameters(&f.parameters.parameters, false),
        clauses,
    }
}

fn variable_signature(v: &VariableDeclaration, sources: &SourceTexts<'_>) -> String {
    let mut out = strip_type_prefix(v.type_string());
    match v.mutability() {
        "mutable" => {}
        other => {
            out.push(' ');
            out.push_str(other);
        }
    }
    out.push(' ');
    out.push_str(&v.name);
    if let Some(init) = v.value.as_ref().and_then(|value| sources.slice(&value.src)) {
        out.push_str(" = ");
        out.push_str(init);
    }
    out
}

fn using_for_signature(u: &UsingForDirective) -> String {
    let library = match (&u.library_name, &u.function_list) {
        (Some(library), _) => library.name.clone(),
        (None, Some(functions)) => {
            let names: Vec<String> = functions
                .iter()
                .filter_map(|entry| match (&entry.function, &entry.definition, &entry.operator) {
                    (Some(function), _, _) => Some(function.name.clone()),
                    (None, Some(definition), Some(op)) => {
                        Some(format!("{} as {}", definition.name, op))
                    }
                    _ => None,
                })
                .collect();
            format!("{{{}}}", names.join(", "))
        }
        (None, None) => String::new(),
    };
    let target = u
        .type_name
        .as_ref()
        .and_then(|t| t.type_descriptions.type_string.as_deref().or(t.name.as_deref()))
        .map(strip_type_prefix)
        .unwrap_or_else(|| "*".to_string());
    let mut out = format!("using {} for {}", library, target);
    if u.global {
        out.push_str(" global");
    }
    out
}

fn contract_signature(c: &ContractDefinition) -> String {
    let mut out = String::new();
    if c.is_abstract {
        out.push_str("abstract ");
    }
    out.push_str(c.contract_kind.as_str());
    out.push(' ');
    out.push_str(&c.name);
    if !c.base_contracts.is_empty() {
        let bases: Vec<&str> = c.base_contracts.iter().map(|b| b.base_name.name.as_str()).collect();
        out.push_str(" is ");
        out.push_str(&bases.join(", "));
    }
    out
}

/// `struct S`, `enum E` and `contract C` read better without the keyword.
pub fn strip_type_prefix(type_string: &str) -> String {
    RE_TYPE_PREFIX.replace_all(type_string, "").into_owned()
}

fn render_parameters(params: &[VariableDeclaration], allow_indexed: bool) -> Vec<String> {
    params.iter().map(|p| render_parameter(p, allow_indexed)).collect()
}

/// `{type}[ {location}][ indexed][ {name}]`
fn render_parameter(param: &VariableDeclaration, allow_indexed: bool) -> String {
    let type_string = strip_type_prefix(param.type_string());
    let mut out = type_string.clone();
    let location = param.storage_location.as_str();
    // solc type strings may already carry it: `string memory`, `uint256[] storage pointer`
    if location != "default" && !type_string.split_whitespace().any(|word| word == location) {
        out.push(' ');
        out.push_str(location);
    }
    if allow_indexed && param.indexed {
        out.push_str(" indexed");
    }
    if !param.name.is_empty() {
        out.push(' ');
        out.push_str(&param.name);
    }
    out
}

fn render_modifier_invocation(
    invocation: &ModifierInvocation,
    sources: &SourceTexts<'_>,
) -> String {
    let name = &invocation.modifier_name.name;
    match &invocation.arguments {
        None => name.clone(),
        Some(args) => {
            let args: Vec<String> = args.iter().map(|a| render_expression(a, sources)).collect();
            format!("{}({})", name, args.join(", "))
        }
    }
}

/// Identifiers and plain literals are rendered directly; anything else is
/// copied out of the source buffer.
fn render_expression(expr: &Expression, sources: &SourceTexts<'_>) -> String {
    match (expr.node_type.as_str(), expr.kind.as_deref()) {
        ("Identifier", _) => {
            if let Some(name) = &expr.name {
                return name.clone();
            }
        }
        ("Literal", Some("number" | "bool")) => {
            if let Some(value) = &expr.value {
                return value.clone();
            }
        }
        _ => {}
    }
    sources
        .slice(&expr.src)
        .map(str::to_string)
        .or_else(|| expr.name.clone())
        .or_else(|| expr.value.clone())
        .unwrap_or_else(|| "...".to_string())
}

/// Display title: name (kind for unnamed functions) plus the selector when
/// the compiler computed one.
pub fn build_title(decl: Declaration<'_>) -> String {
    let selector = |s: &Option<String>| {
        s.as_ref()
            .map(|sel| format!(" (0x{})", sel))
            .unwrap_or_default()
    };
    match decl {
        Declaration::Function(f) => {
            let name = if f.name.is_empty() { &f.kind } else { &f.name };
            format!("{}{}", name, selector(&f.function_selector))
        }
        Declaration::Variable(v) => format!("{}{}", v.name, selector(&v.function_selector)),
        Declaration::Contract(_) => String::new(),
        Declaration::UsingFor(u) => using_for_signature(u),
        other => other.name().to_string(),
    }
}

/// Display lines for a code block, wrapping long callable signatures.
pub fn display_lines(
    decl: Declaration<'_>,
    sources: &SourceTexts<'_>,
    max_width: usize,
) -> Vec<String> {
    match decl {
        Declaration::Function(_) | Declaration::Event(_) | Declaration::Error(_) => {
            match callable_parts(decl, sources) {
                Some(parts) => wrap(&parts, max_width),
                None => vec![build_signature(decl, sources)],
            }
        }
        _ => build_signature(decl, sources)
            .lines()
            .map(str::to_string)
            .collect(),
    }
}

/// Wrap a signature that does not fit `max_width`.
///
/// The head goes on its own line, then one tab-indented parameter per line,
/// then the closing paren with the trailing clauses. If that line is still
/// too long every clause gets its own line. Wrapped output ends with `;`.
pub fn wrap(parts: &SignatureParts, max_width: usize) -> Vec<String> {
    let flat = parts.flat();
    if flat.len() <= max_width {
        return vec![flat];
    }

    let mut lines = vec![format!("{}(", parts.head)];
    if parts.params.is_empty() {
        lines[0].push(')');
    } else {
        let last = parts.params.len() - 1;
        for (i, param) in parts.params.iter().enumerate() {
            let comma = if i < last { "," } else { "" };
            lines.push(format!("\t{}{}", param, comma));
        }
        lines.push(")".to_string());
    }

    if !parts.clauses.is_empty() {
        let tail = format!(" {}", parts.clauses.join(" "));
        let closing = lines.len() - 1;
        if lines[closing].len() + tail.len() <= max_width {
            lines[closing].push_str(&tail);
        } else {
            lines.extend(parts.clauses.iter().map(|c| format!("\t{}", c)));
        }
    }

    if let Some(last) = lines.last_mut() {
        last.push(';');
    }
    lines
}
