//! Records built from the compiler's own documentation output (`devdoc`
//! and `userdoc`) and the ABI, for build-infos compiled without an AST.
//!
//! solc keys both maps by canonical signature (`transfer(address,uint256)`),
//! so every ABI entry is looked up under the signature rebuilt from it.

use crate::build_info::{custom_tags, AbiEntry, AbiParam, ContractOutput, MethodDevDoc, UserNotice};
use crate::model::{DeclKind, DocParam, DocRecord, DocReturn, NatSpec};
use crate::parser::signature::{strip_type_prefix, wrap, SignatureParts};

/// Compiler-side documentation of one contract, grouped by kind.
#[derive(Debug, Default)]
pub struct CompilerDocs {
    pub documentation: NatSpec,
    pub events: Vec<DocRecord>,
    pub errors: Vec<DocRecord>,
    pub state_variables: Vec<DocRecord>,
    pub functions: Vec<DocRecord>,
}

pub fn resolve_contract(output: &ContractOutput, max_width: usize) -> CompilerDocs {
    let devdoc = output.devdoc.as_ref();
    let userdoc = output.userdoc.as_ref();
    let selectors = output.evm.as_ref().map(|e| &e.method_identifiers);

    let mut docs = CompilerDocs {
        documentation: NatSpec {
            author: devdoc.and_then(|d| non_empty(d.author.as_deref())),
            title: devdoc.and_then(|d| non_empty(d.title.as_deref())),
            notice: userdoc.and_then(|u| non_empty(u.notice.as_deref())),
            dev: devdoc.and_then(|d| non_empty(d.details.as_deref())),
            custom: devdoc.map(|d| custom_tags(&d.extra)).unwrap_or_default(),
            ..NatSpec::default()
        },
        ..CompilerDocs::default()
    };

    for entry in &output.abi {
        let key = doc_key(entry);
        match entry.kind.as_str() {
            "event" => {
                let natspec = method_natspec(
                    entry,
                    devdoc.and_then(|d| d.events.get(&key)),
                    userdoc.and_then(|u| u.events.get(&key)),
                );
                docs.events.push(record(
                    DeclKind::Event,
                    entry.name.clone(),
                    event_parts(entry),
                    natspec,
                    max_width,
                ));
            }
            "error" => {
                let natspec = method_natspec(
                    entry,
                    devdoc.and_then(|d| d.errors.get(&key)).and_then(|v| v.first()),
                    userdoc.and_then(|u| u.errors.get(&key)).and_then(|v| v.first()),
                );
                docs.errors.push(record(
                    DeclKind::Error,
                    entry.name.clone(),
                    error_parts(entry),
                    natspec,
                    max_width,
                ));
            }
            "function" | "constructor" | "fallback" | "receive" => {
                let selector = selectors
                    .and_then(|s| s.get(&key))
                    .map(|sel| format!(" (0x{})", sel))
                    .unwrap_or_default();
                let name = if entry.name.is_empty() { &entry.kind } else { &entry.name };
                let title = format!("{}{}", name, selector);

                if let Some(variable) = devdoc.and_then(|d| d.state_variables.get(&entry.name)) {
                    let mut natspec = NatSpec {
                        dev: non_empty(variable.details.as_deref()),
                        notice: userdoc
                            .and_then(|u| u.methods.get(&key))
                            .and_then(UserNotice::notice)
                            .and_then(|n| non_empty(Some(n))),
                        ..NatSpec::default()
                    };
                    natspec.returns =
                        getter_returns(entry, variable.return_doc.as_deref(), &variable.returns);
                    docs.state_variables.push(DocRecord {
                        kind: DeclKind::Variable,
                        title,
                        full_signature: getter_signature(entry),
                        signature_lines: vec![getter_signature(entry)],
                        natspec,
                    });
                    continue;
                }

                let natspec = method_natspec(
                    entry,
                    devdoc.and_then(|d| d.methods.get(&key)),
                    userdoc.and_then(|u| u.methods.get(&key)),
                );
                docs.functions.push(record(
                    DeclKind::Function,
                    title,
                    function_parts(entry),
                    natspec,
                    max_width,
                ));
            }
            other => tracing::debug!(kind = other, "ignoring ABI entry"),
        }
    }

    docs
}

fn record(
    kind: DeclKind,
    title: String,
    parts: SignatureParts,
    natspec: NatSpec,
    max_width: usize,
) -> DocRecord {
    DocRecord {
        kind,
        title,
        full_signature: parts.flat(),
        signature_lines: wrap(&parts, max_width),
        natspec,
    }
}

/// Key of an ABI entry in the devdoc/userdoc maps.
fn doc_key(entry: &AbiEntry) -> String {
    match entry.kind.as_str() {
        "constructor" | "fallback" | "receive" => entry.kind.clone(),
        _ => canonical_signature(entry),
    }
}

/// `name(type1,type2)` with tuples expanded.
pub fn canonical_signature(entry: &AbiEntry) -> String {
    let types: Vec<String> = entry.inputs.iter().map(canonical_type).collect();
    format!("{}({})", entry.name, types.join(","))
}

fn canonical_type(param: &AbiParam) -> String {
    match param.ty.strip_prefix("tuple") {
        Some(suffix) => {
            let inner: Vec<String> = param.components.iter().map(canonical_type).collect();
            format!("({}){}", inner.join(","), suffix)
        }
        None => param.ty.clone(),
    }
}

/// Source-level type name: the internal type when the compiler provided
/// one, without `struct `/`enum `/`contract ` prefixes.
fn display_type(param: &AbiParam) -> String {
    strip_type_prefix(param.internal_type.as_deref().unwrap_or(&param.ty))
}

fn render_params(params: &[AbiParam], allow_indexed: bool) -> Vec<String> {
    params
        .iter()
        .map(|p| {
            let mut out = display_type(p);
            if allow_indexed && p.indexed {
                out.push_str(" indexed");
            }
            if !p.name.is_empty() {
                out.push(' ');
                out.push_str(&p.name);
            }
            out
        })
        .collect()
}

fn function_parts(entry: &AbiEntry) -> SignatureParts {
    let head = match entry.kind.as_str() {
        "function" => format!("function {}", entry.name),
        other => other.to_string(),
    };
    let mut clauses = Vec::new();
    if entry.kind != "constructor" {
        clauses.push("external".to_string());
    }
    if let Some(mutability) = entry.state_mutability.as_deref().filter(|m| *m != "nonpayable") {
        clauses.push(mutability.to_string());
    }
    if !entry.outputs.is_empty() {
        clauses.push(format!("returns ({})", render_params(&entry.outputs, false).join(", ")));
    }
    SignatureParts {
        head,
        params: render_params(&entry.inputs, false),
        clauses,
    }
}

fn event_parts(entry: &AbiEntry) -> SignatureParts {
    SignatureParts {
        head: format!("event {}", entry.name),
        params: render_params(&entry.inputs, true),
        clauses: if entry.anonymous { vec!["anonymous".to_string()] } else { Vec::new() },
    }
}

fn error_parts(entry: &AbiEntry) -> SignatureParts {
    SignatureParts {
        head: format!("error {}", entry.name),
        params: render_params(&entry.inputs, false),
        clauses: Vec::new(),
    }
}

/// Plain getters read back as `type public name`; mapping and array
/// getters keep their function form.
fn getter_signature(entry: &AbiEntry) -> String {
    match entry.outputs.as_slice() {
        [output] if entry.inputs.is_empty() => {
            format!("{} public {}", display_type(output), entry.name)
        }
        _ => function_parts(entry).flat(),
    }
}

fn getter_returns(
    entry: &AbiEntry,
    return_doc: Option<&str>,
    returns: &indexmap::IndexMap<String, String>,
) -> Vec<DocReturn> {
    if let (Some(text), [output]) = (non_empty(return_doc), entry.outputs.as_slice()) {
        return vec![DocReturn {
            name: None,
            type_name: Some(display_type(output)),
            description: text,
        }];
    }
    output_returns(&entry.outputs, returns)
}

fn method_natspec(
    entry: &AbiEntry,
    dev: Option<&MethodDevDoc>,
    user: Option<&UserNotice>,
) -> NatSpec {
    let mut natspec = NatSpec {
        notice: user.and_then(UserNotice::notice).and_then(|n| non_empty(Some(n))),
        ..NatSpec::default()
    };
    let Some(dev) = dev else {
        return natspec;
    };

    natspec.dev = non_empty(dev.details.as_deref());
    natspec.custom = custom_tags(&dev.extra);
    natspec.params = entry
        .inputs
        .iter()
        .filter_map(|input| {
            let description = dev.params.get(&input.name)?;
            Some(DocParam {
                name: input.name.clone(),
                type_name: Some(display_type(input)),
                description: description.clone(),
            })
        })
        .collect();
    natspec.returns = output_returns(&entry.outputs, &dev.returns);
    natspec
}

/// Return docs in output order. solc keys unnamed outputs as `_0`, `_1`...
fn output_returns(
    outputs: &[AbiParam],
    docs: &indexmap::IndexMap<String, String>,
) -> Vec<DocReturn> {
    outputs
        .iter()
        .enumerate()
        .filter_map(|(i, output)| {
            let key = if output.name.is_empty() { format!("_{}", i) } else { output.name.clone() };
            let description = docs.get(&key)?;
            Some(DocReturn {
                name: (!output.name.is_empty()).then(|| output.name.clone()),
                type_name: Some(display_type(output)),
                description: description.clone(),
            })
        })
        .collect()
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}
