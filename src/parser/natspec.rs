//! NatSpec resolution: comment cleanup, tag splitting, tag dispatch and the
//! inheritance walk behind `@inheritdoc` and undocumented overrides.

use crate::build_info::SourceTexts;
use crate::error::Error;
use crate::model::{DocParam, DocReturn, NatSpec};
use crate::parser::ast::Documentation;
use crate::parser::index::{Declaration, NodeIndex};
use crate::parser::signature::strip_type_prefix;
use regex::Regex;
use std::collections::{HashSet, VecDeque};
use std::sync::LazyLock;
use tracing::debug;

static RE_TAG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@(\w+|custom:[a-z][a-z-]*)(?:[ \t]+|$)").unwrap());

static RE_NAME_DESCRIPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(\w+)[^\n]?[ \t](.*)$").unwrap());

static RE_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w+$").unwrap());

static RE_BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Documentation of one declaration plus whatever went wrong resolving it.
#[derive(Debug, Default)]
pub struct Resolution {
    pub natspec: NatSpec,
    pub problems: Vec<Error>,
}

/// One `@tag text` run of a doc comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub tag: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag<'t> {
    Title,
    Author,
    Notice,
    Dev,
    Param,
    Return,
    Inheritdoc,
    Custom(&'t str),
    Unknown(&'t str),
}

impl<'t> Tag<'t> {
    fn parse(tag: &'t str) -> Self {
        match tag {
            "title" => Tag::Title,
            "author" => Tag::Author,
            "notice" => Tag::Notice,
            "dev" => Tag::Dev,
            "param" => Tag::Param,
            "return" => Tag::Return,
            "inheritdoc" => Tag::Inheritdoc,
            other => match other.strip_prefix("custom:") {
                Some(name) => Tag::Custom(name),
                None => Tag::Unknown(other),
            },
        }
    }
}

/// Resolve the documentation of `decl`, following inheritance edges
/// through `index`.
///
/// The walk is breadth-first over declaration ids, so the declaration's
/// own comment is applied before anything it inherits and every node is
/// visited at most once, even in diamond or cyclic override graphs.
pub fn resolve<'a>(
    decl: Declaration<'a>,
    index: &NodeIndex<'a>,
    sources: &SourceTexts<'_>,
) -> Resolution {
    let mut walk = Walk::new(decl, index);

    while let Some(node) = walk.queue.pop_front() {
        let Some(doc) = node.documentation() else {
            if let Some(parent) = implicit_parent(node, index) {
                walk.push(parent);
            }
            continue;
        };
        let text = strip_comment_markers(raw_text(doc, sources));
        for segment in split_segments(&text) {
            walk.apply(node, &segment);
        }
    }

    walk.resolution
}

fn raw_text<'d>(doc: &'d Documentation, sources: &SourceTexts<'d>) -> &'d str {
    match doc {
        Documentation::Structured(s) => sources.slice(&s.src).unwrap_or(&s.text),
        Documentation::Text(text) => text,
    }
}

/// The single overridden function an undocumented function or getter
/// silently inherits from. Functions must keep the parent's parameter
/// names, in order.
fn implicit_parent<'a>(node: Declaration<'a>, index: &NodeIndex<'a>) -> Option<Declaration<'a>> {
    let [base] = node.base_ids() else {
        return None;
    };
    let parent = index.deref(*base)?;
    let Declaration::Function(parent_fn) = parent else {
        return None;
    };
    match node {
        Declaration::Variable(_) => Some(parent),
        Declaration::Function(f) => {
            let own = f.parameters.parameters.iter().map(|p| &p.name);
            let inherited = parent_fn.parameters.parameters.iter().map(|p| &p.name);
            own.eq(inherited).then_some(parent)
        }
        _ => None,
    }
}

struct Walk<'w, 'a> {
    target: Declaration<'a>,
    index: &'w NodeIndex<'a>,
    queue: VecDeque<Declaration<'a>>,
    seen: HashSet<i64>,
    resolution: Resolution,
}

impl<'w, 'a> Walk<'w, 'a> {
    fn new(target: Declaration<'a>, index: &'w NodeIndex<'a>) -> Self {
        let mut walk = Walk {
            target,
            index,
            queue: VecDeque::new(),
            seen: HashSet::new(),
            resolution: Resolution::default(),
        };
        walk.push(target);
        walk
    }

    fn push(&mut self, decl: Declaration<'a>) {
        if self.seen.insert(decl.id()) {
            self.queue.push_back(decl);
        }
    }

    fn apply(&mut self, node: Declaration<'a>, segment: &Segment) {
        let text = segment.text.as_str();
        let mut tag = Tag::parse(&segment.tag);
        let natspec = &mut self.resolution.natspec;

        // `param` and `return` may hand the same text over to each other
        // once; everything else settles on the first pass.
        loop {
            match tag {
                Tag::Title => {
                    if matches!(node, Declaration::Contract(_)) {
                        set_first(&mut natspec.title, text);
                    }
                }
                Tag::Author => set_first(&mut natspec.author, text),
                Tag::Notice => set_first(&mut natspec.notice, text),
                Tag::Dev => set_first(&mut natspec.dev, text),
                Tag::Custom(name) => {
                    natspec.custom.insert(name.to_string(), text.to_string());
                }
                Tag::Param => {
                    let Some((name, description)) = split_name(text) else {
                        debug!(declaration = %node.describe(), "skipping malformed @param");
                        return;
                    };
                    if natspec.params.iter().any(|p| p.name == name) {
                        return;
                    }
                    match node.members().into_iter().find(|m| m.name == name) {
                        Some(member) => natspec.params.push(DocParam {
                            name: name.to_string(),
                            type_name: member.type_string.map(strip_type_prefix),
                            description: join_lines(description),
                        }),
                        None if node.is_event() => {
                            debug!(
                                declaration = %node.describe(),
                                param = name,
                                "dropping @param for unknown name"
                            );
                        }
                        None => {
                            tag = Tag::Return;
                            continue;
                        }
                    }
                }
                Tag::Return => {
                    if node.is_event() {
                        tag = Tag::Param;
                        continue;
                    }
                    let outputs = node.outputs();
                    let Some(output) = outputs.get(natspec.returns.len()) else {
                        return;
                    };
                    let type_name = output.type_string.map(strip_type_prefix);
                    if output.name.is_empty() {
                        natspec.returns.push(DocReturn {
                            name: None,
                            type_name,
                            description: join_lines(text),
                        });
                    } else {
                        match split_name(text) {
                            Some((name, description)) if name == output.name => {
                                natspec.returns.push(DocReturn {
                                    name: Some(name.to_string()),
                                    type_name,
                                    description: join_lines(description),
                                })
                            }
                            _ => {
                                debug!(
                                    declaration = %node.describe(),
                                    expected = output.name,
                                    "skipping @return that does not name its output"
                                );
                            }
                        }
                    }
                }
                Tag::Inheritdoc => self.inherit(node, text),
                Tag::Unknown(name) => self.resolution.problems.push(Error::UnknownTag {
                    tag: name.to_string(),
                    declaration: node.describe(),
                }),
            }
            return;
        }
    }

    fn inherit(&mut self, node: Declaration<'a>, reference: &str) {
        let found = RE_IDENTIFIER
            .is_match(reference)
            .then(|| find_in_contract(node, reference, self.index))
            .flatten();
        match found {
            Some(parent) => self.push(parent),
            None => self.resolution.problems.push(Error::InvalidInheritdoc {
                reference: reference.to_string(),
                declaration: self.target.describe(),
            }),
        }
    }
}

/// Depth-first search through override edges for the member declared in
/// contract `contract_name`. The starting node itself never matches.
fn find_in_contract<'a>(
    start: Declaration<'a>,
    contract_name: &str,
    index: &NodeIndex<'a>,
) -> Option<Declaration<'a>> {
    let mut seen = HashSet::from([start.id()]);
    let mut stack: Vec<i64> = start.base_ids().iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        let Some(decl) = index.deref(id) else {
            continue;
        };
        if let Some(scope) = index.scope_of(id) {
            if scope.name == contract_name || scope.canonical_name.as_deref() == Some(contract_name)
            {
                return Some(decl);
            }
        }
        stack.extend(decl.base_ids().iter().rev().copied());
    }
    None
}

fn set_first(field: &mut Option<String>, text: &str) {
    if field.is_none() && !text.is_empty() {
        *field = Some(text.to_string());
    }
}

/// `name description` with an optional punctuation mark after the name
/// (`to: recipient`, `to - recipient`).
fn split_name(text: &str) -> Option<(&str, &str)> {
    let caps = RE_NAME_DESCRIPTION.captures(text)?;
    let name = caps.get(1)?.as_str();
    let description = caps.get(2).map_or("", |m| m.as_str());
    Some((name, description))
}

fn join_lines(text: &str) -> String {
    text.replace('\n', " ")
}

/// Reduce a raw doc comment to its text.
///
/// Removes the `/** */` delimiters and leading `*`, `//` or `///` markers
/// and left-trims every line. Inside triple-backtick fences indentation is
/// kept relative to the first fenced line.
pub fn strip_comment_markers(raw: &str) -> String {
    let trimmed = raw.trim();
    let body = match trimmed.strip_prefix("/**") {
        Some(inner) => inner.strip_suffix("*/").unwrap_or(inner),
        None => trimmed,
    };

    let mut lines: Vec<String> = Vec::new();
    let mut in_fence = false;
    let mut fence_indent: Option<usize> = None;

    for line in body.lines() {
        let (indent, content) = split_marker(line);
        if content.contains("```") {
            in_fence = !in_fence;
            fence_indent = None;
            lines.push(content.to_string());
        } else if in_fence {
            let base = *fence_indent.get_or_insert(indent.len());
            lines.push(format!("{}{}", indent.get(base..).unwrap_or_default(), content));
        } else {
            lines.push(content.to_string());
        }
    }

    lines.join("\n").trim().to_string()
}

/// Split a comment line into the whitespace after its marker and the
/// content. Lines without a marker keep their own leading whitespace as
/// the indent.
fn split_marker(line: &str) -> (&str, &str) {
    let rest = strip_marker(line.trim_start_matches([' ', '\t'])).unwrap_or(line);
    let content = rest.trim_start_matches([' ', '\t']);
    (&rest[..rest.len() - content.len()], content)
}

/// Strip every leading run of `//`-style or `*` markers (`//// x`, `///** x`).
fn strip_marker(line: &str) -> Option<&str> {
    let mut rest = line;
    loop {
        let slashes = rest.trim_start_matches('/');
        if rest.len() - slashes.len() >= 2 {
            rest = slashes;
            continue;
        }
        // `*` only counts as a marker when it is not the start of markdown
        // emphasis such as `**bold**`.
        let stars = rest.trim_start_matches('*');
        let is_marker = stars.is_empty() || stars.starts_with([' ', '\t', '@']);
        if stars.len() < rest.len() && is_marker {
            rest = stars;
            continue;
        }
        break;
    }
    (rest.len() < line.len()).then_some(rest)
}

/// Split stripped comment text into tag segments. Text before the first
/// tag is an implicit `@notice`.
pub fn split_segments(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut tag = "notice".to_string();
    let mut explicit = false;
    let mut body: Vec<&str> = Vec::new();

    for line in text.lines() {
        if let Some(caps) = RE_TAG_LINE.captures(line) {
            flush(&mut segments, tag, &body, explicit);
            tag = caps[1].to_string();
            explicit = true;
            body = vec![&line[caps[0].len()..]];
        } else {
            body.push(line);
        }
    }
    flush(&mut segments, tag, &body, explicit);
    segments
}

fn flush(segments: &mut Vec<Segment>, tag: String, body: &[&str], explicit: bool) {
    let joined = body.join("\n");
    let text = RE_BLANK_RUNS.replace_all(&joined, "\n").trim().to_string();
    if explicit || !text.is_empty() {
        segments.push(Segment { tag, text });
    }
}
