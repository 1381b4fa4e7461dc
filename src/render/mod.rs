//! Renderer module: a narrow block interface, the emitter that drives it
//! from a [`ContractInfo`], and trait-based format dispatch.

pub mod json;
pub mod markdown;

use crate::model::{ContractInfo, DocRecord, NatSpec};
use crate::toc;
use anyhow::{anyhow, Result};

/// Block-level output primitives the document is emitted through.
pub trait BlockSink {
    fn add_heading(&mut self, text: &str, level: u8);
    fn add_paragraph(&mut self, text: &str);
    fn add_list(&mut self, items: &[String]);
    fn add_table(&mut self, headers: &[&str], rows: &[Vec<String>]);
    fn add_code_block(&mut self, lines: &[String], language: &str);
}

/// Trait for rendering a contract into a specific output format.
pub trait Renderer {
    fn render(&self, info: &ContractInfo) -> Result<String>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "markdown" | "md" => Ok(Box::new(markdown::MarkdownRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(anyhow!("unknown format: {}. Use markdown or json", format)),
    }
}

/// Emit a contract's document: header, group index, the contract record,
/// then every group in display order.
pub fn emit(info: &ContractInfo, sink: &mut dyn BlockSink) {
    sink.add_heading(&info.name, 1);

    let kind = capitalize(info.kind.as_str());
    let description = if info.is_abstract {
        format!("Abstract {} Description", kind)
    } else {
        format!("{} Description", kind)
    };
    sink.add_heading(&description, 2);
    sink.add_paragraph(&format!("License: {}", info.license));

    if !info.groups.is_empty() {
        let items: Vec<String> = info
            .groups
            .iter()
            .map(|g| toc::render_toc_link(g.kind.title()))
            .collect();
        sink.add_list(&items);
    }

    emit_record(&info.documentation, sink);

    for group in &info.groups {
        sink.add_heading(group.kind.title(), 2);
        for record in &group.records {
            emit_record(record, sink);
        }
    }
}

fn emit_record(record: &DocRecord, sink: &mut dyn BlockSink) {
    if !record.title.is_empty() {
        sink.add_heading(&record.title, 3);
    }
    sink.add_code_block(&record.signature_lines, "solidity");
    emit_natspec(&record.natspec, sink);
}

fn emit_natspec(natspec: &NatSpec, sink: &mut dyn BlockSink) {
    if let Some(author) = &natspec.author {
        sink.add_paragraph(&format!("Author: {}", author));
    }
    if let Some(title) = &natspec.title {
        sink.add_paragraph(title);
    }
    if let Some(notice) = &natspec.notice {
        sink.add_paragraph(notice);
    }
    if let Some(dev) = &natspec.dev {
        emit_dev(dev, sink);
    }
    for (key, value) in &natspec.custom {
        sink.add_paragraph(&format!("{}: {}", key, value));
    }

    if !natspec.params.is_empty() {
        sink.add_paragraph("Parameters:");
        let typed = natspec.params.iter().any(|p| p.type_name.is_some());
        let rows: Vec<Vec<String>> = natspec
            .params
            .iter()
            .map(|p| {
                let mut row = vec![p.name.clone()];
                if typed {
                    row.push(p.type_name.clone().unwrap_or_default());
                }
                row.push(p.description.clone());
                row
            })
            .collect();
        let headers: &[&str] = if typed {
            &["Name", "Type", "Description"]
        } else {
            &["Name", "Description"]
        };
        sink.add_table(headers, &rows);
    }

    if !natspec.returns.is_empty() {
        sink.add_paragraph("Return values:");
        let typed = natspec.returns.iter().any(|r| r.type_name.is_some());
        let rows: Vec<Vec<String>> = natspec
            .returns
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let mut row = vec![r.name.clone().unwrap_or_else(|| format!("[{}]", i))];
                if typed {
                    row.push(r.type_name.clone().unwrap_or_default());
                }
                row.push(r.description.clone());
                row
            })
            .collect();
        let headers: &[&str] = if typed {
            &["Name", "Type", "Description"]
        } else {
            &["Name", "Description"]
        };
        sink.add_table(headers, &rows);
    }
}

/// Developer notes: each prose line in emphasis, fenced code as code blocks.
fn emit_dev(dev: &str, sink: &mut dyn BlockSink) {
    let mut fence: Option<(String, Vec<String>)> = None;
    for line in dev.lines() {
        let trimmed = line.trim();
        let opener = trimmed.strip_prefix("```");
        match fence.take() {
            Some((language, lines)) if opener.is_some() => sink.add_code_block(&lines, &language),
            Some((language, mut lines)) => {
                lines.push(line.to_string());
                fence = Some((language, lines));
            }
            None => match opener {
                Some(language) => fence = Some((language.trim().to_string(), Vec::new())),
                None if trimmed.is_empty() => {}
                None => sink.add_paragraph(&format!("*{}*", trimmed)),
            },
        }
    }
    // An unclosed fence still renders as code.
    if let Some((language, lines)) = fence {
        sink.add_code_block(&lines, &language);
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
