//! GitHub-flavored markdown renderer.

use crate::model::ContractInfo;
use crate::render::{emit, BlockSink, Renderer};
use anyhow::Result;

pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, info: &ContractInfo) -> Result<String> {
        let mut sink = MarkdownSink::default();
        emit(info, &mut sink);
        Ok(sink.finish())
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}

/// Accumulates blocks as markdown, one blank line between blocks.
#[derive(Debug, Default)]
pub struct MarkdownSink {
    out: String,
}

impl MarkdownSink {
    pub fn finish(self) -> String {
        let mut out = self.out.trim_end().to_string();
        out.push('\n');
        out
    }
}

impl BlockSink for MarkdownSink {
    fn add_heading(&mut self, text: &str, level: u8) {
        let hashes = "#".repeat(level.clamp(1, 6) as usize);
        self.out.push_str(&format!("{} {}\n\n", hashes, text));
    }

    fn add_paragraph(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push_str("\n\n");
    }

    fn add_list(&mut self, items: &[String]) {
        for item in items {
            self.out.push_str(&format!("* {}\n", item));
        }
        self.out.push('\n');
    }

    fn add_table(&mut self, headers: &[&str], rows: &[Vec<String>]) {
        self.out.push_str(&format!("| {} |\n", headers.join(" | ")));
        let rule: Vec<&str> = headers.iter().map(|_| ":---").collect();
        self.out.push_str(&format!("| {} |\n", rule.join(" | ")));
        for row in rows {
            let cells: Vec<String> = row.iter().map(|c| table_cell(c)).collect();
            self.out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        self.out.push('\n');
    }

    fn add_code_block(&mut self, lines: &[String], language: &str) {
        self.out.push_str(&format!("```{}\n", language));
        for line in lines {
            self.out.push_str(line);
            self.out.push('\n');
        }
        self.out.push_str("```\n\n");
    }
}

/// Cells are single-line; pipes would end the cell early.
fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
