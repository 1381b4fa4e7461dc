//! JSON renderer: structured output for tooling integration.
//!
//! Serializes the contract model directly, so custom rendering pipelines
//! see the same records the markdown renderer emits.

use crate::model::ContractInfo;
use crate::render::Renderer;
use anyhow::{Context, Result};

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, info: &ContractInfo) -> Result<String> {
        let mut out = serde_json::to_string_pretty(info)
            .with_context(|| format!("failed to serialize {}", info.name))?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::sample;
    use serde_json::Value;

    #[test]
    fn serializes_model() {
        let out = JsonRenderer.render(&sample()).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["name"], "Token");
        assert_eq!(value["kind"], "contract");
        assert_eq!(value["groups"][0]["kind"], "functions");
        let transfer = &value["groups"][0]["records"][0];
        assert_eq!(transfer["natspec"]["params"][1]["type"], "uint256");
        assert_eq!(transfer["natspec"]["custom"]["security"], "audited");
        // unset fields are omitted
        assert!(transfer["natspec"].get("author").is_none());
        assert!(transfer["natspec"]["returns"][0].get("name").is_none());
    }
}
