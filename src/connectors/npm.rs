use super::{Connector, DetectionResult, ScanContext};
use crate::model::types::{ItemKind, ItemVariables, SearchItem};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;

const MANIFEST: &str = "package.json";

#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    /// Insertion-ordered, so items follow `package.json`.
    #[serde(default)]
    scripts: Map<String, Value>,
}

pub struct NpmConnector;

impl NpmConnector {
    pub fn new() -> Self {
        Self
    }

    /// Items for the `scripts` table of a `package.json` document.
    pub fn parse_manifest(raw: &str) -> Result<Vec<SearchItem>> {
        let manifest: PackageManifest = serde_json::from_str(raw)?;

        Ok(manifest
            .scripts
            .iter()
            .map(|(name, command)| {
                let command = match command {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                SearchItem::new(
                    format!("NPM Script: {name}"),
                    format!("[NPM] {command}"),
                    format!("npm run {name}"),
                    ItemVariables::new(ItemKind::NpmScript, name.as_str(), command.as_str())
                        .with_searchable_text(format!("{name} {command}")),
                )
            })
            .collect())
    }
}

impl Default for NpmConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for NpmConnector {
    fn name(&self) -> &'static str {
        "npm"
    }

    fn kind(&self) -> ItemKind {
        ItemKind::NpmScript
    }

    fn detect(&self, ctx: &ScanContext) -> DetectionResult {
        DetectionResult::if_exists(&ctx.project_file(MANIFEST))
    }

    fn scan(&self, ctx: &ScanContext) -> Result<Vec<SearchItem>> {
        let path = ctx.project_file(MANIFEST);
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse_manifest(&raw).with_context(|| format!("parsing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_become_items() {
        let items = NpmConnector::parse_manifest(
            r#"{"name": "app", "scripts": {"build": "vite build", "test": "Vitest Run"}}"#,
        )
        .unwrap();

        assert_eq!(items.len(), 2);
        let build = &items[0];
        assert_eq!(build.title, "NPM Script: build");
        assert_eq!(build.subtitle, "[NPM] vite build");
        assert_eq!(build.arg.as_deref(), Some("npm run build"));
        let vars = build.variables.as_ref().unwrap();
        assert_eq!(vars.keyword, "build");
        assert_eq!(vars.display_text, "vite build");
        assert_eq!(vars.kind, ItemKind::NpmScript);

        assert_eq!(
            items[1].variables.as_ref().unwrap().searchable_text.as_deref(),
            Some("test vitest run")
        );
    }

    #[test]
    fn scripts_keep_manifest_order() {
        let items = NpmConnector::parse_manifest(
            r#"{"scripts": {"test": "vitest", "build": "vite build", "dev": "vite"}}"#,
        )
        .unwrap();
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["NPM Script: test", "NPM Script: build", "NPM Script: dev"]
        );
    }

    #[test]
    fn missing_scripts_is_empty() {
        assert!(NpmConnector::parse_manifest(r#"{"name": "lib"}"#).unwrap().is_empty());
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(NpmConnector::parse_manifest("{not json").is_err());
    }
}
