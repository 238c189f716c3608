use super::{Connector, DetectionResult, ScanContext};
use crate::model::types::{ItemKind, ItemVariables, SearchItem};
use anyhow::{Context, Result};
use serde_yaml::Value;
use std::fs;
use std::path::Path;

pub const COMPOSE_FILES: &[&str] = &["docker-compose.yml", "docker-compose.yaml"];

pub struct DockerComposeConnector;

impl DockerComposeConnector {
    pub fn new() -> Self {
        Self
    }

    /// Items for every entry under `services` in a compose document.
    pub fn parse_compose(raw: &str) -> Result<Vec<SearchItem>> {
        let doc: Value = serde_yaml::from_str(raw)?;
        let Some(services) = doc.get("services").and_then(Value::as_mapping) else {
            return Ok(Vec::new());
        };

        let mut items = Vec::new();
        for (name, config) in services {
            let Some(name) = scalar_to_string(name) else {
                continue;
            };
            let description = describe_service(config);
            items.push(SearchItem::new(
                format!("Docker Service: {name}"),
                format!("[Docker] {description}"),
                format!("docker-compose up {name}"),
                ItemVariables::new(ItemKind::DockerService, name.as_str(), description.as_str())
                    .with_searchable_text(format!("{name} {description}")),
            ));
        }
        Ok(items)
    }

    fn parse_file(path: &Path) -> Result<Vec<SearchItem>> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::parse_compose(&raw).with_context(|| format!("parsing {}", path.display()))
    }
}

impl Default for DockerComposeConnector {
    fn default() -> Self {
        Self::new()
    }
}

/// `Image: <image> Port: [<ports>]`; the image defaults to `custom`.
pub fn describe_service(config: &Value) -> String {
    let image = config
        .get("image")
        .and_then(scalar_to_string)
        .unwrap_or_else(|| "custom".to_string());
    let ports = config
        .get("ports")
        .and_then(Value::as_sequence)
        .map(|ports| ports.iter().map(render_value).collect::<Vec<_>>().join(", "))
        .unwrap_or_default();
    format!("Image: {image} Port: [{ports}]")
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Compact rendering: strings single-quoted, numbers bare, collections bracketed.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Sequence(seq) => {
            format!("[{}]", seq.iter().map(render_value).collect::<Vec<_>>().join(", "))
        }
        Value::Mapping(map) => format!(
            "{{{}}}",
            map.iter()
                .map(|(k, v)| format!("{}: {}", render_value(k), render_value(v)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        Value::Tagged(tagged) => render_value(&tagged.value),
    }
}

impl Connector for DockerComposeConnector {
    fn name(&self) -> &'static str {
        "docker"
    }

    fn kind(&self) -> ItemKind {
        ItemKind::DockerService
    }

    fn detect(&self, ctx: &ScanContext) -> DetectionResult {
        COMPOSE_FILES
            .iter()
            .map(|f| ctx.project_file(f))
            .find(|p| p.exists())
            .map_or_else(DetectionResult::not_found, |p| DetectionResult::found(&p))
    }

    fn scan(&self, ctx: &ScanContext) -> Result<Vec<SearchItem>> {
        let mut items = Vec::new();

        for file in COMPOSE_FILES {
            let path = ctx.project_file(file);
            if !path.exists() {
                continue;
            }
            match Self::parse_file(&path) {
                Ok(found) => items.extend(found),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %format!("{e:#}"), "docker skipping unreadable compose file");
                }
            }
        }

        Ok(items)
    }
}
