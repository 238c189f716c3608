use super::{Connector, DetectionResult, ScanContext};
use crate::model::types::{ItemKind, ItemVariables, SearchItem};
use anyhow::Result;
use std::fs;
use std::path::Path;

pub struct AliasConnector;

impl AliasConnector {
    pub fn new() -> Self {
        Self
    }

    /// Parse `alias name=command` lines out of shell rc content.
    pub fn parse_aliases(content: &str, source_file: &Path) -> Vec<SearchItem> {
        content
            .lines()
            .filter_map(parse_alias_line)
            .map(|(name, command)| {
                SearchItem::new(
                    format!("Alias: {name}"),
                    format!("[Shell Alias] {command}"),
                    name,
                    ItemVariables::new(ItemKind::Alias, name, command)
                        .with_searchable_text(format!("{name} {command}"))
                        .with_extra("source_file", source_file.display().to_string()),
                )
            })
            .collect()
    }
}

impl Default for AliasConnector {
    fn default() -> Self {
        Self::new()
    }
}

/// Split one line into `(name, command)` if it defines an alias.
///
/// The command loses surrounding whitespace, then surrounding `'`, then `"`.
pub fn parse_alias_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let definition = line.strip_prefix("alias ")?.trim();
    let (name, command) = definition.split_once('=')?;
    let command = command.trim().trim_matches('\'').trim_matches('"');
    Some((name.trim(), command))
}

impl Connector for AliasConnector {
    fn name(&self) -> &'static str {
        "alias"
    }

    fn kind(&self) -> ItemKind {
        ItemKind::Alias
    }

    fn detect(&self, ctx: &ScanContext) -> DetectionResult {
        let found: Vec<_> = ctx.shell_files.iter().filter(|p| p.exists()).cloned().collect();
        if found.is_empty() {
            return DetectionResult::not_found();
        }
        DetectionResult {
            detected: true,
            evidence: found.iter().map(|p| format!("found {}", p.display())).collect(),
            root_paths: found,
        }
    }

    fn scan(&self, ctx: &ScanContext) -> Result<Vec<SearchItem>> {
        let mut items = Vec::new();

        for path in &ctx.shell_files {
            if !path.exists() {
                continue;
            }
            match fs::read_to_string(path) {
                Ok(content) => items.extend(Self::parse_aliases(&content, path)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "alias skipping unreadable shell file");
                }
            }
        }

        Ok(items)
    }
}
