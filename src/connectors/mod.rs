//! Connectors for local keyword sources.
//!
//! Each connector reads one configuration store (Alfred preferences, shell
//! rc files, project manifests) and emits normalized [`SearchItem`]s.

use crate::model::types::{ItemKind, SearchItem};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub mod alias;
pub mod docker;
pub mod make;
pub mod npm;
pub mod websearch;
pub mod workflow;

/// High-level detection status for a connector.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionResult {
    pub detected: bool,
    pub evidence: Vec<String>,
    pub root_paths: Vec<PathBuf>,
}

impl DetectionResult {
    pub fn not_found() -> Self {
        Self {
            detected: false,
            evidence: Vec::new(),
            root_paths: Vec::new(),
        }
    }

    pub fn found(path: &Path) -> Self {
        Self {
            detected: true,
            evidence: vec![format!("found {}", path.display())],
            root_paths: vec![path.to_path_buf()],
        }
    }

    /// Detected if `path` exists.
    pub fn if_exists(path: &Path) -> Self {
        if path.exists() {
            Self::found(path)
        } else {
            Self::not_found()
        }
    }
}

/// Resolved locations every connector reads from.
#[derive(Debug, Clone)]
pub struct ScanContext {
    /// Alfred preferences bundle (`Alfred.alfredpreferences`).
    pub alfred_preferences: PathBuf,
    pub home: PathBuf,
    /// Shell rc files scanned for `alias` lines, in order.
    pub shell_files: Vec<PathBuf>,
    /// Directory holding `package.json`, compose files and the Makefile.
    pub project_dir: PathBuf,
    pub make_program: String,
}

impl ScanContext {
    /// Context rooted entirely under `root`; handy for fixtures.
    pub fn under(root: &Path) -> Self {
        let home = root.join("home");
        Self {
            alfred_preferences: root.join("Alfred.alfredpreferences"),
            shell_files: vec![home.join(".zshrc"), home.join(".bashrc")],
            home,
            project_dir: root.join("project"),
            make_program: "make".into(),
        }
    }

    pub fn websearch_dir(&self) -> PathBuf {
        self.alfred_preferences
            .join("preferences")
            .join("features")
            .join("websearch")
    }

    pub fn workflows_dir(&self) -> PathBuf {
        self.alfred_preferences.join("workflows")
    }

    pub fn project_file(&self, name: &str) -> PathBuf {
        self.project_dir.join(name)
    }
}

pub trait Connector {
    fn name(&self) -> &'static str;
    fn kind(&self) -> ItemKind;
    fn detect(&self, ctx: &ScanContext) -> DetectionResult;
    fn scan(&self, ctx: &ScanContext) -> Result<Vec<SearchItem>>;
}

/// Read an XML or binary property list.
pub fn read_plist(path: &Path) -> Result<plist::Value> {
    plist::Value::from_file(path).with_context(|| format!("reading plist {}", path.display()))
}

/// String value at `key`, or `""` when missing or not a string.
pub fn plist_str<'a>(dict: &'a plist::Dictionary, key: &str) -> &'a str {
    dict.get(key).and_then(plist::Value::as_string).unwrap_or("")
}

/// Dictionary value at `key`, if present.
pub fn plist_dict<'a>(dict: &'a plist::Dictionary, key: &str) -> Option<&'a plist::Dictionary> {
    dict.get(key).and_then(plist::Value::as_dictionary)
}

/// Uppercase the first character and lowercase the rest (`duckduckgo` → `Duckduckgo`).
pub fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
