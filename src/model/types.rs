//! Normalized result structs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Categories of actions aggregated from the local sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Websearch,
    Workflow,
    Alias,
    NpmScript,
    DockerService,
    MakeTarget,
}

impl ItemKind {
    pub const ALL: [ItemKind; 6] = [
        ItemKind::Websearch,
        ItemKind::Workflow,
        ItemKind::Alias,
        ItemKind::NpmScript,
        ItemKind::DockerService,
        ItemKind::MakeTarget,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Websearch => "websearch",
            Self::Workflow => "workflow",
            Self::Alias => "alias",
            Self::NpmScript => "npm_script",
            Self::DockerService => "docker_service",
            Self::MakeTarget => "make_target",
        }
    }

    /// Query prefix tokens that select this kind.
    pub fn prefixes(&self) -> &'static [&'static str] {
        match self {
            Self::Websearch => &["_web", "web"],
            Self::Workflow => &["_work", "wf"],
            Self::Alias => &["_alias"],
            Self::NpmScript => &["_npm"],
            Self::DockerService => &["_docker"],
            Self::MakeTarget => &["_make"],
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variables Alfred exports to the downstream action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemVariables {
    pub keyword: String,
    pub display_text: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Lowercase text the query is matched against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searchable_text: Option<String>,
    /// Source-specific fields (`url`, `source_file`, `workflow_name`, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl ItemVariables {
    pub fn new(kind: ItemKind, keyword: impl Into<String>, display_text: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            display_text: display_text.into(),
            kind,
            searchable_text: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_searchable_text(mut self, text: impl AsRef<str>) -> Self {
        self.searchable_text = Some(text.as_ref().to_lowercase());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// One Alfred Script Filter result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    pub title: String,
    pub subtitle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<ItemVariables>,
}

impl SearchItem {
    pub fn new(
        title: impl Into<String>,
        subtitle: impl Into<String>,
        arg: impl Into<String>,
        variables: ItemVariables,
    ) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            arg: Some(arg.into()),
            valid: None,
            variables: Some(variables),
        }
    }

    /// Synthetic, non-actionable item used to surface a failure in Alfred.
    pub fn error(title: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            title: title.into(),
            subtitle: message.to_string(),
            arg: None,
            valid: Some(false),
            variables: None,
        }
    }

    pub fn kind(&self) -> Option<ItemKind> {
        self.variables.as_ref().map(|v| v.kind)
    }

    /// Lowercase text a query is matched against.
    ///
    /// Uses `searchable_text` when the source provided one, otherwise joins
    /// the non-empty title, subtitle, keyword and display text.
    pub fn search_text(&self) -> String {
        if let Some(text) = self
            .variables
            .as_ref()
            .and_then(|v| v.searchable_text.as_deref())
            .filter(|t| !t.is_empty())
        {
            return text.to_lowercase();
        }

        let (keyword, display_text) = self
            .variables
            .as_ref()
            .map_or(("", ""), |v| (v.keyword.as_str(), v.display_text.as_str()));

        [
            self.title.as_str(),
            self.subtitle.as_str(),
            keyword,
            display_text,
        ]
        .into_iter()
        .filter(|field| !field.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
    }
}

/// Top-level Script Filter document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptFilterOutput {
    pub items: Vec<SearchItem>,
}

impl ScriptFilterOutput {
    pub fn new(items: Vec<SearchItem>) -> Self {
        Self { items }
    }

    pub fn error(title: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            items: vec![SearchItem::error(title, message)],
        }
    }
}
