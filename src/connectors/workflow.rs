use super::{Connector, DetectionResult, ScanContext, plist_dict, plist_str, read_plist};
use crate::model::types::{ItemKind, ItemVariables, SearchItem};
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use walkdir::WalkDir;

/// Workflow object types that carry a user-facing keyword.
pub const INPUT_TYPES: &[&str] = &[
    "alfred.workflow.input.keyword",
    "alfred.workflow.input.scriptfilter",
    "alfred.workflow.input.filefilter",
    "alfred.workflow.input.argument",
    "alfred.workflow.input.box",
];

const OPEN_URL_ACTION: &str = "alfred.workflow.action.openurl";

pub struct WorkflowConnector;

impl Default for WorkflowConnector {
    fn default() -> Self {
        Self::new()
    }
}

/// Workflow-level metadata shared by every keyword in the bundle.
struct WorkflowMeta<'a> {
    name: &'a str,
    description: &'a str,
    creator: &'a str,
    website: &'a str,
    defaults: HashMap<&'a str, &'a str>,
}

impl WorkflowConnector {
    pub fn new() -> Self {
        Self
    }

    /// Extract keyword items from one parsed `info.plist`.
    pub fn parse_info(info: &plist::Value) -> Vec<SearchItem> {
        let Some(root) = info.as_dictionary() else {
            return Vec::new();
        };
        let Some(objects) = root.get("objects").and_then(plist::Value::as_array) else {
            return Vec::new();
        };

        let meta = WorkflowMeta {
            name: plist_str(root, "name"),
            description: plist_str(root, "description"),
            creator: plist_str(root, "createdby"),
            website: plist_str(root, "webaddress"),
            defaults: user_config_defaults(root),
        };
        let connections = plist_dict(root, "connections");

        let mut items = Vec::new();
        for obj in objects.iter().filter_map(plist::Value::as_dictionary) {
            let obj_type = plist_str(obj, "type");
            if !INPUT_TYPES.contains(&obj_type) {
                continue;
            }
            let Some(config) = plist_dict(obj, "config") else {
                continue;
            };
            let keyword = resolve_keyword(plist_str(config, "keyword"), &meta.defaults);
            if keyword.is_empty() {
                continue;
            }

            let (urls, actions) = match (plist_str(obj, "uid"), connections) {
                ("", _) | (_, None) => (Vec::new(), Vec::new()),
                (uid, Some(conns)) => connected_actions(uid, conns, objects),
            };

            items.push(Self::build_item(&meta, obj_type, config, &keyword, urls, actions));
        }
        items
    }

    fn build_item(
        meta: &WorkflowMeta<'_>,
        obj_type: &str,
        config: &plist::Dictionary,
        keyword: &str,
        urls: Vec<String>,
        actions: Vec<String>,
    ) -> SearchItem {
        let text = plist_str(config, "text");
        let subtext = plist_str(config, "subtext");
        let title = plist_str(config, "title");
        let script = plist_str(config, "script");

        let display_text = if !title.is_empty() && !subtext.is_empty() {
            format!("{title} - {subtext}")
        } else {
            [text, title, subtext, meta.description]
                .into_iter()
                .find(|s| !s.is_empty())
                .unwrap_or("No description")
                .to_string()
        };

        let creator_text = if meta.creator.is_empty() {
            String::new()
        } else {
            format!(" by {}", meta.creator)
        };

        let searchable_text = format!(
            "{keyword} {} {} {text} {subtext} {title} {}",
            meta.name, meta.description, meta.creator
        );

        SearchItem::new(
            format!("{}: {keyword}", meta.name),
            format!("[Workflow{creator_text}] {display_text}"),
            keyword,
            ItemVariables::new(ItemKind::Workflow, keyword, display_text)
                .with_searchable_text(searchable_text)
                .with_extra("workflow_name", meta.name)
                .with_extra("workflow_desc", meta.description)
                .with_extra("workflow_creator", meta.creator)
                .with_extra("workflow_website", meta.website)
                .with_extra("workflow_type", type_suffix(obj_type))
                .with_extra("script", script)
                .with_extra("url", urls.join(","))
                .with_extra("actions", actions.join(",")),
        )
    }

    fn parse_file(path: &Path) -> Result<Vec<SearchItem>> {
        let info = read_plist(path)?;
        Ok(Self::parse_info(&info))
    }
}

impl Connector for WorkflowConnector {
    fn name(&self) -> &'static str {
        "workflow"
    }

    fn kind(&self) -> ItemKind {
        ItemKind::Workflow
    }

    fn detect(&self, ctx: &ScanContext) -> DetectionResult {
        DetectionResult::if_exists(&ctx.workflows_dir())
    }

    fn scan(&self, ctx: &ScanContext) -> Result<Vec<SearchItem>> {
        let mut items = Vec::new();

        for entry in WalkDir::new(ctx.workflows_dir())
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() || entry.file_name() != "info.plist" {
                continue;
            }
            match Self::parse_file(entry.path()) {
                Ok(found) => {
                    tracing::debug!(path = %entry.path().display(), keywords = found.len(), "workflow parsed");
                    items.extend(found);
                }
                Err(e) => {
                    tracing::debug!(path = %entry.path().display(), error = %e, "workflow skipping unreadable info.plist");
                }
            }
        }

        Ok(items)
    }
}

/// `userconfigurationconfig[*].variable` → `config.default`.
fn user_config_defaults(root: &plist::Dictionary) -> HashMap<&str, &str> {
    root.get("userconfigurationconfig")
        .and_then(plist::Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(plist::Value::as_dictionary)
                .filter_map(|entry| {
                    let var = plist_str(entry, "variable");
                    if var.is_empty() {
                        return None;
                    }
                    let default = plist_dict(entry, "config")
                        .map(|c| plist_str(c, "default"))
                        .unwrap_or("");
                    Some((var, default))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Resolve `{var:NAME}` keywords against user configuration defaults.
///
/// Unconfigured variables resolve to their own name.
pub fn resolve_keyword(keyword: &str, defaults: &HashMap<&str, &str>) -> String {
    match keyword
        .strip_prefix("{var:")
        .and_then(|rest| rest.strip_suffix('}'))
    {
        Some(var) => defaults.get(var).copied().unwrap_or(var).to_string(),
        None => keyword.to_string(),
    }
}

/// Follow `connections[uid]` to destination objects.
///
/// Returns open-URL targets and the type suffix of every destination.
fn connected_actions(
    uid: &str,
    connections: &plist::Dictionary,
    objects: &[plist::Value],
) -> (Vec<String>, Vec<String>) {
    let mut urls = Vec::new();
    let mut actions = Vec::new();

    let Some(dests) = connections.get(uid).and_then(plist::Value::as_array) else {
        return (urls, actions);
    };

    for dest in dests.iter().filter_map(plist::Value::as_dictionary) {
        let dest_uid = plist_str(dest, "destinationuid");
        if dest_uid.is_empty() {
            continue;
        }
        for target in objects.iter().filter_map(plist::Value::as_dictionary) {
            if plist_str(target, "uid") != dest_uid {
                continue;
            }
            let target_type = plist_str(target, "type");
            if target_type == OPEN_URL_ACTION {
                let url = plist_dict(target, "config")
                    .map(|c| plist_str(c, "url"))
                    .unwrap_or("");
                if !url.is_empty() {
                    urls.push(url.to_string());
                }
            }
            actions.push(type_suffix(target_type).to_string());
        }
    }

    (urls, actions)
}

fn type_suffix(obj_type: &str) -> &str {
    obj_type.rsplit('.').next().unwrap_or(obj_type)
}
