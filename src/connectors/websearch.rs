use super::{
    Connector, DetectionResult, ScanContext, plist_dict, plist_str, read_plist, title_case,
};
use crate::model::types::{ItemKind, ItemVariables, SearchItem};
use anyhow::Result;

/// Alfred's bundled web searches that can be re-keyworded, with their URL templates.
pub const BUILTIN_SEARCHES: &[(&str, &str)] = &[
    ("amazon", "https://www.amazon.com/s?k={query}"),
    ("duckduckgo", "https://duckduckgo.com/?q={query}"),
    ("google", "https://www.google.com/search?q={query}"),
    ("youtube", "https://www.youtube.com/results?search_query={query}"),
];

/// A user-defined web search from `customSites`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomSite {
    pub keyword: String,
    pub text: String,
    pub url: String,
}

/// Built-in searches whose keyword the user customised.
pub struct BuiltinWebSearchConnector;

impl BuiltinWebSearchConnector {
    pub fn new() -> Self {
        Self
    }

    fn parse_builtin(name: &str, url: &str, prefs: &plist::Value) -> Option<SearchItem> {
        let keyword = prefs.as_dictionary()?.get("keyword")?.as_string()?;
        let display_name = title_case(name);

        Some(SearchItem::new(
            format!("{display_name}: {keyword}"),
            format!("[Web Search] Search {display_name} for {{query}}"),
            keyword,
            ItemVariables::new(ItemKind::Websearch, keyword, format!("Search {display_name}"))
                .with_extra("url", url),
        ))
    }
}

impl Default for BuiltinWebSearchConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for BuiltinWebSearchConnector {
    fn name(&self) -> &'static str {
        "builtin_websearch"
    }

    fn kind(&self) -> ItemKind {
        ItemKind::Websearch
    }

    fn detect(&self, ctx: &ScanContext) -> DetectionResult {
        DetectionResult::if_exists(&ctx.websearch_dir())
    }

    fn scan(&self, ctx: &ScanContext) -> Result<Vec<SearchItem>> {
        let base = ctx.websearch_dir();
        let mut items = Vec::new();

        for (name, url) in BUILTIN_SEARCHES {
            let path = base.join(name).join("prefs.plist");
            if !path.exists() {
                continue;
            }
            match read_plist(&path) {
                Ok(prefs) => {
                    if let Some(item) = Self::parse_builtin(name, url, &prefs) {
                        items.push(item);
                    }
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "builtin websearch skipping unreadable plist");
                }
            }
        }

        Ok(items)
    }
}

/// User-defined searches from the websearch `prefs.plist`.
pub struct CustomWebSearchConnector;

impl CustomWebSearchConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CustomWebSearchConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for CustomWebSearchConnector {
    fn name(&self) -> &'static str {
        "custom_websearch"
    }

    fn kind(&self) -> ItemKind {
        ItemKind::Websearch
    }

    fn detect(&self, ctx: &ScanContext) -> DetectionResult {
        DetectionResult::if_exists(&custom_prefs_path(ctx))
    }

    fn scan(&self, ctx: &ScanContext) -> Result<Vec<SearchItem>> {
        let prefs = read_plist(&custom_prefs_path(ctx))?;

        Ok(custom_sites(&prefs)
            .into_iter()
            .map(|site| {
                SearchItem::new(
                    format!("{}: {}", site.text, site.keyword),
                    format!("[Web Search] {}", site.url),
                    site.keyword.clone(),
                    ItemVariables::new(ItemKind::Websearch, site.keyword, site.text)
                        .with_extra("url", site.url),
                )
            })
            .collect())
    }
}

pub fn custom_prefs_path(ctx: &ScanContext) -> std::path::PathBuf {
    ctx.websearch_dir().join("prefs.plist")
}

/// Enabled entries of `customSites`, in file order.
pub fn custom_sites(prefs: &plist::Value) -> Vec<CustomSite> {
    let Some(sites) = prefs.as_dictionary().and_then(|d| plist_dict(d, "customSites")) else {
        return Vec::new();
    };

    sites
        .values()
        .filter_map(|site| {
            let site = site.as_dictionary()?;
            if !is_enabled(site.get("enabled")) {
                return None;
            }
            Some(CustomSite {
                keyword: plist_str(site, "keyword").to_string(),
                text: plist_str(site, "text").to_string(),
                url: plist_str(site, "url").to_string(),
            })
        })
        .collect()
}

/// Missing flags count as enabled; integers follow C truthiness.
fn is_enabled(flag: Option<&plist::Value>) -> bool {
    match flag {
        Some(plist::Value::Boolean(b)) => *b,
        Some(v) => v.as_signed_integer().is_none_or(|i| i != 0),
        None => true,
    }
}

/// Custom searches shaped as direct links: keyword as title, URL as arg.
///
/// Unlike the aggregated connectors, a preferences file that cannot be read
/// is an error here.
pub fn quick_links(ctx: &ScanContext) -> Result<Vec<SearchItem>> {
    let prefs = read_plist(&custom_prefs_path(ctx))?;

    Ok(custom_sites(&prefs)
        .into_iter()
        .map(|site| {
            SearchItem::new(
                site.keyword.clone(),
                format!("{} → {}", site.text, site.url),
                site.url.clone(),
                ItemVariables::new(ItemKind::Websearch, site.keyword, site.text)
                    .with_extra("url", site.url),
            )
        })
        .collect())
}
