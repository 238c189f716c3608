//! Query parsing and filtering.
//!
//! A query is an optional type-prefix token followed by free text:
//!
//! ```text
//! _web goo        websearch items whose text contains "goo"
//! wf              every workflow keyword
//! docker status   every item whose text contains "docker status"
//! ```
//!
//! Matching is case-insensitive substring containment on NFC-normalized
//! text. Alfred hands queries over in decomposed form, so both sides are
//! composed before comparing.

use crate::model::types::{ItemKind, SearchItem};
use std::collections::BTreeMap;
use unicode_normalization::UnicodeNormalization;

/// Maps prefix tokens (lowercase) to the kind they select.
#[derive(Debug, Clone)]
pub struct PrefixTable {
    prefixes: BTreeMap<String, ItemKind>,
}

impl Default for PrefixTable {
    fn default() -> Self {
        let prefixes = ItemKind::ALL
            .into_iter()
            .flat_map(|kind| kind.prefixes().iter().map(move |p| (p.to_string(), kind)))
            .collect();
        Self { prefixes }
    }
}

impl PrefixTable {
    /// Built-in prefixes plus `extra`, which wins on conflicts.
    pub fn with_extra<'a>(extra: impl IntoIterator<Item = (&'a String, &'a ItemKind)>) -> Self {
        let mut table = Self::default();
        for (token, kind) in extra {
            table.prefixes.insert(token.to_lowercase(), *kind);
        }
        table
    }

    pub fn lookup(&self, token: &str) -> Option<ItemKind> {
        self.prefixes.get(&token.to_lowercase()).copied()
    }
}

/// Parsed query: optional kind restriction plus a normalized needle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilter {
    pub kind: Option<ItemKind>,
    pub needle: String,
}

impl QueryFilter {
    /// Parse command-line tokens with the built-in prefixes.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Self {
        Self::parse_with(args, &PrefixTable::default())
    }

    /// Parse command-line tokens.
    ///
    /// Tokens are joined and re-split on whitespace, so `["_web goo"]` and
    /// `["_web", "goo"]` parse the same.
    pub fn parse_with<S: AsRef<str>>(args: &[S], prefixes: &PrefixTable) -> Self {
        let joined = args.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ");
        let tokens: Vec<&str> = joined.split_whitespace().collect();

        let Some((first, rest)) = tokens.split_first() else {
            return Self::default();
        };

        match prefixes.lookup(first) {
            Some(kind) => Self {
                kind: Some(kind),
                needle: normalize(&rest.join(" ")),
            },
            None => Self {
                kind: None,
                needle: normalize(&tokens.join(" ")),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.needle.is_empty()
    }

    pub fn matches(&self, item: &SearchItem) -> bool {
        if self.kind.is_some_and(|kind| item.kind() != Some(kind)) {
            return false;
        }
        if self.needle.is_empty() {
            return true;
        }
        normalize(&item.search_text()).contains(&self.needle)
    }
}

/// NFC-compose and lowercase.
pub fn normalize(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}

/// Keep items matching `filter`, preserving order.
pub fn filter_items(items: Vec<SearchItem>, filter: &QueryFilter) -> Vec<SearchItem> {
    if filter.is_empty() {
        return items;
    }
    let before = items.len();
    let kept: Vec<SearchItem> = items.into_iter().filter(|i| filter.matches(i)).collect();
    tracing::debug!(
        kind = ?filter.kind,
        needle = %filter.needle,
        before,
        after = kept.len(),
        "filtered items"
    );
    kept
}

/// Keep items whose title or subtitle contains `query`; used by quick links.
pub fn filter_title_subtitle(items: Vec<SearchItem>, query: &str) -> Vec<SearchItem> {
    let needle = normalize(query.trim());
    if needle.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|i| normalize(&i.title).contains(&needle) || normalize(&i.subtitle).contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::ItemVariables;
    use proptest::prelude::*;

    fn item(kind: ItemKind, title: &str, searchable: Option<&str>) -> SearchItem {
        let mut vars = ItemVariables::new(kind, title, "");
        if let Some(s) = searchable {
            vars = vars.with_searchable_text(s);
        }
        SearchItem::new(title, format!("[{kind}] {title}"), title, vars)
    }

    fn sample() -> Vec<SearchItem> {
        vec![
            item(ItemKind::Websearch, "Google: g", None),
            item(ItemKind::Workflow, "Todo: td", Some("td todo list")),
            item(ItemKind::Alias, "Alias: gs", Some("gs git status")),
            item(ItemKind::NpmScript, "NPM Script: build", Some("build vite build")),
        ]
    }

    #[test]
    fn no_args_is_unfiltered() {
        let f = QueryFilter::parse::<&str>(&[]);
        assert!(f.is_empty());
        assert_eq!(filter_items(sample(), &f).len(), 4);
    }

    #[test]
    fn prefix_selects_kind() {
        let f = QueryFilter::parse(&["_web"]);
        assert_eq!(f.kind, Some(ItemKind::Websearch));
        assert_eq!(f.needle, "");

        let f = QueryFilter::parse(&["WF", "Todo"]);
        assert_eq!(f.kind, Some(ItemKind::Workflow));
        assert_eq!(f.needle, "todo");
    }

    #[test]
    fn single_argument_is_split() {
        let f = QueryFilter::parse(&["_alias   Git  Status "]);
        assert_eq!(
            f,
            QueryFilter {
                kind: Some(ItemKind::Alias),
                needle: "git status".into()
            }
        );
    }

    #[test]
    fn unknown_first_token_is_text() {
        let f = QueryFilter::parse(&["_git", "push"]);
        assert_eq!(f.kind, None);
        assert_eq!(f.needle, "_git push");
    }

    #[test]
    fn prefix_must_be_whole_token() {
        let f = QueryFilter::parse(&["webpack"]);
        assert_eq!(f.kind, None);
        assert_eq!(f.needle, "webpack");
    }

    #[test]
    fn extra_prefixes_override_builtin() {
        let extra: BTreeMap<String, ItemKind> = [
            ("_sh".to_string(), ItemKind::Alias),
            ("web".to_string(), ItemKind::Workflow),
        ]
        .into_iter()
        .collect();
        let table = PrefixTable::with_extra(&extra);

        assert_eq!(QueryFilter::parse_with(&["_sh"], &table).kind, Some(ItemKind::Alias));
        assert_eq!(QueryFilter::parse_with(&["web"], &table).kind, Some(ItemKind::Workflow));
        assert_eq!(
            QueryFilter::parse_with(&["_web"], &table).kind,
            Some(ItemKind::Websearch)
        );
    }

    #[test]
    fn filter_uses_searchable_text_then_fallback() {
        let hits = filter_items(sample(), &QueryFilter::parse(&["status"]));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Alias: gs");

        // Web search has no searchable_text; title is matched instead.
        let hits = filter_items(sample(), &QueryFilter::parse(&["google"]));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind(), Some(ItemKind::Websearch));
    }

    #[test]
    fn kind_and_text_combine() {
        let hits = filter_items(sample(), &QueryFilter::parse(&["_npm", "todo"]));
        assert!(hits.is_empty());
        let hits = filter_items(sample(), &QueryFilter::parse(&["_npm", "vite"]));
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn decomposed_query_matches_composed_text() {
        let items = vec![item(ItemKind::Alias, "Alias: cafe", Some("café open"))];
        let decomposed = "cafe\u{301}";
        let hits = filter_items(items, &QueryFilter::parse(&[decomposed]));
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn error_items_never_match_a_kind() {
        let items = vec![SearchItem::error("Error reading searches", "boom")];
        assert!(filter_items(items, &QueryFilter::parse(&["_web"])).is_empty());
    }

    #[test]
    fn title_subtitle_filter() {
        let items = vec![
            SearchItem::new(
                "gh",
                "GitHub → https://github.com/search?q={query}",
                "https://github.com/search?q={query}",
                ItemVariables::new(ItemKind::Websearch, "gh", "GitHub"),
            ),
            SearchItem::new(
                "wiki",
                "Wikipedia → https://en.wikipedia.org/w/index.php?search={query}",
                "https://en.wikipedia.org",
                ItemVariables::new(ItemKind::Websearch, "wiki", "Wikipedia"),
            ),
        ];
        assert_eq!(filter_title_subtitle(items.clone(), "").len(), 2);
        assert_eq!(filter_title_subtitle(items.clone(), "GITHUB").len(), 1);
        assert_eq!(filter_title_subtitle(items, "wik").len(), 1);
    }

    fn arb_kind() -> impl Strategy<Value = ItemKind> {
        prop::sample::select(ItemKind::ALL.to_vec())
    }

    fn arb_items() -> impl Strategy<Value = Vec<SearchItem>> {
        prop::collection::vec((arb_kind(), "[a-zA-Z ]{0,12}"), 0..12).prop_map(|rows| {
            rows.into_iter()
                .map(|(kind, text)| item(kind, &text, Some(&text)))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn empty_query_is_identity(items in arb_items()) {
            let filtered = filter_items(items.clone(), &QueryFilter::parse::<&str>(&[]));
            prop_assert_eq!(filtered, items);
        }

        #[test]
        fn matching_ignores_case(items in arb_items(), needle in "[a-zA-Z]{1,3}") {
            let lower = filter_items(items.clone(), &QueryFilter::parse(&[needle.to_lowercase()]));
            let upper = filter_items(items, &QueryFilter::parse(&[needle.to_uppercase()]));
            prop_assert_eq!(lower, upper);
        }

        #[test]
        fn prefixes_partition_by_kind(items in arb_items()) {
            let mut total = 0;
            for kind in ItemKind::ALL {
                let hits = filter_items(items.clone(), &QueryFilter::parse(&[kind.prefixes()[0]]));
                prop_assert!(hits.iter().all(|i| i.kind() == Some(kind)));
                total += hits.len();
            }
            prop_assert_eq!(total, items.len());
        }
    }
}
