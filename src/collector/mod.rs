//! Runs every connector and concatenates their items.

use crate::connectors::alias::AliasConnector;
use crate::connectors::docker::DockerComposeConnector;
use crate::connectors::make::MakeConnector;
use crate::connectors::npm::NpmConnector;
use crate::connectors::websearch::{BuiltinWebSearchConnector, CustomWebSearchConnector};
use crate::connectors::workflow::WorkflowConnector;
use crate::connectors::{Connector, DetectionResult, ScanContext};
use crate::model::types::{ItemKind, SearchItem};
use serde::Serialize;

/// All connectors, in the order their items appear in the output.
#[allow(clippy::type_complexity)]
pub fn get_connector_factories() -> Vec<(&'static str, fn() -> Box<dyn Connector>)> {
    vec![
        ("builtin_websearch", || Box::new(BuiltinWebSearchConnector::new())),
        ("workflow", || Box::new(WorkflowConnector::new())),
        ("alias", || Box::new(AliasConnector::new())),
        ("custom_websearch", || Box::new(CustomWebSearchConnector::new())),
        ("npm", || Box::new(NpmConnector::new())),
        ("docker", || Box::new(DockerComposeConnector::new())),
        ("make", || Box::new(MakeConnector::new())),
    ]
}

/// Per-connector outcome of one collection pass.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub name: &'static str,
    pub kind: ItemKind,
    pub enabled: bool,
    pub detection: DetectionResult,
    pub items: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectReport {
    pub items: Vec<SearchItem>,
    pub sources: Vec<SourceReport>,
}

impl CollectReport {
    pub fn failures(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|s| s.error.is_some())
    }
}

/// Collect items from every enabled, detected connector.
///
/// A connector that fails contributes nothing; the failure is logged and
/// recorded in its [`SourceReport`].
pub fn collect_items(ctx: &ScanContext, enabled: &[ItemKind]) -> CollectReport {
    let mut report = CollectReport::default();

    for (name, factory) in get_connector_factories() {
        let conn = factory();
        let kind = conn.kind();
        let is_enabled = enabled.contains(&kind);

        let detection = if is_enabled {
            conn.detect(ctx)
        } else {
            DetectionResult::not_found()
        };

        let mut source = SourceReport {
            name,
            kind,
            enabled: is_enabled,
            detection,
            items: 0,
            error: None,
        };

        if !is_enabled {
            tracing::debug!(connector = name, "source disabled");
        } else if !source.detection.detected {
            tracing::debug!(connector = name, "source not detected");
        } else {
            match conn.scan(ctx) {
                Ok(items) => {
                    tracing::debug!(connector = name, items = items.len(), "scan complete");
                    source.items = items.len();
                    report.items.extend(items);
                }
                Err(e) => {
                    tracing::warn!(connector = name, "scan failed: {:#}", e);
                    source.error = Some(format!("{e:#}"));
                }
            }
        }

        report.sources.push(source);
    }

    tracing::info!(
        items = report.items.len(),
        failures = report.failures().count(),
        "collection complete"
    );
    report
}
