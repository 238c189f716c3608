use super::{Connector, DetectionResult, ScanContext};
use crate::model::types::{ItemKind, ItemVariables, SearchItem};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::process::Command;

const MAKEFILE: &str = "Makefile";

/// Marker `make -p` prints before files it knows about but that are not targets.
const NOT_A_TARGET: &str = "# Not a target:";

pub struct MakeConnector;

impl MakeConnector {
    pub fn new() -> Self {
        Self
    }

    pub fn target_item(target: &str) -> SearchItem {
        SearchItem::new(
            format!("Make Target: {target}"),
            format!("[Make] Run make {target}"),
            format!("make {target}"),
            ItemVariables::new(ItemKind::MakeTarget, target, format!("Make target: {target}"))
                .with_searchable_text(target),
        )
    }
}

impl Default for MakeConnector {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract target names from `make -qp` database output, first-seen order.
pub fn parse_make_database(output: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut targets = Vec::new();
    let mut skip_next = false;

    for line in output.lines() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if line.starts_with(NOT_A_TARGET) {
            skip_next = true;
            continue;
        }
        if line.starts_with('\t') || line.starts_with('#') {
            continue;
        }
        let Some((head, _)) = line.split_once(':') else {
            continue;
        };
        // `VAR := value`, `VAR ::= value` and `VAR = a:b` are assignments.
        if line[head.len()..].starts_with(":=")
            || line[head.len()..].starts_with("::=")
            || head.contains('=')
        {
            continue;
        }
        for target in head.split_whitespace() {
            if target.starts_with('.') || target.contains('%') {
                continue;
            }
            if seen.insert(target.to_string()) {
                targets.push(target.to_string());
            }
        }
    }

    targets
}

impl Connector for MakeConnector {
    fn name(&self) -> &'static str {
        "make"
    }

    fn kind(&self) -> ItemKind {
        ItemKind::MakeTarget
    }

    fn detect(&self, ctx: &ScanContext) -> DetectionResult {
        let makefile = ctx.project_file(MAKEFILE);
        if !makefile.exists() {
            return DetectionResult::not_found();
        }
        match which::which(&ctx.make_program) {
            Ok(program) => {
                let mut result = DetectionResult::found(&makefile);
                result.evidence.push(format!("using {}", program.display()));
                result
            }
            Err(e) => {
                tracing::debug!(program = %ctx.make_program, error = %e, "make program not on PATH");
                DetectionResult::not_found()
            }
        }
    }

    fn scan(&self, ctx: &ScanContext) -> Result<Vec<SearchItem>> {
        // `-q` makes the exit status meaningless here; only stdout matters.
        let output = Command::new(&ctx.make_program)
            .arg("-qp")
            .current_dir(&ctx.project_dir)
            .output()
            .with_context(|| format!("running {} -qp", ctx.make_program))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_make_database(&stdout)
            .iter()
            .map(|t| Self::target_item(t))
            .collect())
    }
}
