pub mod collector;
pub mod config;
pub mod connectors;
pub mod logging;
pub mod model;
pub mod search;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use collector::collect_items;
use config::Config;
use model::types::ScriptFilterOutput;
use search::query::{PrefixTable, QueryFilter, filter_items, filter_title_subtitle};
use std::io::Write;
use std::path::PathBuf;

pub const SEARCH_ERROR_TITLE: &str = "Error reading searches";
pub const WEB_SEARCH_ERROR_TITLE: &str = "Error reading web searches";

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "alfred-keywords",
    version,
    about = "Alfred script filter over web searches, workflow keywords, shell aliases and project scripts"
)]
pub struct Cli {
    // Top-level only: anything after `search` or `web-searches` is query text.
    /// Path to config.toml (defaults to the platform config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// Increase log verbosity (stderr); repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Aggregated script filter; an optional prefix token (_web, wf, _alias, ...) selects a type
    #[command(disable_help_flag = true)]
    Search {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
    /// Custom web searches as direct links, filtered on title and subtitle
    #[command(disable_help_flag = true)]
    WebSearches {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
    /// Show which sources were detected and how many items each produced
    Sources,
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page to stdout
    Man,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut out = std::io::stdout().lock();
    run_with(cli, &mut out)
}

pub fn run_with(cli: Cli, out: &mut impl Write) -> Result<()> {
    let loaded = Config::load(cli.config.as_deref());
    let log_file = loaded.as_ref().ok().and_then(Config::log_file);
    logging::init(cli.verbose, log_file.as_deref());
    tracing::debug!(args = ?std::env::args().collect::<Vec<_>>(), "invoked");

    match cli.command {
        Commands::Search { query } => {
            let output = search_output(loaded, &query);
            write_json(out, &output, cli.pretty)
        }
        Commands::WebSearches { query } => {
            let output = web_searches_output(loaded, &query);
            write_json(out, &output, cli.pretty)
        }
        Commands::Sources => {
            let config = loaded?;
            let ctx = config.scan_context()?;
            let report = collect_items(&ctx, &config.enabled_kinds());
            let summary = serde_json::json!({
                "alfred_preferences": ctx.alfred_preferences,
                "project_dir": ctx.project_dir,
                "total_items": report.items.len(),
                "sources": report.sources,
            });
            write_json(out, &summary, true)
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "alfred-keywords", out);
            Ok(())
        }
        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            man.render(out)?;
            Ok(())
        }
    }
}

/// Aggregated, filtered items; any top-level failure becomes a single error item.
pub fn search_output(
    loaded: Result<Config, config::ConfigError>,
    query: &[String],
) -> ScriptFilterOutput {
    let result = loaded.map_err(anyhow::Error::from).and_then(|config| {
        let ctx = config.scan_context()?;
        let report = collect_items(&ctx, &config.enabled_kinds());
        let filter = QueryFilter::parse_with(query, &PrefixTable::with_extra(&config.prefixes));
        Ok(ScriptFilterOutput::new(filter_items(report.items, &filter)))
    });

    result.unwrap_or_else(|e| {
        tracing::error!("search failed: {e}");
        ScriptFilterOutput::error(SEARCH_ERROR_TITLE, e)
    })
}

/// Custom web searches as quick links; an unreadable preferences file becomes an error item.
pub fn web_searches_output(
    loaded: Result<Config, config::ConfigError>,
    query: &[String],
) -> ScriptFilterOutput {
    let result = loaded.map_err(anyhow::Error::from).and_then(|config| {
        let ctx = config.scan_context()?;
        connectors::websearch::quick_links(&ctx)
    });

    match result {
        Ok(items) => ScriptFilterOutput::new(filter_title_subtitle(items, &query.join(" "))),
        Err(e) => {
            tracing::error!("web searches failed: {e:#}");
            ScriptFilterOutput::error(WEB_SEARCH_ERROR_TITLE, format!("{e:#}"))
        }
    }
}

fn write_json<T: serde::Serialize>(out: &mut impl Write, value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    writeln!(out, "{rendered}").context("writing output")?;
    Ok(())
}
