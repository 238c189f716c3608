//! Tracing subscriber setup.
//!
//! Stdout carries the Script Filter JSON, so logs go to stderr (which Alfred
//! shows in its workflow debugger) or to the configured log file.

use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `alfred_keywords=debug`.
pub const LOG_ENV: &str = "ALFRED_KEYWORDS_LOG";

/// Default level for a `-v` count.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn build_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)))
}

/// Relative log paths are taken from `base`.
fn resolve_log_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn file_appender(path: &Path) -> Option<RollingFileAppender> {
    let path = match std::env::current_dir() {
        Ok(cwd) => resolve_log_path(path, &cwd),
        Err(e) => {
            eprintln!("alfred-keywords: ignoring log file {}: {e}", path.display());
            return None;
        }
    };
    let (Some(dir), Some(name)) = (path.parent(), path.file_name().and_then(|n| n.to_str()))
    else {
        eprintln!("alfred-keywords: ignoring log file {}: not a file path", path.display());
        return None;
    };
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("alfred-keywords: cannot create log directory {}: {e}", dir.display());
        return None;
    }
    match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
    {
        Ok(appender) => Some(appender),
        Err(e) => {
            eprintln!("alfred-keywords: cannot open log file {}: {e}", path.display());
            None
        }
    }
}

/// Install the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init(verbosity: u8, log_file: Option<&Path>) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbosity))
        .with_ansi(false)
        .with_target(false);

    let _ = match log_file.and_then(file_appender) {
        Some(appender) => builder.with_writer(appender).try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(9), "trace");
    }

    #[test]
    fn file_appender_creates_parent_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs/nested/alfred-keywords.log");
        assert!(file_appender(&path).is_some());
        assert!(path.parent().unwrap().is_dir());
    }

    #[test]
    fn relative_log_path_resolves_against_base() {
        let base = Path::new("/work/app");
        assert_eq!(
            resolve_log_path(Path::new("keywords.log"), base),
            PathBuf::from("/work/app/keywords.log")
        );
        assert_eq!(
            resolve_log_path(Path::new("logs/keywords.log"), base),
            PathBuf::from("/work/app/logs/keywords.log")
        );
        assert_eq!(
            resolve_log_path(Path::new("/var/log/ak.log"), base),
            PathBuf::from("/var/log/ak.log")
        );
    }

    #[test]
    fn root_path_has_no_appender() {
        assert!(file_appender(Path::new("/")).is_none());
    }
}
