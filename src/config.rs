//! Configuration for alfred-keywords.
//!
//! Configuration is optional. When present it lives in a TOML file:
//!
//! ```toml
//! alfred_preferences = "~/Dropbox/Alfred.alfredpreferences"
//! shell_files = ["~/.zshrc", "~/.config/zsh/aliases.zsh"]
//! project_dir = "~/src/my-app"
//! make_program = "gmake"
//! disabled_sources = ["docker_service"]
//! log_file = "~/Library/Logs/alfred-keywords.log"
//!
//! [prefixes]
//! _w = "workflow"
//! _sh = "alias"
//! ```
//!
//! Lookup order for the file: `--config`, `ALFRED_KEYWORDS_CONFIG`, then
//! `config.toml` in the platform config directory. A missing file means
//! defaults; a malformed file is an error.

use crate::connectors::ScanContext;
use crate::model::types::ItemKind;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "ALFRED_KEYWORDS_CONFIG";
/// Environment variable overriding the project directory.
pub const PROJECT_DIR_ENV: &str = "ALFRED_KEYWORDS_PROJECT_DIR";
/// Set by Alfred for script filters; points at the preferences bundle.
pub const ALFRED_PREFERENCES_ENV: &str = "alfred_preferences";

const DEFAULT_ALFRED_PREFERENCES: &str =
    "Library/Application Support/Alfred/Alfred.alfredpreferences";

const DEFAULT_SHELL_FILES: &[&str] = &[
    ".zshrc",
    ".bashrc",
    ".bash_aliases",
    ".aliases",
    ".zsh_aliases",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Could not determine home directory")]
    NoHomeDir,
    #[error("Could not determine current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// Parsed configuration file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub alfred_preferences: Option<PathBuf>,
    pub shell_files: Option<Vec<PathBuf>>,
    pub project_dir: Option<PathBuf>,
    pub make_program: Option<String>,
    pub disabled_sources: Vec<ItemKind>,
    /// Extra query prefix tokens, merged over the built-in ones.
    pub prefixes: BTreeMap<String, ItemKind>,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load from an explicit path, the env override, or the default location.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => dotenvy::var(CONFIG_ENV)
                .ok()
                .map(PathBuf::from)
                .or_else(default_config_path),
        };

        match path {
            Some(p) if p.exists() => Self::load_from(&p),
            Some(p) => {
                tracing::debug!(path = %p.display(), "no config file; using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn is_enabled(&self, kind: ItemKind) -> bool {
        !self.disabled_sources.contains(&kind)
    }

    pub fn enabled_kinds(&self) -> Vec<ItemKind> {
        ItemKind::ALL
            .into_iter()
            .filter(|k| self.is_enabled(*k))
            .collect()
    }

    /// Resolve every path the connectors read.
    pub fn scan_context(&self) -> Result<ScanContext, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;

        let alfred_preferences = self
            .alfred_preferences
            .clone()
            .or_else(|| {
                dotenvy::var(ALFRED_PREFERENCES_ENV)
                    .ok()
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .map(|p| expand_tilde(&p, &home))
            .unwrap_or_else(|| home.join(DEFAULT_ALFRED_PREFERENCES));

        let shell_files = match &self.shell_files {
            Some(files) => files.iter().map(|p| expand_tilde(p, &home)).collect(),
            None => DEFAULT_SHELL_FILES.iter().map(|f| home.join(f)).collect(),
        };

        let project_dir = match dotenvy::var(PROJECT_DIR_ENV).ok().map(PathBuf::from) {
            Some(p) => expand_tilde(&p, &home),
            None => match &self.project_dir {
                Some(p) => expand_tilde(p, &home),
                None => std::env::current_dir().map_err(ConfigError::CurrentDir)?,
            },
        };

        Ok(ScanContext {
            alfred_preferences,
            home,
            shell_files,
            project_dir,
            make_program: self.make_program.clone().unwrap_or_else(|| "make".into()),
        })
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        let log_file = self.log_file.as_ref()?;
        Some(match dirs::home_dir() {
            Some(home) => expand_tilde(log_file, &home),
            None => log_file.clone(),
        })
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "alfred-keywords", "alfred-keywords")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Replace a leading `~` component with `home`.
pub fn expand_tilde(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_has_defaults() {
        let cfg = Config::parse("").unwrap();
        assert!(cfg.alfred_preferences.is_none());
        assert!(cfg.shell_files.is_none());
        assert_eq!(cfg.enabled_kinds(), ItemKind::ALL.to_vec());
    }

    #[test]
    fn parses_all_keys() {
        let cfg = Config::parse(
            r#"
alfred_preferences = "~/Sync/Alfred.alfredpreferences"
shell_files = ["~/.zshrc", "/etc/aliases.sh"]
project_dir = "/work/app"
make_program = "gmake"
disabled_sources = ["docker_service", "make_target"]
log_file = "/tmp/ak.log"

[prefixes]
_sh = "alias"
"#,
        )
        .unwrap();

        assert_eq!(
            cfg.alfred_preferences,
            Some(PathBuf::from("~/Sync/Alfred.alfredpreferences"))
        );
        assert_eq!(cfg.shell_files.as_ref().map(Vec::len), Some(2));
        assert_eq!(cfg.make_program.as_deref(), Some("gmake"));
        assert!(!cfg.is_enabled(ItemKind::DockerService));
        assert!(!cfg.is_enabled(ItemKind::MakeTarget));
        assert!(cfg.is_enabled(ItemKind::Alias));
        assert_eq!(cfg.prefixes.get("_sh"), Some(&ItemKind::Alias));
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(Config::parse(r#"disabled_sources = ["git"]"#).is_err());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(Config::parse("colour = true").is_err());
    }

    #[test]
    fn load_from_reports_parse_errors_with_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "shell_files = 3").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn load_with_missing_explicit_file_uses_defaults() {
        let cfg = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap();
        assert!(cfg.disabled_sources.is_empty());
    }

    #[test]
    fn expand_tilde_only_touches_leading_component() {
        let home = Path::new("/home/me");
        assert_eq!(
            expand_tilde(Path::new("~/.zshrc"), home),
            PathBuf::from("/home/me/.zshrc")
        );
        assert_eq!(
            expand_tilde(Path::new("/etc/~x"), home),
            PathBuf::from("/etc/~x")
        );
        assert_eq!(expand_tilde(Path::new("~"), home), PathBuf::from("/home/me"));
    }
}
