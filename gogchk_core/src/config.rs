/*============================================================
  Synavera Project: Gog-Chk
  Module: gogchk_core::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Load Gog-Chk-Core configuration from TOML, falling back to
    built-in defaults for every unset key.

  Security / Safety Notes:
    Reads a single user-owned file; no secrets are expected or
    stored.

  Dependencies:
    serde + toml for parsing, dirs for platform directories.

  Operational Scope:
    Resolved once at startup; CLI flags override loaded values.

  Revision History:
    2025-11-12 COD  Added catalog, scan, report, and log sections.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit defaults for every tunable
    - Missing explicit paths fail loudly
============================================================*/

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{GogchkError, Result};

const APP_DIR: &str = "gog-chk";
const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_CATALOG_URL: &str = "https://www.gogdb.org/data/products/{id}/product.json";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GogchkConfig {
    pub scan: ScanConfig,
    pub catalog: CatalogConfig,
    pub report: ReportConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Collection root; may be supplied on the command line instead.
    pub root: Option<PathBuf>,
    pub keep_going: bool,
}

/// Remote catalog settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Product URL; `{id}` is replaced with the catalog id.
    pub url_template: String,
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Attempts per product, 1 meaning no retry.
    pub max_retries: usize,
    pub max_parallel_requests: usize,
    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_CATALOG_URL.to_string(),
            timeout: 30,
            max_retries: 1,
            max_parallel_requests: 4,
            user_agent: format!("Gog-Chk-Core/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub dir: Option<PathBuf>,
}

impl GogchkConfig {
    /// Load from an explicit path, or from the default location when absent.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(explicit) => {
                if !explicit.is_file() {
                    return Err(GogchkError::Config(format!(
                        "Config file {} does not exist",
                        explicit.display()
                    )));
                }
                Self::load_file(explicit)
            }
            None => match default_config_path() {
                Some(default) if default.is_file() => Self::load_file(&default),
                _ => Ok(Self::default()),
            },
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            GogchkError::Config(format!("Failed to read {}: {err}", path.display()))
        })?;
        Self::from_toml(&raw)
            .map_err(|err| GogchkError::Config(format!("{}: {err}", path.display())))
    }

    fn from_toml(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn report_path(&self) -> PathBuf {
        self.report
            .path
            .clone()
            .unwrap_or_else(|| data_dir().join("report.json"))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log.dir.clone().unwrap_or_else(|| data_dir().join("logs"))
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = GogchkConfig::from_toml("").unwrap();
        assert_eq!(config.catalog.url_template, DEFAULT_CATALOG_URL);
        assert_eq!(config.catalog.max_retries, 1);
        assert_eq!(config.catalog.max_parallel_requests, 4);
        assert!(config.scan.root.is_none());
        assert!(!config.scan.keep_going);
    }

    #[test]
    fn sections_override_defaults() {
        let config = GogchkConfig::from_toml(
            r#"
            [scan]
            root = "/srv/gog"
            keep_going = true

            [catalog]
            timeout = 5
            max_parallel_requests = 8

            [report]
            path = "/tmp/gog-report.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.scan.root, Some(PathBuf::from("/srv/gog")));
        assert!(config.scan.keep_going);
        assert_eq!(config.catalog.timeout, 5);
        assert_eq!(config.catalog.max_parallel_requests, 8);
        assert_eq!(config.catalog.url_template, DEFAULT_CATALOG_URL);
        assert_eq!(config.report_path(), PathBuf::from("/tmp/gog-report.json"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(GogchkConfig::from_toml("[catalog]\nretries = 3\n").is_err());
    }

    #[test]
    fn missing_explicit_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GogchkConfig::load_from_optional_path(Some(&dir.path().join("nope.toml")))
            .unwrap_err();
        assert!(matches!(err, GogchkError::Config(_)));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[log]\ndir = \"/var/log/gog-chk\"\n").unwrap();
        let config = GogchkConfig::load_from_optional_path(Some(&path)).unwrap();
        assert_eq!(config.log_dir(), PathBuf::from("/var/log/gog-chk"));
    }
}
