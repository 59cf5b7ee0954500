//! Configuration management for StackIt.
//!
//! Loads configuration from ${`STACKIT_HOME`}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the configured backend origin.
pub const BASE_URL_ENV: &str = "STACKIT_BASE_URL";

/// Environment variable that overrides the configured log filter.
pub const LOG_ENV: &str = "STACKIT_LOG";

/// Returns the default config template with comments.
///
/// This is embedded from `default_config.toml` at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// New comments/sections from the template are always present,
/// while the user's customized values win.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;

    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for StackIt configuration and data files.
    //!
    //! `STACKIT_HOME` resolution order:
    //! 1. `STACKIT_HOME` environment variable (if set)
    //! 2. ~/.config/stackit (default)

    use std::path::PathBuf;

    /// Returns the StackIt home directory.
    ///
    /// Checks `STACKIT_HOME` first, falls back to ~/.config/stackit.
    /// Without a resolvable home directory the current directory is used.
    pub fn stackit_home() -> PathBuf {
        if let Ok(home) = std::env::var("STACKIT_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".stackit"),
            |h| h.join(".config").join("stackit"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        stackit_home().join("config.toml")
    }

    /// Returns the path to the persisted credentials file.
    pub fn credentials_path() -> PathBuf {
        stackit_home().join("credentials.json")
    }

    /// Returns the directory for rolling log files.
    pub fn logs_dir() -> PathBuf {
        stackit_home().join("logs")
    }
}

/// Backend API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend origin, e.g. `http://localhost:5000`.
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Config::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `STACKIT_LOG` is unset.
    pub level: String,
    /// Log to a daily rolling file under the logs dir instead of stderr.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Config::DEFAULT_LOG_LEVEL.to_string(),
            file: false,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend API settings.
    pub api: ApiConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

impl Config {
    pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
    const DEFAULT_LOG_LEVEL: &str = "warn";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the backend origin to use for this run.
    ///
    /// Resolution order: explicit override (CLI flag), `STACKIT_BASE_URL`,
    /// config file, built-in default.
    ///
    /// # Errors
    /// Returns an error if the winning value is not a valid URL.
    pub fn effective_base_url(&self, override_url: Option<&str>) -> Result<String> {
        let env_url = std::env::var(BASE_URL_ENV).ok();
        resolve_base_url(override_url, env_url.as_deref(), Some(&self.api.base_url))
    }

    /// Returns the log filter directive, preferring `STACKIT_LOG`.
    pub fn effective_log_filter(&self) -> String {
        let env_filter = std::env::var(LOG_ENV).ok();
        resolve_log_filter(env_filter.as_deref(), &self.logging.level)
    }

    /// Saves only the `api.base_url` field to the config file.
    ///
    /// # Errors
    /// Returns an error if the config cannot be read, parsed or written.
    pub fn save_base_url(base_url: &str) -> Result<()> {
        Self::save_base_url_to(&paths::config_path(), base_url)
    }

    /// Saves only the `api.base_url` field to a specific config file path.
    ///
    /// Creates the file with the default template if it doesn't exist.
    /// If the file exists, user values are merged into the latest template.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the file cannot be written.
    pub fn save_base_url_to(path: &Path, base_url: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let base_url = base_url.trim();
        validate_url(base_url)?;

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["api"]["base_url"] = value(base_url);

        Self::write_config(path, &doc.to_string())
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Writes to a temp file first, then renames over the target.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

/// Resolves a base URL with precedence: override > env > config > default.
///
/// Blank values are skipped. Trailing slashes are trimmed so paths can be
/// appended directly.
///
/// # Errors
/// Returns an error if the selected value is not a valid URL.
pub fn resolve_base_url(
    override_url: Option<&str>,
    env_url: Option<&str>,
    config_url: Option<&str>,
) -> Result<String> {
    let chosen = [override_url, env_url, config_url]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(Config::DEFAULT_BASE_URL);

    validate_url(chosen)?;
    Ok(chosen.trim_end_matches('/').to_string())
}

fn resolve_log_filter(env_filter: Option<&str>, configured: &str) -> String {
    env_filter
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| Some(configured.trim()).filter(|s| !s.is_empty()))
        .unwrap_or(Config::DEFAULT_LOG_LEVEL)
        .to_string()
}

fn validate_url(url: &str) -> Result<()> {
    let parsed =
        url::Url::parse(url).with_context(|| format!("Invalid StackIt base URL: {url}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("Invalid StackIt base URL: {url} (expected http or https)");
    }
    Ok(())
}
