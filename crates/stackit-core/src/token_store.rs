//! Bearer token storage.
//!
//! The file-backed store keeps the token in `<base>/credentials.json` with
//! restricted permissions (0600). Tokens are never logged or displayed in full.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::paths;

/// Fixed key the bearer token is stored under.
pub const TOKEN_KEY: &str = "token";

/// Persistent storage for a single bearer token.
///
/// `set` overwrites whole values, so concurrent readers see either the old
/// token or the new one, never a mix.
pub trait TokenStore: Send + Sync {
    /// Returns the currently held token, if any.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be read.
    fn get(&self) -> Result<Option<String>>;

    /// Persists `token`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, token: &str) -> Result<()>;

    /// Removes the token. Clearing an empty store is not an error.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn clear(&self) -> Result<()>;
}

/// On-disk layout of the credentials file: key -> value.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct CredentialsFile {
    #[serde(flatten)]
    entries: HashMap<String, String>,
}

impl CredentialsFile {
    fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse credentials from {}", path.display()))
    }

    /// Like `load`, but a file that does not parse is treated as empty so
    /// writers can overwrite it. The flag is true when the file was discarded.
    fn load_for_update(path: &Path) -> Result<(Self, bool)> {
        if !path.exists() {
            return Ok((Self::default(), false));
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

        if contents.trim().is_empty() {
            return Ok((Self::default(), false));
        }

        match serde_json::from_str(&contents) {
            Ok(file) => Ok((file, false)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "discarding unreadable credentials file");
                Ok((Self::default(), true))
            }
        }
    }

    fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(self).context("Failed to serialize credentials")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(path, contents)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        Ok(())
    }
}

/// Token store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store at the default location, `<base>/credentials.json`.
    pub fn new() -> Self {
        Self::at(paths::credentials_path())
    }

    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<String>> {
        let file = CredentialsFile::load(&self.path)?;
        Ok(file.entries.get(TOKEN_KEY).cloned())
    }

    fn set(&self, token: &str) -> Result<()> {
        let (mut file, _) = CredentialsFile::load_for_update(&self.path)?;
        file.entries.insert(TOKEN_KEY.to_string(), token.to_string());
        file.save(&self.path)
    }

    fn clear(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let (mut file, discarded) = CredentialsFile::load_for_update(&self.path)?;
        if file.entries.remove(TOKEN_KEY).is_some() || discarded {
            file.save(&self.path)?;
        }
        Ok(())
    }
}

/// Process-local token store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that starts out holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<String>> {
        let guard = self
            .token
            .lock()
            .map_err(|_poisoned| anyhow!("token store lock poisoned"))?;
        Ok(guard.clone())
    }

    fn set(&self, token: &str) -> Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_poisoned| anyhow!("token store lock poisoned"))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_poisoned| anyhow!("token store lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.chars().count() <= 16 {
        return "***".to_string();
    }
    let prefix: String = token.chars().take(12).collect();
    format!("{prefix}...")
}
