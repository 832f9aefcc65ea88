//! Local libSQL database location.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the database file. Empty means the platform data directory
    /// (`~/.local/share/stride/stride.db` on Linux). `:memory:` is accepted.
    #[serde(default)]
    pub path: String,
}

impl DatabaseConfig {
    /// Resolve the configured path, falling back to the platform data dir.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        if !self.path.is_empty() {
            return PathBuf::from(&self.path);
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stride")
            .join("stride.db")
    }

    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}
