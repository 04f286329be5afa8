//! Remembers the logged-in username between runs.
//!
//! The name is kept in a single file, `~/.focus-dashboard/username`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Directory under the home directory holding dashboard state.
pub const STATE_DIR: &str = ".focus-dashboard";

const USERNAME_FILE: &str = "username";

/// File-backed username store.
#[derive(Debug, Clone)]
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    /// Store in the user's home directory.
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().context("Could not determine the home directory")?;
        Ok(Self::in_dir(home.join(STATE_DIR)))
    }

    /// Store inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(USERNAME_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the remembered username, if any.
    ///
    /// A missing or blank file counts as nobody logged in.
    pub fn load(&self) -> Result<Option<String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {:?}", self.path));
            }
        };

        let name = raw.trim();
        Ok((!name.is_empty()).then(|| name.to_string()))
    }

    pub fn save(&self, username: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        fs::write(&self.path, username.trim())
            .with_context(|| format!("Failed to write {:?}", self.path))?;
        Ok(())
    }
}
