use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::auth::Session;

/// File-based store for the auth session, the only state carried between
/// invocations. Everything else is re-fetched on each page load.
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).context("Failed to create session directory")?;
        Ok(Self { dir })
    }

    /// Store rooted at `PORTAL_SESSION_DIR`, or `.portal` by default.
    pub fn open_default() -> Result<Self> {
        let dir = std::env::var("PORTAL_SESSION_DIR").unwrap_or_else(|_| ".portal".to_string());
        Self::new(dir)
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        let path = self.session_path();
        let json = serde_json::to_string_pretty(session).context("Failed to serialize session")?;
        fs::write(&path, json).context("Failed to write session file")?;
        info!("Saved session to {}", path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<Option<Session>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).context("Failed to read session file")?;
        let session = serde_json::from_str(&json).context("Failed to deserialize session")?;
        Ok(Some(session))
    }

    pub fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            fs::remove_file(&path).context("Failed to remove session file")?;
            info!("Cleared stored session");
        }
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join("session.json")
    }
}
