use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use super::memory::{LedgerState, MemoryStore};
use crate::errors::Result;

const TMP_SUFFIX: &str = "tmp";
const BACKUP_SUFFIX: &str = "bak";

/// Filesystem-backed JSON snapshots of a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        suffixed(&self.path, BACKUP_SUFFIX)
    }

    /// Writes the store's state, keeping the previous snapshot as `.bak`.
    pub fn save(&self, store: &MemoryStore) -> Result<()> {
        let state = store.snapshot()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        if self.path.exists() {
            fs::copy(&self.path, self.backup_path())?;
        }
        let tmp = suffixed(&self.path, TMP_SUFFIX);
        write_atomic(&tmp, &serde_json::to_string_pretty(&state)?)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "ledger snapshot saved");
        Ok(())
    }

    /// Loads the snapshot, or an empty state when no file exists yet.
    pub fn load(&self) -> Result<MemoryStore> {
        Ok(MemoryStore::from_state(self.load_state()?))
    }

    pub fn load_state(&self) -> Result<LedgerState> {
        if !self.path.exists() {
            return Ok(LedgerState::default());
        }
        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let mut out = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{suffix}"),
        None => suffix.to_string(),
    };
    out.set_extension(ext);
    out
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}
