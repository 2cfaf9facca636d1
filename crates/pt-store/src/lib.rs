//! JSON file persistence for playtime records.
//!
//! State is a single JSON object keyed by user ID, read once at startup and
//! rewritten in full on every change. There are no partial writes and no
//! transactions; the in-memory record map is the source of truth between
//! writes, so a failed write is recoverable by the next successful one.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use pt_core::{UserId, UserRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Full-state JSON file store for the user record map.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted record map.
    ///
    /// A missing file means empty state; a file that exists but does not
    /// parse is an error the caller should treat as fatal at startup.
    pub fn load(&self) -> Result<BTreeMap<UserId, UserRecord>, StoreError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => {
                let records = serde_json::from_slice(&bytes)?;
                Ok(records)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = ?self.path, "no data file yet, starting empty");
                Ok(BTreeMap::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Overwrites the data file with the full record map, pretty-printed.
    ///
    /// Creates the parent directory on first write.
    pub fn save(&self, records: &BTreeMap<UserId, UserRecord>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec_pretty(records)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(path = ?self.path, users = records.len(), "playtime data written");
        Ok(())
    }
}
