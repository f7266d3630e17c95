//! Pattern store persistence on disk.
//!
//! The state file mirrors the extension's storage record:
//! `{"blockedSites": [...], "blockedImage": "<base64>"}`. Only the site list
//! is managed here; any stored image is written back untouched.

use std::fs;
use std::path::{Path, PathBuf};

use sb_core::error::StoreError;
use sb_core::store::PatternBackend;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    blocked_sites: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    blocked_image: Option<String>,
}

/// JSON state file backend.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_record(&self) -> Result<Option<StateRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::Backend(format!("Failed to read '{}': {}", self.path.display(), e)))?;
        Ok(Some(serde_json::from_str(&text)?))
    }
}

impl PatternBackend for FileBackend {
    fn load(&self) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.read_record()?.and_then(|record| record.blocked_sites))
    }

    fn save(&mut self, patterns: &[String]) -> Result<(), StoreError> {
        let mut record = self.read_record()?.unwrap_or_default();
        record.blocked_sites = Some(patterns.to_vec());
        let json = serde_json::to_string_pretty(&record)?;
        write_atomic(&self.path, json.as_bytes())
            .map_err(|e| StoreError::Backend(format!("Failed to write '{}': {}", self.path.display(), e)))
    }
}

/// Write through a sibling temp file so readers never see a partial file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
