use sb_core::error::StoreError;
use sb_core::store::PatternBackend;
use web_sys::Storage;

use crate::host::js_error_message;

/// Key the pattern list is stored under.
pub const STORAGE_KEY: &str = "blockedSites";

/// Pattern list persisted as a JSON array in `window.localStorage`.
pub struct LocalStorageBackend {
    key: String,
}

impl LocalStorageBackend {
    pub fn new() -> Self {
        Self { key: STORAGE_KEY.to_string() }
    }
}

impl Default for LocalStorageBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn local_storage() -> Result<Storage, StoreError> {
    let window = web_sys::window().ok_or_else(|| StoreError::Backend("no window".to_string()))?;
    window
        .local_storage()
        .map_err(|e| StoreError::Backend(js_error_message(e)))?
        .ok_or_else(|| StoreError::Backend("localStorage unavailable".to_string()))
}

impl PatternBackend for LocalStorageBackend {
    fn load(&self) -> Result<Option<Vec<String>>, StoreError> {
        let stored = local_storage()?
            .get_item(&self.key)
            .map_err(|e| StoreError::Backend(js_error_message(e)))?;
        match stored {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, patterns: &[String]) -> Result<(), StoreError> {
        let json = serde_json::to_string(patterns)?;
        local_storage()?
            .set_item(&self.key, &json)
            .map_err(|e| StoreError::Backend(js_error_message(e)))
    }
}
