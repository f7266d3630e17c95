//! Rule table kept in a JSON file, for running the synchronizer outside a
//! browser. The file holds the array of active rule objects.

use std::path::PathBuf;

use sb_compiler::sync::RuleHost;
use sb_core::table::RuleTable;
use sb_core::types::RuleUpdate;
use tokio::fs;

use crate::state::tmp_path;

pub struct FileRuleHost {
    path: PathBuf,
}

impl FileRuleHost {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Current table; a missing file is an empty table.
    pub async fn load_table(&self) -> Result<RuleTable, String> {
        match fs::read_to_string(&self.path).await {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| format!("Invalid rule file '{}': {}", self.path.display(), e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RuleTable::new()),
            Err(e) => Err(format!("Failed to read '{}': {}", self.path.display(), e)),
        }
    }

    async fn store_table(&self, table: &RuleTable) -> Result<(), String> {
        let json = serde_json::to_string_pretty(table).map_err(|e| e.to_string())?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
            }
        }
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, json)
            .await
            .map_err(|e| format!("Failed to write '{}': {}", tmp.display(), e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| format!("Failed to write '{}': {}", self.path.display(), e))
    }
}

impl RuleHost for FileRuleHost {
    async fn update_dynamic_rules(&mut self, update: &RuleUpdate) -> Result<(), String> {
        let mut table = self.load_table().await?;
        table.apply(update).map_err(|e| e.to_string())?;
        self.store_table(&table).await?;
        log::debug!("Wrote {} rule(s) to {}", table.len(), self.path.display());
        Ok(())
    }
}
