//! Rule Synchronizer
//!
//! Keeps the host's rule table in step with the pattern list. Each call
//! sends a single combined update that removes the whole reserved ID range
//! and installs the freshly built rules, so the host never holds a mix of
//! old and new rules.

use sb_core::protocol::{Message, Response};
use sb_core::table::RuleTable;
use sb_core::types::RuleUpdate;

use crate::builder::{build_update, SyncConfig};
use crate::error::SyncError;

/// Something that owns a dynamic rule table.
///
/// `update_dynamic_rules` must complete exactly once and apply the update
/// atomically: on error the previous rules stay in place.
#[allow(async_fn_in_trait)]
pub trait RuleHost {
    async fn update_dynamic_rules(&mut self, update: &RuleUpdate) -> Result<(), String>;
}

/// Translates pattern lists into rule updates and installs them.
///
/// `synchronize` borrows the synchronizer mutably, so calls through one
/// instance never overlap.
pub struct Synchronizer<H> {
    host: H,
    config: SyncConfig,
}

impl<H: RuleHost> Synchronizer<H> {
    pub fn new(host: H, config: SyncConfig) -> Self {
        Self { host, config }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Replace the reserved range with one rule per pattern. Returns the number
    /// of rules installed.
    pub async fn synchronize<S: AsRef<str>>(&mut self, patterns: &[S]) -> Result<usize, SyncError> {
        let update = build_update(patterns, &self.config)?;
        let installed = update.add_rules.len();

        match self.host.update_dynamic_rules(&update).await {
            Ok(()) => {
                log::info!("Dynamic rules updated: {} rule(s) installed", installed);
                Ok(installed)
            }
            Err(message) => {
                log::warn!("Dynamic rule update failed: {}", message);
                Err(SyncError::Host(message))
            }
        }
    }

    /// Answer a UI message. Errors are folded into the response.
    pub async fn handle(&mut self, message: Message) -> Response {
        match message {
            Message::UpdateRules { sites } => self.synchronize(&sites).await.map(|_| ()).into(),
        }
    }
}

/// Rule host backed by an in-process [`RuleTable`].
#[derive(Debug, Default, Clone)]
pub struct MemoryRuleHost {
    table: RuleTable,
    updates: usize,
}

impl MemoryRuleHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: RuleTable) -> Self {
        Self { table, updates: 0 }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Number of updates received, successful or not.
    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl RuleHost for MemoryRuleHost {
    async fn update_dynamic_rules(&mut self, update: &RuleUpdate) -> Result<(), String> {
        self.updates += 1;
        self.table.apply(update).map_err(|e| e.to_string())
    }
}
