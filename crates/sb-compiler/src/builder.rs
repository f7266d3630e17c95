use sb_core::types::{ResourceType, Rule, RuleAction, RuleCondition, RuleIdRange, RuleUpdate};

use crate::error::SyncError;
use crate::special::{filter_for, MatchFilter};

pub const DEFAULT_ID_BASE: u32 = 1000;
pub const DEFAULT_CAPACITY: u32 = 1000;
pub const DEFAULT_PRIORITY: u32 = 1;
pub const DEFAULT_REDIRECT_PATH: &str = "/blocked.html";

/// Everything that shapes the generated rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// First ID of the reserved range
    pub id_base: u32,
    /// Number of IDs in the reserved range
    pub capacity: u32,
    pub priority: u32,
    /// Blocked page, relative to the extension root
    pub redirect_path: String,
    pub resource_types: ResourceType,
    /// The extension's own ID, excluded from initiator matching
    pub extension_id: String,
}

impl SyncConfig {
    pub fn new(extension_id: impl Into<String>) -> Self {
        Self {
            id_base: DEFAULT_ID_BASE,
            capacity: DEFAULT_CAPACITY,
            priority: DEFAULT_PRIORITY,
            redirect_path: DEFAULT_REDIRECT_PATH.to_string(),
            resource_types: ResourceType::MAIN_FRAME,
            extension_id: extension_id.into(),
        }
    }

    pub fn with_id_range(mut self, id_base: u32, capacity: u32) -> Self {
        self.id_base = id_base;
        self.capacity = capacity;
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_redirect_path(mut self, path: impl Into<String>) -> Self {
        self.redirect_path = path.into();
        self
    }

    pub fn with_resource_types(mut self, resource_types: ResourceType) -> Self {
        self.resource_types = resource_types;
        self
    }

    /// The reserved range, checked for host constraints.
    pub fn id_range(&self) -> Result<RuleIdRange, SyncError> {
        if self.id_base == 0 {
            return Err(SyncError::InvalidConfig("rule ids start at 1".to_string()));
        }
        // The last ID is base + capacity - 1, which may be u32::MAX itself.
        if self.capacity > 0 && self.id_base.checked_add(self.capacity - 1).is_none() {
            return Err(SyncError::InvalidConfig(format!(
                "range {}+{} overflows the rule id space",
                self.id_base, self.capacity
            )));
        }
        if self.extension_id.is_empty() {
            return Err(SyncError::InvalidConfig("extension id must not be empty".to_string()));
        }
        Ok(RuleIdRange::new(self.id_base, self.capacity))
    }
}

/// Build one rule per pattern, IDs assigned in list order from the range base.
pub fn build_rules<S: AsRef<str>>(patterns: &[S], config: &SyncConfig) -> Result<Vec<Rule>, SyncError> {
    let range = config.id_range()?;
    if patterns.len() > range.capacity as usize {
        return Err(SyncError::CapacityExceeded {
            count: patterns.len(),
            capacity: range.capacity,
        });
    }

    let rules = patterns
        .iter()
        .zip(range.ids())
        .map(|(pattern, id)| build_rule(id, pattern.as_ref(), config))
        .collect();

    Ok(rules)
}

fn build_rule(id: u32, pattern: &str, config: &SyncConfig) -> Rule {
    let mut condition = RuleCondition {
        resource_types: config.resource_types,
        excluded_initiator_domains: vec![config.extension_id.clone()],
        ..Default::default()
    };

    match filter_for(pattern) {
        MatchFilter::Url(filter) => condition.url_filter = Some(filter),
        MatchFilter::Regex(regex) => {
            log::debug!("Rule {} for '{}' uses regex {}", id, pattern, regex);
            condition.regex_filter = Some(regex);
        }
    }

    Rule {
        id,
        priority: config.priority,
        action: RuleAction::redirect_to(config.redirect_path.as_str()),
        condition,
    }
}

/// Combined update: clear the whole reserved range, install the new rules.
pub fn build_update<S: AsRef<str>>(patterns: &[S], config: &SyncConfig) -> Result<RuleUpdate, SyncError> {
    let add_rules = build_rules(patterns, config)?;
    let remove_rule_ids = config.id_range()?.ids().collect();
    Ok(RuleUpdate { remove_rule_ids, add_rules })
}
