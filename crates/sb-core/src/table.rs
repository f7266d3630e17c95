//! In-process rule table
//!
//! Hosts other than the browser (tests, the CLI's rule file) keep their active
//! rules in a [`RuleTable`]. Updates are applied the way the browser applies
//! `updateDynamicRules`: removals, then additions, all or nothing.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::RuleTableError;
use crate::types::{Rule, RuleUpdate};

/// Ordered set of active rules, unique by ID.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// Apply a combined update. On error the table is left untouched.
    pub fn apply(&mut self, update: &RuleUpdate) -> Result<(), RuleTableError> {
        let remove: HashSet<u32> = update.remove_rule_ids.iter().copied().collect();
        let mut next: Vec<Rule> = self
            .rules
            .iter()
            .filter(|rule| !remove.contains(&rule.id))
            .cloned()
            .collect();

        let mut ids: HashSet<u32> = next.iter().map(|rule| rule.id).collect();
        for rule in &update.add_rules {
            rule.validate()?;
            if !ids.insert(rule.id) {
                return Err(RuleTableError::IdCollision(rule.id));
            }
            next.push(rule.clone());
        }

        self.rules = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResourceType, RuleAction, RuleCondition};

    fn rule(id: u32, filter: &str) -> Rule {
        Rule {
            id,
            priority: 1,
            action: RuleAction::redirect_to("/blocked.html"),
            condition: RuleCondition {
                url_filter: Some(filter.to_string()),
                resource_types: ResourceType::MAIN_FRAME,
                ..Default::default()
            },
        }
    }

    #[test]
    fn removes_before_adding() {
        let mut table = RuleTable::new();
        table
            .apply(&RuleUpdate { remove_rule_ids: vec![], add_rules: vec![rule(1, "a.com")] })
            .unwrap();

        // Re-using a removed id in the same update is fine.
        table
            .apply(&RuleUpdate { remove_rule_ids: vec![1], add_rules: vec![rule(1, "b.com")] })
            .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(1).unwrap().condition.url_filter.as_deref(), Some("b.com"));
    }

    #[test]
    fn collision_leaves_table_untouched() {
        let mut table = RuleTable::new();
        table
            .apply(&RuleUpdate { remove_rule_ids: vec![], add_rules: vec![rule(5, "keep.com")] })
            .unwrap();
        let before = table.clone();

        let err = table
            .apply(&RuleUpdate {
                remove_rule_ids: vec![],
                add_rules: vec![rule(6, "new.com"), rule(5, "clash.com")],
            })
            .unwrap_err();

        assert_eq!(err, RuleTableError::IdCollision(5));
        assert_eq!(table, before);
    }

    #[test]
    fn invalid_rule_rejects_whole_update() {
        let mut table = RuleTable::new();
        table
            .apply(&RuleUpdate { remove_rule_ids: vec![], add_rules: vec![rule(1, "a.com")] })
            .unwrap();

        let result = table.apply(&RuleUpdate {
            remove_rule_ids: vec![1],
            add_rules: vec![rule(2, "")],
        });

        assert!(matches!(result, Err(RuleTableError::InvalidRule { id: 2, .. })));
        assert!(table.get(1).is_some());
    }

    #[test]
    fn leaves_foreign_ids_alone() {
        let mut table = RuleTable::new();
        table
            .apply(&RuleUpdate { remove_rule_ids: vec![], add_rules: vec![rule(1, "other.com"), rule(1000, "a.com")] })
            .unwrap();

        table
            .apply(&RuleUpdate { remove_rule_ids: (1000..2000).collect(), add_rules: vec![] })
            .unwrap();

        assert_eq!(table.len(), 1);
        assert!(table.get(1).is_some());
    }
}
