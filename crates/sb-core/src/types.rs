//! Core type definitions for SiteBlock
//!
//! These types serialize to the exact object shapes consumed by the
//! browser's declarative network request API (`updateDynamicRules`).

use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::RuleTableError;

// =============================================================================
// Resource Types
// =============================================================================

bitflags::bitflags! {
    /// Resource type mask for a rule condition.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ResourceType: u16 {
        const MAIN_FRAME = 1 << 0;
        const SUB_FRAME = 1 << 1;
        const STYLESHEET = 1 << 2;
        const SCRIPT = 1 << 3;
        const IMAGE = 1 << 4;
        const FONT = 1 << 5;
        const OBJECT = 1 << 6;
        const XMLHTTPREQUEST = 1 << 7;
        const PING = 1 << 8;
        const CSP_REPORT = 1 << 9;
        const MEDIA = 1 << 10;
        const WEBSOCKET = 1 << 11;
        const WEBTRANSPORT = 1 << 12;
        const WEBBUNDLE = 1 << 13;
        const OTHER = 1 << 14;
    }
}

/// Browser names, in the order they are serialized.
const RESOURCE_TYPE_NAMES: &[(ResourceType, &str)] = &[
    (ResourceType::MAIN_FRAME, "main_frame"),
    (ResourceType::SUB_FRAME, "sub_frame"),
    (ResourceType::STYLESHEET, "stylesheet"),
    (ResourceType::SCRIPT, "script"),
    (ResourceType::IMAGE, "image"),
    (ResourceType::FONT, "font"),
    (ResourceType::OBJECT, "object"),
    (ResourceType::XMLHTTPREQUEST, "xmlhttprequest"),
    (ResourceType::PING, "ping"),
    (ResourceType::CSP_REPORT, "csp_report"),
    (ResourceType::MEDIA, "media"),
    (ResourceType::WEBSOCKET, "websocket"),
    (ResourceType::WEBTRANSPORT, "webtransport"),
    (ResourceType::WEBBUNDLE, "webbundle"),
    (ResourceType::OTHER, "other"),
];

impl ResourceType {
    /// Parse a single browser resource type name.
    pub fn from_browser_name(name: &str) -> Option<Self> {
        RESOURCE_TYPE_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(flag, _)| *flag)
    }

    /// Browser names of every type in the mask.
    pub fn browser_names(&self) -> Vec<&'static str> {
        RESOURCE_TYPE_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl Serialize for ResourceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names = self.browser_names();
        let mut seq = serializer.serialize_seq(Some(names.len()))?;
        for name in names {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for ResourceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        let mut mask = ResourceType::empty();
        for name in &names {
            let flag = ResourceType::from_browser_name(name)
                .ok_or_else(|| de::Error::custom(format!("unknown resource type '{}'", name)))?;
            mask |= flag;
        }
        Ok(mask)
    }
}

// =============================================================================
// Rules
// =============================================================================

/// Redirect target inside the extension package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redirect {
    pub extension_path: String,
}

/// Action to take for a matched rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RuleAction {
    /// Redirect the navigation to a page bundled with the extension
    Redirect { redirect: Redirect },
}

impl RuleAction {
    pub fn redirect_to(extension_path: impl Into<String>) -> Self {
        Self::Redirect {
            redirect: Redirect { extension_path: extension_path.into() },
        }
    }
}

/// Match condition of a rule. Exactly one of `url_filter` and
/// `regex_filter` is set on a valid rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_filter: Option<String>,
    #[serde(default, skip_serializing_if = "ResourceType::is_empty")]
    pub resource_types: ResourceType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_initiator_domains: Vec<String>,
}

/// A declarative network rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub id: u32,
    pub priority: u32,
    pub action: RuleAction,
    pub condition: RuleCondition,
}

impl Rule {
    /// Check the constraints the browser enforces when a rule is installed.
    pub fn validate(&self) -> Result<(), RuleTableError> {
        let invalid = |reason: &str| RuleTableError::InvalidRule {
            id: self.id,
            reason: reason.to_string(),
        };

        if self.id == 0 {
            return Err(invalid("id must be at least 1"));
        }
        if self.priority == 0 {
            return Err(invalid("priority must be at least 1"));
        }

        let RuleAction::Redirect { redirect } = &self.action;
        if !redirect.extension_path.starts_with('/') {
            return Err(invalid("extensionPath must start with '/'"));
        }

        match (&self.condition.url_filter, &self.condition.regex_filter) {
            (Some(_), Some(_)) => Err(invalid("urlFilter and regexFilter are mutually exclusive")),
            (None, None) => Err(invalid("condition needs a urlFilter or a regexFilter")),
            (Some(filter), None) => {
                if filter.is_empty() {
                    Err(invalid("urlFilter must not be empty"))
                } else if !filter.is_ascii() {
                    Err(invalid("urlFilter must only contain ASCII characters"))
                } else {
                    Ok(())
                }
            }
            (None, Some(regex)) => {
                if regex.is_empty() {
                    Err(invalid("regexFilter must not be empty"))
                } else {
                    Ok(())
                }
            }
        }
    }
}

// =============================================================================
// Rule Updates
// =============================================================================

/// Contiguous block of rule IDs owned by this extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleIdRange {
    pub base: u32,
    pub capacity: u32,
}

impl RuleIdRange {
    pub const fn new(base: u32, capacity: u32) -> Self {
        Self { base, capacity }
    }

    /// Every ID in the range, ascending. Stops at `u32::MAX`.
    pub fn ids(&self) -> impl Iterator<Item = u32> {
        let base = self.base;
        (0..self.capacity).map_while(move |offset| base.checked_add(offset))
    }
}

/// Combined remove + add request, applied by the host as one operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleUpdate {
    #[serde(default)]
    pub remove_rule_ids: Vec<u32>,
    #[serde(default)]
    pub add_rules: Vec<Rule>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn url_rule(id: u32, filter: &str) -> Rule {
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
    fn serializes_browser_rule_shape() {
        let mut rule = url_rule(1000, "*.instagram.com");
        rule.condition.excluded_initiator_domains = vec!["abcdef".to_string()];

        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 1000,
                "priority": 1,
                "action": {
                    "type": "redirect",
                    "redirect": { "extensionPath": "/blocked.html" }
                },
                "condition": {
                    "urlFilter": "*.instagram.com",
                    "resourceTypes": ["main_frame"],
                    "excludedInitiatorDomains": ["abcdef"]
                }
            })
        );
    }

    #[test]
    fn parses_rule_from_browser_json() {
        let rule: Rule = serde_json::from_value(json!({
            "id": 7,
            "priority": 2,
            "action": { "type": "redirect", "redirect": { "extensionPath": "/x.html" } },
            "condition": { "regexFilter": "^https://a\\.com/", "resourceTypes": ["sub_frame", "main_frame"] }
        }))
        .unwrap();

        assert_eq!(rule.id, 7);
        assert_eq!(rule.condition.resource_types, ResourceType::MAIN_FRAME | ResourceType::SUB_FRAME);
        assert_eq!(rule.condition.regex_filter.as_deref(), Some("^https://a\\.com/"));
        assert!(rule.condition.url_filter.is_none());
    }

    #[test]
    fn rejects_unknown_resource_type() {
        let result: Result<ResourceType, _> = serde_json::from_value(json!(["main_frame", "bogus"]));
        assert!(result.is_err());
    }

    #[test]
    fn validates_conditions() {
        assert!(url_rule(1, "example.com").validate().is_ok());
        assert!(url_rule(0, "example.com").validate().is_err());
        assert!(url_rule(1, "").validate().is_err());
        assert!(url_rule(1, "bücher.de").validate().is_err());

        let mut both = url_rule(1, "example.com");
        both.condition.regex_filter = Some(".*".to_string());
        assert!(both.validate().is_err());

        let mut neither = url_rule(1, "example.com");
        neither.condition.url_filter = None;
        assert!(neither.validate().is_err());
    }

    #[test]
    fn id_range_bounds() {
        let range = RuleIdRange::new(1000, 1000);
        assert_eq!(range.ids().count(), 1000);
        assert_eq!(range.ids().next(), Some(1000));
        assert_eq!(range.ids().last(), Some(1999));

        let top = RuleIdRange::new(u32::MAX - 1, 5);
        assert_eq!(top.ids().collect::<Vec<_>>(), vec![u32::MAX - 1, u32::MAX]);
    }
}
