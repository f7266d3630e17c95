use serde::Deserialize;

use crate::error::StoreError;

const BUNDLED_DEFAULTS: &str = include_str!("../../assets/blockedSites.json");

/// Default pattern list, used when nothing has been persisted yet.
///
/// On disk this is a `{"blocked": [...]}` document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct DefaultList {
    pub blocked: Vec<String>,
}

impl DefaultList {
    /// The list shipped with the extension.
    pub fn bundled() -> Result<Self, StoreError> {
        Self::from_json(BUNDLED_DEFAULTS)
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { blocked: patterns.into_iter().map(Into::into).collect() }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_list_parses() {
        let defaults = DefaultList::bundled().unwrap();
        assert!(!defaults.blocked.is_empty());
        assert!(defaults.blocked.iter().any(|p| p == "facebook.com"));
    }

    #[test]
    fn rejects_missing_key() {
        assert!(matches!(DefaultList::from_json(r#"{"sites": []}"#), Err(StoreError::Parse(_))));
    }
}
