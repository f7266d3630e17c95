//! Error types for the pattern store and rule tables.

/// Error type for Pattern Store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Index {index} out of range for list of {len} patterns")]
    InvalidIndex { index: usize, len: usize },
    #[error("Storage backend failed: {0}")]
    Backend(String),
    #[error("Malformed pattern list: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Error type for rejected rule updates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleTableError {
    #[error("Rule with id {0} does not have a unique ID")]
    IdCollision(u32),
    #[error("Rule with id {id} is invalid: {reason}")]
    InvalidRule { id: u32, reason: String },
}
