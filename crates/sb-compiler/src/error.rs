/// Error type for rule synchronization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("{count} patterns exceed the reserved rule capacity of {capacity}")]
    CapacityExceeded { count: usize, capacity: u32 },
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),
    #[error("{0}")]
    Host(String),
}
