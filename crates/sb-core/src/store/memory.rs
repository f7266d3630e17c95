use super::PatternBackend;
use crate::error::StoreError;

/// In-memory backend for tests and ephemeral sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    stored: Option<Vec<String>>,
    saves: usize,
    fail_saves: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patterns(patterns: Vec<String>) -> Self {
        Self { stored: Some(patterns), ..Self::default() }
    }

    /// Make every subsequent save fail.
    pub fn with_failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    pub fn stored(&self) -> Option<&[String]> {
        self.stored.as_deref()
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl PatternBackend for MemoryBackend {
    fn load(&self) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.stored.clone())
    }

    fn save(&mut self, patterns: &[String]) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Backend("memory backend is read-only".to_string()));
        }
        self.stored = Some(patterns.to_vec());
        self.saves += 1;
        Ok(())
    }
}
