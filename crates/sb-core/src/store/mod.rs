//! Pattern Store
//!
//! The ordered list of blocked-site patterns, mirrored to a persistence
//! backend on every mutation. The backend is injected so the store runs the
//! same against `localStorage` in the extension, a JSON file in the CLI, or
//! memory in tests.
//!
//! Writes are last-write-wins. Two editors (popup and options page) holding
//! their own store over the same backend will overwrite each other; call
//! [`PatternStore::reload`] before editing to pick up the other's changes.

mod defaults;
mod memory;

pub use defaults::DefaultList;
pub use memory::MemoryBackend;

use std::collections::HashSet;

use crate::error::StoreError;
use crate::pattern::normalize_pattern;

/// Persistence backend for the pattern list.
pub trait PatternBackend {
    /// Read the persisted list. `Ok(None)` means nothing has been stored yet.
    fn load(&self) -> Result<Option<Vec<String>>, StoreError>;

    /// Replace the persisted list.
    fn save(&mut self, patterns: &[String]) -> Result<(), StoreError>;
}

/// Result of [`PatternStore::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Pattern appended and persisted
    Added,
    /// Pattern already in the list; nothing changed
    Duplicate,
    /// Blank input; nothing changed
    Empty,
}

impl AddOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, Self::Added)
    }
}

/// Ordered, duplicate-free pattern list backed by a [`PatternBackend`].
pub struct PatternStore<B: PatternBackend> {
    backend: B,
    defaults: Vec<String>,
    patterns: Vec<String>,
    seeded: bool,
}

impl<B: PatternBackend> PatternStore<B> {
    /// Load the persisted list, seeding the backend with `defaults` on first run.
    pub fn load(mut backend: B, defaults: DefaultList) -> Result<Self, StoreError> {
        let defaults = dedupe(defaults.blocked);
        let (patterns, seeded) = read_or_seed(&mut backend, &defaults)?;
        Ok(Self { backend, defaults, patterns, seeded })
    }

    /// Re-read the backend, discarding the in-memory copy.
    pub fn reload(&mut self) -> Result<&[String], StoreError> {
        let (patterns, seeded) = read_or_seed(&mut self.backend, &self.defaults)?;
        self.patterns = patterns;
        self.seeded = seeded;
        Ok(&self.patterns)
    }

    /// Whether the last load found nothing stored and wrote the defaults.
    /// No rules exist for a freshly seeded list until the caller installs them.
    pub fn seeded(&self) -> bool {
        self.seeded
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn position(&self, pattern: &str) -> Option<usize> {
        self.patterns.iter().position(|p| p == pattern)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Append a pattern. Blank input and duplicates are reported no-ops.
    pub fn add(&mut self, raw: &str) -> Result<AddOutcome, StoreError> {
        let Some(pattern) = normalize_pattern(raw) else {
            return Ok(AddOutcome::Empty);
        };
        if self.position(&pattern).is_some() {
            log::debug!("Pattern '{}' already blocked", pattern);
            return Ok(AddOutcome::Duplicate);
        }

        let mut next = self.patterns.clone();
        next.push(pattern);
        self.commit(next)?;
        Ok(AddOutcome::Added)
    }

    /// Remove the pattern at `index`, returning it.
    pub fn remove(&mut self, index: usize) -> Result<String, StoreError> {
        if index >= self.patterns.len() {
            return Err(StoreError::InvalidIndex { index, len: self.patterns.len() });
        }

        let mut next = self.patterns.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        Ok(removed)
    }

    /// Persist `next`, then adopt it. A failed save leaves the list as it was.
    fn commit(&mut self, next: Vec<String>) -> Result<(), StoreError> {
        self.backend.save(&next)?;
        self.patterns = next;
        Ok(())
    }
}

fn read_or_seed<B: PatternBackend>(backend: &mut B, defaults: &[String]) -> Result<(Vec<String>, bool), StoreError> {
    match backend.load()? {
        Some(stored) => {
            let count = stored.len();
            let patterns = dedupe(stored);
            if patterns.len() != count {
                log::warn!("Dropped {} duplicate pattern(s) from stored list", count - patterns.len());
            }
            Ok((patterns, false))
        }
        None => {
            backend.save(defaults)?;
            log::info!("Seeded pattern list with {} default pattern(s)", defaults.len());
            Ok((defaults.to_vec(), true))
        }
    }
}

/// Drop repeated and blank entries, keeping first occurrences in order.
fn dedupe(patterns: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    patterns
        .into_iter()
        .filter_map(|p| normalize_pattern(&p))
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(initial: Option<&[&str]>) -> PatternStore<MemoryBackend> {
        let backend = match initial {
            Some(list) => MemoryBackend::with_patterns(list.iter().map(|s| s.to_string()).collect()),
            None => MemoryBackend::new(),
        };
        PatternStore::load(backend, DefaultList::from_patterns(["*.instagram.com", "facebook.com"])).unwrap()
    }

    #[test]
    fn seeds_defaults_on_first_load() {
        let store = store(None);
        assert_eq!(store.patterns(), ["*.instagram.com", "facebook.com"]);
        assert_eq!(store.backend().stored(), Some(store.patterns()));
        assert_eq!(store.backend().saves(), 1);
        assert!(store.seeded());
    }

    #[test]
    fn keeps_persisted_list_over_defaults() {
        let store = store(Some(&["a.com"]));
        assert_eq!(store.patterns(), ["a.com"]);
        assert_eq!(store.backend().saves(), 0);
        assert!(!store.seeded());

        // A persisted empty list is not "absent".
        let store = self::store(Some(&[]));
        assert!(store.is_empty());
        assert!(!store.seeded());
    }

    #[test]
    fn reload_after_seeding_reads_stored_list() {
        let mut store = store(None);
        assert!(store.seeded());

        store.reload().unwrap();
        assert!(!store.seeded());
        assert_eq!(store.patterns(), ["*.instagram.com", "facebook.com"]);
        assert_eq!(store.backend().saves(), 1);
    }

    #[test]
    fn drops_duplicates_from_persisted_list() {
        let store = store(Some(&["a.com", "b.com", "a.com", " "]));
        assert_eq!(store.patterns(), ["a.com", "b.com"]);
    }

    #[test]
    fn add_appends_and_persists() {
        let mut store = store(Some(&["a.com"]));
        assert_eq!(store.add("b.com").unwrap(), AddOutcome::Added);
        assert_eq!(store.patterns(), ["a.com", "b.com"]);
        assert_eq!(store.backend().stored(), Some(&["a.com".to_string(), "b.com".to_string()][..]));
    }

    #[test]
    fn add_rejects_duplicates_and_blanks() {
        let mut store = store(Some(&["a.com"]));
        assert_eq!(store.add("b.com").unwrap(), AddOutcome::Added);
        let saves = store.backend().saves();

        assert_eq!(store.add("b.com").unwrap(), AddOutcome::Duplicate);
        assert_eq!(store.add("  b.com ").unwrap(), AddOutcome::Duplicate);
        assert_eq!(store.add("").unwrap(), AddOutcome::Empty);
        assert_eq!(store.add("   ").unwrap(), AddOutcome::Empty);

        assert_eq!(store.patterns(), ["a.com", "b.com"]);
        assert_eq!(store.backend().saves(), saves);
    }

    #[test]
    fn remove_out_of_range() {
        let mut store = store(Some(&["a.com", "b.com", "c.com"]));
        let err = store.remove(5).unwrap_err();
        assert!(matches!(err, StoreError::InvalidIndex { index: 5, len: 3 }));
        assert_eq!(store.patterns(), ["a.com", "b.com", "c.com"]);
    }

    #[test]
    fn add_then_remove_round_trips() {
        let mut store = store(Some(&["a.com", "b.com"]));
        let before = store.patterns().to_vec();

        store.add("x.com").unwrap();
        let index = store.position("x.com").unwrap();
        assert_eq!(store.remove(index).unwrap(), "x.com");

        assert_eq!(store.reload().unwrap(), &before[..]);
    }

    #[test]
    fn failed_save_keeps_list() {
        let backend = MemoryBackend::with_patterns(vec!["a.com".to_string()]).with_failing_saves();
        let mut store = PatternStore::load(backend, DefaultList::empty()).unwrap();

        assert!(matches!(store.add("b.com"), Err(StoreError::Backend(_))));
        assert!(store.remove(0).is_err());
        assert_eq!(store.patterns(), ["a.com"]);
    }
}
