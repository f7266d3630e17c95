//! SiteBlock Core Library
//!
//! This crate holds the data model shared by every SiteBlock component: the
//! persisted pattern list, the declarative rule objects handed to the browser,
//! and the message protocol spoken between the extension UI and its
//! background process.
//!
//! # Architecture
//!
//! The user edits an ordered list of URL patterns. Every edit is persisted by
//! the [`PatternStore`] and then translated (by `sb-compiler`) into a block
//! of declarative redirect rules that replaces the previous block wholesale.
//! This crate never talks to a browser; hosts plug in behind traits.
//!
//! # Modules
//!
//! - `types`: Rule objects, resource types and the combined rule update
//! - `table`: Atomic application of rule updates for non-browser hosts
//! - `store`: Pattern Store with an injected persistence backend
//! - `pattern`: Pattern helpers (current-site patterns, coarse URL checks)
//! - `url`: Allocation-free URL slicing
//! - `protocol`: UI to background message types
//! - `error`: Error types

pub mod error;
pub mod pattern;
pub mod protocol;
pub mod store;
pub mod table;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use error::{RuleTableError, StoreError};
pub use pattern::{is_url_blocked, pattern_for_url};
pub use protocol::{Message, Response};
pub use store::{AddOutcome, DefaultList, PatternBackend, PatternStore};
pub use table::RuleTable;
pub use types::{ResourceType, Rule, RuleAction, RuleCondition, RuleUpdate};
