//! SiteBlock Rule Compiler
//!
//! This crate turns the pattern list into declarative redirect rules and
//! installs them on a rule host, replacing the reserved ID range wholesale.

pub mod builder;
pub mod error;
pub mod parser;
pub mod special;
pub mod sync;

pub use builder::{build_rules, build_update, SyncConfig};
pub use error::SyncError;
pub use parser::parse_pattern_list;
pub use special::{filter_for, MatchFilter, SpecialCase, SPECIAL_CASES};
pub use sync::{MemoryRuleHost, RuleHost, Synchronizer};
