//! Compiled rules, grouped by topic.
//!
//! ```text
//! RulesDb
//!   ├─ scripts       (kept for setup_user on new users)
//!   └─ topics
//!        "all"   ── Topic { rules, sorted cache, substitutions }
//!        "dance" ── Topic { ... }
//! ```
//!
//! - `rule.rs`: [`Rule`], its ordering and `matches`.
//! - `topic.rs`: [`Topic`], duplicate detection and the sorted-rule cache.
//! - `db.rs`: [`RulesDb::load`], which runs the scripts and compiles their rules.
//! - `matched.rs`: [`Match`], the captures handed to a rule's handler.

#[path = "rules/db.rs"]
mod db;
#[path = "rules/matched.rs"]
mod matched;
#[path = "rules/rule.rs"]
mod rule;
#[path = "rules/topic.rs"]
mod topic;

pub use db::RulesDb;
pub use matched::Match;
pub use rule::Rule;
pub use topic::Topic;
