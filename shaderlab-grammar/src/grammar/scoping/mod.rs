//! Document-level scope segmentation
//!
//! A [`ScopeDeclare`] tree describes regions bounded by begin/end regular
//! expressions (comment blocks, brace blocks, string spans). [`match_scope`]
//! partitions a document range into a tree of concrete [`Scope`]s.
//!
//! This family is distinct from the token-level [`GrammarScope`] regions
//! compiled into the pattern automaton: scope declarations are regex-anchored
//! document regions with their own backtracking rules, and the two are never
//! unified.
//!
//! [`GrammarScope`]: crate::grammar::pattern::GrammarScope

mod declare;
mod matcher;

pub use declare::{ScopeDeclare, ScopeDeclareSet, ScopeId};
pub use matcher::{match_in_range, match_scope, Scope};
