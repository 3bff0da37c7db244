//! Token-level grammars
//!
//! Declarative [`GrammarPattern`]s (whitespace-separated templates with
//! `<placeholder>`, `[optional]`, `(group)`, `{scope}` tokens) compile into
//! an immutable [`CompiledPattern`] arena. Matching is driven one character
//! at a time through a per-attempt [`MatchCursor`], which owns all progress
//! state so compiled patterns can be cached and shared freely.

mod automaton;
mod compile;
mod cursor;
mod declare;

pub use automaton::{CompiledPattern, NodeId, PatternKind, PatternNode};
pub use compile::{compile_grammar, Grammar};
pub use cursor::{match_at, MatchCursor, TokenMatch};
pub use declare::{BracketPair, GrammarDeclare, GrammarPattern, GrammarScope};
