//! Main module for the grammar engine

pub mod diagnostics;
pub mod document;
pub mod error;
pub mod loader;
pub mod pattern;
pub mod scoping;

pub use diagnostics::{Diagnostic, DiagnosticSeverity, MatchCapturePattern, UnmatchedDescriptor};
pub use document::{DocumentView, Position, SourceDocument, SourceRange};
pub use error::GrammarError;
pub use loader::GrammarLoader;
pub use pattern::{
    BracketPair, CompiledPattern, Grammar, GrammarDeclare, GrammarPattern, GrammarScope,
    MatchCursor, TokenMatch,
};
pub use scoping::{match_scope, Scope, ScopeDeclare, ScopeDeclareSet, ScopeId};
