//! # shaderlab-grammar
//!
//! A grammar engine for ShaderLab-style language descriptions. Two halves:
//!
//! - **Scope matching**: a declarative tree of begin/end regular expressions
//!   is matched against a document, producing a nested tree of [`Scope`]
//!   regions with absolute offsets (comment blocks, brace blocks, string
//!   literals).
//! - **Token grammars**: named patterns written as whitespace-separated
//!   templates (`<identifier>`, `[optional]`, `{scope}`, bare literals)
//!   compile into an immutable matcher tree that is driven one character at
//!   a time over the text inside a scope.
//!
//! The engine never talks to an editor protocol. It consumes anything that
//! implements [`DocumentView`] and produces scope trees, token matches and
//! [`Diagnostic`] records for a downstream publisher.
//!
//! Compiled grammars are immutable and shareable; all matching progress
//! lives in a per-attempt [`MatchCursor`], so the same compiled pattern can
//! be retried or used from several matches at once without reset
//! choreography.
//!
//! [`Scope`]: grammar::scoping::Scope
//! [`DocumentView`]: grammar::document::DocumentView
//! [`Diagnostic`]: grammar::diagnostics::Diagnostic
//! [`MatchCursor`]: grammar::pattern::MatchCursor

pub mod grammar;
