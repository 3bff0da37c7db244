//! # shaderlab-syntax
//!
//! The built-in ShaderLab language description: document scope declarations
//! (comments, strings, brace blocks, CG program regions), token grammars for
//! the constructs inside them (properties, tags, render-state statements)
//! and diagnostic patterns for common authoring mistakes.
//!
//! Everything here is data handed to the `shaderlab-grammar` engine; the
//! crate contains no matching logic of its own.

pub mod diagnostics;
pub mod scopes;
pub mod tokens;

use shaderlab_grammar::grammar::document::{DocumentView, SourceDocument};
use shaderlab_grammar::grammar::scoping::{match_scope, Scope};

use crate::scopes::SHADERLAB_SCOPES;

/// A whole ShaderLab document segmented into scopes
pub struct ShaderCode {
    pub scopes: Scope,
}

impl ShaderCode {
    /// Segment a document against the built-in root declaration. The root
    /// has no delimiters, so any document yields a scope tree.
    pub fn parse(doc: &SourceDocument) -> Option<ShaderCode> {
        let scopes = SHADERLAB_SCOPES.with_set(|set, root| match_scope(set, root, doc, 0, doc.len()))?;
        Some(ShaderCode { scopes })
    }
}
