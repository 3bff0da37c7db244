//! Error types for grammar compilation
//!
//! These errors indicate a malformed grammar *description*, not malformed
//! document text. They abort compilation of that grammar; matching-time
//! outcomes are `Option`s and never raise errors.

use std::fmt;

/// Fatal grammar-description errors raised during compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A `{name}` token references a scope absent from the pattern's scope
    /// dictionary
    UndefinedScopeReference { name: String },
    /// Unbalanced brackets in a template token, or a stray closing bracket
    Syntax { message: String },
    /// A compiled node ended up with zero sub-matchers
    EmptyPattern { pattern: String },
    /// A construct with no defined matching policy (e.g. a recursive
    /// `<name>` reference)
    UnsupportedConstruct { message: String },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::UndefinedScopeReference { name } => {
                write!(f, "pattern undefined: no scope named '{{{name}}}'")
            }
            GrammarError::Syntax { message } => write!(f, "syntax error: {message}"),
            GrammarError::EmptyPattern { pattern } => {
                write!(f, "no pattern: '{pattern}' yields no matchers")
            }
            GrammarError::UnsupportedConstruct { message } => {
                write!(f, "unsupported construct: {message}")
            }
        }
    }
}

impl std::error::Error for GrammarError {}
