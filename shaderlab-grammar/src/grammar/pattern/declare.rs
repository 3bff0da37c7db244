//! Declarative grammar descriptions
//!
//! These are the author-written data structures: named patterns built from
//! whitespace-separated template strings, a dictionary resolving `<name>`
//! placeholder references, and a scope dictionary resolving `{name}`
//! references to bracketed token regions. All of it deserializes from JSON
//! or YAML (see [`GrammarLoader`](crate::grammar::loader::GrammarLoader)),
//! and all of it is read-only configuration once authored.
//!
//! Template token shapes:
//!
//! - `<name>`: a built-in matcher (`string`, `number`, `identifier`), a
//!   dictionary reference, or a free identifier when neither resolves
//! - `[ ... ]`: an optional group; may be absent from a match
//! - `( ... )`: a literal parenthesised group; the parens are matched text
//! - `{name}`: a scope-dictionary reference
//! - anything else: a literal word

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::grammar::error::GrammarError;
use crate::grammar::pattern::automaton::CompiledPattern;
use crate::grammar::pattern::compile::compile_grammar;

/// A matched pair of bracket characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketPair {
    pub open: char,
    pub close: char,
}

/// A whole language's token grammar: named patterns plus lexical policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarDeclare {
    pub name: String,
    pub patterns: Vec<GrammarPattern>,
    /// Pattern matched and discarded between tokens (defaults to
    /// whitespace when absent)
    #[serde(default)]
    pub ignore: Option<GrammarPattern>,
    #[serde(default)]
    pub string_delimiters: Vec<char>,
    #[serde(default)]
    pub bracket_pairs: Vec<BracketPair>,
}

/// One named pattern: template alternatives plus the dictionaries its
/// placeholder and scope references resolve against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarPattern {
    pub name: String,
    /// Independent template alternatives
    pub patterns: Vec<String>,
    /// `<name>` references
    #[serde(default)]
    pub dictionary: HashMap<String, GrammarPattern>,
    /// `{name}` references
    #[serde(default)]
    pub scopes: HashMap<String, GrammarScope>,
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,
    #[serde(skip)]
    compiled: OnceCell<Arc<CompiledPattern>>,
}

fn default_case_sensitive() -> bool {
    true
}

impl GrammarPattern {
    pub fn new(name: impl Into<String>, templates: &[&str]) -> Self {
        Self {
            name: name.into(),
            patterns: templates.iter().map(|t| t.to_string()).collect(),
            dictionary: HashMap::new(),
            scopes: HashMap::new(),
            case_sensitive: true,
            compiled: OnceCell::new(),
        }
    }

    pub fn with_reference(mut self, name: impl Into<String>, pattern: GrammarPattern) -> Self {
        self.dictionary.insert(name.into(), pattern);
        self
    }

    pub fn with_scope(mut self, name: impl Into<String>, scope: GrammarScope) -> Self {
        self.scopes.insert(name.into(), scope);
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    /// The compiled form of this pattern, compiled at most once. The
    /// compiled topology is immutable and shared; every match attempt gets
    /// its own cursor.
    pub fn compiled(&self) -> Result<Arc<CompiledPattern>, GrammarError> {
        self.compiled
            .get_or_try_init(|| compile_grammar(self).map(Arc::new))
            .cloned()
    }
}

/// A token-level bracketed region inside a grammar: literal delimiters with
/// patterns valid between them
///
/// Distinct from a document-level scope declaration: grammar scopes are
/// compiled into the pattern automaton and matched literally, character by
/// character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarScope {
    pub begin: String,
    pub end: String,
    #[serde(default)]
    pub patterns: Vec<GrammarPattern>,
    #[serde(default)]
    pub scopes: HashMap<String, GrammarScope>,
    #[serde(default)]
    pub ignore: Option<String>,
    #[serde(default)]
    pub pairs: Vec<BracketPair>,
}

impl GrammarScope {
    pub fn new(begin: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            begin: begin.into(),
            end: end.into(),
            patterns: Vec::new(),
            scopes: HashMap::new(),
            ignore: None,
            pairs: Vec::new(),
        }
    }

    pub fn with_pattern(mut self, pattern: GrammarPattern) -> Self {
        self.patterns.push(pattern);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_from_json() {
        let json = r#"{
            "name": "assignment",
            "patterns": ["<identifier> = <number>"]
        }"#;
        let pattern: GrammarPattern = serde_json::from_str(json).unwrap();
        assert_eq!(pattern.name, "assignment");
        assert_eq!(pattern.patterns.len(), 1);
        assert!(pattern.case_sensitive);
        assert!(pattern.dictionary.is_empty());
    }

    #[test]
    fn test_declare_from_yaml() {
        let yaml = "
name: demo
patterns:
  - name: call
    patterns:
      - \"<identifier> ( <number> )\"
string_delimiters: [\"\\\"\"]
bracket_pairs:
  - open: \"(\"
    close: \")\"
";
        let declare: GrammarDeclare = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(declare.name, "demo");
        assert_eq!(declare.patterns.len(), 1);
        assert_eq!(declare.string_delimiters, vec!['"']);
        assert_eq!(
            declare.bracket_pairs,
            vec![BracketPair {
                open: '(',
                close: ')'
            }]
        );
    }

    #[test]
    fn test_compiled_cache_returns_same_tree() {
        let pattern = GrammarPattern::new("word", &["hello"]);
        let first = pattern.compiled().unwrap();
        let second = pattern.compiled().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
