//! Grammar loading utilities
//!
//! `GrammarLoader` reads a whole [`GrammarDeclare`] from JSON or YAML
//! (grammar descriptions are data structures, not code) and hands back
//! either the declaration or its compiled [`Grammar`].
//!
//! # Example
//!
//! ```rust,ignore
//! let loader = GrammarLoader::from_path("shaderlab.grammar.yaml")?;
//! let grammar = loader.compile()?;
//! let tokens = grammar.tokenize(source);
//! ```

use std::fs;
use std::path::Path;

use crate::grammar::error::GrammarError;
use crate::grammar::pattern::{Grammar, GrammarDeclare};

/// Error that can occur when loading a grammar description
#[derive(Debug)]
pub enum LoaderError {
    /// IO error when reading a grammar file
    Io(String),
    /// The file did not deserialize into a grammar description
    Parse(String),
    /// The description deserialized but failed to compile
    Grammar(GrammarError),
}

impl std::fmt::Display for LoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderError::Io(msg) => write!(f, "IO error: {msg}"),
            LoaderError::Parse(msg) => write!(f, "parse error: {msg}"),
            LoaderError::Grammar(err) => write!(f, "grammar error: {err}"),
        }
    }
}

impl std::error::Error for LoaderError {}

impl From<std::io::Error> for LoaderError {
    fn from(err: std::io::Error) -> Self {
        LoaderError::Io(err.to_string())
    }
}

impl From<GrammarError> for LoaderError {
    fn from(err: GrammarError) -> Self {
        LoaderError::Grammar(err)
    }
}

/// Loads grammar descriptions from files or strings
pub struct GrammarLoader {
    declare: GrammarDeclare,
}

impl GrammarLoader {
    pub fn from_json_str(json: &str) -> Result<Self, LoaderError> {
        let declare = serde_json::from_str(json).map_err(|e| LoaderError::Parse(e.to_string()))?;
        Ok(Self { declare })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, LoaderError> {
        let declare = serde_yaml::from_str(yaml).map_err(|e| LoaderError::Parse(e.to_string()))?;
        Ok(Self { declare })
    }

    /// Load from a file, dispatching on extension: `.yaml`/`.yml` parse as
    /// YAML, everything else as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoaderError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    pub fn declare(&self) -> &GrammarDeclare {
        &self.declare
    }

    pub fn into_declare(self) -> GrammarDeclare {
        self.declare
    }

    pub fn compile(&self) -> Result<Grammar, LoaderError> {
        Grammar::compile(&self.declare).map_err(LoaderError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO_JSON: &str = r#"{
        "name": "demo",
        "patterns": [
            { "name": "number", "patterns": ["<number>"] },
            { "name": "word", "patterns": ["<identifier>"] }
        ]
    }"#;

    #[test]
    fn test_load_json_and_compile() {
        let loader = GrammarLoader::from_json_str(DEMO_JSON).unwrap();
        assert_eq!(loader.declare().name, "demo");
        let grammar = loader.compile().unwrap();
        let tokens = grammar.tokenize("x 1");
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_load_yaml() {
        let yaml = "
name: demo
patterns:
  - name: word
    patterns: [\"<identifier>\"]
";
        let loader = GrammarLoader::from_yaml_str(yaml).unwrap();
        assert_eq!(loader.declare().patterns.len(), 1);
    }

    #[test]
    fn test_malformed_input_is_parse_error() {
        assert!(matches!(
            GrammarLoader::from_json_str("{ not json"),
            Err(LoaderError::Parse(_))
        ));
    }

    #[test]
    fn test_bad_grammar_is_grammar_error() {
        let json = r#"{
            "name": "demo",
            "patterns": [ { "name": "bad", "patterns": ["a ]"] } ]
        }"#;
        let loader = GrammarLoader::from_json_str(json).unwrap();
        assert!(matches!(
            loader.compile(),
            Err(LoaderError::Grammar(GrammarError::Syntax { .. }))
        ));
    }
}
