//! Scope declarations
//!
//! Declarations live in a [`ScopeDeclareSet`] arena and reference each other
//! by [`ScopeId`], so a declaration may list itself as a child (nested
//! parens, nested blocks) without reference cycles in the data.

use regex::Regex;

use crate::grammar::error::GrammarError;

/// Index of a declaration inside its [`ScopeDeclareSet`]
pub type ScopeId = usize;

/// One scope declaration: optional name, optional begin/end regular
/// expressions, ordered child declarations
#[derive(Debug)]
pub struct ScopeDeclare {
    pub name: Option<String>,
    pub begin: Option<Regex>,
    pub end: Option<Regex>,
    pub children: Vec<ScopeId>,
}

impl ScopeDeclare {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// Arena of scope declarations forming one language's scope tree
#[derive(Debug, Default)]
pub struct ScopeDeclareSet {
    nodes: Vec<ScopeDeclare>,
}

impl ScopeDeclareSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a scope from already-compiled regular expressions.
    pub fn declare(
        &mut self,
        name: Option<&str>,
        begin: Option<Regex>,
        end: Option<Regex>,
    ) -> ScopeId {
        let id = self.nodes.len();
        self.nodes.push(ScopeDeclare {
            name: name.map(str::to_string),
            begin,
            end,
            children: Vec::new(),
        });
        id
    }

    /// Declare a scope from regex source strings. A pattern that fails to
    /// compile is a malformed grammar description.
    pub fn declare_delimited(
        &mut self,
        name: Option<&str>,
        begin: Option<&str>,
        end: Option<&str>,
    ) -> Result<ScopeId, GrammarError> {
        let compile = |pattern: Option<&str>| -> Result<Option<Regex>, GrammarError> {
            match pattern {
                Some(p) => Regex::new(p).map(Some).map_err(|e| GrammarError::Syntax {
                    message: format!("invalid scope pattern '{p}': {e}"),
                }),
                None => Ok(None),
            }
        };
        Ok(self.declare(name, compile(begin)?, compile(end)?))
    }

    /// Append a child declaration to a parent. Order of addition is the
    /// declaration order used for tie-breaking during matching.
    pub fn add_child(&mut self, parent: ScopeId, child: ScopeId) {
        self.nodes[parent].children.push(child);
    }

    pub fn get(&self, id: ScopeId) -> &ScopeDeclare {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_link() {
        let mut set = ScopeDeclareSet::new();
        let root = set.declare(Some("source"), None, None);
        let block = set
            .declare_delimited(Some("block"), Some(r"\{"), Some(r"\}"))
            .unwrap();
        set.add_child(root, block);
        set.add_child(block, block);

        assert_eq!(set.get(root).children, vec![block]);
        assert_eq!(set.get(block).children, vec![block]);
        assert_eq!(set.get(block).name(), "block");
    }

    #[test]
    fn test_invalid_pattern_is_syntax_error() {
        let mut set = ScopeDeclareSet::new();
        let err = set
            .declare_delimited(Some("bad"), Some(r"("), None)
            .unwrap_err();
        assert!(matches!(err, GrammarError::Syntax { .. }));
    }
}
