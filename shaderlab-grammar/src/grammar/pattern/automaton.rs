//! Compiled matcher topology
//!
//! A compiled grammar is an arena of [`PatternNode`]s addressed by
//! [`NodeId`]. Parents own their children (downward, via child id lists);
//! each node also records its parent id, used only for continuation when a
//! completed node hands control back up the tree. The arena carries no
//! matching progress whatsoever: cursors live in
//! [`MatchCursor`](super::MatchCursor), one per match attempt, so a single
//! `CompiledPattern` can back any number of concurrent or repeated attempts.

/// Index of a node inside its [`CompiledPattern`] arena
pub type NodeId = usize;

/// The closed set of matcher kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternKind {
    /// A fixed literal matched one character at a time
    Text {
        literal: String,
        case_sensitive: bool,
    },
    /// Any character from a fixed set, repeated a fixed count
    CharSet { chars: Vec<char>, count: usize },
    /// Exactly one whitespace character (space, CR, LF); never advances
    /// past itself, so consecutive whitespace collapses onto one node
    Whitespace,
    /// Escaped double-quoted string literal state machine
    StringLit,
    /// Numeric literal probed by regex at the current index
    Number,
    /// Identifier lexeme: `[A-Za-z_][A-Za-z0-9_]*`
    Identifier,
    /// Ordered sequence of children, matched in order
    Sequence { children: Vec<NodeId> },
    /// Ordered disjunction: children are tried in declaration order
    Alternatives { children: Vec<NodeId> },
    /// A bracketed token region: begin literal, inner patterns, end literal
    Scope { children: Vec<NodeId> },
}

impl PatternKind {
    pub fn children(&self) -> &[NodeId] {
        match self {
            PatternKind::Sequence { children }
            | PatternKind::Alternatives { children }
            | PatternKind::Scope { children } => children,
            _ => &[],
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            PatternKind::Sequence { .. }
                | PatternKind::Alternatives { .. }
                | PatternKind::Scope { .. }
        )
    }
}

/// One node of the compiled topology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternNode {
    pub kind: PatternKind,
    /// Continuation link; `None` only for the root
    pub parent: Option<NodeId>,
    /// An ignorable matcher may be absent from the input without failing
    /// the enclosing match
    pub ignorable: bool,
    /// Name of the grammar pattern this node was compiled from, for
    /// diagnostics
    pub origin: Option<String>,
}

/// An immutable, shareable compiled matcher tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    nodes: Vec<PatternNode>,
    root: NodeId,
}

impl CompiledPattern {
    pub(crate) fn new(nodes: Vec<PatternNode>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    /// A single-node pattern, for programmatic matchers (e.g. a
    /// [`PatternKind::CharSet`] swizzle matcher) and tests.
    pub fn leaf(kind: PatternKind) -> Self {
        debug_assert!(!kind.is_composite());
        Self {
            nodes: vec![PatternNode {
                kind,
                parent: None,
                ignorable: false,
                origin: None,
            }],
            root: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &PatternNode {
        &self.nodes[id]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes[id].kind.children()
    }

    /// Iterate all nodes with their ids, in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &PatternNode)> {
        self.nodes.iter().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_pattern() {
        let pattern = CompiledPattern::leaf(PatternKind::Whitespace);
        assert_eq!(pattern.node_count(), 1);
        assert_eq!(pattern.node(pattern.root()).kind, PatternKind::Whitespace);
        assert!(pattern.node(pattern.root()).parent.is_none());
    }

    #[test]
    fn test_children_of_leaf_is_empty() {
        let pattern = CompiledPattern::leaf(PatternKind::Number);
        assert!(pattern.children(pattern.root()).is_empty());
    }
}
