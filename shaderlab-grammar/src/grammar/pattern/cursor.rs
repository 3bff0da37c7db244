//! Matching runtime
//!
//! A [`MatchCursor`] drives one match attempt over a shared
//! [`CompiledPattern`]. The protocol is pull-based: the driver asks
//! [`is_match`](MatchCursor::is_match) whether the active matcher accepts
//! the current character, then [`move_next`](MatchCursor::move_next) to
//! advance to whatever must be checked next. Control bubbles to the parent
//! continuation when a composite's children are exhausted, and
//! [`reset`](MatchCursor::reset) returns the cursor to its initial state so
//! the same compiled topology can be retried from another offset.
//!
//! All progress state (literal cursors, repeat counters, string phases,
//! active-child indices) lives here, never on the compiled nodes, so one
//! compiled pattern can back concurrent attempts without corruption.
//!
//! Failure recovery, in order of preference at the failing node and then
//! upward along the active path:
//!
//! 1. a whitespace matcher that already consumed something is simply
//!    complete (it never advances past itself);
//! 2. an alternatives node retries its next untried branch, rewinding to
//!    the position where it was entered;
//! 3. an ignorable node that has consumed nothing is skipped entirely.
//!
//! When nothing along the path can recover, the attempt is dead and the
//! driver reports no-match.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::grammar::pattern::automaton::{CompiledPattern, NodeId, PatternKind};

/// Numeric literal shape probed at the current index: optional sign,
/// optional integer part, optional fractional part, at least one digit
static NUMBER_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)").unwrap());

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringPhase {
    Unopened,
    Open { escaped: bool },
    Closed,
}

/// Per-node matching progress, parallel to the compiled arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Text { cursor: usize },
    CharSet { remaining: usize },
    Whitespace { matched: bool },
    StringLit { phase: StringPhase },
    Number { length: Option<usize>, consumed: usize },
    Identifier { consumed: usize },
    /// Sequence/Scope: index of the active child and entry position
    Branch { active: usize, entered_at: usize },
    /// Alternatives: branch currently being tried and entry position
    Choice { taken: usize, entered_at: usize },
}

fn initial_state(kind: &PatternKind) -> NodeState {
    match kind {
        PatternKind::Text { .. } => NodeState::Text { cursor: 0 },
        PatternKind::CharSet { count, .. } => NodeState::CharSet { remaining: *count },
        PatternKind::Whitespace => NodeState::Whitespace { matched: false },
        PatternKind::StringLit => NodeState::StringLit {
            phase: StringPhase::Unopened,
        },
        PatternKind::Number => NodeState::Number {
            length: None,
            consumed: 0,
        },
        PatternKind::Identifier => NodeState::Identifier { consumed: 0 },
        PatternKind::Sequence { .. } | PatternKind::Scope { .. } => NodeState::Branch {
            active: 0,
            entered_at: 0,
        },
        PatternKind::Alternatives { .. } => NodeState::Choice {
            taken: 0,
            entered_at: 0,
        },
    }
}

/// Untried-branch record for an alternatives node on the active path
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    node: NodeId,
    next: usize,
    at: usize,
}

/// One token recognized by a compiled pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch {
    pub span: Range<usize>,
    /// Name of the grammar pattern that produced the match, when known
    pub pattern: Option<String>,
}

/// Per-attempt matching cursor over a shared compiled pattern
pub struct MatchCursor<'p> {
    pattern: &'p CompiledPattern,
    states: Vec<NodeState>,
    active: Option<NodeId>,
    start: usize,
    checkpoints: Vec<Checkpoint>,
}

impl<'p> MatchCursor<'p> {
    pub fn new(pattern: &'p CompiledPattern, start: usize) -> Self {
        let states = pattern.iter().map(|(_, n)| initial_state(&n.kind)).collect();
        let mut cursor = Self {
            pattern,
            states,
            active: None,
            start,
            checkpoints: Vec::new(),
        };
        cursor.enter(pattern.root(), start);
        cursor
    }

    /// The leaf matcher currently expecting input, `None` once the whole
    /// pattern is satisfied.
    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    pub fn is_complete(&self) -> bool {
        self.active.is_none()
    }

    /// Does the active matcher accept `ch` at byte `index` of `text`?
    pub fn is_match(&mut self, ch: char, index: usize, text: &str) -> bool {
        let Some(node) = self.active else {
            return false;
        };
        let pattern = self.pattern;
        match (&pattern.node(node).kind, &mut self.states[node]) {
            (
                PatternKind::Text {
                    literal,
                    case_sensitive,
                },
                NodeState::Text { cursor },
            ) => match literal[*cursor..].chars().next() {
                Some(expected) => {
                    expected == ch || (!*case_sensitive && expected.eq_ignore_ascii_case(&ch))
                }
                None => false,
            },
            (PatternKind::CharSet { chars, .. }, NodeState::CharSet { remaining }) => {
                *remaining > 0 && chars.contains(&ch)
            }
            (PatternKind::Whitespace, _) => matches!(ch, ' ' | '\r' | '\n'),
            (PatternKind::StringLit, NodeState::StringLit { phase }) => match phase {
                StringPhase::Unopened => ch == '"',
                StringPhase::Open { .. } => true,
                StringPhase::Closed => false,
            },
            (PatternKind::Number, NodeState::Number { length, consumed }) => {
                let length = *length
                    .get_or_insert_with(|| NUMBER_LITERAL.find(&text[index..]).map_or(0, |m| m.end()));
                *consumed < length
            }
            (PatternKind::Identifier, NodeState::Identifier { consumed }) => {
                if *consumed == 0 {
                    is_ident_start(ch)
                } else {
                    is_ident_continue(ch)
                }
            }
            _ => false,
        }
    }

    /// Record that `ch` at byte `index` was consumed and move to the next
    /// matcher to consult. Returns the new active leaf, or `None` once the
    /// entire pattern is satisfied.
    pub fn move_next(&mut self, ch: char, index: usize, text: &str) -> Option<NodeId> {
        let node = self.active?;
        let next_at = index + ch.len_utf8();
        let pattern = self.pattern;
        let mut bubble = false;
        match (&pattern.node(node).kind, &mut self.states[node]) {
            (PatternKind::Text { literal, .. }, NodeState::Text { cursor }) => {
                *cursor += ch.len_utf8();
                bubble = *cursor >= literal.len();
            }
            (PatternKind::CharSet { .. }, NodeState::CharSet { remaining }) => {
                *remaining -= 1;
                bubble = *remaining == 0;
            }
            (PatternKind::Whitespace, NodeState::Whitespace { matched }) => {
                // never advances past itself; the continuation is reached
                // through recovery when a non-whitespace character arrives
                *matched = true;
            }
            (PatternKind::StringLit, NodeState::StringLit { phase }) => match *phase {
                StringPhase::Unopened => *phase = StringPhase::Open { escaped: false },
                StringPhase::Open { escaped: true } => {
                    *phase = StringPhase::Open { escaped: false }
                }
                StringPhase::Open { escaped: false } if ch == '\\' => {
                    *phase = StringPhase::Open { escaped: true }
                }
                StringPhase::Open { escaped: false } if ch == '"' => {
                    *phase = StringPhase::Closed;
                    bubble = true;
                }
                StringPhase::Open { escaped: false } | StringPhase::Closed => {}
            },
            (PatternKind::Number, NodeState::Number { length, consumed }) => {
                *consumed += ch.len_utf8();
                bubble = *consumed >= length.unwrap_or(0);
            }
            (PatternKind::Identifier, NodeState::Identifier { consumed }) => {
                *consumed += ch.len_utf8();
                let continues = text[next_at..].chars().next().is_some_and(is_ident_continue);
                bubble = !continues;
            }
            _ => {}
        }
        if bubble {
            self.bubble(node, next_at);
        }
        self.active
    }

    /// Return the cursor to its initial sub-state for a fresh attempt at
    /// the same start offset.
    pub fn reset(&mut self) {
        self.reset_to(self.start);
    }

    /// Reset and aim the next attempt at a different start offset.
    pub fn reset_to(&mut self, start: usize) {
        self.start = start;
        self.checkpoints.clear();
        for (id, node) in self.pattern.iter() {
            self.states[id] = initial_state(&node.kind);
        }
        self.active = None;
        self.enter(self.pattern.root(), start);
    }

    /// Attempt recovery after the active matcher rejected the character at
    /// byte `at` (or after end of input). Returns the position to resume
    /// from (possibly rewound to an alternatives entry point), or `None`
    /// when the attempt is dead.
    pub fn recover(&mut self, at: usize) -> Option<usize> {
        let mut node = self.active?;
        let pattern = self.pattern;

        if let NodeState::Whitespace { matched: true } = self.states[node] {
            self.bubble(node, at);
            return Some(at);
        }

        loop {
            if let PatternKind::Alternatives { .. } = &pattern.node(node).kind {
                if let Some(resume) = self.retry(node) {
                    return Some(resume);
                }
            }
            let parent = pattern.node(node).parent;
            let under_branch = matches!(
                parent.map(|p| &pattern.node(p).kind),
                Some(PatternKind::Sequence { .. }) | Some(PatternKind::Scope { .. })
            );
            if under_branch && pattern.node(node).ignorable && self.is_fresh(node, at) {
                self.bubble(node, at);
                return Some(at);
            }
            node = parent?;
        }
    }

    /// Name of the grammar pattern the (completed) match came from.
    pub fn matched_pattern(&self) -> Option<&str> {
        let root = self.pattern.root();
        let node = match (&self.pattern.node(root).kind, &self.states[root]) {
            (PatternKind::Alternatives { children }, NodeState::Choice { taken, .. }) => {
                children[*taken]
            }
            _ => root,
        };
        self.pattern.node(node).origin.as_deref()
    }

    /// Descend into `node`, initializing its state, until a leaf becomes
    /// active.
    fn enter(&mut self, node: NodeId, at: usize) {
        let pattern = self.pattern;
        match &pattern.node(node).kind {
            PatternKind::Sequence { children } | PatternKind::Scope { children } => {
                self.states[node] = NodeState::Branch {
                    active: 0,
                    entered_at: at,
                };
                self.enter(children[0], at);
            }
            PatternKind::Alternatives { children } => {
                self.states[node] = NodeState::Choice {
                    taken: 0,
                    entered_at: at,
                };
                self.checkpoints.push(Checkpoint { node, next: 1, at });
                self.enter(children[0], at);
            }
            kind => {
                self.states[node] = initial_state(kind);
                self.active = Some(node);
            }
        }
    }

    /// Hand control up the tree from a satisfied node: advance the parent
    /// sequence to its next child, or keep bubbling when the parent is
    /// itself exhausted.
    fn bubble(&mut self, from: NodeId, at: usize) {
        let pattern = self.pattern;
        let mut current = from;
        loop {
            let Some(parent) = pattern.node(current).parent else {
                self.active = None;
                return;
            };
            match &pattern.node(parent).kind {
                PatternKind::Sequence { children } | PatternKind::Scope { children } => {
                    if let NodeState::Branch { active, .. } = &mut self.states[parent] {
                        *active += 1;
                        if *active < children.len() {
                            let next = children[*active];
                            self.enter(next, at);
                            return;
                        }
                    }
                    current = parent;
                }
                PatternKind::Alternatives { .. } => {
                    // the taken branch satisfied the whole choice; its
                    // untried branches (and any nested within the branch)
                    // are no longer live
                    if let Some(idx) = self.checkpoints.iter().rposition(|c| c.node == parent) {
                        self.checkpoints.truncate(idx);
                    }
                    current = parent;
                }
                _ => current = parent,
            }
        }
    }

    /// Re-enter the next untried branch of an alternatives node, rewinding
    /// to its entry position.
    fn retry(&mut self, node: NodeId) -> Option<usize> {
        let idx = self.checkpoints.iter().rposition(|c| c.node == node)?;
        let Checkpoint { next, at, .. } = self.checkpoints[idx];
        let PatternKind::Alternatives { children } = &self.pattern.node(node).kind else {
            return None;
        };
        if next < children.len() {
            // checkpoints above ours belong to the failed branch
            self.checkpoints.truncate(idx + 1);
            self.checkpoints[idx].next = next + 1;
            if let NodeState::Choice { taken, .. } = &mut self.states[node] {
                *taken = next;
            }
            let child = children[next];
            self.enter(child, at);
            Some(at)
        } else {
            self.checkpoints.truncate(idx);
            None
        }
    }

    /// Has `node` consumed nothing since it was entered?
    fn is_fresh(&self, node: NodeId, at: usize) -> bool {
        match (&self.pattern.node(node).kind, &self.states[node]) {
            (_, NodeState::Branch { entered_at, .. })
            | (_, NodeState::Choice { entered_at, .. }) => *entered_at == at,
            (_, NodeState::Text { cursor }) => *cursor == 0,
            (PatternKind::CharSet { count, .. }, NodeState::CharSet { remaining }) => {
                remaining == count
            }
            (_, NodeState::Whitespace { matched }) => !*matched,
            (_, NodeState::StringLit { phase }) => *phase == StringPhase::Unopened,
            (_, NodeState::Number { consumed, .. }) => *consumed == 0,
            (_, NodeState::Identifier { consumed }) => *consumed == 0,
            _ => false,
        }
    }
}

/// Drive one match attempt of `pattern` against `text` starting at byte
/// `start`. A zero-length match is reported as no-match.
pub fn match_at(pattern: &CompiledPattern, text: &str, start: usize) -> Option<TokenMatch> {
    let mut cursor = MatchCursor::new(pattern, start);
    let mut pos = start;
    while !cursor.is_complete() {
        match text[pos..].chars().next() {
            Some(ch) if cursor.is_match(ch, pos, text) => {
                cursor.move_next(ch, pos, text);
                pos += ch.len_utf8();
            }
            _ => pos = cursor.recover(pos)?,
        }
    }
    if pos == start {
        None
    } else {
        Some(TokenMatch {
            span: start..pos,
            pattern: cursor.matched_pattern().map(str::to_string),
        })
    }
}
