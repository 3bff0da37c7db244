//! Recursive scope matching
//!
//! [`match_scope`] partitions a document range into nested scopes. The
//! algorithm, per level:
//!
//! 1. Locate the declaration's `begin` pattern (if any) inside the range.
//! 2. Repeatedly place the earliest-starting child scope: probe every child
//!    declaration's `begin`, order candidates by match offset (declaration
//!    order breaks ties), and recurse into the first candidate that starts
//!    before the parent's own `end` match. A failed child recursion falls
//!    through to the next candidate at the same cursor; placed children are
//!    never revisited.
//! 3. Locate the `end` pattern after the last child, or span to the range
//!    bound when the declaration has no `end`.
//!
//! Failure is `None`, the single no-match signal. An unterminated region is
//! not a partial success: a declaration whose `end` pattern cannot be found
//! fails as a whole, and the partially built scope is discarded.

use regex::Regex;

use crate::grammar::document::{DocumentView, Position};
use crate::grammar::scoping::declare::{ScopeDeclareSet, ScopeId};

/// Candidate offset used for children whose begin pattern does not match
const NO_MATCH: usize = usize::MAX;

/// One successfully matched region: half-open byte offsets plus the matched
/// children, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub declare: ScopeId,
    pub start_offset: usize,
    pub end_offset: usize,
    pub children: Vec<Scope>,
}

impl Scope {
    pub fn start_position(&self, doc: &impl DocumentView) -> Position {
        doc.position_at(self.start_offset)
    }

    pub fn end_position(&self, doc: &impl DocumentView) -> Position {
        doc.position_at(self.end_offset)
    }

    /// The document text this scope covers.
    pub fn text<'d, D: DocumentView>(&self, doc: &'d D) -> &'d str {
        doc.text_in(self.start_offset..self.end_offset)
    }

    /// Depth-first traversal of this scope and all descendants.
    pub fn iter_depth_first(&self) -> impl Iterator<Item = &Scope> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

/// Probe a regular expression against a document range. Returns the matched
/// span in absolute byte offsets.
pub fn match_in_range(
    regex: &Regex,
    doc: &impl DocumentView,
    start: usize,
    end: usize,
) -> Option<(usize, usize)> {
    let sub = doc.text_in(start..end);
    regex.find(sub).map(|m| (start + m.start(), start + m.end()))
}

/// Match one scope declaration against `[start_offset, end_offset)`.
pub fn match_scope(
    set: &ScopeDeclareSet,
    declare: ScopeId,
    doc: &impl DocumentView,
    start_offset: usize,
    end_offset: usize,
) -> Option<Scope> {
    let decl = set.get(declare);

    let mut scope_start = start_offset;
    let mut cursor = start_offset;
    if let Some(begin) = &decl.begin {
        let (match_start, match_end) = match_in_range(begin, doc, start_offset, end_offset)?;
        scope_start = match_start;
        cursor = match_end;
    }

    let mut children: Vec<Scope> = Vec::new();
    loop {
        // Probe every child's begin pattern; children that do not match get
        // an infinite sentinel so the sort pushes them last. The sort is
        // stable, so equal offsets keep declaration order.
        let mut candidates: Vec<(usize, ScopeId)> = decl
            .children
            .iter()
            .map(|&child_id| {
                let offset = set
                    .get(child_id)
                    .begin
                    .as_ref()
                    .map_or(Some((cursor, cursor)), |begin| {
                        match_in_range(begin, doc, cursor, end_offset)
                    })
                    .map_or(NO_MATCH, |(match_start, _)| match_start);
                (offset, child_id)
            })
            .collect();
        candidates.sort_by_key(|&(offset, _)| offset);

        // The parent's own end takes precedence over any later-starting
        // child; an end pattern that no longer matches fails the scope.
        let end_match = match &decl.end {
            Some(end) => Some(match_in_range(end, doc, cursor, end_offset)?),
            None => None,
        };

        let mut placed = false;
        for (offset, child_id) in candidates {
            if offset == NO_MATCH {
                continue;
            }
            if let Some((end_start, _)) = end_match {
                if end_start <= offset {
                    break;
                }
            }
            if let Some(child) = match_scope(set, child_id, doc, cursor, end_offset) {
                // A child that does not advance the cursor can never be
                // placed; trying the next candidate avoids livelock on
                // zero-width begin matches.
                if child.end_offset <= cursor {
                    continue;
                }
                cursor = child.end_offset;
                children.push(child);
                placed = true;
                break;
            }
        }
        if !placed {
            break;
        }
    }

    let scope_end = match &decl.end {
        None => end_offset,
        Some(end) => {
            let (_, match_end) = match_in_range(end, doc, cursor, end_offset)?;
            match_end
        }
    };

    Some(Scope {
        declare,
        start_offset: scope_start,
        end_offset: scope_end,
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::document::SourceDocument;

    fn comment_grammar() -> (ScopeDeclareSet, ScopeId) {
        let mut set = ScopeDeclareSet::new();
        let comment = set
            .declare_delimited(Some("comment"), Some(r"/\*"), Some(r"\*/"))
            .unwrap();
        (set, comment)
    }

    #[test]
    fn test_flat_scope() {
        let (set, comment) = comment_grammar();
        let doc = SourceDocument::new("a/* hi */b");

        let scope = match_scope(&set, comment, &doc, 0, doc.len()).unwrap();
        assert_eq!(scope.start_offset, 1);
        assert_eq!(scope.end_offset, 9);
        assert_eq!(scope.text(&doc), "/* hi */");
        assert!(scope.children.is_empty());
    }

    #[test]
    fn test_begin_not_found_is_no_match() {
        let (set, comment) = comment_grammar();
        let doc = SourceDocument::new("no comment here");
        assert!(match_scope(&set, comment, &doc, 0, doc.len()).is_none());
    }

    #[test]
    fn test_unterminated_region_is_no_match() {
        let mut set = ScopeDeclareSet::new();
        let string = set
            .declare_delimited(Some("string"), Some("\""), Some("\""))
            .unwrap();
        let doc = SourceDocument::new("\"abc");
        assert!(match_scope(&set, string, &doc, 0, doc.len()).is_none());
    }

    #[test]
    fn test_nested_scopes() {
        let mut set = ScopeDeclareSet::new();
        let paren = set
            .declare_delimited(Some("paren"), Some(r"\("), Some(r"\)"))
            .unwrap();
        set.add_child(paren, paren);
        let root = set.declare(Some("source"), None, None);
        set.add_child(root, paren);

        let doc = SourceDocument::new("x(y(z))w");
        let scope = match_scope(&set, root, &doc, 0, doc.len()).unwrap();

        assert_eq!(scope.start_offset, 0);
        assert_eq!(scope.end_offset, doc.len());
        assert_eq!(scope.children.len(), 1);

        let outer = &scope.children[0];
        assert_eq!((outer.start_offset, outer.end_offset), (1, 7));
        assert_eq!(outer.text(&doc), "(y(z))");
        assert_eq!(outer.children.len(), 1);

        let inner = &outer.children[0];
        assert_eq!((inner.start_offset, inner.end_offset), (3, 6));
        assert_eq!(inner.text(&doc), "(z)");
        assert!(inner.children.is_empty());
    }

    #[test]
    fn test_root_without_delimiters_spans_input() {
        let mut set = ScopeDeclareSet::new();
        let root = set.declare(None, None, None);
        let doc = SourceDocument::new("anything at all");

        let scope = match_scope(&set, root, &doc, 0, doc.len()).unwrap();
        assert_eq!(scope.start_offset, 0);
        assert_eq!(scope.end_offset, doc.len());
    }

    #[test]
    fn test_end_precedence_over_later_child() {
        // The comment closes before the inner block opens; the block must
        // not be placed even though its begin pattern matches later text.
        let mut set = ScopeDeclareSet::new();
        let block = set
            .declare_delimited(Some("block"), Some(r"\{"), Some(r"\}"))
            .unwrap();
        let comment = set
            .declare_delimited(Some("comment"), Some(r"/\*"), Some(r"\*/"))
            .unwrap();
        set.add_child(comment, block);

        let doc = SourceDocument::new("/* a */ { }");
        let scope = match_scope(&set, comment, &doc, 0, doc.len()).unwrap();
        assert_eq!(scope.end_offset, 7);
        assert!(scope.children.is_empty());
    }

    #[test]
    fn test_declaration_order_breaks_ties() {
        // Both children's begin patterns first match at the same offset; the
        // earlier-declared child wins.
        let mut set = ScopeDeclareSet::new();
        let wide = set
            .declare_delimited(Some("wide"), Some(r"<"), Some(r">>"))
            .unwrap();
        let narrow = set
            .declare_delimited(Some("narrow"), Some(r"<"), Some(r">"))
            .unwrap();
        let root = set.declare(None, None, None);
        set.add_child(root, wide);
        set.add_child(root, narrow);

        let doc = SourceDocument::new("<a>>");
        let scope = match_scope(&set, root, &doc, 0, doc.len()).unwrap();
        assert_eq!(scope.children.len(), 1);
        assert_eq!(scope.children[0].declare, wide);
    }

    #[test]
    fn test_failed_candidate_falls_through_to_next() {
        // "wide" opens first but never closes, so its recursion fails; the
        // sibling scan must then place "narrow" at the same cursor.
        let mut set = ScopeDeclareSet::new();
        let wide = set
            .declare_delimited(Some("wide"), Some(r"<"), Some(r"@@"))
            .unwrap();
        let narrow = set
            .declare_delimited(Some("narrow"), Some(r"<"), Some(r">"))
            .unwrap();
        let root = set.declare(None, None, None);
        set.add_child(root, wide);
        set.add_child(root, narrow);

        let doc = SourceDocument::new("<a>");
        let scope = match_scope(&set, root, &doc, 0, doc.len()).unwrap();
        assert_eq!(scope.children.len(), 1);
        assert_eq!(scope.children[0].declare, narrow);
        assert_eq!(scope.children[0].text(&doc), "<a>");
    }

    #[test]
    fn test_siblings_in_document_order() {
        let mut set = ScopeDeclareSet::new();
        let comment = set
            .declare_delimited(Some("comment"), Some(r"/\*"), Some(r"\*/"))
            .unwrap();
        let root = set.declare(None, None, None);
        set.add_child(root, comment);

        let doc = SourceDocument::new("/*a*/ x /*b*/");
        let scope = match_scope(&set, root, &doc, 0, doc.len()).unwrap();
        assert_eq!(scope.children.len(), 2);
        assert_eq!(scope.children[0].text(&doc), "/*a*/");
        assert_eq!(scope.children[1].text(&doc), "/*b*/");
        assert!(scope.children[0].end_offset <= scope.children[1].start_offset);
    }

    #[test]
    fn test_iter_depth_first() {
        let mut set = ScopeDeclareSet::new();
        let paren = set
            .declare_delimited(Some("paren"), Some(r"\("), Some(r"\)"))
            .unwrap();
        set.add_child(paren, paren);
        let root = set.declare(None, None, None);
        set.add_child(root, paren);

        let doc = SourceDocument::new("(a)(b(c))");
        let scope = match_scope(&set, root, &doc, 0, doc.len()).unwrap();
        let texts: Vec<&str> = scope.iter_depth_first().map(|s| s.text(&doc)).collect();
        assert_eq!(texts, vec!["(a)(b(c))", "(a)", "(b(c))", "(c)"]);
    }
}
