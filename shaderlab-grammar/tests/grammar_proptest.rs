//! Property-based tests for the scope matcher and pattern automaton.

use proptest::prelude::*;
use shaderlab_grammar::grammar::document::{DocumentView, SourceDocument};
use shaderlab_grammar::grammar::pattern::{match_at, GrammarPattern};
use shaderlab_grammar::grammar::scoping::{match_scope, Scope, ScopeDeclareSet, ScopeId};

fn paren_grammar() -> (ScopeDeclareSet, ScopeId) {
    let mut set = ScopeDeclareSet::new();
    let paren = set
        .declare_delimited(Some("paren"), Some(r"\("), Some(r"\)"))
        .unwrap();
    set.add_child(paren, paren);
    let root = set.declare(Some("source"), None, None);
    set.add_child(root, paren);
    (set, root)
}

fn assert_invariants(scope: &Scope) {
    let mut previous_end = scope.start_offset;
    for child in &scope.children {
        assert!(child.start_offset >= scope.start_offset);
        assert!(child.end_offset <= scope.end_offset);
        assert!(previous_end <= child.start_offset);
        previous_end = child.end_offset;
        assert_invariants(child);
    }
}

proptest! {
    /// A root with no begin/end always succeeds and spans the whole input.
    #[test]
    fn root_always_spans_document(text in "[a-z() ]{0,40}") {
        let (set, root) = paren_grammar();
        let doc = SourceDocument::new(text.as_str());
        let scope = match_scope(&set, root, &doc, 0, doc.len()).unwrap();
        prop_assert_eq!(scope.start_offset, 0);
        prop_assert_eq!(scope.end_offset, doc.len());
    }

    /// Children stay inside their parent and siblings never overlap, for
    /// arbitrary (including unbalanced) inputs.
    #[test]
    fn scope_containment_holds(text in "[a-z() ]{0,60}") {
        let (set, root) = paren_grammar();
        let doc = SourceDocument::new(text.as_str());
        let scope = match_scope(&set, root, &doc, 0, doc.len()).unwrap();
        assert_invariants(&scope);
    }

    /// Matching the same declaration over the same document twice yields
    /// structurally identical trees.
    #[test]
    fn scope_matching_is_deterministic(text in "[a-z() ]{0,60}") {
        let (set, root) = paren_grammar();
        let doc = SourceDocument::new(text.as_str());
        let first = match_scope(&set, root, &doc, 0, doc.len());
        let second = match_scope(&set, root, &doc, 0, doc.len());
        prop_assert_eq!(first, second);
    }

    /// A balanced paren region is matched exactly, wherever it sits.
    #[test]
    fn balanced_region_is_found(prefix in "[a-z ]{0,10}", inner in "[a-z ]{0,10}", suffix in "[a-z ]{0,10}") {
        let text = format!("{prefix}({inner}){suffix}");
        let (set, root) = paren_grammar();
        let doc = SourceDocument::new(text.as_str());
        let scope = match_scope(&set, root, &doc, 0, doc.len()).unwrap();
        prop_assert_eq!(scope.children.len(), 1);
        let child = &scope.children[0];
        let expected = format!("({inner})");
        prop_assert_eq!(child.text(&doc), expected.as_str());
    }

    /// An identifier-shaped lexeme is matched in full.
    #[test]
    fn identifier_matches_whole_lexeme(lexeme in "[a-zA-Z_][a-zA-Z0-9_]{0,12}") {
        let pattern = GrammarPattern::new("ident", &["<identifier>"]);
        let compiled = pattern.compiled().unwrap();
        let text = format!("{lexeme};");
        let token = match_at(&compiled, &text, 0).unwrap();
        prop_assert_eq!(&text[token.span], lexeme.as_str());
    }

    /// A numeric literal is matched in full, signs and fractions included.
    #[test]
    fn number_matches_whole_literal(sign in "[+-]?", digits in "[0-9]{1,6}", frac in proptest::option::of("[0-9]{1,4}")) {
        let literal = match &frac {
            Some(f) => format!("{sign}{digits}.{f}"),
            None => format!("{sign}{digits}"),
        };
        let pattern = GrammarPattern::new("num", &["<number>"]);
        let compiled = pattern.compiled().unwrap();
        let text = format!("{literal} tail");
        let token = match_at(&compiled, &text, 0).unwrap();
        prop_assert_eq!(&text[token.span], literal.as_str());
    }

    /// Compiling the same pattern twice yields structurally identical trees.
    #[test]
    fn compilation_is_deterministic(words in proptest::collection::vec("[a-z]{1,6}", 1..5)) {
        let template = words.join(" ");
        let first = GrammarPattern::new("words", &[template.as_str()])
            .compiled()
            .unwrap();
        let second = GrammarPattern::new("words", &[template.as_str()])
            .compiled()
            .unwrap();
        prop_assert_eq!(first.as_ref(), second.as_ref());
    }

    /// A literal-word template matches exactly the text it spells.
    #[test]
    fn literal_template_matches_itself(words in proptest::collection::vec("[a-z]{1,6}", 1..5)) {
        let template = words.join(" ");
        let pattern = GrammarPattern::new("words", &[template.as_str()]);
        let compiled = pattern.compiled().unwrap();
        let token = match_at(&compiled, &template, 0).unwrap();
        prop_assert_eq!(token.span, 0..template.len());
    }
}
