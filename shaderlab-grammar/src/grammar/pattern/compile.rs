//! Grammar compilation
//!
//! Turns declarative [`GrammarPattern`]s into [`CompiledPattern`] arenas.
//! Compilation is a two-stage pipeline: templates are analysed into a build
//! tree (where single-child wrappers collapse and ignorable flags
//! propagate), then the build tree is interned into the arena with parent
//! links fixed up.
//!
//! Adjacent matchers in an analysed sequence are joined with ignorable
//! whitespace separators, so `if ( <identifier> )` accepts both `if (x)`
//! and `if ( x )`.

use crate::grammar::error::GrammarError;
use crate::grammar::pattern::automaton::{CompiledPattern, NodeId, PatternKind, PatternNode};
use crate::grammar::pattern::cursor::{match_at, TokenMatch};
use crate::grammar::pattern::declare::{BracketPair, GrammarDeclare, GrammarPattern, GrammarScope};

/// Intermediate build tree; children are owned directly, which keeps the
/// collapse rule trivial before arena interning assigns ids
struct Build {
    kind: BuildKind,
    ignorable: bool,
    origin: Option<String>,
}

enum BuildKind {
    Text { literal: String, case_sensitive: bool },
    Whitespace,
    StringLit,
    Number,
    Identifier,
    Sequence(Vec<Build>),
    Alternatives(Vec<Build>),
    Scope(Vec<Build>),
}

/// Compile one named pattern into a shareable matcher tree.
pub fn compile_grammar(pattern: &GrammarPattern) -> Result<CompiledPattern, GrammarError> {
    let mut guard = Vec::new();
    Ok(intern_root(compile_pattern(pattern, &mut guard)?))
}

/// The compiled root of a whole grammar: one child per top-level pattern,
/// plus the declare's lexical policy (ignore pattern, string delimiters,
/// bracket pairs)
#[derive(Debug, Clone)]
pub struct Grammar {
    pub name: String,
    root: CompiledPattern,
    ignore: Option<CompiledPattern>,
    string_delimiters: Vec<char>,
    bracket_pairs: Vec<BracketPair>,
}

impl Grammar {
    pub fn compile(declare: &GrammarDeclare) -> Result<Self, GrammarError> {
        if declare.patterns.is_empty() {
            return Err(GrammarError::EmptyPattern {
                pattern: declare.name.clone(),
            });
        }
        let mut guard = Vec::new();
        let mut tops = Vec::new();
        for pattern in &declare.patterns {
            tops.push(compile_pattern(pattern, &mut guard)?);
        }
        let mut build = collapse(tops, BuildKind::Alternatives);
        if build.origin.is_none() {
            build.origin = Some(declare.name.clone());
        }
        let ignore = declare
            .ignore
            .as_ref()
            .map(|pattern| compile_pattern(pattern, &mut guard).map(intern_root))
            .transpose()?;
        Ok(Self {
            name: declare.name.clone(),
            root: intern_root(build),
            ignore,
            string_delimiters: declare.string_delimiters.clone(),
            bracket_pairs: declare.bracket_pairs.clone(),
        })
    }

    pub fn compiled(&self) -> &CompiledPattern {
        &self.root
    }

    pub fn is_string_delimiter(&self, ch: char) -> bool {
        self.string_delimiters.contains(&ch)
    }

    pub fn bracket_partner(&self, open: char) -> Option<char> {
        self.bracket_pairs
            .iter()
            .find(|pair| pair.open == open)
            .map(|pair| pair.close)
    }

    /// Repeatedly match the compiled root over `text`, skipping the ignore
    /// pattern (or plain whitespace) between tokens. Unclassified text is
    /// stepped over one character at a time and simply left untagged.
    pub fn tokenize(&self, text: &str) -> Vec<TokenMatch> {
        let mut tokens = Vec::new();
        let mut pos = 0;
        while pos < text.len() {
            if let Some(ignored) = self
                .ignore
                .as_ref()
                .and_then(|pattern| match_at(pattern, text, pos))
            {
                pos = ignored.span.end;
                continue;
            }
            let Some(ch) = text[pos..].chars().next() else {
                break;
            };
            if self.ignore.is_none() && ch.is_whitespace() {
                pos += ch.len_utf8();
                continue;
            }
            match match_at(&self.root, text, pos) {
                Some(token) => {
                    pos = token.span.end;
                    tokens.push(token);
                }
                None => pos += ch.len_utf8(),
            }
        }
        tokens
    }
}

/// Compile a pattern into a build tree. `guard` carries the in-progress
/// pattern names; a `<name>` reference back into the stack has no
/// terminating expansion and is rejected.
fn compile_pattern(
    pattern: &GrammarPattern,
    guard: &mut Vec<String>,
) -> Result<Build, GrammarError> {
    if guard.iter().any(|name| name == &pattern.name) {
        return Err(GrammarError::UnsupportedConstruct {
            message: format!("recursive reference to pattern '{}'", pattern.name),
        });
    }
    guard.push(pattern.name.clone());
    let mut alternatives = Vec::new();
    for template in &pattern.patterns {
        alternatives.push(analyse_template(template, pattern, guard)?);
    }
    guard.pop();

    if alternatives.is_empty() {
        return Err(GrammarError::EmptyPattern {
            pattern: pattern.name.clone(),
        });
    }
    // alternatives of a named pattern are optional relative to each other,
    // so the compiled root is ignorable either way
    let mut build = collapse(alternatives, BuildKind::Alternatives);
    build.ignorable = true;
    if build.origin.is_none() {
        build.origin = Some(pattern.name.clone());
    }
    Ok(build)
}

/// Analyse one template string into a matcher sequence.
fn analyse_template(
    template: &str,
    pattern: &GrammarPattern,
    guard: &mut Vec<String>,
) -> Result<Build, GrammarError> {
    let tokens = tokenize_template(template)?;
    if tokens.is_empty() {
        return Err(GrammarError::EmptyPattern {
            pattern: template.to_string(),
        });
    }
    let mut items = Vec::with_capacity(tokens.len());
    for token in &tokens {
        items.push(analyse_token(token, pattern, guard)?);
    }
    Ok(join(items, BuildKind::Sequence, pattern))
}

/// Split a template into tokens on whitespace at bracket depth zero. Group
/// brackets (`[...]` and `(...)`) may nest arbitrarily inside one token; a
/// mismatched or unterminated group is a malformed template.
fn tokenize_template(template: &str) -> Result<Vec<String>, GrammarError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut open_brackets: Vec<char> = Vec::new();
    for ch in template.chars() {
        match ch {
            '[' | '(' => {
                open_brackets.push(ch);
                current.push(ch);
            }
            ']' | ')' => {
                let expected = if ch == ']' { '[' } else { '(' };
                match open_brackets.pop() {
                    Some(open) if open == expected => current.push(ch),
                    Some(open) => {
                        return Err(GrammarError::Syntax {
                            message: format!(
                                "mismatched '{open}' closed by '{ch}' in '{template}'"
                            ),
                        })
                    }
                    None => {
                        return Err(GrammarError::Syntax {
                            message: format!("stray '{ch}' in '{template}'"),
                        })
                    }
                }
            }
            c if c.is_whitespace() && open_brackets.is_empty() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if let Some(open) = open_brackets.pop() {
        return Err(GrammarError::Syntax {
            message: format!("unterminated '{open}' group in '{template}'"),
        });
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Analyse one template token by shape.
fn analyse_token(
    token: &str,
    pattern: &GrammarPattern,
    guard: &mut Vec<String>,
) -> Result<Build, GrammarError> {
    if token.len() >= 2 && token.starts_with('<') && token.ends_with('>') {
        let name = &token[1..token.len() - 1];
        return Ok(match name {
            "string" => leaf(BuildKind::StringLit, pattern),
            "number" => leaf(BuildKind::Number, pattern),
            "identifier" => leaf(BuildKind::Identifier, pattern),
            _ => match pattern.dictionary.get(name) {
                Some(referenced) => compile_pattern(referenced, guard)?,
                // an unresolved placeholder matches a free identifier
                None => leaf(BuildKind::Identifier, pattern),
            },
        });
    }
    if token.starts_with('[') && spans_whole_token(token) {
        let mut group = analyse_template(&token[1..token.len() - 1], pattern, guard)?;
        group.ignorable = true;
        return Ok(group);
    }
    if token.starts_with('(') && spans_whole_token(token) {
        // the parens are matched text, unlike the optionality brackets
        let inner = analyse_template(&token[1..token.len() - 1], pattern, guard)?;
        let items = vec![text("(", pattern), inner, text(")", pattern)];
        return Ok(join(items, BuildKind::Sequence, pattern));
    }
    if token.len() >= 2 && token.starts_with('{') && token.ends_with('}') {
        let name = &token[1..token.len() - 1];
        let scope =
            pattern
                .scopes
                .get(name)
                .ok_or_else(|| GrammarError::UndefinedScopeReference {
                    name: name.to_string(),
                })?;
        return compile_scope(scope, pattern, guard);
    }
    Ok(text(token, pattern))
}

/// Does the group opened by the token's first character close exactly at
/// its last character? `(a)(b)` does not qualify and stays a literal.
fn spans_whole_token(token: &str) -> bool {
    let mut depth = 0usize;
    for (i, ch) in token.char_indices() {
        match ch {
            '[' | '(' => depth += 1,
            ']' | ')' => {
                depth -= 1;
                if depth == 0 {
                    return i == token.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

/// Compile a token-level scope: begin literal, one (ignorable) matcher per
/// inner pattern, end literal, as one rigid sequence.
fn compile_scope(
    scope: &GrammarScope,
    pattern: &GrammarPattern,
    guard: &mut Vec<String>,
) -> Result<Build, GrammarError> {
    if scope.begin.is_empty() || scope.end.is_empty() {
        return Err(GrammarError::EmptyPattern {
            pattern: format!("scope '{}' .. '{}'", scope.begin, scope.end),
        });
    }
    let mut items = vec![text(&scope.begin, pattern)];
    for inner in &scope.patterns {
        items.push(compile_pattern(inner, guard)?);
    }
    items.push(text(&scope.end, pattern));
    Ok(join(items, BuildKind::Scope, pattern))
}

fn leaf(kind: BuildKind, pattern: &GrammarPattern) -> Build {
    Build {
        kind,
        ignorable: false,
        origin: Some(pattern.name.clone()),
    }
}

fn text(literal: &str, pattern: &GrammarPattern) -> Build {
    Build {
        kind: BuildKind::Text {
            literal: literal.to_string(),
            case_sensitive: pattern.case_sensitive,
        },
        ignorable: false,
        origin: Some(pattern.name.clone()),
    }
}

fn separator(pattern: &GrammarPattern) -> Build {
    Build {
        kind: BuildKind::Whitespace,
        ignorable: true,
        origin: Some(pattern.name.clone()),
    }
}

/// Join matchers into a composite of `wrap` kind, interleaving ignorable
/// whitespace separators; a singleton collapses to its only item.
fn join(items: Vec<Build>, wrap: fn(Vec<Build>) -> BuildKind, pattern: &GrammarPattern) -> Build {
    if items.len() == 1 {
        return items.into_iter().next().expect("len checked");
    }
    let mut spaced = Vec::with_capacity(items.len() * 2 - 1);
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            spaced.push(separator(pattern));
        }
        spaced.push(item);
    }
    Build {
        kind: wrap(spaced),
        ignorable: false,
        origin: Some(pattern.name.clone()),
    }
}

/// Collapse a singleton wrapper to its only child, propagating nothing but
/// what the child already carries; multiple children get the wrapper kind.
fn collapse(mut items: Vec<Build>, wrap: fn(Vec<Build>) -> BuildKind) -> Build {
    debug_assert!(!items.is_empty());
    if items.len() == 1 {
        items.pop().expect("len checked")
    } else {
        Build {
            kind: wrap(items),
            ignorable: false,
            origin: None,
        }
    }
}

fn intern_root(build: Build) -> CompiledPattern {
    let mut nodes = Vec::new();
    let root = intern(build, None, &mut nodes);
    CompiledPattern::new(nodes, root)
}

/// Flatten a build tree into the arena, assigning parent links.
fn intern(build: Build, parent: Option<NodeId>, nodes: &mut Vec<PatternNode>) -> NodeId {
    let id = nodes.len();
    // placeholder kind; overwritten once the children know their parent id
    nodes.push(PatternNode {
        kind: PatternKind::Whitespace,
        parent,
        ignorable: build.ignorable,
        origin: build.origin,
    });
    let kind = match build.kind {
        BuildKind::Text {
            literal,
            case_sensitive,
        } => PatternKind::Text {
            literal,
            case_sensitive,
        },
        BuildKind::Whitespace => PatternKind::Whitespace,
        BuildKind::StringLit => PatternKind::StringLit,
        BuildKind::Number => PatternKind::Number,
        BuildKind::Identifier => PatternKind::Identifier,
        BuildKind::Sequence(items) => PatternKind::Sequence {
            children: intern_children(items, id, nodes),
        },
        BuildKind::Alternatives(items) => PatternKind::Alternatives {
            children: intern_children(items, id, nodes),
        },
        BuildKind::Scope(items) => PatternKind::Scope {
            children: intern_children(items, id, nodes),
        },
    };
    nodes[id].kind = kind;
    id
}

fn intern_children(items: Vec<Build>, parent: NodeId, nodes: &mut Vec<PatternNode>) -> Vec<NodeId> {
    items
        .into_iter()
        .map(|item| intern(item, Some(parent), nodes))
        .collect()
}
