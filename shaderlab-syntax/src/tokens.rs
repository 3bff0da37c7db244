//! Token grammars for ShaderLab constructs
//!
//! Declarative grammars for the statements found inside ShaderLab blocks:
//! property declarations (`_MainTex ("Texture", 2D) = "white" {}`), tag
//! pairs, and render-state statements (`Cull Back`, `ZWrite Off`). Compiled
//! forms are cached per pattern; the statics here are the shared topology
//! every match attempt runs against.

use once_cell::sync::Lazy;

use shaderlab_grammar::grammar::pattern::{
    BracketPair, CompiledPattern, Grammar, GrammarDeclare, GrammarPattern, GrammarScope,
    PatternKind,
};

/// Property type names accepted in a property declaration
fn property_kind() -> GrammarPattern {
    GrammarPattern::new(
        "property-kind",
        &[
            "2D",
            "3D",
            "Cube",
            "Color",
            "Vector",
            "Int",
            "Float",
            "Range ( <number> , <number> )",
        ],
    )
}

/// Property default values: scalar, texture name with optional options
/// block, or a four-component vector
fn property_default() -> GrammarPattern {
    GrammarPattern::new(
        "property-default",
        &[
            "( <number> , <number> , <number> , <number> )",
            "<string> [{options}]",
            "<number>",
        ],
    )
    .with_scope("options", GrammarScope::new("{", "}"))
}

/// One `Properties` block entry
pub fn property_pattern() -> GrammarPattern {
    GrammarPattern::new(
        "property",
        &["<identifier> ( <string> , <kind> ) = <default>"],
    )
    .with_reference("kind", property_kind())
    .with_reference("default", property_default())
}

/// A `Tags { "Key" = "Value" }` statement
pub fn tags_pattern() -> GrammarPattern {
    let body = GrammarScope::new("{", "}")
        .with_pattern(GrammarPattern::new("tag-pair", &["<string> = <string>"]));
    GrammarPattern::new("tags", &["Tags {body}"]).with_scope("body", body)
}

/// Render-state statements; ShaderLab keywords are case-insensitive
pub fn render_state_pattern() -> GrammarPattern {
    let toggle = GrammarPattern::new("toggle", &["On", "Off"]).case_insensitive();
    let cull_mode = GrammarPattern::new("cull-mode", &["Back", "Front", "Off"]).case_insensitive();
    GrammarPattern::new("render-state", &["Cull <cull-mode>", "ZWrite <toggle>", "Lighting <toggle>"])
        .case_insensitive()
        .with_reference("toggle", toggle)
        .with_reference("cull-mode", cull_mode)
}

/// The grammar driven over `Properties` block interiors
pub static PROPERTIES_GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
    let declare = GrammarDeclare {
        name: "shaderlab.properties".to_string(),
        patterns: vec![property_pattern()],
        ignore: None,
        string_delimiters: vec!['"'],
        bracket_pairs: vec![
            BracketPair {
                open: '(',
                close: ')',
            },
            BracketPair {
                open: '{',
                close: '}',
            },
            BracketPair {
                open: '[',
                close: ']',
            },
        ],
    };
    Grammar::compile(&declare).expect("static grammar compiles")
});

/// The grammar driven over `SubShader`/`Pass` block interiors
pub static BLOCK_GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
    let declare = GrammarDeclare {
        name: "shaderlab.block".to_string(),
        patterns: vec![tags_pattern(), render_state_pattern()],
        ignore: None,
        string_delimiters: vec!['"'],
        bracket_pairs: vec![BracketPair {
            open: '{',
            close: '}',
        }],
    };
    Grammar::compile(&declare).expect("static grammar compiles")
});

/// A swizzle suffix matcher (`xyz`, `rgba`-style component runs) of fixed
/// length, built directly on the automaton
pub fn swizzle_pattern(count: usize) -> CompiledPattern {
    CompiledPattern::leaf(PatternKind::CharSet {
        chars: vec!['x', 'y', 'z', 'w'],
        count,
    })
}
