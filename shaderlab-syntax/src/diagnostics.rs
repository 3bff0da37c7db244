//! Diagnostic patterns for common ShaderLab authoring mistakes
//!
//! Capture patterns run over `Properties` block interiors; each significant
//! capture group that fails to participate produces one diagnostic record
//! for the hosting layer to publish.

use once_cell::sync::Lazy;

use shaderlab_grammar::grammar::diagnostics::{
    extract_diagnostics, Diagnostic, DiagnosticSeverity, MatchCapturePattern,
};
use shaderlab_grammar::grammar::document::DocumentView;

/// A property declaration: name, display string, type, then the default
/// value clause as capture group 4
static PROPERTY_DECLARATION: Lazy<MatchCapturePattern> = Lazy::new(|| {
    MatchCapturePattern::new(
        r#"(?m)^\s*(_?[A-Za-z]\w*)\s*\(\s*"([^"]*)"\s*,\s*([A-Za-z0-9]+(?:\s*\([^)]*\))?)\s*\)(?:\s*=\s*(\S[^\r\n]*))?"#,
    )
    .expect("static diagnostic pattern")
    .with_unmatched(
        4,
        DiagnosticSeverity::Warning,
        "property declaration has no default value",
    )
});

/// Collect diagnostics for a `Properties` block interior.
pub fn property_diagnostics(doc: &impl DocumentView, start: usize, end: usize) -> Vec<Diagnostic> {
    extract_diagnostics(&PROPERTY_DECLARATION, doc, start, end)
        .into_iter()
        .map(|diag| diag.with_source("shaderlab-syntax").with_code("property-no-default"))
        .collect()
}
