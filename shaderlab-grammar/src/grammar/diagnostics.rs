//! Diagnostic extraction
//!
//! Structured error/warning records for editor consumption. A
//! [`MatchCapturePattern`] pairs a match regular expression with the capture
//! groups that are *significant*: groups an author declared must participate
//! in a match. Running the pattern over a document range emits one
//! [`Diagnostic`] per significant group that failed to capture, covering the
//! whole match span.
//!
//! Diagnostics are data, not control flow: extraction never fails and an
//! unmatched capture never aborts the surrounding match.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;

use crate::grammar::document::{DocumentView, SourceRange};
use crate::grammar::error::GrammarError;

/// Diagnostic severity levels matching the LSP protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Information,
    Hint,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "error"),
            DiagnosticSeverity::Warning => write!(f, "warning"),
            DiagnosticSeverity::Information => write!(f, "info"),
            DiagnosticSeverity::Hint => write!(f, "hint"),
        }
    }
}

/// One structured diagnostic record
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub range: SourceRange,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub code: Option<String>,
    pub source: String,
}

impl Diagnostic {
    pub fn new(range: SourceRange, severity: DiagnosticSeverity, message: String) -> Self {
        Self {
            range,
            severity,
            message,
            code: None,
            source: "shaderlab-grammar".to_string(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {} at {}",
            self.severity, self.source, self.message, self.range.start
        )
    }
}

/// What to report when a significant capture group does not participate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedDescriptor {
    pub severity: DiagnosticSeverity,
    pub message: String,
}

/// Per-pattern diagnostic metadata: a match regular expression and, per
/// capture-group index, the descriptor to emit when that group fails to
/// participate
#[derive(Debug, Clone)]
pub struct MatchCapturePattern {
    pub pattern: Regex,
    /// Keyed by capture-group index; ordered so emission is deterministic
    pub captures: BTreeMap<usize, UnmatchedDescriptor>,
}

impl MatchCapturePattern {
    pub fn new(pattern: &str) -> Result<Self, GrammarError> {
        let pattern = Regex::new(pattern).map_err(|e| GrammarError::Syntax {
            message: format!("invalid capture pattern '{pattern}': {e}"),
        })?;
        Ok(Self {
            pattern,
            captures: BTreeMap::new(),
        })
    }

    pub fn with_unmatched(
        mut self,
        index: usize,
        severity: DiagnosticSeverity,
        message: impl Into<String>,
    ) -> Self {
        self.captures.insert(
            index,
            UnmatchedDescriptor {
                severity,
                message: message.into(),
            },
        );
        self
    }
}

/// Run a capture pattern over `[start, end)` and emit one diagnostic per
/// declared capture group that did not participate in a match.
pub fn extract_diagnostics(
    declare: &MatchCapturePattern,
    doc: &impl DocumentView,
    start: usize,
    end: usize,
) -> Vec<Diagnostic> {
    let text = doc.text_in(start..end);
    let mut diagnostics = Vec::new();
    for caps in declare.pattern.captures_iter(text) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        let span = start + whole.start()..start + whole.end();
        for (&index, descriptor) in &declare.captures {
            if caps.get(index).is_none() {
                diagnostics.push(Diagnostic::new(
                    doc.range_at(span.clone()),
                    descriptor.severity,
                    descriptor.message.clone(),
                ));
            }
        }
    }
    diagnostics
}
