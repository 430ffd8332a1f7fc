//! Diagnostics data model.
//!
//! Diagnostics are produced fresh by every validation pass. The host owns their lifecycle:
//! - problems panels / gutter markers
//! - hover tooltips / inline messages
//! - mapping diagnostics to underline styles (see [`DiagnosticSeverity::style_id`])

use crate::intervals::{
    DIAGNOSTIC_ERROR_STYLE_ID, DIAGNOSTIC_INFO_STYLE_ID, DIAGNOSTIC_WARNING_STYLE_ID, Interval,
    StyleId,
};
use serde::Serialize;

/// A half-open character-offset range (`start..end`) in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiagnosticRange {
    /// Range start offset (inclusive), in Unicode scalar values (`char`) from the start of the document.
    pub start: usize,
    /// Range end offset (exclusive), in Unicode scalar values (`char`) from the start of the document.
    pub end: usize,
}

impl DiagnosticRange {
    /// Create a new diagnostic range.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns `true` for a zero-width range (e.g. the end-of-document brace check).
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Diagnostic severity levels.
///
/// Only [`DiagnosticSeverity::Error`] blocks saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// Structural or semantic violation.
    Error,
    /// Naming-convention violation.
    Warning,
    /// Soft hint.
    Info,
}

impl DiagnosticSeverity {
    /// Lowercase label (`"error"`, `"warning"`, `"info"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Underline style used for this severity in the diagnostics style layer.
    pub fn style_id(self) -> StyleId {
        match self {
            Self::Error => DIAGNOSTIC_ERROR_STYLE_ID,
            Self::Warning => DIAGNOSTIC_WARNING_STYLE_ID,
            Self::Info => DIAGNOSTIC_INFO_STYLE_ID,
        }
    }
}

/// A single diagnostic item for the current document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Zero-based line the diagnostic was reported on.
    pub line: usize,
    /// Diagnostic range in character offsets.
    pub range: DiagnosticRange,
    /// Diagnostic severity.
    pub severity: DiagnosticSeverity,
    /// Stable rule identifier (e.g. `"unknown-type"`).
    pub code: &'static str,
    /// Diagnostic message.
    pub message: String,
}

impl Diagnostic {
    /// Source label hosts attach to IPL diagnostics.
    pub const SOURCE: &'static str = "IPL";

    /// Create a new diagnostic.
    pub fn new(
        line: usize,
        range: DiagnosticRange,
        severity: DiagnosticSeverity,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            line,
            range,
            severity,
            code,
            message: message.into(),
        }
    }

    /// Underline interval for the diagnostics style layer of a document `doc_len` chars long.
    ///
    /// Zero-width ranges are widened to one char so they stay visible. At the end of the
    /// document the widening covers the previous char instead.
    pub fn underline(&self, doc_len: usize) -> Interval {
        let DiagnosticRange { start, end } = self.range;
        let (start, end) = if end > start {
            (start, end)
        } else if start < doc_len {
            (start, start + 1)
        } else {
            let end = start.min(doc_len);
            (end.saturating_sub(1), end)
        };
        Interval::new(start, end, self.severity.style_id())
    }
}
