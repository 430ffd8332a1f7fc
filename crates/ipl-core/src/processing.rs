//! Generic document processing interfaces.
//!
//! This module defines a shared "edit" format for derived document state, such as:
//! - syntax highlighting (style layers)
//! - lint diagnostics
//!
//! Processors (the linter here, the highlighter in `ipl-core-highlight`) produce
//! [`ProcessingEdit`] values; the host applies them to whatever it renders.

use crate::config::LintConfig;
use crate::diagnostics::Diagnostic;
use crate::intervals::{Interval, StyleLayerId};
use crate::validate::validate_with;
use std::convert::Infallible;

/// A change to derived document state (highlighting, diagnostics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingEdit {
    /// Replace an entire style layer with the given intervals (char offsets).
    ReplaceStyleLayer {
        /// The style layer being replaced.
        layer: StyleLayerId,
        /// The full set of style intervals for the layer (char offsets, half-open).
        intervals: Vec<Interval>,
    },
    /// Clear a style layer.
    ClearStyleLayer {
        /// The style layer being cleared.
        layer: StyleLayerId,
    },
    /// Replace the full diagnostic list.
    ReplaceDiagnostics {
        /// Diagnostics in line order.
        diagnostics: Vec<Diagnostic>,
    },
    /// Clear all diagnostics.
    ClearDiagnostics,
}

/// A generic processor that produces [`ProcessingEdit`]s for a document snapshot.
pub trait DocumentProcessor {
    /// The error type returned by [`DocumentProcessor::process`].
    type Error;

    /// Compute derived state updates for `text`.
    ///
    /// Implementations never mutate the document; they return edits the caller applies.
    fn process(&mut self, text: &str) -> Result<Vec<ProcessingEdit>, Self::Error>;
}

/// Runs the validator and publishes its diagnostics plus matching underlines.
#[derive(Debug, Clone)]
pub struct LintProcessor {
    config: LintConfig,
    valid: bool,
}

impl LintProcessor {
    /// Create a processor with the given lint settings.
    pub fn new(config: LintConfig) -> Self {
        Self {
            config,
            valid: true,
        }
    }

    /// Lint settings in use.
    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    /// Whether the last processed snapshot had no errors (save gate).
    ///
    /// `true` before the first run.
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

impl Default for LintProcessor {
    fn default() -> Self {
        Self::new(LintConfig::default())
    }
}

impl DocumentProcessor for LintProcessor {
    type Error = Infallible;

    fn process(&mut self, text: &str) -> Result<Vec<ProcessingEdit>, Self::Error> {
        let result = validate_with(text, &self.config);
        self.valid = result.valid;

        if result.diagnostics.is_empty() {
            return Ok(vec![
                ProcessingEdit::ClearDiagnostics,
                ProcessingEdit::ClearStyleLayer {
                    layer: StyleLayerId::DIAGNOSTICS,
                },
            ]);
        }

        let doc_len = text.chars().count();
        let intervals = result
            .diagnostics
            .iter()
            .map(|d| d.underline(doc_len))
            .collect();
        Ok(vec![
            ProcessingEdit::ReplaceDiagnostics {
                diagnostics: result.diagnostics,
            },
            ProcessingEdit::ReplaceStyleLayer {
                layer: StyleLayerId::DIAGNOSTICS,
                intervals,
            },
        ])
    }
}
