#![warn(missing_docs)]
//! IPL Core - Headless Analysis Engine for the IPL Policy Language
//!
//! # Overview
//!
//! `ipl-core` is the language-analysis kernel behind the policy editor: a streaming tokenizer,
//! a structural linter, and a schema-aware completion resolver. It owns no document buffer,
//! cursor, or UI. The host passes an immutable text snapshot into each operation and renders
//! what comes back.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Processing Edits (lint / highlight)        │  ← Host integration
//! ├─────────────────────────────────────────────┤
//! │  Completion Resolver + Snippet Expansion    │  ← Suggestions
//! ├─────────────────────────────────────────────┤
//! │  Validator (line scanner, diagnostics)      │  ← Lint
//! ├─────────────────────────────────────────────┤
//! │  Schema Extractor                           │  ← Entities / relations / permissions
//! ├─────────────────────────────────────────────┤
//! │  Tokenizer (per-line state machine)         │  ← Highlighting
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use ipl_core::{CompletionTrigger, complete, validate};
//!
//! let doc = "schema acl v1\nentity User {}\nentity Document {\n  relations {\n    owner: User\n  }\n  permissions {\n    view: \n  }\n}\n";
//!
//! let result = validate(doc);
//! assert!(result.valid);
//!
//! let cursor = doc.find("view: ").unwrap() + "view: ".len();
//! let completion = complete(doc, cursor, CompletionTrigger::Typing).unwrap();
//! assert!(completion.candidates.iter().any(|c| c.label == "owner"));
//! ```
//!
//! # Module Description
//!
//! - [`tokenizer`] - streaming per-line tokenizer
//! - [`schema`] - entity / relation / permission extraction
//! - [`validate`] - line-based linter producing [`Diagnostic`]s
//! - [`completion`] - context classification and candidate tables
//! - [`snippet`] - insert-template expansion
//! - [`processing`] - generic processing edits for hosts
//! - [`config`] - lint settings and debounce policy
//!
//! # Offsets
//!
//! Token spans are byte ranges within a line. Everything else (diagnostics, completion
//! offsets, highlight intervals) uses document-absolute char offsets.
//!
//! # Logging
//!
//! Operations emit `tracing` events at `debug`/`trace` level. No subscriber is installed.

pub mod completion;
pub mod config;
pub mod diagnostics;
mod error;
pub mod intervals;
pub mod line_index;
pub mod processing;
pub mod schema;
pub mod snippet;
pub mod tokenizer;
pub mod validate;

pub use completion::{
    CompletionCandidate, CompletionContext, CompletionKind, CompletionResult, CompletionTrigger,
    complete, complete_with_context,
};
pub use config::{DEFAULT_LINT_DELAY_MS, LintConfig, LintDebounce};
pub use diagnostics::{Diagnostic, DiagnosticRange, DiagnosticSeverity};
pub use error::IplError;
pub use intervals::{Interval, StyleId, StyleLayerId};
pub use line_index::LineIndex;
pub use processing::{DocumentProcessor, LintProcessor, ProcessingEdit};
pub use schema::{
    PermissionDef, RelationDef, SchemaContext, extract_entities, extract_permissions,
    extract_relations,
};
pub use snippet::{AppliedCompletion, SnippetExpansion, apply_completion, expand};
pub use tokenizer::{Token, TokenKind, TokenizerState, tokenize};
pub use validate::{ValidationResult, validate, validate_with};
