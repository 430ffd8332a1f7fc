//! Insert-template expansion for completion candidates.
//!
//! Templates use `${name}` placeholders (default text `name`) and `${}` empty tab stops, e.g.
//! `entity ${Name} {\n  attributes {\n    id: UUID\n  }\n}`. `\$` inserts a literal dollar.
//!
//! There are no choices, variables, or nested placeholders. The expansion reports where each
//! placeholder landed so a host can walk the tab stops.

use crate::completion::{CompletionCandidate, CompletionResult};
use std::ops::Range;

/// Result of expanding an insert template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetExpansion {
    /// Text to insert, placeholders replaced by their default text.
    pub text: String,
    /// Char ranges (relative to `text`) of each placeholder, in template order.
    pub tab_stops: Vec<Range<usize>>,
    /// Char offset (relative to `text`) where the cursor should go after inserting.
    pub cursor: usize,
}

/// Expand a template into plain text plus tab stops.
pub fn expand(template: &str) -> SnippetExpansion {
    let mut text = String::with_capacity(template.len());
    let mut text_chars = 0usize;
    let mut tab_stops = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'$') => {
                chars.next();
                text.push('$');
                text_chars += 1;
            }
            '$' if chars.peek() == Some(&'{') => {
                chars.next(); // consume '{'
                let start = text_chars;
                for ch in chars.by_ref() {
                    if ch == '}' {
                        break;
                    }
                    text.push(ch);
                    text_chars += 1;
                }
                tab_stops.push(start..text_chars);
            }
            other => {
                text.push(other);
                text_chars += 1;
            }
        }
    }

    let cursor = tab_stops.first().map_or(text_chars, |stop| stop.start);
    SnippetExpansion {
        text,
        tab_stops,
        cursor,
    }
}

/// A document after a completion candidate was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedCompletion {
    /// The full new document text.
    pub text: String,
    /// Absolute char ranges of the inserted tab stops.
    pub tab_stops: Vec<Range<usize>>,
    /// Absolute char offset for the cursor.
    pub cursor: usize,
}

/// Apply `candidate` from `result` to `doc`, replacing `[result.replace_from, cursor)`.
///
/// `cursor` is the char offset the completion was requested at. Offsets past the end of the
/// document are clamped.
pub fn apply_completion(
    doc: &str,
    result: &CompletionResult,
    candidate: &CompletionCandidate,
    cursor: usize,
) -> AppliedCompletion {
    let expansion = expand(candidate.insert_text());

    let end = byte_offset(doc, cursor);
    let start = byte_offset(doc, result.replace_from).min(end);
    let base = doc[..start].chars().count();

    let mut text = String::with_capacity(doc.len() + expansion.text.len());
    text.push_str(&doc[..start]);
    text.push_str(&expansion.text);
    text.push_str(&doc[end..]);

    AppliedCompletion {
        text,
        tab_stops: expansion
            .tab_stops
            .iter()
            .map(|stop| base + stop.start..base + stop.end)
            .collect(),
        cursor: base + expansion.cursor,
    }
}

/// Byte offset of the `char_offset`-th char, clamped to the end of `text`.
pub(crate) fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(idx, _)| idx)
}
