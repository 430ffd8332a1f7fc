//! `ipl-core-highlight` - token-based syntax highlighting for IPL documents.
//!
//! Runs the `ipl-core` tokenizer over every line of a document, threading the tokenizer state
//! so strings and block comments can span lines, and converts the tokens into char-offset
//! style intervals.

use ipl_core::intervals::{Interval, StyleId, StyleLayerId};
use ipl_core::processing::{DocumentProcessor, ProcessingEdit};
use ipl_core::tokenizer::{Token, TokenKind, TokenizerState, tokenize};
use ipl_core::LineIndex;
use std::convert::Infallible;

/// Style ids used for each token kind.
///
/// A `None` entry leaves that kind unstyled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IplStyles {
    pub keyword: Option<StyleId>,
    pub block_keyword: Option<StyleId>,
    pub ty: Option<StyleId>,
    pub string: Option<StyleId>,
    pub comment: Option<StyleId>,
    pub number: Option<StyleId>,
    pub operator: Option<StyleId>,
    pub punctuation: Option<StyleId>,
    pub decorator: Option<StyleId>,
    pub relation_ref: Option<StyleId>,
    pub identifier: Option<StyleId>,
}

impl IplStyles {
    /// The style id for `kind`, if that kind is styled.
    pub fn style_for(&self, kind: TokenKind) -> Option<StyleId> {
        match kind {
            TokenKind::Keyword => self.keyword,
            TokenKind::BlockKeyword => self.block_keyword,
            TokenKind::Type => self.ty,
            TokenKind::String => self.string,
            TokenKind::Comment => self.comment,
            TokenKind::Number => self.number,
            TokenKind::Operator => self.operator,
            TokenKind::Punctuation => self.punctuation,
            TokenKind::Decorator => self.decorator,
            TokenKind::RelationRef => self.relation_ref,
            TokenKind::Identifier => self.identifier,
            TokenKind::None => None,
        }
    }
}

impl Default for IplStyles {
    fn default() -> Self {
        Self {
            keyword: Some(IPL_STYLE_KEYWORD),
            block_keyword: Some(IPL_STYLE_BLOCK_KEYWORD),
            ty: Some(IPL_STYLE_TYPE),
            string: Some(IPL_STYLE_STRING),
            comment: Some(IPL_STYLE_COMMENT),
            number: Some(IPL_STYLE_NUMBER),
            operator: Some(IPL_STYLE_OPERATOR),
            punctuation: Some(IPL_STYLE_PUNCTUATION),
            decorator: Some(IPL_STYLE_DECORATOR),
            relation_ref: Some(IPL_STYLE_RELATION_REF),
            identifier: None,
        }
    }
}

/// Whole-document IPL highlighter.
#[derive(Debug, Clone, Default)]
pub struct IplHighlighter {
    styles: IplStyles,
}

impl IplHighlighter {
    pub fn new(styles: IplStyles) -> Self {
        Self { styles }
    }

    pub fn styles(&self) -> &IplStyles {
        &self.styles
    }

    /// Tokenize every line and return style intervals (char offsets), in document order.
    ///
    /// Each call starts from a fresh [`TokenizerState`].
    pub fn highlight(&self, line_index: &LineIndex) -> Vec<Interval> {
        let mut intervals = Vec::new();
        let mut state = TokenizerState::default();

        for line in 0..line_index.line_count() {
            let Some(line_text) = line_index.get_line_text(line) else {
                continue;
            };
            let line_start = line_index.position_to_char_offset(line, 0);

            let (tokens, next_state) = tokenize(&line_text, state);
            state = next_state;

            intervals.extend(
                tokens
                    .iter()
                    .filter_map(|token| self.interval_for(line_start, &line_text, token)),
            );
        }

        tracing::trace!(
            lines = line_index.line_count(),
            intervals = intervals.len(),
            "highlighted IPL document"
        );
        intervals
    }

    /// Convenience wrapper over [`highlight`](Self::highlight) for a plain string.
    pub fn highlight_text(&self, text: &str) -> Vec<Interval> {
        self.highlight(&LineIndex::from_text(text))
    }

    fn interval_for(&self, line_start: usize, line_text: &str, token: &Token) -> Option<Interval> {
        let style_id = self.styles.style_for(token.kind)?;
        interval_from_span(line_start, line_text, token.start, token.end, style_id)
    }
}

/// A processor that applies an [`IplHighlighter`] into a [`StyleLayerId`] via `ipl-core`'s
/// generic processing interface.
#[derive(Debug, Clone)]
pub struct IplHighlightProcessor {
    layer: StyleLayerId,
    highlighter: IplHighlighter,
}

impl IplHighlightProcessor {
    pub fn new(layer: StyleLayerId, highlighter: IplHighlighter) -> Self {
        Self { layer, highlighter }
    }

    pub fn layer(&self) -> StyleLayerId {
        self.layer
    }

    pub fn highlighter(&self) -> &IplHighlighter {
        &self.highlighter
    }

    pub fn highlighter_mut(&mut self) -> &mut IplHighlighter {
        &mut self.highlighter
    }
}

impl Default for IplHighlightProcessor {
    fn default() -> Self {
        Self::new(StyleLayerId::IPL_SYNTAX, IplHighlighter::default())
    }
}

impl DocumentProcessor for IplHighlightProcessor {
    type Error = Infallible;

    fn process(&mut self, text: &str) -> Result<Vec<ProcessingEdit>, Self::Error> {
        let intervals = self.highlighter.highlight_text(text);
        Ok(vec![ProcessingEdit::ReplaceStyleLayer {
            layer: self.layer,
            intervals,
        }])
    }
}

/// Default `StyleId` constants for IPL token kinds.
///
/// These are only identifiers. UI/theme layer is expected to map them to actual colors.
pub const IPL_STYLE_KEYWORD: StyleId = 0x0200_0001;
pub const IPL_STYLE_BLOCK_KEYWORD: StyleId = 0x0200_0002;
pub const IPL_STYLE_TYPE: StyleId = 0x0200_0003;
pub const IPL_STYLE_STRING: StyleId = 0x0200_0004;
pub const IPL_STYLE_COMMENT: StyleId = 0x0200_0005;
pub const IPL_STYLE_NUMBER: StyleId = 0x0200_0006;
pub const IPL_STYLE_OPERATOR: StyleId = 0x0200_0007;
pub const IPL_STYLE_PUNCTUATION: StyleId = 0x0200_0008;
pub const IPL_STYLE_DECORATOR: StyleId = 0x0200_0009;
pub const IPL_STYLE_RELATION_REF: StyleId = 0x0200_000A;

fn interval_from_span(
    line_start_offset: usize,
    line_text: &str,
    start_byte: usize,
    end_byte: usize,
    style_id: StyleId,
) -> Option<Interval> {
    if start_byte >= end_byte || end_byte > line_text.len() {
        return None;
    }

    let start_col = line_text[..start_byte].chars().count();
    let end_col = start_col + line_text[start_byte..end_byte].chars().count();

    Some(Interval::new(
        line_start_offset + start_col,
        line_start_offset + end_col,
        style_id,
    ))
}
