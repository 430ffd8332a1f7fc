//! Line-oriented IPL tokenizer.
//!
//! The tokenizer is a streaming scanner: it sees one line at a time and threads a tiny
//! [`TokenizerState`] from line to line so strings and block comments can span lines.
//! It never fails. Anything it does not recognize becomes a [`TokenKind::None`] token and
//! scanning continues, so highlighting survives arbitrary input.
//!
//! Token spans are **byte** ranges within the line passed to [`tokenize`], so callers can slice
//! the line directly. The returned tokens always cover the whole line without gaps.

use ipl_core_lang::{is_block_keyword, is_keyword, is_operator_word, is_type};
use serde::Serialize;
use std::ops::Range;

/// Token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    /// General keyword (`entity`, `schema`, `when`, ...).
    Keyword,
    /// Block-opening keyword (`attributes`, `relations`, ...).
    BlockKeyword,
    /// Built-in type, or an identifier directly followed by `#` (`User#member`).
    Type,
    /// String literal, including its quotes.
    String,
    /// Line or block comment.
    Comment,
    /// Number or version literal (`42`, `1.5`, `v1.0`).
    Number,
    /// Comparison operator or word operator (`==`, `and`, `in_cidr`).
    Operator,
    /// Structural punctuation (`{`, `->`, `:`, `|`, ...).
    Punctuation,
    /// Decorator (`@unique`).
    Decorator,
    /// Relation reference after `#` (`#member`).
    ///
    /// [`tokenize`] never emits this: `#` always starts a line comment.
    RelationRef,
    /// Any other identifier.
    Identifier,
    /// Whitespace or an unrecognized character.
    None,
}

/// A classified span of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Token category.
    pub kind: TokenKind,
    /// Start byte offset within the line.
    pub start: usize,
    /// End byte offset within the line (exclusive).
    pub end: usize,
}

impl Token {
    fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    /// Byte range within the line.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The token's text, given the line it was produced from.
    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        &line[self.range()]
    }
}

/// Scanner state carried across line boundaries within one highlighting pass.
///
/// Every independent pass must start from [`TokenizerState::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct TokenizerState {
    /// Inside a `"..."` string that has not been closed yet.
    pub in_string: bool,
    /// Inside a `/* ... */` comment that has not been closed yet.
    pub in_comment: bool,
}

/// Tokenize a single line, starting from `state`.
///
/// Returns the tokens for the line and the state to pass to the next line.
pub fn tokenize(line: &str, state: TokenizerState) -> (Vec<Token>, TokenizerState) {
    let mut scanner = Scanner {
        line,
        bytes: line.as_bytes(),
        pos: 0,
        state,
        tokens: Vec::new(),
    };
    scanner.run();
    (scanner.tokens, scanner.state)
}

struct Scanner<'a> {
    line: &'a str,
    bytes: &'a [u8],
    pos: usize,
    state: TokenizerState,
    tokens: Vec<Token>,
}

impl Scanner<'_> {
    fn run(&mut self) {
        if self.state.in_string {
            self.continue_string(0);
        } else if self.state.in_comment {
            self.continue_block_comment(0);
        }

        while self.pos < self.bytes.len() {
            self.next_token();
        }
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }

    fn rest(&self) -> &str {
        &self.line[self.pos..]
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        if self.pos > start {
            self.tokens.push(Token::new(kind, start, self.pos));
        }
    }

    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let start = self.pos;
        while self.pos < self.bytes.len() && pred(self.bytes[self.pos]) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Consume string content starting at `start`, up to and including the closing `"`.
    fn continue_string(&mut self, start: usize) {
        let mut i = self.pos;
        while i < self.bytes.len() {
            // A quote directly followed by `\` does not close the string.
            if self.bytes[i] == b'"' && self.bytes.get(i + 1) != Some(&b'\\') {
                self.pos = i + 1;
                self.state.in_string = false;
                self.push(TokenKind::String, start);
                return;
            }
            i += 1;
        }
        self.pos = self.bytes.len();
        self.push(TokenKind::String, start);
    }

    fn continue_block_comment(&mut self, start: usize) {
        match self.rest().find("*/") {
            Some(idx) => {
                self.pos += idx + 2;
                self.state.in_comment = false;
            }
            None => self.pos = self.bytes.len(),
        }
        self.push(TokenKind::Comment, start);
    }

    fn next_token(&mut self) {
        let start = self.pos;
        let rest = self.rest();

        // Whitespace runs carry no style but keep the spans contiguous.
        let ws_len: usize = rest
            .chars()
            .take_while(|c| c.is_whitespace())
            .map(char::len_utf8)
            .sum();
        if ws_len > 0 {
            self.pos += ws_len;
            self.push(TokenKind::None, start);
            return;
        }

        let b = self.bytes[start];

        if b == b'#' || rest.starts_with("//") {
            self.pos = self.bytes.len();
            self.push(TokenKind::Comment, start);
            return;
        }

        if rest.starts_with("/*") {
            self.pos += 2;
            self.state.in_comment = true;
            self.continue_block_comment(start);
            return;
        }

        if b == b'"' {
            self.pos += 1;
            self.state.in_string = true;
            self.continue_string(start);
            return;
        }

        if b == b'@' && self.peek_at(1).is_some_and(is_word_byte) {
            self.pos += 1;
            self.eat_while(is_word_byte);
            self.push(TokenKind::Decorator, start);
            return;
        }

        // Version literal (`v1`, `v1.0`), checked before identifiers.
        if b == b'v' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            self.eat_number();
            self.push(TokenKind::Number, start);
            return;
        }

        if b.is_ascii_digit() {
            self.eat_number();
            self.push(TokenKind::Number, start);
            return;
        }

        if let Some(len) = punctuation_len(rest) {
            self.pos += len;
            self.push(TokenKind::Punctuation, start);
            return;
        }

        if let Some(len) = comparison_len(rest) {
            self.pos += len;
            self.push(TokenKind::Operator, start);
            return;
        }

        if b.is_ascii_alphabetic() || b == b'_' {
            self.eat_while(is_word_byte);
            let kind = self.classify_word(&self.line[start..self.pos]);
            self.push(kind, start);
            return;
        }

        let len = rest.chars().next().map_or(1, char::len_utf8);
        self.pos += len;
        self.push(TokenKind::None, start);
    }

    /// `\d+(\.\d+)?`
    fn eat_number(&mut self) {
        self.eat_while(|c| c.is_ascii_digit());
        if self.peek_at(0) == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            self.eat_while(|c| c.is_ascii_digit());
        }
    }

    fn classify_word(&self, word: &str) -> TokenKind {
        if is_keyword(word) {
            TokenKind::Keyword
        } else if is_block_keyword(word) {
            TokenKind::BlockKeyword
        } else if is_type(word) {
            TokenKind::Type
        } else if is_operator_word(word) {
            TokenKind::Operator
        } else if self.peek_at(0) == Some(b'#') {
            TokenKind::Type
        } else {
            TokenKind::Identifier
        }
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn punctuation_len(rest: &str) -> Option<usize> {
    const TWO: [&str; 3] = ["->", "=>", "::"];
    if TWO.iter().any(|p| rest.starts_with(p)) {
        return Some(2);
    }
    match rest.as_bytes().first()? {
        b':' | b'{' | b'}' | b'(' | b')' | b'[' | b']' | b',' | b'.' | b'|' => Some(1),
        _ => None,
    }
}

fn comparison_len(rest: &str) -> Option<usize> {
    const TWO: [&str; 4] = ["==", "!=", "<=", ">="];
    if TWO.iter().any(|p| rest.starts_with(p)) {
        return Some(2);
    }
    match rest.as_bytes().first()? {
        b'<' | b'>' => Some(1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(line: &str) -> Vec<(TokenKind, &str)> {
        let (tokens, _) = tokenize(line, TokenizerState::default());
        tokens
            .iter()
            .filter(|t| t.kind != TokenKind::None || !t.text(line).trim().is_empty())
            .map(|t| (t.kind, t.text(line)))
            .collect()
    }

    fn assert_covers(line: &str, tokens: &[Token]) {
        let mut expected_start = 0;
        for token in tokens {
            assert_eq!(token.start, expected_start, "gap before {token:?} in {line:?}");
            assert!(token.end > token.start, "empty token {token:?} in {line:?}");
            expected_start = token.end;
        }
        assert_eq!(expected_start, line.len(), "tokens do not reach end of {line:?}");
    }

    #[test]
    fn test_entity_header() {
        assert_eq!(
            kinds("entity Document {"),
            vec![
                (TokenKind::Keyword, "entity"),
                (TokenKind::Identifier, "Document"),
                (TokenKind::Punctuation, "{"),
            ]
        );
    }

    #[test]
    fn test_schema_version_is_number() {
        assert_eq!(
            kinds("schema acl v1.2"),
            vec![
                (TokenKind::Keyword, "schema"),
                (TokenKind::Identifier, "acl"),
                (TokenKind::Number, "v1.2"),
            ]
        );
    }

    #[test]
    fn test_attribute_line() {
        assert_eq!(
            kinds("email: String @unique"),
            vec![
                (TokenKind::Identifier, "email"),
                (TokenKind::Punctuation, ":"),
                (TokenKind::Type, "String"),
                (TokenKind::Decorator, "@unique"),
            ]
        );
    }

    #[test]
    fn test_hash_after_entity_starts_comment() {
        assert_eq!(
            kinds("viewer: Team#member | owner"),
            vec![
                (TokenKind::Identifier, "viewer"),
                (TokenKind::Punctuation, ":"),
                (TokenKind::Type, "Team"),
                (TokenKind::Comment, "#member | owner"),
            ]
        );
    }

    #[test]
    fn test_detached_hash_is_comment() {
        assert_eq!(
            kinds("owner: User # the creator"),
            vec![
                (TokenKind::Identifier, "owner"),
                (TokenKind::Punctuation, ":"),
                (TokenKind::Type, "User"),
                (TokenKind::Comment, "# the creator"),
            ]
        );
        assert_eq!(kinds("// note"), vec![(TokenKind::Comment, "// note")]);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("a == b and c >= 1"),
            vec![
                (TokenKind::Identifier, "a"),
                (TokenKind::Operator, "=="),
                (TokenKind::Identifier, "b"),
                (TokenKind::Operator, "and"),
                (TokenKind::Identifier, "c"),
                (TokenKind::Operator, ">="),
                (TokenKind::Number, "1"),
            ]
        );
        assert_eq!(
            kinds("f() -> Boolean"),
            vec![
                (TokenKind::Identifier, "f"),
                (TokenKind::Punctuation, "("),
                (TokenKind::Punctuation, ")"),
                (TokenKind::Punctuation, "->"),
                (TokenKind::Type, "Boolean"),
            ]
        );
    }

    #[test]
    fn test_block_keyword_kind() {
        assert_eq!(
            kinds("relations {"),
            vec![
                (TokenKind::BlockKeyword, "relations"),
                (TokenKind::Punctuation, "{"),
            ]
        );
    }

    #[test]
    fn test_string_closes_on_same_line() {
        let line = r#"source: "mod" x"#;
        let (tokens, state) = tokenize(line, TokenizerState::default());
        assert_eq!(state, TokenizerState::default());
        let strings: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::String)
            .map(|t| t.text(line))
            .collect();
        assert_eq!(strings, vec![r#""mod""#]);
    }

    #[test]
    fn test_quote_closes_unless_followed_by_backslash() {
        // The closing check peeks at the next char, so `\"` still closes and `"\` does not.
        let line = r#""a\"b" c"#;
        let (tokens, state) = tokenize(line, TokenizerState::default());
        assert_eq!(
            tokens.iter().map(|t| (t.kind, t.text(line))).collect::<Vec<_>>(),
            vec![
                (TokenKind::String, r#""a\""#),
                (TokenKind::Identifier, "b"),
                (TokenKind::String, r#"" c"#),
            ]
        );
        assert!(state.in_string);

        let line = r#""x"\ y"#;
        let (tokens, state) = tokenize(line, TokenizerState::default());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert!(state.in_string);
    }

    #[test]
    fn test_unterminated_string_spans_lines() {
        let (first, state) = tokenize(r#"x: "abc"#, TokenizerState::default());
        assert!(state.in_string);
        assert_eq!(first.last().map(|t| t.kind), Some(TokenKind::String));

        let line = r#"def" y"#;
        let (second, state) = tokenize(line, state);
        assert!(!state.in_string);
        assert_eq!(second[0].kind, TokenKind::String);
        assert_eq!(second[0].text(line), r#"def""#);
        assert_eq!(second.last().map(|t| t.kind), Some(TokenKind::Identifier));
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let (_, state) = tokenize("a /* start", TokenizerState::default());
        assert!(state.in_comment);

        let (tokens, state) = tokenize("still comment", state);
        assert!(state.in_comment);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Comment);

        let line = "end */ entity";
        let (tokens, state) = tokenize(line, state);
        assert!(!state.in_comment);
        assert_eq!(tokens[0].text(line), "end */");
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Keyword));
    }

    #[test]
    fn test_unknown_characters_become_untyped() {
        assert_eq!(
            kinds("a ; b $"),
            vec![
                (TokenKind::Identifier, "a"),
                (TokenKind::None, ";"),
                (TokenKind::Identifier, "b"),
                (TokenKind::None, "$"),
            ]
        );
    }

    #[test]
    fn test_tokens_cover_every_line() {
        let lines = [
            "",
            "   ",
            "entity User {",
            "  name: String @unique",
            r#"  note: "unterminated"#,
            "  x: 1.5 v2 12abc",
            "  🎉 héllo → wörld",
            "@ # / * \" \\",
            "a#b #c /* d */ e",
            "\t\tviewer: Team#member | self",
        ];
        for line in lines {
            let (tokens, _) = tokenize(line, TokenizerState::default());
            assert_covers(line, &tokens);
            let (tokens, _) = tokenize(line, TokenizerState { in_string: true, in_comment: false });
            assert_covers(line, &tokens);
            let (tokens, _) = tokenize(line, TokenizerState { in_string: false, in_comment: true });
            assert_covers(line, &tokens);
        }
    }
}
