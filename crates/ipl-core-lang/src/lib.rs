#![warn(missing_docs)]
//! `ipl-core-lang` - static language data for IPL, the authorization policy language.
//!
//! This crate intentionally stays dependency-free and does **not** know about tokenizing,
//! validation, or completion. It provides the vocabulary tables and small config structs that
//! the analysis engine and hosts share.

/// Comment tokens/config for a given language.
///
/// Hosts use this to implement comment toggling in a UI-agnostic way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentConfig {
    /// Line comment token (e.g. `#`).
    pub line: Option<String>,
    /// Block comment start token (e.g. `/*`).
    pub block_start: Option<String>,
    /// Block comment end token (e.g. `*/`).
    pub block_end: Option<String>,
}

impl CommentConfig {
    /// Create a config that supports only line comments.
    pub fn line(token: impl Into<String>) -> Self {
        Self {
            line: Some(token.into()),
            block_start: None,
            block_end: None,
        }
    }

    /// Create a config that supports only block comments.
    pub fn block(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            line: None,
            block_start: Some(start.into()),
            block_end: Some(end.into()),
        }
    }

    /// Create a config that supports both line and block comments.
    pub fn line_and_block(
        line: impl Into<String>,
        block_start: impl Into<String>,
        block_end: impl Into<String>,
    ) -> Self {
        Self {
            line: Some(line.into()),
            block_start: Some(block_start.into()),
            block_end: Some(block_end.into()),
        }
    }

    /// The comment tokens IPL uses: `#` for line comments, `/* */` for block comments.
    ///
    /// `//` is also accepted as a line comment by the tokenizer, but `#` is the token used when
    /// toggling.
    pub fn ipl() -> Self {
        Self::line_and_block("#", "/*", "*/")
    }

    /// Returns `true` if a line comment token is configured.
    pub fn has_line(&self) -> bool {
        self.line.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Returns `true` if both block comment tokens are configured.
    pub fn has_block(&self) -> bool {
        self.block_start.as_deref().is_some_and(|s| !s.is_empty())
            && self.block_end.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Bracket pairs that hosts auto-close while typing IPL.
pub const BRACKET_PAIRS: &[(char, char)] = &[('(', ')'), ('[', ']'), ('{', '}'), ('"', '"')];

/// General keywords.
pub const KEYWORDS: &[&str] = &[
    "schema",
    "entity",
    "module",
    "derived",
    "wasm",
    "function",
    "when",
    "match",
    "from",
    "to",
    "on",
    "allow",
    "deny",
    "true",
    "false",
    "self",
    "principal",
    "resource",
    "context",
    "action",
    "source",
    "revision",
    "capabilities",
    "limits",
    "exports",
    "permission",
];

/// Keywords that open a block inside an entity or module.
pub const BLOCK_KEYWORDS: &[&str] = &["attributes", "relations", "permissions", "methods", "network"];

/// Type names highlighted as types.
pub const TYPES: &[&str] = &[
    "UUID",
    "String",
    "Boolean",
    "Timestamp",
    "Set",
    "Enum",
    "Context",
    "Resource",
    "User",
];

/// Word operators.
pub const OPERATORS: &[&str] = &["and", "or", "not", "in", "in_cidr"];

/// Attribute decorators, including the leading `@`.
pub const DECORATORS: &[&str] = &["@unique", "@indexed", "@default"];

/// Types accepted on the right-hand side of an attribute definition (besides declared entities).
pub const BUILTIN_ATTRIBUTE_TYPES: &[&str] = &["UUID", "String", "Boolean", "Timestamp", "Set", "Enum"];

/// Permission names that trigger relation suggestions after their colon.
pub const PERMISSION_VERBS: &[&str] = &[
    "delete", "edit", "view", "share", "read", "write", "manage", "admin",
];

/// Relation targets that always resolve, even without a declaration.
pub const RESERVED_RELATION_TARGETS: &[&str] = &["self", "principal"];

/// Returns `true` for a general keyword.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Returns `true` for a block-opening keyword.
pub fn is_block_keyword(word: &str) -> bool {
    BLOCK_KEYWORDS.contains(&word)
}

/// Returns `true` for a highlighted type name.
pub fn is_type(word: &str) -> bool {
    TYPES.contains(&word)
}

/// Returns `true` for a word operator (`and`, `or`, ...).
pub fn is_operator_word(word: &str) -> bool {
    OPERATORS.contains(&word)
}

/// Returns `true` for a type that may be used in an `attributes` block without declaring it.
pub fn is_builtin_attribute_type(word: &str) -> bool {
    BUILTIN_ATTRIBUTE_TYPES.contains(&word)
}
