//! IPL linter.
//!
//! A single pass over the document's lines with a little carried state (current entity,
//! current block, brace depth, running char offset). It is a best-effort structural scanner,
//! not a parser: malformed input only ever produces more diagnostics.

use crate::config::LintConfig;
use crate::diagnostics::{Diagnostic, DiagnosticRange, DiagnosticSeverity};
use crate::error::IplError;
use crate::schema::SchemaContext;
use ipl_core_lang::{BUILTIN_ATTRIBUTE_TYPES, RESERVED_RELATION_TARGETS, is_builtin_attribute_type};
use serde::Serialize;
use std::sync::LazyLock;

use regex::Regex;

static ENTITY_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^entity\s+([A-Za-z0-9_]+)").unwrap());

static PASCAL_CASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-zA-Z0-9]*$").unwrap());

static SNAKE_CASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").unwrap());

static BLOCK_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(attributes|relations|permissions|methods)\s*\{").unwrap()
});

static ATTRIBUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_]+):\s*([A-Za-z0-9_]+)").unwrap());

static MEMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_]+):\s*(.+)").unwrap());

static SCHEMA_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^schema\s+[A-Za-z0-9_]+\s+v[0-9.]+$").unwrap());

static SINGLE_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());

/// The entity sub-block the scanner is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Attributes,
    Relations,
    Permissions,
    Methods,
}

impl BlockKind {
    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "attributes" => Some(Self::Attributes),
            "relations" => Some(Self::Relations),
            "permissions" => Some(Self::Permissions),
            "methods" => Some(Self::Methods),
            _ => None,
        }
    }
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// `true` iff no diagnostic has [`DiagnosticSeverity::Error`].
    pub valid: bool,
    /// Diagnostics in line order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let valid = !diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error);
        Self { valid, diagnostics }
    }

    fn count(&self, severity: DiagnosticSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Number of error diagnostics.
    pub fn error_count(&self) -> usize {
        self.count(DiagnosticSeverity::Error)
    }

    /// Number of warning diagnostics.
    pub fn warning_count(&self) -> usize {
        self.count(DiagnosticSeverity::Warning)
    }

    /// Number of info diagnostics.
    pub fn info_count(&self) -> usize {
        self.count(DiagnosticSeverity::Info)
    }

    /// Save gate: hosts must not persist the document while this returns an error.
    pub fn ensure_savable(&self) -> Result<(), IplError> {
        if self.valid {
            Ok(())
        } else {
            Err(IplError::InvalidDocument {
                errors: self.error_count(),
            })
        }
    }
}

/// Validate `doc` with the default [`LintConfig`].
pub fn validate(doc: &str) -> ValidationResult {
    validate_with(doc, &LintConfig::default())
}

/// Validate `doc`.
pub fn validate_with(doc: &str, config: &LintConfig) -> ValidationResult {
    let schema = SchemaContext::extract(doc);
    let mut linter = Linter {
        schema: &schema,
        config,
        diagnostics: Vec::new(),
        current_entity: None,
        current_block: None,
        brace_depth: 0,
    };

    let lines: Vec<&str> = doc.split('\n').collect();
    let last = lines.len() - 1;
    let mut char_offset = 0;

    for (i, line) in lines.iter().enumerate() {
        let line_len = line.chars().count();
        let span = LineSpan {
            index: i,
            text: line,
            start: char_offset,
            end: char_offset + line_len,
        };
        char_offset += line_len + 1;

        linter.check_line(&span, i == last);
    }

    let result = ValidationResult::from_diagnostics(linter.diagnostics);
    tracing::debug!(
        lines = lines.len(),
        errors = result.error_count(),
        warnings = result.warning_count(),
        infos = result.info_count(),
        "validated IPL document"
    );
    result
}

struct LineSpan<'a> {
    index: usize,
    text: &'a str,
    /// Absolute char offset of the line start.
    start: usize,
    /// Absolute char offset of the line end (before `\n`).
    end: usize,
}

impl LineSpan<'_> {
    /// Absolute char range of the first occurrence of `needle` in the line.
    fn find(&self, needle: &str) -> Option<DiagnosticRange> {
        let byte_idx = self.text.find(needle)?;
        let start = self.start + self.text[..byte_idx].chars().count();
        Some(DiagnosticRange::new(start, start + needle.chars().count()))
    }
}

struct Linter<'a> {
    schema: &'a SchemaContext,
    config: &'a LintConfig,
    diagnostics: Vec<Diagnostic>,
    current_entity: Option<String>,
    current_block: Option<BlockKind>,
    brace_depth: i64,
}

impl Linter<'_> {
    fn push(
        &mut self,
        line: &LineSpan<'_>,
        range: DiagnosticRange,
        severity: DiagnosticSeverity,
        code: &'static str,
        message: impl Into<String>,
    ) {
        self.diagnostics
            .push(Diagnostic::new(line.index, range, severity, code, message));
    }

    fn check_line(&mut self, line: &LineSpan<'_>, is_last: bool) {
        let trimmed = line.text.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
            if is_last {
                self.check_brace_balance(line);
            }
            return;
        }

        let opens = line.text.matches('{').count() as i64;
        let closes = line.text.matches('}').count() as i64;
        self.brace_depth += opens - closes;

        if let Some(caps) = ENTITY_LINE_RE.captures(trimmed) {
            let name = &caps[1];
            self.current_entity = Some(name.to_string());
            if !PASCAL_CASE_RE.is_match(name) {
                if let Some(range) = line.find(name) {
                    self.push(
                        line,
                        range,
                        DiagnosticSeverity::Warning,
                        "entity-pascal-case",
                        "Entity names should be in PascalCase (e.g., UserGroup)",
                    );
                }
            }
        }

        if let Some(caps) = BLOCK_OPEN_RE.captures(trimmed) {
            self.current_block = BlockKind::from_keyword(&caps[1]);
        }

        if trimmed == "}" && self.current_block.is_some() {
            self.current_block = None;
        }

        match self.current_block {
            Some(BlockKind::Attributes) => self.check_attribute(line, trimmed),
            Some(BlockKind::Relations) => self.check_relation(line, trimmed),
            Some(BlockKind::Permissions) => self.check_permission(line, trimmed),
            Some(BlockKind::Methods) | None => {}
        }

        if trimmed.starts_with("schema ") && !SCHEMA_HEADER_RE.is_match(trimmed) {
            self.push(
                line,
                DiagnosticRange::new(line.start, line.end),
                DiagnosticSeverity::Error,
                "schema-header",
                "Schema declaration should be: schema <name> v<version>",
            );
        }

        if is_last {
            self.check_brace_balance(line);
        }

        if let Some(range) = line.find(";;") {
            self.push(
                line,
                range,
                DiagnosticSeverity::Error,
                "double-semicolon",
                "Unexpected double semicolon",
            );
        }

        if self.config.report_tabs && line.text.contains('\t') {
            self.push(
                line,
                DiagnosticRange::new(line.start, line.start + 1),
                DiagnosticSeverity::Info,
                "tab-indentation",
                "Use spaces instead of tabs for indentation",
            );
        }
    }

    fn check_attribute(&mut self, line: &LineSpan<'_>, trimmed: &str) {
        let Some(caps) = ATTRIBUTE_RE.captures(trimmed) else {
            return;
        };
        let (name, ty) = (&caps[1], &caps[2]);

        self.check_snake_case(
            line,
            name,
            "attribute-snake-case",
            "Attribute names should be in snake_case (e.g., user_email)",
        );

        let base_type = ty.split('<').next().unwrap_or(ty);
        if is_builtin_attribute_type(base_type) || self.schema.has_entity(base_type) {
            return;
        }
        if let Some(range) = line.find(ty) {
            self.push(
                line,
                range,
                DiagnosticSeverity::Error,
                "unknown-type",
                format!(
                    "Unknown type \"{ty}\". Valid types: {}",
                    BUILTIN_ATTRIBUTE_TYPES.join(", ")
                ),
            );
        }
    }

    fn check_relation(&mut self, line: &LineSpan<'_>, trimmed: &str) {
        let Some(caps) = MEMBER_RE.captures(trimmed) else {
            return;
        };
        let (name, targets) = (&caps[1], &caps[2]);

        self.check_snake_case(
            line,
            name,
            "relation-snake-case",
            "Relation names should be in snake_case (e.g., parent_folder)",
        );

        for target in targets.split('|').map(str::trim) {
            let entity_ref = target.split('#').next().unwrap_or_default().trim();
            if entity_ref.is_empty() || self.schema.has_entity(entity_ref) {
                continue;
            }
            // Only bare identifiers are checked; `Entity#relation` and expressions pass through.
            if !SINGLE_WORD_RE.is_match(target) {
                continue;
            }
            if self.schema.is_relation_name(target) || RESERVED_RELATION_TARGETS.contains(&target)
            {
                continue;
            }
            let local = self
                .current_entity
                .as_deref()
                .is_some_and(|entity| self.schema.has_relation(entity, target));
            if local {
                continue;
            }
            if let Some(range) = line.find(target) {
                self.push(
                    line,
                    range,
                    DiagnosticSeverity::Info,
                    "unknown-reference",
                    format!("Unknown entity or relation \"{target}\""),
                );
            }
        }
    }

    fn check_permission(&mut self, line: &LineSpan<'_>, trimmed: &str) {
        let Some(caps) = MEMBER_RE.captures(trimmed) else {
            return;
        };
        self.check_snake_case(
            line,
            &caps[1],
            "permission-snake-case",
            "Permission names should be in snake_case (e.g., can_edit)",
        );
    }

    fn check_snake_case(
        &mut self,
        line: &LineSpan<'_>,
        name: &str,
        code: &'static str,
        message: &'static str,
    ) {
        if SNAKE_CASE_RE.is_match(name) {
            return;
        }
        if let Some(range) = line.find(name) {
            self.push(line, range, DiagnosticSeverity::Warning, code, message);
        }
    }

    fn check_brace_balance(&mut self, line: &LineSpan<'_>) {
        let depth = self.brace_depth;
        if depth == 0 {
            return;
        }
        let plural = if depth > 1 { "s" } else { "" };
        let direction = if depth > 0 { "open" } else { "extra closing" };
        self.push(
            line,
            DiagnosticRange::new(line.end, line.end),
            DiagnosticSeverity::Error,
            "unbalanced-braces",
            format!("Unclosed brace{plural} ({} {direction})", depth.abs()),
        );
    }
}
