//! Context-aware IPL completion.
//!
//! Completion looks only at the text between the start of the cursor's line and the cursor,
//! plus a fresh [`SchemaContext`] for the whole document. The first matching context wins:
//!
//! ```text
//! email: String @u|        → decorators (replace from `@`)
//! view: |                  → relations, permission snippets, `principal`
//! owner: Us|               → attribute types and entity names
//! viewer: Team#m|          → relations of `Team`
//! view: from p|            → relations of every entity
//! rel|                     → everything starting with `rel`
//! |                        → block snippets and keywords (blank line or explicit trigger)
//! ```
//!
//! All offsets are document-absolute char offsets.

use crate::schema::SchemaContext;
use crate::snippet::byte_offset;
use ipl_core_lang::{BLOCK_KEYWORDS, DECORATORS, KEYWORDS, OPERATORS, TYPES};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static DECORATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[A-Za-z0-9_]*$").unwrap());

static PERMISSION_VERB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)(delete|edit|view|share|read|write|manage|admin):\s*$").unwrap()
});

static TYPE_POSITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*([A-Za-z0-9_]*)$").unwrap());

static RELATION_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9_]+)#([A-Za-z0-9_]*)$").unwrap());

static FROM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u:\b)from\s+([A-Za-z0-9_]*)$").unwrap());

static TRAILING_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u:\b)([A-Za-z0-9_]+)$").unwrap());

/// Candidate categories, used by hosts to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CompletionKind {
    /// Keyword or operator.
    Keyword,
    /// Type or entity name.
    Type,
    /// Relation name or decorator.
    Property,
    /// Multi-token template.
    Snippet,
}

/// A single completion suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionCandidate {
    /// Text shown in the menu (and inserted when there is no template).
    pub label: String,
    /// Category.
    pub kind: CompletionKind,
    /// Short description shown next to the label.
    pub detail: String,
    /// Text to insert, with `${...}` placeholders (see [`crate::snippet`]).
    pub insert_template: Option<String>,
    /// Higher sorts first.
    pub priority: i32,
}

impl CompletionCandidate {
    /// The template if present, else the label.
    pub fn insert_text(&self) -> &str {
        self.insert_template.as_deref().unwrap_or(&self.label)
    }
}

/// Which rule produced a [`CompletionResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum CompletionContext {
    /// After `@`.
    Decorator,
    /// After a permission verb and its colon (`view: `).
    PermissionExpression,
    /// After a colon (attribute type or relation target).
    TypeReference,
    /// After `Entity#`.
    RelationOf {
        /// The entity before `#`.
        entity: String,
    },
    /// After `from `.
    FromRelation,
    /// A partial word anywhere else.
    Word {
        /// The partial word being completed.
        prefix: String,
    },
    /// Blank line or explicit trigger.
    TopLevel,
}

/// Completion suggestions for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    /// Char offset where the inserted text starts replacing (the cursor is the end).
    pub replace_from: usize,
    /// Candidates ordered by priority (descending), then label.
    pub candidates: Vec<CompletionCandidate>,
}

/// How the completion request was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionTrigger {
    /// Passive trigger while typing.
    #[default]
    Typing,
    /// The user explicitly asked for completions.
    Explicit,
}

/// Compute completions at `cursor` (a char offset into `doc`).
///
/// Returns `None` when no completion context applies.
pub fn complete(doc: &str, cursor: usize, trigger: CompletionTrigger) -> Option<CompletionResult> {
    complete_with_context(doc, cursor, trigger).map(|(_, result)| result)
}

/// Like [`complete`], but also reports which context matched.
pub fn complete_with_context(
    doc: &str,
    cursor: usize,
    trigger: CompletionTrigger,
) -> Option<(CompletionContext, CompletionResult)> {
    let cursor = cursor.min(doc.chars().count());
    let line_before = line_before_cursor(doc, cursor);
    let schema = SchemaContext::extract(doc);

    let resolved = resolve(line_before, cursor, trigger, &schema);
    match &resolved {
        Some((context, result)) => tracing::trace!(
            ?context,
            candidates = result.candidates.len(),
            "resolved completion context"
        ),
        None => tracing::trace!("no completion context"),
    }
    resolved.map(|(context, mut result)| {
        sort_candidates(&mut result.candidates);
        (context, result)
    })
}

fn resolve(
    line_before: &str,
    cursor: usize,
    trigger: CompletionTrigger,
    schema: &SchemaContext,
) -> Option<(CompletionContext, CompletionResult)> {
    if let Some(m) = DECORATOR_RE.find(line_before) {
        return Some((
            CompletionContext::Decorator,
            CompletionResult {
                replace_from: cursor - m.as_str().chars().count(),
                candidates: DECORATOR_CANDIDATES.iter().map(StaticCandidate::to_candidate).collect(),
            },
        ));
    }

    // `view: ` also matches the type position below; the verb rule is the narrower one.
    if PERMISSION_VERB_RE.is_match(line_before) {
        let mut candidates: Vec<CompletionCandidate> = schema
            .relations
            .iter()
            .map(|r| relation_candidate(&r.relation, "relation".to_string()))
            .collect();
        candidates.extend(PERMISSION_SNIPPETS.iter().map(StaticCandidate::to_candidate));
        candidates.push(PRINCIPAL.to_candidate());
        return Some((
            CompletionContext::PermissionExpression,
            CompletionResult {
                replace_from: cursor,
                candidates,
            },
        ));
    }

    if let Some(caps) = TYPE_POSITION_RE.captures(line_before) {
        let mut candidates: Vec<CompletionCandidate> = ATTRIBUTE_TYPE_SNIPPETS
            .iter()
            .map(StaticCandidate::to_candidate)
            .collect();
        candidates.extend(
            schema
                .entities
                .iter()
                .map(|entity| entity_candidate(entity, 1)),
        );
        return Some((
            CompletionContext::TypeReference,
            CompletionResult {
                replace_from: cursor - caps[1].chars().count(),
                candidates,
            },
        ));
    }

    if let Some(caps) = RELATION_REF_RE.captures(line_before) {
        let entity = &caps[1];
        let candidates: Vec<CompletionCandidate> = schema
            .relations_of(entity)
            .map(|r| relation_candidate(&r.relation, format!("{RELATION_OF}{entity}")))
            .collect();
        if !candidates.is_empty() {
            return Some((
                CompletionContext::RelationOf {
                    entity: entity.to_string(),
                },
                CompletionResult {
                    replace_from: cursor - caps[2].chars().count(),
                    candidates,
                },
            ));
        }
    }

    if let Some(caps) = FROM_RE.captures(line_before) {
        let candidates = schema
            .relations
            .iter()
            .map(|r| relation_candidate(&r.relation, format!("{RELATION_OF}{}", r.entity)))
            .collect();
        return Some((
            CompletionContext::FromRelation,
            CompletionResult {
                replace_from: cursor - caps[1].chars().count(),
                candidates,
            },
        ));
    }

    if let Some(caps) = TRAILING_WORD_RE.captures(line_before) {
        let word = &caps[1];
        let prefix = word.to_lowercase();
        let candidates: Vec<CompletionCandidate> = BLOCK_SNIPPETS
            .iter()
            .chain(KEYWORD_CANDIDATES.iter())
            .chain(TYPE_CANDIDATES.iter())
            .chain(OPERATOR_CANDIDATES.iter())
            .chain(PERMISSION_SNIPPETS.iter())
            .map(StaticCandidate::to_candidate)
            .chain(schema.entities.iter().map(|entity| entity_candidate(entity, 0)))
            .filter(|c| c.label.to_lowercase().starts_with(&prefix))
            .collect();
        if !candidates.is_empty() {
            return Some((
                CompletionContext::Word {
                    prefix: word.to_string(),
                },
                CompletionResult {
                    replace_from: cursor - word.chars().count(),
                    candidates,
                },
            ));
        }
    }

    if line_before.trim().is_empty() || trigger == CompletionTrigger::Explicit {
        let candidates = BLOCK_SNIPPETS
            .iter()
            .chain(KEYWORD_CANDIDATES.iter())
            .map(StaticCandidate::to_candidate)
            .collect();
        return Some((
            CompletionContext::TopLevel,
            CompletionResult {
                replace_from: cursor,
                candidates,
            },
        ));
    }

    None
}

/// Text of the cursor's line up to the cursor.
fn line_before_cursor(doc: &str, cursor: usize) -> &str {
    let end = byte_offset(doc, cursor);
    let start = doc[..end].rfind('\n').map_or(0, |idx| idx + 1);
    &doc[start..end]
}

/// Sort by priority (descending) then label, dropping repeated `(label, kind)` pairs.
///
/// A relation's owning entity is part of its key, so `owner` of two entities is listed twice.
fn sort_candidates(candidates: &mut Vec<CompletionCandidate>) {
    candidates.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.label.cmp(&b.label))
    });
    let mut seen = HashSet::new();
    candidates.retain(|c| {
        let owner = c.detail.strip_prefix(RELATION_OF).map(str::to_string);
        seen.insert((c.label.clone(), c.kind, owner))
    });
}

const RELATION_OF: &str = "relation of ";

fn relation_candidate(relation: &str, detail: String) -> CompletionCandidate {
    CompletionCandidate {
        label: relation.to_string(),
        kind: CompletionKind::Property,
        detail,
        insert_template: None,
        priority: 0,
    }
}

fn entity_candidate(entity: &str, priority: i32) -> CompletionCandidate {
    CompletionCandidate {
        label: entity.to_string(),
        kind: CompletionKind::Type,
        detail: "entity".to_string(),
        insert_template: None,
        priority,
    }
}

/// A candidate backed entirely by static data.
struct StaticCandidate {
    label: &'static str,
    kind: CompletionKind,
    detail: &'static str,
    template: Option<&'static str>,
    priority: i32,
}

impl StaticCandidate {
    const fn keyword(label: &'static str, detail: &'static str, priority: i32) -> Self {
        Self {
            label,
            kind: CompletionKind::Keyword,
            detail,
            template: None,
            priority,
        }
    }

    const fn snippet(
        label: &'static str,
        detail: &'static str,
        template: &'static str,
        priority: i32,
    ) -> Self {
        Self {
            label,
            kind: CompletionKind::Snippet,
            detail,
            template: Some(template),
            priority,
        }
    }

    const fn ty(label: &'static str, detail: &'static str, template: &'static str) -> Self {
        Self {
            label,
            kind: CompletionKind::Type,
            detail,
            template: Some(template),
            priority: 0,
        }
    }

    fn to_candidate(&self) -> CompletionCandidate {
        CompletionCandidate {
            label: self.label.to_string(),
            kind: self.kind,
            detail: self.detail.to_string(),
            insert_template: self.template.map(str::to_string),
            priority: self.priority,
        }
    }
}

const KEYWORD_PRIORITY: i32 = 1;
const DECORATOR_PRIORITY: i32 = 2;
const OPERATOR_PRIORITY: i32 = -1;

static KEYWORD_CANDIDATES: LazyLock<Vec<StaticCandidate>> = LazyLock::new(|| {
    KEYWORDS
        .iter()
        .chain(BLOCK_KEYWORDS.iter())
        .map(|&kw| StaticCandidate::keyword(kw, "keyword", KEYWORD_PRIORITY))
        .collect()
});

static TYPE_CANDIDATES: LazyLock<Vec<StaticCandidate>> = LazyLock::new(|| {
    TYPES
        .iter()
        .map(|&ty| StaticCandidate {
            label: ty,
            kind: CompletionKind::Type,
            detail: "type",
            template: None,
            priority: 0,
        })
        .collect()
});

static OPERATOR_CANDIDATES: LazyLock<Vec<StaticCandidate>> = LazyLock::new(|| {
    OPERATORS
        .iter()
        .map(|&op| StaticCandidate::keyword(op, "operator", OPERATOR_PRIORITY))
        .collect()
});

static DECORATOR_CANDIDATES: LazyLock<Vec<StaticCandidate>> = LazyLock::new(|| {
    DECORATORS
        .iter()
        .map(|&dec| StaticCandidate {
            label: dec,
            kind: CompletionKind::Property,
            detail: "decorator",
            template: None,
            priority: DECORATOR_PRIORITY,
        })
        .collect()
});

const PRINCIPAL: StaticCandidate = StaticCandidate::keyword("principal", "permission subject", 0);

const ATTRIBUTE_TYPE_SNIPPETS: &[StaticCandidate] = &[
    StaticCandidate::ty("UUID", "Unique identifier", "UUID"),
    StaticCandidate::ty("String", "Text value", "String"),
    StaticCandidate::ty("Boolean", "True/false value", "Boolean"),
    StaticCandidate::ty("Timestamp", "Date and time", "Timestamp"),
    StaticCandidate::ty("Set<>", "Collection of values", "Set<${}>"),
    StaticCandidate::ty("Enum<>", "Enumerated values", "Enum<\"${}\", \"\">"),
];

const BLOCK_SNIPPETS: &[StaticCandidate] = &[
    StaticCandidate::snippet(
        "entity",
        "Define entity",
        "entity ${Name} {\n  attributes {\n    id: UUID\n  }\n}",
        3,
    ),
    StaticCandidate::snippet("attributes", "Attribute block", "attributes {\n  ${}\n}", 2),
    StaticCandidate::snippet("relations", "Relations block", "relations {\n  ${}\n}", 2),
    StaticCandidate::snippet("permissions", "Permissions block", "permissions {\n  ${}\n}", 2),
    StaticCandidate::snippet("methods", "Methods block", "methods {\n  ${}\n}", 2),
    StaticCandidate::snippet(
        "module",
        "Policy module",
        "module ${name} {\n  function ${func_name}(${params}) -> Boolean {\n    ${}\n  }\n}",
        2,
    ),
    StaticCandidate::snippet(
        "wasm module",
        "WASM module",
        "wasm module ${name} {\n  source: \"${id}\"\n  revision: \"latest\"\n  \n  capabilities {\n  }\n  \n  exports {\n  }\n}",
        2,
    ),
    StaticCandidate::snippet(
        "derived permission",
        "Derived permission",
        "derived permission ${name} on ${Entity} {\n  allow principal to <action> when {\n    ${}\n  }\n}",
        2,
    ),
];

const PERMISSION_SNIPPETS: &[StaticCandidate] = &[
    StaticCandidate::snippet("when", "Conditional permission", "when {\n  ${}\n}", 0),
    StaticCandidate::snippet(
        "match",
        "Pattern matching",
        "match ${expr} {\n  \"${value}\" => ${result}\n}",
        0,
    ),
    StaticCandidate::snippet("from", "Inherit from relation", "from ${relation}", 0),
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = "\
schema acl v1
entity User {}
entity Document {
  relations {
    owner: User
    editor: User
  }
  permissions {
    view: owner
  }
}
";

    fn labels(result: &CompletionResult) -> Vec<&str> {
        result.candidates.iter().map(|c| c.label.as_str()).collect()
    }

    /// Completes at the end of `doc`.
    fn complete_at_end(doc: &str) -> Option<(CompletionContext, CompletionResult)> {
        complete_with_context(doc, doc.chars().count(), CompletionTrigger::Typing)
    }

    #[test]
    fn test_decorator_context() {
        let doc = "entity A {\n  attributes {\n    email: String @";
        let (context, result) = complete_at_end(doc).unwrap();
        assert_eq!(context, CompletionContext::Decorator);
        assert_eq!(labels(&result), vec!["@default", "@indexed", "@unique"]);
        assert_eq!(result.replace_from, doc.chars().count() - 1);

        let (_, partial) = complete_at_end(&format!("{doc}un")).unwrap();
        assert_eq!(partial.replace_from, doc.chars().count() - 1);
    }

    #[test]
    fn test_permission_verb_context() {
        let doc = format!("{DOC}entity Folder {{\n  permissions {{\n    view: ");
        let (context, result) = complete_at_end(&doc).unwrap();
        assert_eq!(context, CompletionContext::PermissionExpression);
        assert_eq!(result.replace_from, doc.chars().count());
        assert_eq!(
            labels(&result),
            vec!["editor", "from", "match", "owner", "principal", "when"]
        );
    }

    #[test]
    fn test_type_context_includes_entities() {
        let doc = format!("{DOC}entity Folder {{\n  relations {{\n    parent: Doc");
        let (context, result) = complete_at_end(&doc).unwrap();
        assert_eq!(context, CompletionContext::TypeReference);
        assert_eq!(result.replace_from, doc.chars().count() - 3);
        assert_eq!(
            labels(&result),
            vec![
                "Document", "Folder", "User", "Boolean", "Enum<>", "Set<>", "String", "Timestamp",
                "UUID"
            ]
        );
        let set = result.candidates.iter().find(|c| c.label == "Set<>").unwrap();
        assert_eq!(set.insert_text(), "Set<${}>");
    }

    #[test]
    fn test_relation_of_entity() {
        let doc = format!("{DOC}entity Folder {{\n  relations {{\n    viewer: Document#ow");
        let (context, result) = complete_at_end(&doc).unwrap();
        assert_eq!(
            context,
            CompletionContext::RelationOf {
                entity: "Document".to_string()
            }
        );
        assert_eq!(labels(&result), vec!["editor", "owner"]);
        assert_eq!(result.candidates[0].detail, "relation of Document");
        assert_eq!(result.replace_from, doc.chars().count() - 2);
    }

    #[test]
    fn test_relation_of_unknown_entity_falls_through() {
        let doc = format!("{DOC}x Nope#");
        assert_eq!(complete_at_end(&doc), None);
        assert!(complete(&doc, doc.chars().count(), CompletionTrigger::Explicit).is_some());
    }

    #[test]
    fn test_from_context() {
        let doc = format!("{DOC}x from ed");
        let (context, result) = complete_at_end(&doc).unwrap();
        assert_eq!(context, CompletionContext::FromRelation);
        assert_eq!(labels(&result), vec!["editor", "owner"]);
        assert_eq!(result.replace_from, doc.chars().count() - 2);
    }

    #[test]
    fn test_from_context_keeps_same_relation_of_each_entity() {
        let doc = format!("{DOC}entity Folder {{\n  relations {{\n    owner: User\n  }}\n}}\nx from ");
        let (context, result) = complete_at_end(&doc).unwrap();
        assert_eq!(context, CompletionContext::FromRelation);
        let owners: Vec<&str> = result
            .candidates
            .iter()
            .filter(|c| c.label == "owner")
            .map(|c| c.detail.as_str())
            .collect();
        assert_eq!(owners, vec!["relation of Document", "relation of Folder"]);
    }

    #[test]
    fn test_word_boundaries_are_ascii() {
        // A non-ASCII letter is not a word character, so the verb still starts a word.
        let (context, _) = complete_at_end("  éview: ").unwrap();
        assert_eq!(context, CompletionContext::PermissionExpression);

        let (context, result) = complete_at_end("  caféent").unwrap();
        assert_eq!(
            context,
            CompletionContext::Word {
                prefix: "ent".to_string()
            }
        );
        assert_eq!(result.replace_from, "  café".chars().count());
        assert!(labels(&result).contains(&"entity"));

        let (context, _) = complete_at_end("x éfrom ").unwrap();
        assert_eq!(context, CompletionContext::FromRelation);
    }

    #[test]
    fn test_word_context_filters_case_insensitively() {
        let doc = format!("{DOC}  per");
        let (context, result) = complete_at_end(&doc).unwrap();
        assert_eq!(
            context,
            CompletionContext::Word {
                prefix: "per".to_string()
            }
        );
        assert_eq!(labels(&result), vec!["permissions", "permission", "permissions"]);
        assert_eq!(result.candidates[0].kind, CompletionKind::Snippet);

        let (_, result) = complete_at_end(&format!("{DOC}  doc")).unwrap();
        assert_eq!(labels(&result), vec!["Document"]);
    }

    #[test]
    fn test_word_priorities() {
        let (_, result) = complete_at_end("  e").unwrap();
        assert_eq!(labels(&result), vec!["entity", "entity", "exports", "Enum"]);
        let (_, result) = complete_at_end("  in").unwrap();
        assert_eq!(labels(&result), vec!["in", "in_cidr"]);
        assert!(result.candidates.iter().all(|c| c.priority == OPERATOR_PRIORITY));
    }

    #[test]
    fn test_blank_line_and_explicit_trigger() {
        let doc = format!("{DOC}  ");
        let (context, result) = complete_at_end(&doc).unwrap();
        assert_eq!(context, CompletionContext::TopLevel);
        assert_eq!(result.candidates[0].label, "entity");
        assert_eq!(result.candidates[0].kind, CompletionKind::Snippet);
        assert_eq!(result.replace_from, doc.chars().count());

        let doc = format!("{DOC}x = ");
        assert_eq!(complete_at_end(&doc), None);
        let (context, _) =
            complete_with_context(&doc, doc.chars().count(), CompletionTrigger::Explicit).unwrap();
        assert_eq!(context, CompletionContext::TopLevel);
    }

    #[test]
    fn test_cursor_in_middle_of_document() {
        let cursor = DOC.find("view: ").unwrap() + "view: ".len();
        let (context, result) =
            complete_with_context(DOC, cursor, CompletionTrigger::Typing).unwrap();
        assert_eq!(context, CompletionContext::PermissionExpression);
        assert!(labels(&result).contains(&"owner"));
    }

    #[test]
    fn test_cursor_past_end_is_clamped() {
        let result = complete("entity A {\n  @", 1000, CompletionTrigger::Typing).unwrap();
        assert_eq!(result.replace_from, "entity A {\n  ".chars().count());
    }
}
