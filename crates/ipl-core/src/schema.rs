//! Schema extraction.
//!
//! A structural scan of the whole document that derives the entity, relation, and permission
//! tables used by the validator and the completion resolver. It is not a parser:
//!
//! - entity declarations are found anywhere `entity <Name>` appears (comments included);
//! - each entity's `relations { ... }` / `permissions { ... }` region runs from the first `{`
//!   to the first following `}`. A block with nested braces (e.g. a `when { ... }` permission)
//!   is cut short at the inner `}`, and names after it are not extracted.
//!
//! Extraction is a pure function of the text and is recomputed on every call.

use serde::Serialize;
use std::sync::LazyLock;

use regex::Regex;

static ENTITY_DECL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"entity\s+([A-Za-z0-9_]+)").unwrap());

static RELATIONS_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"relations\s*\{([^}]+)\}").unwrap());

static PERMISSIONS_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"permissions\s*\{([^}]+)\}").unwrap());

static MEMBER_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9_]+):").unwrap());

/// A relation declared in an entity's `relations` block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RelationDef {
    /// Enclosing entity name.
    pub entity: String,
    /// Relation name.
    pub relation: String,
}

/// A permission declared in an entity's `permissions` block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PermissionDef {
    /// Enclosing entity name.
    pub entity: String,
    /// Permission name.
    pub permission: String,
}

/// Read-only snapshot of the schema declared by a document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SchemaContext {
    /// Unique entity names, in order of first appearance.
    pub entities: Vec<String>,
    /// Relations in entity-declaration order, then block order.
    pub relations: Vec<RelationDef>,
    /// Permissions in entity-declaration order, then block order.
    pub permissions: Vec<PermissionDef>,
}

impl SchemaContext {
    /// Extract all three tables from `doc`.
    pub fn extract(doc: &str) -> Self {
        let context = Self {
            entities: extract_entities(doc),
            relations: extract_relations(doc),
            permissions: extract_permissions(doc),
        };
        tracing::trace!(
            entities = context.entities.len(),
            relations = context.relations.len(),
            permissions = context.permissions.len(),
            "extracted schema context"
        );
        context
    }

    /// Returns `true` if `name` is a declared entity.
    pub fn has_entity(&self, name: &str) -> bool {
        self.entities.iter().any(|e| e == name)
    }

    /// Returns `true` if any entity declares a relation called `name`.
    pub fn is_relation_name(&self, name: &str) -> bool {
        self.relations.iter().any(|r| r.relation == name)
    }

    /// Returns `true` if `entity` declares a relation called `relation`.
    pub fn has_relation(&self, entity: &str, relation: &str) -> bool {
        self.relations
            .iter()
            .any(|r| r.entity == entity && r.relation == relation)
    }

    /// Relations declared by `entity`, in block order.
    pub fn relations_of<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a RelationDef> {
        self.relations.iter().filter(move |r| r.entity == entity)
    }
}

/// Unique entity names in order of first appearance.
pub fn extract_entities(doc: &str) -> Vec<String> {
    let mut entities: Vec<String> = Vec::new();
    for caps in ENTITY_DECL_RE.captures_iter(doc) {
        let name = &caps[1];
        if !entities.iter().any(|e| e == name) {
            entities.push(name.to_string());
        }
    }
    entities
}

/// `(entity, relation)` pairs from each entity's first `relations { ... }` region.
pub fn extract_relations(doc: &str) -> Vec<RelationDef> {
    member_names(doc, &RELATIONS_BLOCK_RE)
        .map(|(entity, relation)| RelationDef { entity, relation })
        .collect()
}

/// `(entity, permission)` pairs from each entity's first `permissions { ... }` region.
pub fn extract_permissions(doc: &str) -> Vec<PermissionDef> {
    member_names(doc, &PERMISSIONS_BLOCK_RE)
        .map(|(entity, permission)| PermissionDef { entity, permission })
        .collect()
}

/// Split `doc` at entity declarations and yield `(entity, name)` for every `name:` inside the
/// block region matched by `block_re` in that entity's trailing text.
fn member_names<'a>(
    doc: &'a str,
    block_re: &'a Regex,
) -> impl Iterator<Item = (String, String)> + 'a {
    entity_blocks(doc).flat_map(move |(entity, block)| {
        block_re
            .captures(block)
            .and_then(|caps| caps.get(1))
            .map(|region| {
                MEMBER_NAME_RE
                    .captures_iter(region.as_str())
                    .map(|caps| (entity.to_string(), caps[1].to_string()))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    })
}

/// Each entity name paired with the text between its declaration and the next one.
fn entity_blocks(doc: &str) -> impl Iterator<Item = (&str, &str)> {
    let decls: Vec<(&str, usize, usize)> = ENTITY_DECL_RE
        .captures_iter(doc)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some((name.as_str(), whole.start(), whole.end()))
        })
        .collect();

    (0..decls.len()).map(move |i| {
        let (name, _, body_start) = decls[i];
        let body_end = decls.get(i + 1).map_or(doc.len(), |next| next.1);
        (name, &doc[body_start..body_end])
    })
}
