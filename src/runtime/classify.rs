//! Semantic role inference for attributes and relationship-derived fields.
//!
//! MSON attributes carry a free-form type string only. Whether a field is a
//! scalar property, a single link or a collection is decided here from the
//! type keyword and the structural relationships the owner takes part in.

use crate::mson::{entity_name, is_primitive_type, Attribute, Entity, Relationship};
use crate::runtime::bundle::FieldKind;

/// Classifies an attribute of the entity `owner_id`.
///
/// A structural relationship (association, aggregation, composition)
/// touching the owner decides the kind when it refers to this attribute,
/// either by relationship name or by the far entity's name matching the
/// attribute's type. The far-end multiplicity then selects `collection`
/// (`*` or `..`) or `link`. Without such a relationship, primitive keywords
/// are properties, `T[]` is a collection and any other type is a link.
#[must_use]
pub fn classify_attribute(
    attribute: &Attribute,
    relationships: &[Relationship],
    entities: &[Entity],
    owner_id: &str,
) -> FieldKind {
    let related = relationships.iter().find(|rel| {
        rel.kind.is_structural()
            && rel.touches(owner_id)
            && refers_to(rel, attribute, entities, owner_id)
    });

    if let Some(rel) = related {
        return if attribute.is_array_type() || rel.is_many_from(owner_id) {
            FieldKind::Collection
        } else {
            FieldKind::Link
        };
    }

    if is_primitive_type(attribute.element_type()) {
        FieldKind::Property
    } else if attribute.is_array_type() {
        FieldKind::Collection
    } else {
        FieldKind::Link
    }
}

/// Unresolved endpoints compare by raw id.
fn refers_to(
    rel: &Relationship,
    attribute: &Attribute,
    entities: &[Entity],
    owner_id: &str,
) -> bool {
    rel.name.as_deref() == Some(attribute.name.as_str())
        || entity_name(entities, rel.other_end(owner_id))
            .eq_ignore_ascii_case(attribute.element_type())
}

/// Kind of the field a structural relationship adds to `entity_id`.
#[must_use]
pub fn relationship_field_kind(rel: &Relationship, entity_id: &str) -> FieldKind {
    if rel.is_many_from(entity_id) {
        FieldKind::Collection
    } else {
        FieldKind::Link
    }
}

/// Which end of a relationship the entity sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The entity is the source.
    Forward,
    /// The entity is the target.
    Reverse,
}

/// A field contributed to an entity by a structural relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipField {
    /// Field name on the entity.
    pub name: String,
    /// `link` or `collection`.
    pub kind: FieldKind,
    /// Resolved name of the entity at the other end.
    pub target: String,
    /// Side of the relationship the entity sits on.
    pub direction: Direction,
}

impl RelationshipField {
    /// Whether this field may replace an entry already present.
    ///
    /// Forward fields overwrite attribute fields of the same name; reverse
    /// fields never do.
    #[must_use]
    pub fn overwrites(&self) -> bool {
        self.direction == Direction::Forward
    }
}

/// Derives the fields that structural relationships add to `entity`.
///
/// Forward fields use the relationship name when given. Otherwise, and
/// always for reverse fields, the name is the other entity's lower-cased
/// name with an `s` appended when many-valued. A self-referential
/// relationship contributes its forward field only.
#[must_use]
pub fn relationship_fields(
    entity: &Entity,
    relationships: &[Relationship],
    entities: &[Entity],
) -> Vec<RelationshipField> {
    relationships
        .iter()
        .filter(|rel| rel.kind.is_structural() && rel.touches(&entity.id))
        .map(|rel| {
            let direction = if rel.from == entity.id {
                Direction::Forward
            } else {
                Direction::Reverse
            };
            let kind = relationship_field_kind(rel, &entity.id);
            let target = entity_name(entities, rel.other_end(&entity.id)).to_string();

            let explicit = match direction {
                Direction::Forward => rel.name.as_deref().filter(|n| !n.trim().is_empty()),
                Direction::Reverse => None,
            };
            let name = explicit.map_or_else(
                || derived_field_name(&target, kind),
                ToString::to_string,
            );

            RelationshipField {
                name,
                kind,
                target,
                direction,
            }
        })
        .collect()
}

fn derived_field_name(target: &str, kind: FieldKind) -> String {
    let mut name = target.to_lowercase();
    if kind == FieldKind::Collection {
        name.push('s');
    }
    name
}
