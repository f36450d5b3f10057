//! Entity -> schema transformation.

use tracing::debug;

use crate::mson::{entity_name, Entity, Relationship};
use crate::runtime::bundle::{FieldKind, Schema, BASE_COMPONENT};
use crate::runtime::classify::{classify_attribute, relationship_fields};
use crate::runtime::ids::generate_id;

/// Builds the structural declaration of `entity`.
///
/// Never fails: relationship endpoints that do not resolve to an entity are
/// emitted under their raw id.
#[must_use]
pub fn to_schema(entity: &Entity, relationships: &[Relationship], entities: &[Entity]) -> Schema {
    let mut schema = Schema::new(generate_id(), entity.name.clone());

    for parent in inherited_names(entity, relationships, entities) {
        if !schema.inherit.contains(&parent) {
            schema.inherit.push(parent);
        }
    }

    for attribute in &entity.attributes {
        let kind = classify_attribute(attribute, relationships, entities, &entity.id);
        schema.fields.insert(attribute.name.clone(), kind);
    }

    for method in &entity.methods {
        schema.fields.insert(method.name.clone(), FieldKind::Method);
    }

    // Known inconsistency: forward fields replace attribute entries of the
    // same name, reverse fields leave them alone.
    for field in relationship_fields(entity, relationships, entities) {
        if field.overwrites() {
            schema.fields.insert(field.name, field.kind);
        } else {
            schema.fields.entry(field.name).or_insert(field.kind);
        }
    }

    debug!(
        entity = %entity.name,
        inherit = ?schema.inherit,
        fields = schema.fields.len(),
        "Built schema"
    );

    schema
}

/// Resolves the names of everything `entity` inherits from or implements,
/// in relationship declaration order.
#[must_use]
pub fn inherited_names(
    entity: &Entity,
    relationships: &[Relationship],
    entities: &[Entity],
) -> Vec<String> {
    relationships
        .iter()
        .filter(|rel| rel.kind.is_inheritance() && rel.from == entity.id)
        .map(|rel| entity_name(entities, &rel.to).to_string())
        .filter(|name| name != BASE_COMPONENT)
        .collect()
}
