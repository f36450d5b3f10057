//! Entity -> type model transformation.
//!
//! Walks the same members and relationships as [`to_schema`] in the same
//! order, so the resulting model has exactly the schema's field names.
//!
//! [`to_schema`]: crate::runtime::schema::to_schema

use tracing::debug;

use crate::mson::{Attribute, Entity, Method, Relationship};
use crate::runtime::bundle::{FieldKind, TypeModel, TypeValue};
use crate::runtime::classify::{classify_attribute, relationship_fields};
use crate::runtime::ids::generate_id;

/// Builds the type overlay of `entity`.
#[must_use]
pub fn to_model(entity: &Entity, relationships: &[Relationship], entities: &[Entity]) -> TypeModel {
    let mut model = TypeModel::new(generate_id(), entity.name.clone());

    for attribute in &entity.attributes {
        let kind = classify_attribute(attribute, relationships, entities, &entity.id);
        model
            .fields
            .insert(attribute.name.clone(), attribute_type(attribute, kind));
    }

    for method in &entity.methods {
        model
            .fields
            .insert(method.name.clone(), method_signature(method));
    }

    for field in relationship_fields(entity, relationships, entities) {
        let overwrites = field.overwrites();
        let value = match field.kind {
            FieldKind::Collection => TypeValue::collection_of(field.target),
            _ => TypeValue::of(field.target),
        };
        if overwrites {
            model.fields.insert(field.name, value);
        } else {
            model.fields.entry(field.name).or_insert(value);
        }
    }

    debug!(entity = %entity.name, fields = model.fields.len(), "Built type model");

    model
}

fn attribute_type(attribute: &Attribute, kind: FieldKind) -> TypeValue {
    match kind {
        FieldKind::Collection => TypeValue::collection_of(attribute.element_type()),
        _ => TypeValue::of(attribute.type_name.clone()),
    }
}

fn method_signature(method: &Method) -> TypeValue {
    TypeValue::signature(
        method
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.type_name.as_str())),
        &method.return_type,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mson::{EntityKind, RelationshipKind};
    use crate::runtime::schema::to_schema;
    use serde_json::json;

    fn fixture() -> (Vec<Entity>, Vec<Relationship>) {
        let entities = vec![
            Entity::new("c", "Customer", EntityKind::Class)
                .with_attribute(Attribute::new("name", "string"))
                .with_attribute(Attribute::new("address", "Address"))
                .with_attribute(Attribute::new("tags", "Tag[]"))
                .with_method(
                    Method::new("transfer", "boolean")
                        .with_parameter("from", "Account")
                        .with_parameter("amount", "number"),
                ),
            Entity::new("a", "Account", EntityKind::Class),
        ];
        let relationships = vec![Relationship::new("r1", "c", "a", RelationshipKind::Aggregation)
            .with_multiplicity("1", "*")];
        (entities, relationships)
    }

    #[test]
    fn attribute_types_follow_classification() {
        let (entities, rels) = fixture();
        let model = to_model(&entities[0], &rels, &entities);

        assert_eq!(model.name, "Customer");
        assert_eq!(model.field("name"), Some(&TypeValue::of("string")));
        assert_eq!(model.field("address"), Some(&TypeValue::of("Address")));
        assert_eq!(model.field("tags"), Some(&TypeValue::collection_of("Tag")));
    }

    #[test]
    fn method_becomes_signature() {
        let (entities, rels) = fixture();
        let model = to_model(&entities[0], &rels, &entities);

        let value = serde_json::to_value(model.field("transfer").unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"from": "Account", "amount": "number", "=>": "boolean"})
        );
    }

    #[test]
    fn relationship_fields_use_resolved_names() {
        let (entities, rels) = fixture();

        let customer = to_model(&entities[0], &rels, &entities);
        assert_eq!(
            customer.field("accounts"),
            Some(&TypeValue::collection_of("Account"))
        );

        let account = to_model(&entities[1], &rels, &entities);
        assert_eq!(account.field("customer"), Some(&TypeValue::of("Customer")));
    }

    #[test]
    fn forward_field_replaces_attribute_type_reverse_does_not() {
        let entities = vec![
            Entity::new("e1", "Customer", EntityKind::Class)
                .with_attribute(Attribute::new("accounts", "Account")),
            Entity::new("e2", "Account", EntityKind::Class)
                .with_attribute(Attribute::new("customer", "number")),
        ];
        let rels = vec![
            Relationship::new("r1", "e1", "e2", RelationshipKind::Association)
                .with_multiplicity("1", "0..*")
                .with_name("accounts"),
        ];

        let customer = to_model(&entities[0], &rels, &entities);
        assert_eq!(
            customer.field("accounts"),
            Some(&TypeValue::collection_of("Account"))
        );
        assert_eq!(customer.fields.len(), 1);

        let account = to_model(&entities[1], &rels, &entities);
        assert_eq!(account.field("customer"), Some(&TypeValue::of("number")));
    }

    #[test]
    fn model_mirrors_schema_field_names() {
        let (entities, rels) = fixture();
        for entity in &entities {
            let schema = to_schema(entity, &rels, &entities);
            let model = to_model(entity, &rels, &entities);
            let schema_fields: Vec<&String> = schema.fields.keys().collect();
            let model_fields: Vec<&String> = model.fields.keys().collect();
            assert_eq!(schema_fields, model_fields);
            assert_eq!(schema.name, model.name);
        }
    }
}
