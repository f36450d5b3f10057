//! End-to-end conversion tests: MSON model in, validated bundle out.

use std::collections::BTreeSet;

use mson_runtime_mcp::mson::{
    check_model, Attribute, Entity, EntityKind, Method, Model, ModelKind, Relationship,
    RelationshipKind,
};
use mson_runtime_mcp::runtime::validate::check_semantics;
use mson_runtime_mcp::runtime::{
    assemble, validate, AssembleOptions, FieldKind, TypeValue, BASE_COMPONENT,
};

fn university() -> Model {
    Model::new("m1", "University", ModelKind::Class)
        .with_entity(
            Entity::new("student", "Student", EntityKind::Class)
                .with_attribute(Attribute::new("id", "string")),
        )
        .with_entity(
            Entity::new("course", "Course", EntityKind::Class)
                .with_attribute(Attribute::new("title", "string")),
        )
        .with_relationship(
            Relationship::new("r1", "student", "course", RelationshipKind::Association)
                .with_multiplicity("1", "0..*")
                .with_name("enrollments"),
        )
}

fn bank(name: Option<&str>) -> Model {
    let mut owns = Relationship::new("owns", "customer", "account", RelationshipKind::Association)
        .with_multiplicity("1", "0..*");
    if let Some(name) = name {
        owns = owns.with_name(name);
    }

    Model::new("bank", "Bank", ModelKind::Class)
        .with_entity(
            Entity::new("customer", "Customer", EntityKind::Class)
                .with_attribute(Attribute::new("email", "string")),
        )
        .with_entity(
            Entity::new("account", "Account", EntityKind::Class)
                .with_attribute(Attribute::new("balance", "number"))
                .with_method(
                    Method::new("withdraw", "boolean").with_parameter("amount", "number"),
                ),
        )
        .with_entity(
            Entity::new("branch", "Branch", EntityKind::Class)
                .with_attribute(Attribute::new("code", "string")),
        )
        .with_relationship(owns)
}

#[test]
fn enrollment_example_converts_and_validates() {
    let model = university();
    assert!(check_model(&model).is_valid);

    let bundle = assemble(&model, &AssembleOptions::default());
    assert_eq!(bundle.schemas.len(), 2);
    assert_eq!(bundle.version, "0.0.1");

    let student = bundle.schema_named("Student").unwrap();
    assert_eq!(student.field("id"), Some(FieldKind::Property));
    assert_eq!(student.field("enrollments"), Some(FieldKind::Collection));

    let course = bundle.schema_named("Course").unwrap();
    assert_eq!(course.field("title"), Some(FieldKind::Property));
    assert_eq!(course.field("student"), Some(FieldKind::Link));

    let report = validate(bundle);
    assert!(report.is_valid, "{:?}", report.warnings);
    assert_eq!(report.error_count(), 0);
}

#[test]
fn type_models_mirror_schemas() {
    let bundle = assemble(&university(), &AssembleOptions::default());

    let student = bundle.model_named("Student").unwrap();
    assert_eq!(student.field("id"), Some(&TypeValue::of("string")));
    assert_eq!(
        student.field("enrollments"),
        Some(&TypeValue::collection_of("Course"))
    );

    let course = bundle.model_named("Course").unwrap();
    assert_eq!(course.field("student"), Some(&TypeValue::of("Student")));

    for schema in bundle.schemas.values() {
        let model = bundle.model_named(&schema.name).unwrap();
        let schema_fields: Vec<&String> = schema.fields.keys().collect();
        let model_fields: Vec<&String> = model.fields.keys().collect();
        assert_eq!(schema_fields, model_fields);
    }
}

#[test]
fn one_schema_and_model_per_entity() {
    let model = bank(None);
    let bundle = assemble(&model, &AssembleOptions::default());

    assert_eq!(bundle.schemas.len(), model.entities.len());
    assert_eq!(bundle.models.len(), model.entities.len());
    assert_eq!(bundle.components.len(), model.entities.len());

    let schema_names: BTreeSet<&str> = bundle.schemas.values().map(|s| s.name.as_str()).collect();
    let model_names: BTreeSet<&str> = bundle.models.values().map(|m| m.name.as_str()).collect();
    assert_eq!(schema_names, model_names);

    for (key, schema) in &bundle.schemas {
        assert_eq!(key, &schema.id);
    }
    assert!(validate(bundle).is_valid);
}

#[test]
fn named_association_adds_fields_on_both_ends() {
    let bundle = assemble(&bank(Some("owns")), &AssembleOptions::default());

    let customer = bundle.schema_named("Customer").unwrap();
    assert_eq!(customer.field("owns"), Some(FieldKind::Collection));
    assert_eq!(customer.field("accounts"), None);

    let account = bundle.schema_named("Account").unwrap();
    assert_eq!(account.field("customer"), Some(FieldKind::Link));
    assert_eq!(account.field("withdraw"), Some(FieldKind::Method));

    let branch = bundle.schema_named("Branch").unwrap();
    assert_eq!(branch.fields.len(), 1);
    assert_eq!(branch.field("code"), Some(FieldKind::Property));
}

#[test]
fn unnamed_association_derives_field_name() {
    let bundle = assemble(&bank(None), &AssembleOptions::default());

    let customer = bundle.schema_named("Customer").unwrap();
    assert_eq!(customer.field("accounts"), Some(FieldKind::Collection));

    let account = bundle.model_named("Account").unwrap();
    assert_eq!(account.field("customer"), Some(&TypeValue::of("Customer")));

    let withdraw = account.field("withdraw").unwrap().as_signature().unwrap();
    assert_eq!(withdraw["amount"], "number");
    assert_eq!(withdraw["=>"], "boolean");
}

#[test]
fn opaque_ids_classify_by_entity_name() {
    let model = Model::new("m", "Library", ModelKind::Class)
        .with_entity(
            Entity::new("e1", "Member", EntityKind::Class)
                .with_attribute(Attribute::new("name", "string"))
                .with_attribute(Attribute::new("loans", "Loan"))
                .with_attribute(Attribute::new("card", "LibraryCard")),
        )
        .with_entity(
            Entity::new("e2", "Loan", EntityKind::Class)
                .with_attribute(Attribute::new("borrower", "Member")),
        )
        .with_entity(Entity::new("e3", "LibraryCard", EntityKind::Class))
        .with_relationship(
            Relationship::new("r1", "e1", "e2", RelationshipKind::Association)
                .with_multiplicity("1", "0..*"),
        )
        .with_relationship(
            Relationship::new("r2", "e1", "e3", RelationshipKind::Composition)
                .with_multiplicity("1", "1")
                .with_name("card"),
        );

    let bundle = assemble(&model, &AssembleOptions::default());

    let member = bundle.schema_named("Member").unwrap();
    assert_eq!(member.field("name"), Some(FieldKind::Property));
    assert_eq!(member.field("loans"), Some(FieldKind::Collection));
    assert_eq!(member.field("card"), Some(FieldKind::Link));

    let member_model = bundle.model_named("Member").unwrap();
    assert_eq!(
        member_model.field("loans"),
        Some(&TypeValue::collection_of("Loan"))
    );
    assert_eq!(
        member_model.field("card"),
        Some(&TypeValue::of("LibraryCard"))
    );

    let loan = bundle.schema_named("Loan").unwrap();
    assert_eq!(loan.field("borrower"), Some(FieldKind::Link));
    assert_eq!(loan.field("member"), Some(FieldKind::Link));

    let card = bundle.schema_named("LibraryCard").unwrap();
    assert_eq!(card.field("member"), Some(FieldKind::Link));

    assert!(validate(bundle).is_valid);
}

#[test]
fn explicit_name_colliding_with_typed_attribute() {
    let model = Model::new("m", "Bank", ModelKind::Class)
        .with_entity(
            Entity::new("e1", "Customer", EntityKind::Class)
                .with_attribute(Attribute::new("holdings", "Account")),
        )
        .with_entity(Entity::new("e2", "Account", EntityKind::Class))
        .with_relationship(
            Relationship::new("r1", "e1", "e2", RelationshipKind::Aggregation)
                .with_multiplicity("1", "*")
                .with_name("holdings"),
        );

    let bundle = assemble(&model, &AssembleOptions::default());

    let customer = bundle.schema_named("Customer").unwrap();
    assert_eq!(customer.fields.len(), 1);
    assert_eq!(customer.field("holdings"), Some(FieldKind::Collection));
    assert_eq!(
        bundle.model_named("Customer").unwrap().field("holdings"),
        Some(&TypeValue::collection_of("Account"))
    );
    assert_eq!(
        bundle.schema_named("Account").unwrap().field("customer"),
        Some(FieldKind::Link)
    );
}

#[test]
fn multiple_inheritance_keeps_declaration_order() {
    let model = Model::new("m", "Shapes", ModelKind::Class)
        .with_entity(Entity::new("i1", "Drawable", EntityKind::Interface))
        .with_entity(Entity::new("i2", "Resizable", EntityKind::Interface))
        .with_entity(Entity::new("c", "Canvas", EntityKind::Class))
        .with_relationship(Relationship::new(
            "r1",
            "c",
            "i1",
            RelationshipKind::Implementation,
        ))
        .with_relationship(Relationship::new(
            "r2",
            "c",
            "i2",
            RelationshipKind::Implementation,
        ))
        .with_relationship(Relationship::new(
            "r3",
            "c",
            "i1",
            RelationshipKind::Inheritance,
        ));

    let bundle = assemble(&model, &AssembleOptions::default());
    let canvas = bundle.schema_named("Canvas").unwrap();
    assert_eq!(canvas.inherit, [BASE_COMPONENT, "Drawable", "Resizable"]);

    let drawable = bundle.schema_named("Drawable").unwrap();
    assert_eq!(drawable.inherit, [BASE_COMPONENT]);

    assert!(validate(bundle).is_valid);
}

#[test]
fn inheritance_cycle_is_reported() {
    let model = Model::new("m", "Loop", ModelKind::Class)
        .with_entity(Entity::new("a", "A", EntityKind::Class))
        .with_entity(Entity::new("b", "B", EntityKind::Class))
        .with_relationship(Relationship::new("r1", "a", "b", RelationshipKind::Inheritance))
        .with_relationship(Relationship::new(
            "r2",
            "b",
            "a",
            RelationshipKind::Implementation,
        ));

    let bundle = assemble(&model, &AssembleOptions::default());
    let report = validate(bundle);

    assert!(!report.is_valid);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.is_error() && w.message.contains("Inheritance cycle")));
}

#[test]
fn validation_is_idempotent() {
    let model = Model::new("m", "Loop", ModelKind::Class)
        .with_entity(Entity::new("a", "A", EntityKind::Class))
        .with_entity(Entity::new("b", "B", EntityKind::Class))
        .with_relationship(Relationship::new("r1", "a", "b", RelationshipKind::Inheritance))
        .with_relationship(Relationship::new("r2", "b", "a", RelationshipKind::Inheritance));
    let bundle = assemble(&model, &AssembleOptions::default());

    let first = validate(bundle.clone());
    let second = validate(bundle.clone());
    assert_eq!(first.is_valid, second.is_valid);

    let messages = |warnings: &[mson_runtime_mcp::diagnostics::Diagnostic]| {
        warnings
            .iter()
            .map(|w| w.message.clone())
            .collect::<BTreeSet<_>>()
    };
    assert_eq!(messages(&first.warnings), messages(&second.warnings));
    assert_eq!(messages(&check_semantics(&bundle)), messages(&first.warnings));
}

#[test]
fn unresolved_endpoint_falls_back_to_raw_id() {
    let model = Model::new("m", "Dangling", ModelKind::Class)
        .with_entity(Entity::new("order", "Order", EntityKind::Class))
        .with_relationship(
            Relationship::new("r1", "order", "ghost", RelationshipKind::Composition)
                .with_multiplicity("1", "1..*"),
        );

    let report = check_model(&model);
    assert!(report.is_valid);
    assert!(!report.warnings.is_empty());

    let bundle = assemble(&model, &AssembleOptions::default());
    let order = bundle.model_named("Order").unwrap();
    assert_eq!(order.field("ghosts"), Some(&TypeValue::collection_of("ghost")));
}

#[test]
fn options_flow_into_bundle() {
    let options = AssembleOptions {
        master: true,
        ..AssembleOptions::default()
    }
    .with_version("3.1.4");
    let bundle = assemble(&university(), &options);

    assert_eq!(bundle.version, "3.1.4");
    assert!(bundle.master);
    assert_eq!(bundle.name, "University");
    assert!(bundle.description.contains("University"));
}

#[test]
fn bundle_serialises_in_runtime_shape() {
    let bundle = assemble(&university(), &AssembleOptions::default());
    let json = serde_json::to_value(&bundle).unwrap();

    assert!(json["_id"].is_string());
    assert_eq!(json["master"], false);

    let schema = json["schemas"]
        .as_object()
        .unwrap()
        .values()
        .find(|s| s["_name"] == "Student")
        .unwrap();
    assert_eq!(schema["_inherit"], serde_json::json!(["_Component"]));
    assert_eq!(schema["id"], "property");
    assert_eq!(schema["enrollments"], "collection");

    assert!(json["components"]["Student"].as_object().unwrap().is_empty());
}
