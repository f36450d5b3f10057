//! MSON structural models.
//!
//! An MSON model describes entities (classes, interfaces, enums, components,
//! actors) with their attributes and methods, plus typed relationships
//! between them:
//!
//! - `association`, `aggregation`, `composition`: structural, become link or
//!   collection fields in the target bundle
//! - `inheritance`, `implementation`: extend the inheritance list
//! - `dependency`: carried for diagrams only
//!
//! Entity ids are used for linkage only; entity names are what the target
//! format sees.

pub mod check;
pub mod model;

pub use check::{check_model, ModelReport};
pub use model::{
    entity_name, is_many, is_primitive_type, Attribute, Entity, EntityKind, Method, Model,
    ModelKind, Multiplicity, Parameter, Relationship, RelationshipKind, Visibility,
};
