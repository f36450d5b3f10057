//! MSON -> System Runtime conversion and bundle validation.
//!
//! # Pipeline
//!
//! ```text
//! Model ──▶ assemble ──┬──▶ to_schema (per entity) ──┐
//!                      └──▶ to_model  (per entity) ──┴──▶ Bundle ──▶ validate
//! ```
//!
//! Conversion never fails. Unresolved relationship endpoints degrade to
//! their raw id; only the validator reports problems, all of them in one
//! pass. The validator also accepts bundles produced elsewhere.
//!
//! Conversion is lossy: visibility, static and abstract flags are
//! dropped, and multiplicities collapse to "single" or "many".

pub mod assemble;
pub mod bundle;
pub mod classify;
pub mod ids;
pub mod model;
pub mod schema;
pub mod validate;

pub use assemble::{assemble, AssembleOptions, DEFAULT_VERSION};
pub use bundle::{
    Behavior, Bundle, CustomType, FieldKind, Schema, TypeModel, TypeValue, BASE_COMPONENT,
    RETURN_KEY,
};
pub use classify::classify_attribute;
pub use model::to_model;
pub use schema::to_schema;
pub use validate::{is_semantic_version, validate, validate_bundle, ValidationReport};
