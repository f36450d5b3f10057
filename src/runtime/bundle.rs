//! System Runtime bundle structures.
//!
//! A bundle pairs every schema (field -> kind marker) with a type model
//! (field -> concrete type). Both carry fixed identity fields (`_id`,
//! `_name`) next to an open set of entity-specific fields, which are kept
//! in an ordered map and flattened into the same JSON object.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Base marker every generated schema inherits from.
pub const BASE_COMPONENT: &str = "_Component";

/// Reserved key holding a method's return type inside a type model.
pub const RETURN_KEY: &str = "=>";

/// Kind marker of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Scalar value.
    Property,
    /// Single reference to another component.
    Link,
    /// Multiple references to other components.
    Collection,
    /// Callable behaviour.
    Method,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Property => write!(f, "property"),
            Self::Link => write!(f, "link"),
            Self::Collection => write!(f, "collection"),
            Self::Method => write!(f, "method"),
        }
    }
}

/// Structural declaration of one component class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema identity.
    #[serde(rename = "_id")]
    pub id: String,
    /// Component class name.
    #[serde(rename = "_name")]
    pub name: String,
    /// Inherited schema names, base marker first.
    #[serde(rename = "_inherit", default)]
    pub inherit: Vec<String>,
    /// Field name -> kind marker, in declaration order.
    #[serde(flatten)]
    pub fields: IndexMap<String, FieldKind>,
}

impl Schema {
    /// Creates a schema that inherits only from the base marker.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            inherit: vec![BASE_COMPONENT.to_string()],
            fields: IndexMap::new(),
        }
    }

    /// Returns the kind marker of a field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<FieldKind> {
        self.fields.get(name).copied()
    }
}

/// Type of a type-model field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeValue {
    /// Primitive type or the name of a linked component class.
    Type(String),
    /// Collection of components, as a single-element array of the class name.
    Collection(Vec<String>),
    /// Object value; a method signature when it holds the `=>` key.
    Object(IndexMap<String, Value>),
}

impl TypeValue {
    /// Plain type string.
    #[must_use]
    pub fn of(type_name: impl Into<String>) -> Self {
        Self::Type(type_name.into())
    }

    /// Single-element collection of `type_name`.
    #[must_use]
    pub fn collection_of(type_name: impl Into<String>) -> Self {
        Self::Collection(vec![type_name.into()])
    }

    /// Method signature: parameter name -> type, plus the `=>` return type.
    #[must_use]
    pub fn signature<'a>(
        parameters: impl IntoIterator<Item = (&'a str, &'a str)>,
        return_type: &str,
    ) -> Self {
        let mut signature: IndexMap<String, Value> = parameters
            .into_iter()
            .map(|(name, ty)| (name.to_string(), Value::String(ty.to_string())))
            .collect();
        signature.insert(RETURN_KEY.to_string(), Value::String(return_type.to_string()));
        Self::Object(signature)
    }

    /// Returns the object if this value is a method signature.
    #[must_use]
    pub fn as_signature(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Object(map) if map.contains_key(RETURN_KEY) => Some(map),
            _ => None,
        }
    }
}

/// Type overlay paired 1:1 with a [`Schema`] by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeModel {
    /// Model identity.
    #[serde(rename = "_id")]
    pub id: String,
    /// Name of the schema this model types.
    #[serde(rename = "_name")]
    pub name: String,
    /// Field name -> type, in declaration order.
    #[serde(flatten)]
    pub fields: IndexMap<String, TypeValue>,
}

impl TypeModel {
    /// Creates an empty type model.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Returns the type of a field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&TypeValue> {
        self.fields.get(name)
    }
}

/// A custom type (typically an enumeration) declared by the bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomType {
    /// Type identity.
    #[serde(rename = "_id")]
    pub id: String,
    /// Type name.
    pub name: String,
    /// Underlying primitive type.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Allowed values.
    #[serde(default)]
    pub value: Value,
}

/// Runtime behaviour attached to a component class or to the bundle itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Behavior {
    /// Behaviour identity.
    #[serde(rename = "_id")]
    pub id: String,
    /// Owning component: a schema name or the bundle id.
    pub component: String,
    /// State (method or event name) the behaviour reacts to.
    pub state: String,
    /// Source of the action.
    pub action: String,
    /// Whether this is a core behaviour.
    #[serde(default)]
    pub core: bool,
    /// Whether the action uses the core API.
    #[serde(rename = "useCoreAPI", default)]
    pub use_core_api: bool,
}

/// A complete System Runtime bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    /// Bundle identity.
    #[serde(rename = "_id")]
    pub id: String,
    /// Bundle name.
    pub name: String,
    /// Bundle description.
    #[serde(default)]
    pub description: String,
    /// Semantic version (`MAJOR.MINOR.PATCH`).
    pub version: String,
    /// Whether this is the primary bundle of a system.
    #[serde(default)]
    pub master: bool,
    /// Schemas keyed by identity.
    pub schemas: IndexMap<String, Schema>,
    /// Type models keyed by identity.
    pub models: IndexMap<String, TypeModel>,
    /// Custom types keyed by identity.
    #[serde(default)]
    pub types: IndexMap<String, CustomType>,
    /// Behaviours keyed by identity.
    #[serde(default)]
    pub behaviors: IndexMap<String, Behavior>,
    /// Component class name -> instance id -> instance.
    #[serde(default)]
    pub components: IndexMap<String, IndexMap<String, Value>>,
}

impl Bundle {
    /// Looks up a schema by its declared name.
    #[must_use]
    pub fn schema_named(&self, name: &str) -> Option<&Schema> {
        self.schemas.values().find(|s| s.name == name)
    }

    /// Looks up a type model by its declared name.
    #[must_use]
    pub fn model_named(&self, name: &str) -> Option<&TypeModel> {
        self.models.values().find(|m| m.name == name)
    }
}
