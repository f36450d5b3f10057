//! MSON model structures.
//!
//! These map directly to the JSON shape accepted by the tools. Field names
//! are camelCase on the wire; kind enums serialise lowercase under `type`.

use serde::{Deserialize, Serialize};

/// Primitive type keywords. Anything else is treated as an entity reference.
pub const PRIMITIVE_TYPES: [&str; 7] = [
    "string", "number", "boolean", "date", "any", "object", "array",
];

/// Returns `true` if `type_name` is a primitive keyword (case-insensitive).
#[must_use]
pub fn is_primitive_type(type_name: &str) -> bool {
    PRIMITIVE_TYPES
        .iter()
        .any(|p| p.eq_ignore_ascii_case(type_name.trim()))
}

/// Returns `true` if a multiplicity string denotes "many" (`*` or a `..` range).
#[must_use]
pub fn is_many(multiplicity: &str) -> bool {
    multiplicity.contains('*') || multiplicity.contains("..")
}

/// Kind of diagram a model describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Class diagram.
    Class,
    /// Component diagram.
    Component,
    /// Deployment diagram.
    Deployment,
    /// Use-case diagram.
    Usecase,
}

/// Kind of a structural entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Concrete or abstract class.
    Class,
    /// Interface.
    Interface,
    /// Enumeration.
    Enum,
    /// Component.
    Component,
    /// Use-case actor.
    Actor,
}

/// Kind of a relationship between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    /// Plain association.
    Association,
    /// Class inheritance.
    Inheritance,
    /// Interface implementation.
    Implementation,
    /// Usage dependency.
    Dependency,
    /// Shared aggregation.
    Aggregation,
    /// Composite aggregation.
    Composition,
}

impl RelationshipKind {
    /// Returns `true` for kinds that produce link or collection fields.
    #[must_use]
    pub const fn is_structural(self) -> bool {
        matches!(
            self,
            Self::Association | Self::Aggregation | Self::Composition
        )
    }

    /// Returns `true` for kinds that extend the source's inheritance list.
    #[must_use]
    pub const fn is_inheritance(self) -> bool {
        matches!(self, Self::Inheritance | Self::Implementation)
    }
}

/// Member visibility. Carried through for diagram rendering only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// `+`
    Public,
    /// `-`
    Private,
    /// `#`
    Protected,
    /// `~`
    Package,
}

/// An attribute declared on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Primitive keyword or the name of another entity.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Visibility modifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    /// Static flag.
    #[serde(default)]
    pub is_static: bool,
    /// Read-only flag.
    #[serde(default)]
    pub is_readonly: bool,
}

impl Attribute {
    /// Creates a public, non-static, writable attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            visibility: None,
            is_static: false,
            is_readonly: false,
        }
    }

    /// Returns the declared type with one trailing `[]` removed.
    #[must_use]
    pub fn element_type(&self) -> &str {
        let trimmed = self.type_name.trim();
        trimmed.strip_suffix("[]").unwrap_or(trimmed).trim_end()
    }

    /// Returns `true` if the declared type carries an array suffix.
    #[must_use]
    pub fn is_array_type(&self) -> bool {
        self.type_name.trim().ends_with("[]")
    }
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    #[serde(rename = "type")]
    pub type_name: String,
}

impl Parameter {
    /// Creates a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

fn default_return_type() -> String {
    "void".to_string()
}

/// A method declared on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    /// Method name.
    pub name: String,
    /// Ordered parameters.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Return type (`void` when omitted).
    #[serde(default = "default_return_type")]
    pub return_type: String,
    /// Visibility modifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    /// Static flag.
    #[serde(default)]
    pub is_static: bool,
    /// Abstract flag.
    #[serde(default)]
    pub is_abstract: bool,
}

impl Method {
    /// Creates a method with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: return_type.into(),
            visibility: None,
            is_static: false,
            is_abstract: false,
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.parameters.push(Parameter::new(name, type_name));
        self
    }
}

/// A structural entity (class, interface, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Identifier used only for relationship linkage.
    pub id: String,
    /// Externally visible name.
    pub name: String,
    /// Entity kind.
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Ordered attributes.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Ordered methods.
    #[serde(default)]
    pub methods: Vec<Method>,
}

impl Entity {
    /// Creates an entity with no members.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            attributes: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Appends an attribute.
    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Appends a method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }
}

/// Multiplicity at each end of a relationship.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multiplicity {
    /// Multiplicity at the source end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Multiplicity at the target end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

/// A typed connection between two entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Relationship identifier.
    pub id: String,
    /// Source entity id.
    pub from: String,
    /// Target entity id.
    pub to: String,
    /// Relationship kind.
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    /// Optional multiplicities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplicity: Option<Multiplicity>,
    /// Optional name, used as the forward field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Relationship {
    /// Creates an unnamed relationship without multiplicities.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        kind: RelationshipKind,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            kind,
            multiplicity: None,
            name: None,
        }
    }

    /// Sets the multiplicities at both ends.
    #[must_use]
    pub fn with_multiplicity(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.multiplicity = Some(Multiplicity {
            from: Some(from.into()),
            to: Some(to.into()),
        });
        self
    }

    /// Sets the relationship name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns `true` if `entity_id` is either endpoint.
    #[must_use]
    pub fn touches(&self, entity_id: &str) -> bool {
        self.from == entity_id || self.to == entity_id
    }

    /// Returns the endpoint opposite to `entity_id`.
    ///
    /// For a self-referential relationship this is the entity itself.
    #[must_use]
    pub fn other_end(&self, entity_id: &str) -> &str {
        if self.from == entity_id {
            &self.to
        } else {
            &self.from
        }
    }

    /// Returns the multiplicity at the end opposite to `entity_id`.
    #[must_use]
    pub fn far_multiplicity(&self, entity_id: &str) -> Option<&str> {
        let multiplicity = self.multiplicity.as_ref()?;
        if self.from == entity_id {
            multiplicity.to.as_deref()
        } else {
            multiplicity.from.as_deref()
        }
    }

    /// Returns `true` if the far end, seen from `entity_id`, is many-valued.
    #[must_use]
    pub fn is_many_from(&self, entity_id: &str) -> bool {
        self.far_multiplicity(entity_id).is_some_and(is_many)
    }
}

/// A complete MSON model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Model identifier.
    pub id: String,
    /// Model name.
    pub name: String,
    /// Diagram kind.
    #[serde(rename = "type")]
    pub kind: ModelKind,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered entities.
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Ordered relationships.
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl Model {
    /// Creates an empty model.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ModelKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            description: None,
            entities: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Appends an entity.
    #[must_use]
    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    /// Appends a relationship.
    #[must_use]
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Looks up an entity by id.
    #[must_use]
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }
}

/// Resolves an entity id to its name, falling back to the raw id.
#[must_use]
pub fn entity_name<'a>(entities: &'a [Entity], id: &'a str) -> &'a str {
    entities
        .iter()
        .find(|e| e.id == id)
        .map_or(id, |e| e.name.as_str())
}
