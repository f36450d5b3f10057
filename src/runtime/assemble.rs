//! Model -> bundle assembly.

use indexmap::IndexMap;
use tracing::debug;

use crate::mson::Model;
use crate::runtime::bundle::Bundle;
use crate::runtime::ids::generate_id;
use crate::runtime::model::to_model;
use crate::runtime::schema::to_schema;

/// Version given to bundles when none is requested.
pub const DEFAULT_VERSION: &str = "0.0.1";

/// Options for [`assemble`].
#[derive(Debug, Clone, Default)]
pub struct AssembleOptions {
    /// Bundle version; [`DEFAULT_VERSION`] when `None`.
    pub version: Option<String>,
    /// Marks the bundle as the primary bundle of its system.
    pub master: bool,
}

impl AssembleOptions {
    /// Sets the bundle version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Converts a model into a bundle with one schema and one type model per
/// entity, in entity order.
///
/// Relationship references are not checked here; see
/// [`check_model`](crate::mson::check_model) and
/// [`validate_bundle`](crate::runtime::validate::validate_bundle).
#[must_use]
pub fn assemble(model: &Model, options: &AssembleOptions) -> Bundle {
    let mut schemas = IndexMap::with_capacity(model.entities.len());
    let mut models = IndexMap::with_capacity(model.entities.len());
    let mut components = IndexMap::with_capacity(model.entities.len());

    for entity in &model.entities {
        let schema = to_schema(entity, &model.relationships, &model.entities);
        let type_model = to_model(entity, &model.relationships, &model.entities);

        schemas.insert(schema.id.clone(), schema);
        models.insert(type_model.id.clone(), type_model);
        components.insert(entity.name.clone(), IndexMap::new());
    }

    let description = model.description.clone().unwrap_or_else(|| {
        format!(
            "System Runtime bundle generated from MSON model '{}'",
            model.name
        )
    });

    let bundle = Bundle {
        id: generate_id(),
        name: model.name.clone(),
        description,
        version: options
            .version
            .clone()
            .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        master: options.master,
        schemas,
        models,
        types: IndexMap::new(),
        behaviors: IndexMap::new(),
        components,
    };

    debug!(
        model = %model.name,
        schemas = bundle.schemas.len(),
        version = %bundle.version,
        "Assembled bundle"
    );

    bundle
}
