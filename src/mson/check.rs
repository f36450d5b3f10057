//! Soft consistency checks over an MSON model.
//!
//! The transformation core assumes references resolve and degrades quietly
//! when they don't. This pass is where such problems are surfaced to the
//! caller before conversion.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::diagnostics::{has_errors, Diagnostic};
use crate::mson::model::Model;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Outcome of [`check_model`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelReport {
    /// `true` when no error-severity diagnostics were produced.
    pub is_valid: bool,
    /// All findings, in check order.
    pub warnings: Vec<Diagnostic>,
}

/// Checks a model for duplicate ids, dangling references and naming issues.
#[must_use]
pub fn check_model(model: &Model) -> ModelReport {
    let mut warnings = Vec::new();

    let mut entity_ids: HashSet<&str> = HashSet::new();
    let mut entity_names: HashSet<&str> = HashSet::new();
    for entity in &model.entities {
        if entity.name.trim().is_empty() {
            warnings.push(Diagnostic::error(format!(
                "Entity '{}' has an empty name",
                entity.id
            )));
        } else if !IDENTIFIER.is_match(&entity.name) {
            warnings.push(Diagnostic::warning(format!(
                "Entity name '{}' is not a valid identifier",
                entity.name
            )));
        }

        // Schemas and models are looked up by name in the bundle.
        if !entity.name.trim().is_empty() && !entity_names.insert(entity.name.as_str()) {
            warnings.push(Diagnostic::warning(format!(
                "Duplicate entity name: '{}' (entity '{}')",
                entity.name, entity.id
            )));
        }

        if !entity_ids.insert(entity.id.as_str()) {
            warnings.push(Diagnostic::error(format!(
                "Duplicate entity id: '{}'",
                entity.id
            )));
        }

        let mut members: HashSet<&str> = HashSet::new();
        let names = entity
            .attributes
            .iter()
            .map(|a| a.name.as_str())
            .chain(entity.methods.iter().map(|m| m.name.as_str()));
        for name in names {
            if !members.insert(name) {
                warnings.push(Diagnostic::warning(format!(
                    "Entity '{}' declares member '{name}' more than once",
                    entity.name
                )));
            }
        }
    }

    let mut relationship_ids: HashSet<&str> = HashSet::new();
    for rel in &model.relationships {
        if !relationship_ids.insert(rel.id.as_str()) {
            warnings.push(Diagnostic::warning(format!(
                "Duplicate relationship id: '{}'",
                rel.id
            )));
        }

        for endpoint in [&rel.from, &rel.to] {
            if !entity_ids.contains(endpoint.as_str()) {
                warnings.push(Diagnostic::warning(format!(
                    "Relationship '{}' references unknown entity '{endpoint}'",
                    rel.id
                )));
            }
        }

        if rel.kind.is_inheritance() && rel.from == rel.to {
            warnings.push(Diagnostic::warning(format!(
                "Relationship '{}' makes entity '{}' inherit from itself",
                rel.id, rel.from
            )));
        }

        if !rel.kind.is_structural() && rel.multiplicity.is_some() {
            warnings.push(Diagnostic::warning(format!(
                "Relationship '{}' carries a multiplicity that its kind ignores",
                rel.id
            )));
        }
    }

    ModelReport {
        is_valid: !has_errors(&warnings),
        warnings,
    }
}
