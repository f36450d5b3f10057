//! Bundle validation.
//!
//! Validation runs in two phases:
//!
//! 1. **Structural**: the candidate must deserialise into a [`Bundle`] and
//!    carry a `MAJOR.MINOR.PATCH` version. A failure here is reported as a
//!    single error and nothing else is checked.
//! 2. **Semantic**: every check below runs, whatever the others report:
//!    - every type model names an existing schema
//!    - every component class names an existing schema
//!    - every behaviour belongs to the bundle or to an existing schema
//!    - identities are unique across the whole bundle
//!    - inherited schemas exist and inheritance is acyclic
//!    - method signatures only hold string types
//!
//! Only error-severity diagnostics make a bundle invalid.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::diagnostics::{has_errors, Diagnostic};
use crate::runtime::bundle::{Bundle, Schema, BASE_COMPONENT, RETURN_KEY};

static SEMANTIC_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("version pattern is valid"));

/// Returns `true` if `version` has the `MAJOR.MINOR.PATCH` form.
#[must_use]
pub fn is_semantic_version(version: &str) -> bool {
    SEMANTIC_VERSION.is_match(version)
}

/// Outcome of bundle validation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// `true` when no error-severity diagnostics were produced.
    pub is_valid: bool,
    /// All findings, in check order.
    pub warnings: Vec<Diagnostic>,
    /// The parsed bundle; present whenever the structural phase passed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle: Option<Bundle>,
}

impl ValidationReport {
    fn structural_failure(message: String) -> Self {
        warn!(%message, "Bundle failed structural validation");
        Self {
            is_valid: false,
            warnings: vec![Diagnostic::error(message)],
            bundle: None,
        }
    }

    /// Number of error-severity diagnostics.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.warnings.iter().filter(|w| w.is_error()).count()
    }
}

/// Validates an arbitrary JSON value claiming to be a bundle.
#[must_use]
pub fn validate_bundle(candidate: &Value) -> ValidationReport {
    match Bundle::deserialize(candidate) {
        Ok(bundle) => validate(bundle),
        Err(e) => ValidationReport::structural_failure(format!(
            "Bundle does not match the System Runtime format: {e}"
        )),
    }
}

/// Validates an already typed bundle.
#[must_use]
pub fn validate(bundle: Bundle) -> ValidationReport {
    if !is_semantic_version(&bundle.version) {
        return ValidationReport::structural_failure(format!(
            "Bundle version '{}' is not of the form MAJOR.MINOR.PATCH",
            bundle.version
        ));
    }

    let warnings = check_semantics(&bundle);
    let is_valid = !has_errors(&warnings);

    if is_valid {
        debug!(bundle = %bundle.name, findings = warnings.len(), "Bundle is valid");
    } else {
        warn!(
            bundle = %bundle.name,
            findings = warnings.len(),
            "Bundle failed semantic validation"
        );
    }

    ValidationReport {
        is_valid,
        warnings,
        bundle: Some(bundle),
    }
}

/// Runs every semantic check over `bundle`.
#[must_use]
pub fn check_semantics(bundle: &Bundle) -> Vec<Diagnostic> {
    let schema_names: HashSet<&str> = bundle.schemas.values().map(|s| s.name.as_str()).collect();

    let mut warnings = Vec::new();
    check_schema_references(bundle, &schema_names, &mut warnings);
    check_component_types(bundle, &schema_names, &mut warnings);
    check_behavior_references(bundle, &schema_names, &mut warnings);
    check_unique_ids(bundle, &mut warnings);
    check_keys_match_ids(bundle, &mut warnings);
    check_inheritance(bundle, &mut warnings);
    check_method_signatures(bundle, &mut warnings);
    warnings
}

fn check_schema_references(
    bundle: &Bundle,
    schema_names: &HashSet<&str>,
    warnings: &mut Vec<Diagnostic>,
) {
    for model in bundle.models.values() {
        if !schema_names.contains(model.name.as_str()) {
            warnings.push(Diagnostic::error(format!(
                "Model '{}' ({}) does not match any schema",
                model.name, model.id
            )));
        }
    }
}

fn check_component_types(
    bundle: &Bundle,
    schema_names: &HashSet<&str>,
    warnings: &mut Vec<Diagnostic>,
) {
    for class_name in bundle.components.keys() {
        if !schema_names.contains(class_name.as_str()) {
            warnings.push(Diagnostic::error(format!(
                "Components of class '{class_name}' have no matching schema"
            )));
        }
    }
}

fn check_behavior_references(
    bundle: &Bundle,
    schema_names: &HashSet<&str>,
    warnings: &mut Vec<Diagnostic>,
) {
    for behavior in bundle.behaviors.values() {
        let owner = behavior.component.as_str();
        if owner != bundle.id && !schema_names.contains(owner) {
            warnings.push(Diagnostic::error(format!(
                "Behavior '{}' belongs to unknown component '{owner}'",
                behavior.id
            )));
        }
    }
}

/// Identity of a component instance: its `_id` when present, else its key.
fn instance_id<'a>(key: &'a str, instance: &'a Value) -> &'a str {
    instance.get("_id").and_then(Value::as_str).unwrap_or(key)
}

fn check_unique_ids(bundle: &Bundle, warnings: &mut Vec<Diagnostic>) {
    let mut ids: Vec<(&str, String)> = vec![(bundle.id.as_str(), "bundle".to_string())];
    ids.extend(
        bundle
            .schemas
            .values()
            .map(|s| (s.id.as_str(), format!("schema '{}'", s.name))),
    );
    ids.extend(
        bundle
            .models
            .values()
            .map(|m| (m.id.as_str(), format!("model '{}'", m.name))),
    );
    ids.extend(
        bundle
            .types
            .values()
            .map(|t| (t.id.as_str(), format!("type '{}'", t.name))),
    );
    ids.extend(
        bundle
            .behaviors
            .values()
            .map(|b| (b.id.as_str(), format!("behavior of '{}'", b.component))),
    );
    for (class_name, instances) in &bundle.components {
        ids.extend(instances.iter().map(|(key, instance)| {
            (instance_id(key, instance), format!("'{class_name}' instance"))
        }));
    }

    let mut seen: HashMap<&str, &str> = HashMap::new();
    for (id, owner) in &ids {
        if let Some(first) = seen.get(id) {
            warnings.push(Diagnostic::error(format!(
                "Duplicate identifier '{id}': {owner} reuses the id of {first}"
            )));
        } else {
            seen.insert(*id, owner.as_str());
        }
    }
}

fn check_keys_match_ids(bundle: &Bundle, warnings: &mut Vec<Diagnostic>) {
    let entries = bundle
        .schemas
        .iter()
        .map(|(key, s)| ("schemas", key, &s.id))
        .chain(bundle.models.iter().map(|(key, m)| ("models", key, &m.id)))
        .chain(bundle.types.iter().map(|(key, t)| ("types", key, &t.id)))
        .chain(bundle.behaviors.iter().map(|(key, b)| ("behaviors", key, &b.id)));

    for (section, key, id) in entries {
        if key != id {
            warnings.push(Diagnostic::warning(format!(
                "Entry '{key}' in {section} declares a different _id '{id}'"
            )));
        }
    }
}

fn check_inheritance(bundle: &Bundle, warnings: &mut Vec<Diagnostic>) {
    let by_name: HashMap<&str, &Schema> = bundle
        .schemas
        .values()
        .map(|s| (s.name.as_str(), s))
        .collect();

    for schema in bundle.schemas.values() {
        for parent in parents(schema) {
            if !by_name.contains_key(parent) {
                warnings.push(Diagnostic::error(format!(
                    "Schema '{}' inherits from unknown schema '{parent}'",
                    schema.name
                )));
            }
        }
    }

    let mut acyclic: HashSet<&str> = HashSet::new();
    for schema in bundle.schemas.values() {
        let mut path = Vec::new();
        if let Some(cycle) = find_cycle(&schema.name, &by_name, &mut path, &mut acyclic) {
            warnings.push(Diagnostic::error(format!(
                "Inheritance cycle detected from schema '{}': {}",
                schema.name,
                cycle.join(" -> ")
            )));
        }
    }
}

fn parents(schema: &Schema) -> impl Iterator<Item = &str> {
    schema
        .inherit
        .iter()
        .map(String::as_str)
        .filter(|name| *name != BASE_COMPONENT)
}

/// Depth-first search along inheritance lists. Returns the first cycle
/// reachable from `name`, closed by repeating its first element.
fn find_cycle<'a>(
    name: &'a str,
    by_name: &HashMap<&'a str, &'a Schema>,
    path: &mut Vec<&'a str>,
    acyclic: &mut HashSet<&'a str>,
) -> Option<Vec<&'a str>> {
    if let Some(start) = path.iter().position(|n| *n == name) {
        let mut cycle = path[start..].to_vec();
        cycle.push(name);
        return Some(cycle);
    }
    if acyclic.contains(name) {
        return None;
    }
    let schema: &'a Schema = by_name.get(name).copied()?;

    path.push(name);
    for parent in parents(schema) {
        if let Some(cycle) = find_cycle(parent, by_name, path, acyclic) {
            path.pop();
            return Some(cycle);
        }
    }
    path.pop();

    acyclic.insert(name);
    None
}

fn check_method_signatures(bundle: &Bundle, warnings: &mut Vec<Diagnostic>) {
    for model in bundle.models.values() {
        for (field, value) in &model.fields {
            let Some(signature) = value.as_signature() else {
                continue;
            };

            if !signature.get(RETURN_KEY).is_some_and(Value::is_string) {
                warnings.push(Diagnostic::error(format!(
                    "Method '{field}' of model '{}' has a non-string return type",
                    model.name
                )));
            }

            for (param, param_type) in signature {
                if param != RETURN_KEY && !param_type.is_string() {
                    warnings.push(Diagnostic::error(format!(
                        "Parameter '{param}' of method '{field}' in model '{}' has a non-string type",
                        model.name
                    )));
                }
            }
        }
    }
}
