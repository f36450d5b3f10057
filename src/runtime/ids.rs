//! Identity generation for bundles, schemas and type models.

use uuid::Uuid;

/// Generates a fresh identity as 32 lowercase hex characters.
///
/// Identities are random (UUID v4); uniqueness inside a bundle is still
/// checked by the validator for bundles that come from elsewhere.
#[must_use]
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}
