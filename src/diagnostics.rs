//! Diagnostic entries shared by the model checker and the bundle validator.
//!
//! Both checkers collect every problem they find in one pass instead of
//! stopping at the first one. Only [`Severity::Error`] entries make a
//! result invalid.

use serde::{Deserialize, Serialize};

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational; does not affect validity.
    Warning,
    /// Makes the checked artifact invalid.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single finding reported by a checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Human-readable description of the problem.
    pub message: String,
    /// Severity of the problem.
    pub severity: Severity,
}

impl Diagnostic {
    /// Creates a warning-severity diagnostic.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    /// Creates an error-severity diagnostic.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }

    /// Returns `true` if this diagnostic is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Returns `true` if any diagnostic in the slice is an error.
#[must_use]
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_serialises_lowercase() {
        let json = serde_json::to_string(&Diagnostic::error("bad")).unwrap();
        assert_eq!(json, r#"{"message":"bad","severity":"error"}"#);
    }

    #[test]
    fn warnings_do_not_count_as_errors() {
        let diagnostics = vec![Diagnostic::warning("minor"), Diagnostic::warning("other")];
        assert!(!has_errors(&diagnostics));

        let diagnostics = vec![Diagnostic::warning("minor"), Diagnostic::error("fatal")];
        assert!(has_errors(&diagnostics));
    }
}
