//! Error types for component registry operations
//!
//! Every failure the registry can report is a variant of [`ComponentError`].
//! Each variant carries:
//! - A human-readable message naming the offending identity or key
//! - A stable error code for programmatic handling
//! - A category for grouping
//!
//! Absence is not an error for broad queries: `filter_all` returns an empty
//! list, and `query_one` returns `None`. Only `require_one` turns absence
//! into [`ComponentError::ComponentNotFound`].
//!
//! # Example
//!
//! ```rust
//! use component_core::error::{ComponentError, ErrorCategory};
//!
//! fn handle_error(err: ComponentError) {
//!     match err.category() {
//!         ErrorCategory::NotFound => println!("nothing registered"),
//!         ErrorCategory::Conflict => println!("ambiguous registration"),
//!         _ => println!("other error: {}", err.error_code()),
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, ComponentError>;

/// Boxed error returned by component constructors
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error category for grouping related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Nothing matched a required resolution
    NotFound,
    /// A supplied identity, context or manifest is malformed
    Validation,
    /// More than one component answers an exact query
    Conflict,
    /// The registry store violates its own invariants
    Integrity,
    /// Backend selection or environment configuration is wrong
    Configuration,
    /// A component constructor or the file system failed
    External,
}

/// Errors that can occur in registry operations
#[derive(Error, Debug)]
pub enum ComponentError {
    // ═══════════════════════════════════════════════════════════════════════
    // Identity and registration errors
    // ═══════════════════════════════════════════════════════════════════════

    /// A type-or-name value does not yield a usable identity string
    #[error("Invalid identity '{identity}': {reason}")]
    InvalidIdentity { identity: String, reason: String },

    /// A context element cannot be reduced to a type name
    #[error("Invalid context element '{element}': {reason}. Context must be made of types or type names.")]
    InvalidContext { element: String, reason: String },

    /// A component without an inspectable type was registered without an identity
    #[error("Missing identity for component '{component}'. Provide an explicit identity when registering callables.")]
    MissingIdentity { component: String },

    /// An ancestor chain could not be computed
    #[error("No ancestor chain for '{identity}': {reason}")]
    NoAncestors { identity: String, reason: String },

    // ═══════════════════════════════════════════════════════════════════════
    // Resolution errors
    // ═══════════════════════════════════════════════════════════════════════

    /// An exact query matched more than one registration
    #[error("Multiple components found for '{key}' with context [{context}]: {components:?}. Exact queries must match at most one registration.")]
    AmbiguousResolution {
        key: String,
        context: String,
        components: Vec<String>,
    },

    /// A required resolution found nothing
    #[error("No component found for '{key}' with context [{context}]. Register one with register() first.")]
    ComponentNotFound { key: String, context: String },

    /// A wildcard key holds several context buckets and none is context-free
    #[error("Inconsistent registry under '{key}': untyped query cannot choose between context buckets {signatures:?}")]
    InconsistentRegistry { key: String, signatures: Vec<String> },

    // ═══════════════════════════════════════════════════════════════════════
    // Instantiation errors
    // ═══════════════════════════════════════════════════════════════════════

    /// The resolved component has no constructor
    #[error("Component '{component}' cannot be instantiated: no constructor attached")]
    NotConstructible { component: String },

    /// The component's constructor failed
    #[error("Constructing '{component}' failed: {source}")]
    ConstructionFailed {
        component: String,
        #[source]
        source: BoxError,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Configuration and manifest errors
    // ═══════════════════════════════════════════════════════════════════════

    /// A configuration value is malformed
    #[error("Invalid configuration for '{key}': {reason}")]
    InvalidConfig { key: String, reason: String },

    /// A manifest is structurally valid JSON but semantically wrong
    #[error("Invalid manifest: {reason}")]
    InvalidManifest { reason: String },

    /// A manifest file could not be read
    #[error("Failed to load manifest from '{path}': {reason}")]
    ManifestLoad { path: String, reason: String },

    /// JSON serialization or deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ComponentError {
    /// Returns the error category for grouping
    pub fn category(&self) -> ErrorCategory {
        match self {
            ComponentError::ComponentNotFound { .. } => ErrorCategory::NotFound,

            ComponentError::InvalidIdentity { .. }
            | ComponentError::InvalidContext { .. }
            | ComponentError::MissingIdentity { .. }
            | ComponentError::NoAncestors { .. }
            | ComponentError::InvalidManifest { .. }
            | ComponentError::Json(_) => ErrorCategory::Validation,

            ComponentError::AmbiguousResolution { .. } => ErrorCategory::Conflict,

            ComponentError::InconsistentRegistry { .. } => ErrorCategory::Integrity,

            ComponentError::InvalidConfig { .. } => ErrorCategory::Configuration,

            ComponentError::NotConstructible { .. }
            | ComponentError::ConstructionFailed { .. }
            | ComponentError::ManifestLoad { .. } => ErrorCategory::External,
        }
    }

    /// Returns the stable error code for this error
    ///
    /// Error codes are uppercase, underscore-separated identifiers that
    /// remain stable across versions.
    pub fn error_code(&self) -> &'static str {
        match self {
            ComponentError::InvalidIdentity { .. } => "INVALID_IDENTITY",
            ComponentError::InvalidContext { .. } => "INVALID_CONTEXT",
            ComponentError::MissingIdentity { .. } => "MISSING_IDENTITY",
            ComponentError::NoAncestors { .. } => "NO_ANCESTORS",
            ComponentError::AmbiguousResolution { .. } => "AMBIGUOUS_RESOLUTION",
            ComponentError::ComponentNotFound { .. } => "COMPONENT_NOT_FOUND",
            ComponentError::InconsistentRegistry { .. } => "INCONSISTENT_REGISTRY",
            ComponentError::NotConstructible { .. } => "NOT_CONSTRUCTIBLE",
            ComponentError::ConstructionFailed { .. } => "CONSTRUCTION_FAILED",
            ComponentError::InvalidConfig { .. } => "INVALID_CONFIG",
            ComponentError::InvalidManifest { .. } => "INVALID_MANIFEST",
            ComponentError::ManifestLoad { .. } => "MANIFEST_LOAD_ERROR",
            ComponentError::Json(_) => "JSON_ERROR",
        }
    }

    /// Returns true when the caller supplied bad input or asked for
    /// something that is not registered
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::NotFound
                | ErrorCategory::Validation
                | ErrorCategory::Conflict
                | ErrorCategory::Configuration
        )
    }

    /// Converts this error to a JSON-serializable response object
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                category: self.category(),
            },
        }
    }
}

/// JSON-serializable error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,
}

/// Error detail for JSON responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Stable error code (e.g., "COMPONENT_NOT_FOUND")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Error category
    pub category: ErrorCategory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ComponentError::ComponentNotFound {
                key: "Feeder".to_string(),
                context: String::new(),
            }
            .error_code(),
            "COMPONENT_NOT_FOUND"
        );
        assert_eq!(
            ComponentError::AmbiguousResolution {
                key: "Feeder".to_string(),
                context: "Dog".to_string(),
                components: vec!["a".to_string(), "b".to_string()],
            }
            .error_code(),
            "AMBIGUOUS_RESOLUTION"
        );
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            ComponentError::MissingIdentity {
                component: "feed".to_string()
            }
            .category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            ComponentError::InconsistentRegistry {
                key: "Feeder*".to_string(),
                signatures: vec!["Dog".to_string(), "Cat".to_string()],
            }
            .category(),
            ErrorCategory::Integrity
        );
        assert_eq!(
            ComponentError::ConstructionFailed {
                component: "Dog".to_string(),
                source: "boom".into(),
            }
            .category(),
            ErrorCategory::External
        );
    }

    #[test]
    fn test_is_client_error() {
        let not_found = ComponentError::ComponentNotFound {
            key: "Cat".to_string(),
            context: String::new(),
        };
        assert!(not_found.is_client_error());

        let broken = ComponentError::InconsistentRegistry {
            key: "Cat*".to_string(),
            signatures: vec![],
        };
        assert!(!broken.is_client_error());
    }

    #[test]
    fn test_error_response_serialization() {
        let err = ComponentError::ComponentNotFound {
            key: "Feeder:morning".to_string(),
            context: "Dog".to_string(),
        };
        let response = err.to_error_response();

        let json = serde_json::to_string_pretty(&response).unwrap();
        assert!(json.contains("COMPONENT_NOT_FOUND"));
        assert!(json.contains("Feeder:morning"));
        assert!(json.contains("not_found"));

        let parsed: ErrorResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.error.code, "COMPONENT_NOT_FOUND");
        assert_eq!(parsed.error.category, ErrorCategory::NotFound);
    }

    #[test]
    fn test_construction_error_keeps_source() {
        use std::error::Error as _;

        let err = ComponentError::ConstructionFailed {
            component: "Dog".to_string(),
            source: "leash missing".into(),
        };
        assert!(err.to_string().contains("leash missing"));
        assert!(err.source().is_some());
    }
}
