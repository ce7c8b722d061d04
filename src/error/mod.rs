//! Error handling for testflow.
//!
//! This module provides:
//! - [`FlowError`]: The main error enum for all testflow operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Rich error type with suggestions and context

mod codes;
mod suggestions;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::flow::SessionStatus;

pub use codes::ErrorCode;
pub use suggestions::suggest_for_error;

/// Main error type for testflow operations.
///
/// Operations that the engine used to ignore silently (recording without a
/// session, completing twice) surface here so callers can tell a refused
/// call from a successful one.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("No active test session")]
    NoActiveSession,

    #[error("Test session {session_id} is already active")]
    SessionAlreadyActive { session_id: String },

    #[error("Cannot move test session from {from} to {to}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("Test session is {status}, not in progress")]
    SessionNotInProgress { status: SessionStatus },

    #[error("Unknown step: {0}")]
    UnknownStep(String),

    #[error("Catalog '{0}' has no steps")]
    EmptyCatalog(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Catalog not found: {0}")]
    CatalogNotFound(String),

    #[error("Checklist item not found: {0}")]
    ChecklistItemNotFound(String),

    #[error("Invalid site visit: {0}")]
    InvalidSiteVisit(String),

    #[error("{parameter} value {value} is outside the supported range")]
    OutOfRange { parameter: String, value: f64 },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl FlowError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NoActiveSession => ErrorCode::NoActiveSession,
            Self::SessionAlreadyActive { .. } => ErrorCode::SessionAlreadyActive,
            Self::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            Self::SessionNotInProgress { .. } => ErrorCode::SessionNotInProgress,
            Self::UnknownStep(_) => ErrorCode::UnknownStep,
            Self::EmptyCatalog(_) => ErrorCode::CatalogEmpty,
            Self::InvalidCatalog(_) => ErrorCode::CatalogInvalid,
            Self::CatalogNotFound(_) => ErrorCode::CatalogNotFound,
            Self::ChecklistItemNotFound(_) => ErrorCode::ChecklistItemNotFound,
            Self::InvalidSiteVisit(_) => ErrorCode::SiteVisitInvalid,
            Self::OutOfRange { .. } => ErrorCode::OutOfRange,
            Self::ValidationFailed(_) => ErrorCode::ValidationFailed,
            Self::Config(_) | Self::Toml(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
            Self::Storage(_) => ErrorCode::StorageWriteError,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) | Self::Yaml(_) => ErrorCode::SerializationError,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::SessionAlreadyActive { session_id } => {
                Some(serde_json::json!({ "session_id": session_id }))
            }
            Self::InvalidTransition { from, to } => {
                Some(serde_json::json!({ "from": from, "to": to }))
            }
            Self::SessionNotInProgress { status } => {
                Some(serde_json::json!({ "status": status }))
            }
            Self::UnknownStep(step_id) => Some(serde_json::json!({ "step_id": step_id })),
            Self::CatalogNotFound(name) => Some(serde_json::json!({ "catalog": name })),
            Self::ChecklistItemNotFound(id) => Some(serde_json::json!({ "item_id": id })),
            Self::OutOfRange { parameter, value } => {
                Some(serde_json::json!({ "parameter": parameter, "value": value }))
            }
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_flow_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
///
/// Used for robot mode output where scripts need to branch on the failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "NO_ACTIVE_SESSION")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 101)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "session", "catalog")
    pub category: String,
}

impl StructuredError {
    /// Create a new structured error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    /// Create a structured error from a `FlowError`.
    #[must_use]
    pub fn from_flow_error(err: &FlowError) -> Self {
        let code = err.code();
        let context = err.context();
        let suggestion = suggest_for_error(code, context.as_ref());

        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            suggestion,
            context,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
        }
    }

    /// Add context to this error.
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self.suggestion = suggest_for_error(self.code, self.context.as_ref());
        self
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<&FlowError> for StructuredError {
    fn from(err: &FlowError) -> Self {
        Self::from_flow_error(err)
    }
}

/// Result type alias using `FlowError`.
pub type Result<T> = std::result::Result<T, FlowError>;
