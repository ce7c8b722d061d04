//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Session errors
//! - 2xx: Catalog errors
//! - 3xx: Config errors
//! - 4xx: Checklist errors
//! - 6xx: Storage errors
//! - 8xx: Validation errors
//! - 9xx: General errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output.
///
/// Each variant maps to a numeric code (e.g., `NoActiveSession` -> E101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Session errors (1xx)
    // ========================================
    /// E101: Operation needs a session but none exists
    NoActiveSession,
    /// E102: A session is already running
    SessionAlreadyActive,
    /// E103: Requested lifecycle transition is not allowed
    InvalidTransition,
    /// E104: Session exists but is paused or completed
    SessionNotInProgress,
    /// E105: Step id is not part of the catalog
    UnknownStep,

    // ========================================
    // Catalog errors (2xx)
    // ========================================
    /// E201: Catalog has no steps
    CatalogEmpty,
    /// E202: Catalog has malformed or duplicate steps
    CatalogInvalid,
    /// E203: No built-in catalog or file with that name
    CatalogNotFound,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E302: Config file has invalid syntax or values
    ConfigInvalid,
    /// E304: Required config value is missing
    ConfigMissingRequired,

    // ========================================
    // Checklist errors (4xx)
    // ========================================
    /// E401: Checklist item id not found
    ChecklistItemNotFound,
    /// E402: Site visit record could not be used
    SiteVisitInvalid,

    // ========================================
    // Storage errors (6xx)
    // ========================================
    /// E602: Failed to write to storage
    StorageWriteError,
    /// E605: Serialization/deserialization failed
    SerializationError,

    // ========================================
    // Validation errors (8xx)
    // ========================================
    /// E801: Validation rules failed
    ValidationFailed,
    /// E802: Input outside the supported lookup range
    OutOfRange,

    // ========================================
    // General errors (9xx)
    // ========================================
    /// E905: Generic not found (catch-all)
    NotFound,
    /// E906: IO operation failed
    IoError,
}

impl ErrorCode {
    /// Get the numeric error code (e.g., `NoActiveSession` -> 101).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::NoActiveSession => 101,
            Self::SessionAlreadyActive => 102,
            Self::InvalidTransition => 103,
            Self::SessionNotInProgress => 104,
            Self::UnknownStep => 105,

            Self::CatalogEmpty => 201,
            Self::CatalogInvalid => 202,
            Self::CatalogNotFound => 203,

            Self::ConfigInvalid => 302,
            Self::ConfigMissingRequired => 304,

            Self::ChecklistItemNotFound => 401,
            Self::SiteVisitInvalid => 402,

            Self::StorageWriteError => 602,
            Self::SerializationError => 605,

            Self::ValidationFailed => 801,
            Self::OutOfRange => 802,

            Self::NotFound => 905,
            Self::IoError => 906,
        }
    }

    /// Get the error code as a formatted string (e.g., "E101").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Get the default suggestion for this error code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::NoActiveSession => "Start a session with `testflow session start --catalog <id>`",
            Self::SessionAlreadyActive => "Complete or abandon the current session before starting another",
            Self::InvalidTransition => "Run `testflow session status` to see the current session state",
            Self::SessionNotInProgress => "Resume the session with `testflow session resume` first",
            Self::UnknownStep => "Run `testflow catalog show <id>` to list the step ids in this flow",

            Self::CatalogEmpty => "Add at least one step to the catalog file",
            Self::CatalogInvalid => "Check the catalog for blank or duplicate step ids",
            Self::CatalogNotFound => "Run `testflow catalog list` to see built-in catalogs, or pass a file path",

            Self::ConfigInvalid => "Run `testflow config` to see current values. Check TOML syntax in config file",
            Self::ConfigMissingRequired => "Set the required value in config.toml or via a TESTFLOW_* variable",

            Self::ChecklistItemNotFound => "Check the item id against the saved checklist file",
            Self::SiteVisitInvalid => "Check the site visit file contains `rooms` and `prompt_responses`",

            Self::StorageWriteError => "Check disk space and write permissions on the state directory",
            Self::SerializationError => "The data format may be corrupted. Check input data for validity",

            Self::ValidationFailed => "Review the reported issues and correct the design values",
            Self::OutOfRange => "Use a value inside the lookup table range",

            Self::NotFound => "The requested resource was not found. Check the path or identifier",
            Self::IoError => "File operation failed. Check path exists and permissions are correct",
        }
    }

    /// Check if this error is potentially recoverable by the user.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::SerializationError)
    }

    /// Get the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "session",
            2 => "catalog",
            3 => "config",
            4 => "checklist",
            6 => "storage",
            8 => "validation",
            9 => "general",
            _ => "unknown",
        }
    }

    /// Iterate over all error codes.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::NoActiveSession,
            Self::SessionAlreadyActive,
            Self::InvalidTransition,
            Self::SessionNotInProgress,
            Self::UnknownStep,
            Self::CatalogEmpty,
            Self::CatalogInvalid,
            Self::CatalogNotFound,
            Self::ConfigInvalid,
            Self::ConfigMissingRequired,
            Self::ChecklistItemNotFound,
            Self::SiteVisitInvalid,
            Self::StorageWriteError,
            Self::SerializationError,
            Self::ValidationFailed,
            Self::OutOfRange,
            Self::NotFound,
            Self::IoError,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
