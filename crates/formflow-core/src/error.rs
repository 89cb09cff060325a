//! Error types for formflow.
//!
//! [`FormflowError`] groups every failure the workflow can surface: request
//! and routing problems, persistence failures reported by an object manager,
//! form construction failures, and configuration errors.

use thiserror::Error;

/// The primary error type for formflow.
///
/// Each variant maps to an HTTP status code via [`FormflowError::status_code`]
/// so that web integrations can turn a failed workflow step into a response.
#[derive(Error, Debug)]
pub enum FormflowError {
    // ── Request ──────────────────────────────────────────────────────

    /// The incoming request could not be used (malformed body, bad params).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request was not matched to a named route, so no action URL can be
    /// generated for it.
    #[error("Request has no matched route")]
    MissingRoute,

    // ── Routing ──────────────────────────────────────────────────────

    /// No route with the given name is registered.
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    /// A route exists but the supplied parameters do not satisfy it.
    #[error("Invalid route parameter: {0}")]
    InvalidRouteParameter(String),

    // ── Persistence ──────────────────────────────────────────────────

    /// A generic persistence error raised by an object manager.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A persistence constraint was violated during flush.
    #[error("Integrity error: {0}")]
    IntegrityError(String),

    // ── Forms ────────────────────────────────────────────────────────

    /// The form factory does not know the requested form type.
    #[error("Unknown form type: {0}")]
    UnknownFormType(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FormflowError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `BadRequest`, `InvalidRouteParameter` -> 400
    /// - `RouteNotFound` -> 404
    /// - `IntegrityError` -> 409
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::InvalidRouteParameter(_) => 400,
            Self::RouteNotFound(_) => 404,
            Self::IntegrityError(_) => 409,
            Self::MissingRoute
            | Self::DatabaseError(_)
            | Self::UnknownFormType(_)
            | Self::ConfigurationError(_)
            | Self::SerializationError(_)
            | Self::IoError(_) => 500,
        }
    }

    /// Returns `true` if the error originated in the persistence layer.
    pub const fn is_persistence(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::IntegrityError(_))
    }
}

impl From<serde_json::Error> for FormflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience type alias for `Result<T, FormflowError>`.
pub type FormflowResult<T> = Result<T, FormflowError>;
