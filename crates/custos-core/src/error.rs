//! Error types for custos-core and the crates built on it.

use thiserror::Error;

/// Result type alias for Custos operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving or granting access.
///
/// All variants are marked `#[non_exhaustive]` at the enum level so new
/// failure kinds can be added without breaking callers.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// No access policies exist for the requested object and identities.
    #[error("Unable to find ACL information for object {object} and security identities [{identities}]")]
    NotFound {
        /// Object the lookup was scoped to
        object: String,
        /// Candidate identities, comma separated
        identities: String,
    },

    /// An identical (identity, permission) grant already exists on the object.
    #[error("ACE already exists: {identity} holds {permission} on {object}")]
    DuplicateGrant {
        /// Identity that already holds the grant
        identity: String,
        /// Object the grant applies to
        object: String,
        /// Permission name
        permission: String,
    },

    /// Internal consistency breach: corrupted data or a logic defect upstream.
    #[error("Invariant violation: {message}")]
    InvariantViolation {
        /// What was violated
        message: String,
    },

    /// A permission mask or name is not registered.
    #[error("Unknown permission: {value}")]
    UnknownPermission {
        /// The offending mask or name
        value: String,
    },

    /// Caller supplied a malformed argument.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the argument
        message: String,
    },

    /// Enforcement point refused the request.
    #[error("Access denied: {message}")]
    AccessDenied {
        /// Why access was denied
        message: String,
    },

    /// Backing store failure (unavailable, rejected write, etc.)
    #[error("Storage error: {message}")]
    Storage {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// Fan-out did not complete within the configured deadline.
    #[error("Operation timed out after {millis}ms")]
    Timeout {
        /// Deadline in milliseconds
        millis: u64,
    },
}

impl Error {
    /// Returns whether this error is retryable.
    ///
    /// Only transient storage failures qualify. The engine never retries on
    /// its own; the caller applies its own policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Storage { .. } => true,
            Error::Io(_) => true,
            Error::Timeout { .. } => true,
            Error::NotFound { .. } => false,
            Error::DuplicateGrant { .. } => false,
            Error::InvariantViolation { .. } => false,
            Error::UnknownPermission { .. } => false,
            Error::InvalidArgument { .. } => false,
            Error::AccessDenied { .. } => false,
            Error::Serialization(_) => false,
            Error::Config { .. } => false,
        }
    }

    /// Returns `true` for errors that must abort the current request and be
    /// surfaced to operators.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::InvariantViolation { .. } | Error::UnknownPermission { .. }
        )
    }

    /// Creates a storage error with a message.
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Error::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a storage error with a message and source error.
    pub fn storage_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an invariant violation.
    pub fn invariant<S: Into<String>>(message: S) -> Self {
        Error::InvariantViolation {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an unknown permission error.
    pub fn unknown_permission<S: Into<String>>(value: S) -> Self {
        Error::UnknownPermission {
            value: value.into(),
        }
    }

    /// Creates an access denied error.
    pub fn access_denied<S: Into<String>>(message: S) -> Self {
        Error::AccessDenied {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}
