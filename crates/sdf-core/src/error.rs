use std::fmt;

use thiserror::Error;

/// Classification attached to every provisioning failure.
///
/// Remote adapters assign the kind once, at the provider boundary. Business logic
/// branches on the kind and never on provider error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The create target is already present.
    AlreadyExists,
    /// The target of a read or delete is absent.
    NotFound,
    /// The provider reported a definitive failure.
    RemoteFailure,
    /// A polling ceiling was reached without a terminal state.
    Timeout,
    /// The caller supplied an invalid or contradictory target.
    Configuration,
    /// Anything else (serialization, unexpected responses).
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::NotFound => write!(f, "not_found"),
            Self::RemoteFailure => write!(f, "remote_failure"),
            Self::Timeout => write!(f, "timeout"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

impl ErrorKind {
    /// Classify a provider error from its error code, falling back to the message text.
    ///
    /// Only provider adapters call this; everything downstream branches on the kind.
    pub fn classify(code: Option<&str>, message: &str) -> Self {
        match code {
            Some("ResourceNotFoundException" | "NotFoundException" | "NoSuchKey" | "NotFound") => {
                Self::NotFound
            }
            Some("ResourceExistsException" | "ConflictException") => Self::AlreadyExists,
            _ if message.contains("already exists") => Self::AlreadyExists,
            _ if message.contains("does not exist") => Self::NotFound,
            _ => Self::RemoteFailure,
        }
    }
}

/// Errors raised while driving remote control-plane operations to convergence.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("{target} already exists")]
    AlreadyExists { target: String },

    #[error("{target} not found")]
    NotFound { target: String },

    #[error(
        "Statement query '{query_id}' with status FAILED, error: {message}, queryString: {query_string}"
    )]
    StatementFailed {
        query_id: String,
        message: String,
        query_string: String,
        kind: ErrorKind,
    },

    #[error("Remote call {operation} failed: {message}")]
    Remote {
        operation: String,
        message: String,
        kind: ErrorKind,
    },

    #[error("Timeout error, timeout seconds: {elapsed_secs}, waiting for: {subject}")]
    Timeout { subject: String, elapsed_secs: u64 },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid resource properties: {0}")]
    InvalidProperties(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProvisionError {
    pub fn already_exists(target: impl Into<String>) -> Self {
        Self::AlreadyExists {
            target: target.into(),
        }
    }

    pub fn not_found(target: impl Into<String>) -> Self {
        Self::NotFound {
            target: target.into(),
        }
    }

    /// A failure reported by a remote call, classified by the adapter.
    pub fn remote(operation: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        match kind {
            ErrorKind::AlreadyExists => Self::already_exists(message),
            ErrorKind::NotFound => Self::not_found(message),
            _ => Self::Remote {
                operation: operation.into(),
                message: message.into(),
                kind,
            },
        }
    }

    pub fn timeout(subject: impl Into<String>, elapsed_secs: u64) -> Self {
        Self::Timeout {
            subject: subject.into(),
            elapsed_secs,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_properties(message: impl Into<String>) -> Self {
        Self::InvalidProperties(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::StatementFailed { kind, .. } | Self::Remote { kind, .. } => *kind,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Configuration(_) | Self::InvalidProperties(_) => ErrorKind::Configuration,
            Self::Json(_) => ErrorKind::Internal,
        }
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind() == ErrorKind::AlreadyExists
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self.kind() {
            ErrorKind::AlreadyExists | ErrorKind::NotFound => ErrorCategory::Idempotent,
            ErrorKind::RemoteFailure | ErrorKind::Timeout => ErrorCategory::Remote,
            ErrorKind::Configuration => ErrorCategory::Configuration,
            ErrorKind::Internal => ErrorCategory::System,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Conditions that replay-safe handlers may treat as success.
    Idempotent,
    Remote,
    Configuration,
    System,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idempotent => write!(f, "idempotent"),
            Self::Remote => write!(f, "remote"),
            Self::Configuration => write!(f, "configuration"),
            Self::System => write!(f, "system"),
        }
    }
}

/// Convenience result type for provisioning operations
pub type Result<T> = std::result::Result<T, ProvisionError>;
