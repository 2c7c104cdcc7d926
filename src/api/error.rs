use thiserror::Error;

/// Failure taxonomy for remote store operations.
///
/// Recovery policy lives with the callers: `NotFound` drives re-creation
/// and fallback flows, `Conflict` a disambiguation retry, `Unreachable`
/// degrades to local fallbacks. Nothing here is fatal to the process.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RemoteError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("remote store unreachable: {0}")]
    Unreachable(String),
    #[error("remote store error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl RemoteError {
    /// Maps an HTTP status and reported reason onto the taxonomy.
    ///
    /// The store reports username uniqueness violations as 400 with an
    /// "already exists" reason rather than 409.
    #[must_use]
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            400 if message.contains("already exists") => Self::Conflict(message),
            _ => Self::Api { status, message },
        }
    }

    /// True for transport-level failures where local fallbacks apply.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}
