use accel_sig::{ResolveError, SignatureParseError};

/// Failure reported by a code-generation or execution backend.
///
/// Opaque to this crate: it is carried to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        BackendError(message.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JitError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    InvalidSignature(#[from] SignatureParseError),
    #[error("Signature error: {0}")]
    Signature(String),
    #[error("Launch config error: {0}")]
    LaunchConfig(String),
    #[error("Invocation error: {0}")]
    Invocation(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("Config error: {0}")]
    Config(String),
}

impl From<ResolveError> for JitError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Conflict(message) => JitError::Configuration(message),
            ResolveError::Parse(err) => JitError::InvalidSignature(err),
        }
    }
}
