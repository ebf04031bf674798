/// Errors from key-value backend operations.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    /// A read-only open targeted a namespace that has never been created.
    #[error("namespace not found: {0}")]
    NamespaceNotFound(String),

    /// A namespace or key name violates the naming rules.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// A mutating call was made through a read-only handle.
    #[error("namespace {0} is open read-only")]
    ReadOnly(String),

    /// The caller's buffer cannot hold the stored value.
    #[error("buffer too small for key {key}: need {needed} bytes, have {available}")]
    BufferTooSmall {
        key: String,
        needed: usize,
        available: usize,
    },

    /// The backend refuses all access (device missing, partition not mounted).
    #[error("storage backend unavailable")]
    Unavailable,

    /// I/O error from the underlying storage medium.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for backend operations.
pub type KvResult<T> = Result<T, KvError>;
