use nvcfg_kv::KvError;

/// Errors from configuration record operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The backend could not be opened or failed during I/O.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] KvError),

    /// The stored blob is missing or has the wrong size.
    #[error("length mismatch: expected {expected} bytes, found {}", found_display(.found))]
    LengthMismatch {
        expected: usize,
        found: Option<usize>,
    },

    /// The stored checksum does not match the data bytes.
    #[error("checksum mismatch: stored {stored:#06x}, computed {computed:#06x}")]
    ChecksumMismatch { stored: u16, computed: u16 },

    /// The bytes passed the checksum but are not a valid value of the record type.
    #[error("stored bytes are not a valid {type_name}")]
    InvalidRecord { type_name: &'static str },

    /// The backend accepted fewer bytes than the encoded record.
    #[error("short write: wrote {written} of {expected} bytes")]
    ShortWrite { expected: usize, written: usize },
}

impl ConfigError {
    /// Returns `true` if nothing was ever stored: the namespace or the key is
    /// absent. This is the normal first-boot condition rather than corruption.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            Self::StorageUnavailable(KvError::NamespaceNotFound(_))
                | Self::LengthMismatch { found: None, .. }
        )
    }
}

fn found_display(found: &Option<usize>) -> String {
    match found {
        Some(len) => len.to_string(),
        None => "nothing".into(),
    }
}

/// Result alias for configuration record operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
