use nvcfg_kv::{KvBackend, KvHandle, OpenMode};
use tracing::{debug, error, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::record::{self, encoded_len, Record};

/// Key under which the record blob is stored inside its namespace.
pub const CONFIG_KEY: &str = "config";

/// A configuration record bound to one namespace of a key-value backend.
///
/// `data` always holds a usable value: `T::default()` after construction, the
/// verified stored record after a successful [`load`](Self::load), and the
/// defaults again after any failed load.
///
/// Each operation opens its own backend handle and drops it before returning.
/// The store is meant for a single owner; callers sharing a namespace across
/// threads must serialize access themselves.
pub struct ConfigStore<T, B> {
    /// The current record. Mutate it freely, then call [`save`](Self::save).
    pub data: T,
    valid: bool,
    namespace: String,
    backend: B,
}

impl<T: Record, B: KvBackend> ConfigStore<T, B> {
    /// Bind a default-initialized record to `namespace`. No I/O is performed.
    pub fn new(namespace: impl Into<String>, backend: B) -> Self {
        Self {
            data: T::default(),
            valid: false,
            namespace: namespace.into(),
            backend,
        }
    }

    /// The namespace this store reads and writes.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The backing key-value store.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Whether `data` came from a verified load or an intentional reset.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Load the stored record into `data`.
    ///
    /// Returns `true` if a stored record passed verification. On any failure
    /// the record is reset to defaults (and the defaults are persisted on a
    /// best-effort basis) and `false` is returned.
    pub fn load(&mut self) -> bool {
        self.valid = false;
        debug!(namespace = %self.namespace, "reading configuration");

        match self.read_verified() {
            Ok(data) => {
                self.data = data;
                self.valid = true;
                debug!(namespace = %self.namespace, "configuration read ok");
                true
            }
            Err(e) => {
                if e.is_missing() {
                    info!(namespace = %self.namespace, reason = %e, "no stored configuration");
                } else {
                    error!(namespace = %self.namespace, error = %e, "stored configuration rejected");
                }
                self.reset_to_defaults();
                false
            }
        }
    }

    /// Read and verify the stored record without touching `data` or the
    /// validity flag.
    pub fn read_verified(&self) -> ConfigResult<T> {
        let expected = encoded_len::<T>();
        let handle = self.backend.open(&self.namespace, OpenMode::ReadOnly)?;

        let found = handle.value_len(CONFIG_KEY)?;
        if found != Some(expected) {
            return Err(ConfigError::LengthMismatch { expected, found });
        }

        let mut blob = vec![0u8; expected];
        let read = handle.get_bytes(CONFIG_KEY, &mut blob)?;
        drop(handle);

        if read != expected {
            return Err(ConfigError::LengthMismatch {
                expected,
                found: Some(read),
            });
        }
        record::decode(&blob)
    }

    /// Persist `data`. Returns `true` if the whole blob was written.
    ///
    /// A failure leaves `data` and the validity flag untouched.
    pub fn save(&self) -> bool {
        match self.try_save() {
            Ok(()) => true,
            Err(e) => {
                error!(namespace = %self.namespace, error = %e, "failed to save configuration");
                false
            }
        }
    }

    /// Persist `data`, reporting the cause of any failure.
    pub fn try_save(&self) -> ConfigResult<()> {
        let blob = record::encode(&self.data);
        let mut handle = self.backend.open(&self.namespace, OpenMode::ReadWrite)?;
        let written = handle.put_bytes(CONFIG_KEY, &blob)?;
        drop(handle);

        if written != blob.len() {
            return Err(ConfigError::ShortWrite {
                expected: blob.len(),
                written,
            });
        }
        debug!(namespace = %self.namespace, bytes = written, "configuration saved");
        Ok(())
    }

    /// Replace `data` with `T::default()` and try to persist it.
    ///
    /// A persistence failure is logged but not reported: the defaults are
    /// usable in memory either way, so the record is marked valid.
    pub fn reset_to_defaults(&mut self) {
        self.data = T::default();
        debug!(namespace = %self.namespace, "saving default configuration");
        if !self.save() {
            warn!(namespace = %self.namespace, "default configuration held in memory only");
        }
        self.valid = true;
    }

    /// Remove every key in the namespace. Returns `false` on failure.
    ///
    /// `data` and the validity flag are not touched.
    pub fn erase(&self) -> bool {
        match self.try_erase() {
            Ok(()) => true,
            Err(e) => {
                error!(namespace = %self.namespace, error = %e, "failed to erase configuration");
                false
            }
        }
    }

    /// Remove every key in the namespace, reporting the cause of any failure.
    pub fn try_erase(&self) -> ConfigResult<()> {
        let mut handle = self.backend.open(&self.namespace, OpenMode::ReadWrite)?;
        debug!(namespace = %self.namespace, "clearing configuration namespace");
        handle.clear()?;
        Ok(())
    }
}

impl<T: std::fmt::Debug, B> std::fmt::Debug for ConfigStore<T, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("namespace", &self.namespace)
            .field("valid", &self.valid)
            .field("data", &self.data)
            .finish()
    }
}
