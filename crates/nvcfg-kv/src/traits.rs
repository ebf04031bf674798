use crate::error::KvResult;

/// How a namespace is opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpenMode {
    /// Reads only. The namespace must already exist.
    ReadOnly,
    /// Reads and writes. The namespace is created if missing.
    ReadWrite,
}

impl OpenMode {
    /// Returns `true` if mutating calls are permitted.
    pub fn is_writable(self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}

impl std::fmt::Display for OpenMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "read-only"),
            Self::ReadWrite => write!(f, "read-write"),
        }
    }
}

/// An open namespace. Dropping the handle closes it.
///
/// All implementations must satisfy these invariants:
/// - Every call is scoped to the namespace the handle was opened on.
/// - `put_bytes` replaces the previous value as a whole; readers never see a
///   partially written value.
/// - Mutating calls on a read-only handle fail with [`KvError::ReadOnly`]
///   and leave storage untouched.
///
/// [`KvError::ReadOnly`]: crate::KvError::ReadOnly
pub trait KvHandle {
    /// The namespace this handle is bound to.
    fn namespace(&self) -> &str;

    /// The mode the handle was opened with.
    fn mode(&self) -> OpenMode;

    /// Length in bytes of the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn value_len(&self, key: &str) -> KvResult<Option<usize>>;

    /// Copy the value stored under `key` into the front of `buf`.
    ///
    /// Returns the number of bytes copied, `0` if the key does not exist.
    /// Fails with `BufferTooSmall` if the value does not fit.
    fn get_bytes(&self, key: &str, buf: &mut [u8]) -> KvResult<usize>;

    /// Store `bytes` under `key`, replacing any previous value.
    ///
    /// Returns the number of bytes written.
    fn put_bytes(&mut self, key: &str, bytes: &[u8]) -> KvResult<usize>;

    /// Remove `key`. Returns `true` if it existed.
    fn remove(&mut self, key: &str) -> KvResult<bool>;

    /// Remove every key in the namespace.
    fn clear(&mut self) -> KvResult<()>;
}

/// Namespaced key-value storage backend.
///
/// Backends are shared across threads, but each handle belongs to a single
/// operation. Callers that mutate the same namespace from several threads
/// must serialize access themselves.
pub trait KvBackend: Send + Sync {
    /// Handle type returned by [`open`](Self::open).
    type Handle: KvHandle;

    /// Open `namespace` in the given mode.
    fn open(&self, namespace: &str, mode: OpenMode) -> KvResult<Self::Handle>;
}

impl<B: KvBackend> KvBackend for &B {
    type Handle = B::Handle;

    fn open(&self, namespace: &str, mode: OpenMode) -> KvResult<Self::Handle> {
        (**self).open(namespace, mode)
    }
}
