//! Namespaced key-value storage for nvcfg.
//!
//! This crate models the small non-volatile stores found on embedded targets
//! (flash-backed "preferences" partitions and the like): a flat set of
//! namespaces, each holding opaque byte values under short string keys.
//!
//! # Access Model
//!
//! A backend is opened per namespace and per operation. [`KvBackend::open`]
//! returns a [`KvHandle`] scoped to that namespace; dropping the handle closes
//! it. Handles are never shared between operations.
//!
//! - [`OpenMode::ReadOnly`] fails with [`KvError::NamespaceNotFound`] when the
//!   namespace has never been written.
//! - [`OpenMode::ReadWrite`] creates the namespace on demand.
//!
//! # Storage Backends
//!
//! - [`InMemoryKv`] -- `HashMap`-based store for tests and embedding
//! - [`FsKv`] -- one directory per namespace, one file per key, atomic
//!   replace on write
//!
//! # Design Rules
//!
//! 1. Namespaces are isolated: no operation on one handle can observe another
//!    namespace.
//! 2. A single `put_bytes` replaces the whole value or leaves the old one.
//! 3. The store never interprets values -- integrity checks belong to callers.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod names;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{KvError, KvResult};
pub use fs::{FsHandle, FsKv, FsKvConfig, SyncMode};
pub use memory::{InMemoryHandle, InMemoryKv};
pub use names::{validate_name, MAX_NAME_LEN};
pub use traits::{KvBackend, KvHandle, OpenMode};
