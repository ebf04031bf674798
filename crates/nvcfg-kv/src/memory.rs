use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::{KvError, KvResult};
use crate::names::validate_name;
use crate::traits::{KvBackend, KvHandle, OpenMode};

type Namespace = HashMap<String, Vec<u8>>;
type Namespaces = HashMap<String, Namespace>;

/// In-memory, HashMap-based key-value store.
///
/// Intended for tests and embedding. Clones share the same underlying maps,
/// so a value written through one clone is visible through every other.
/// Values are copied on read and write.
#[derive(Clone)]
pub struct InMemoryKv {
    namespaces: Arc<RwLock<Namespaces>>,
    available: Arc<AtomicBool>,
}

impl InMemoryKv {
    /// Create a new empty, available store.
    pub fn new() -> Self {
        Self {
            namespaces: Arc::new(RwLock::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulate the backing medium going away (or coming back).
    ///
    /// While unavailable every `open` fails with [`KvError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Returns `true` unless [`set_available(false)`](Self::set_available) is in effect.
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Sorted list of namespaces that have been created.
    pub fn namespaces(&self) -> Vec<String> {
        let map = self.namespaces.read().expect("lock poisoned");
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        names
    }

    /// Read a value directly, bypassing handles and availability.
    pub fn raw_get(&self, namespace: &str, key: &str) -> Option<Vec<u8>> {
        let map = self.namespaces.read().expect("lock poisoned");
        map.get(namespace).and_then(|ns| ns.get(key)).cloned()
    }

    /// Write a value directly, bypassing handles, availability and name rules.
    ///
    /// Used to plant truncated or corrupted values in tests.
    pub fn raw_put(&self, namespace: &str, key: &str, bytes: Vec<u8>) {
        let mut map = self.namespaces.write().expect("lock poisoned");
        map.entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), bytes);
    }
}

impl Default for InMemoryKv {
    fn default() -> Self {
        Self::new()
    }
}

impl KvBackend for InMemoryKv {
    type Handle = InMemoryHandle;

    fn open(&self, namespace: &str, mode: OpenMode) -> KvResult<InMemoryHandle> {
        if !self.is_available() {
            return Err(KvError::Unavailable);
        }
        validate_name(namespace)?;

        let mut map = self.namespaces.write().expect("lock poisoned");
        if !map.contains_key(namespace) {
            if !mode.is_writable() {
                return Err(KvError::NamespaceNotFound(namespace.to_string()));
            }
            map.insert(namespace.to_string(), HashMap::new());
        }
        debug!(namespace, %mode, "opened in-memory namespace");

        Ok(InMemoryHandle {
            namespaces: Arc::clone(&self.namespaces),
            namespace: namespace.to_string(),
            mode,
        })
    }
}

impl std::fmt::Debug for InMemoryKv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.namespaces.read().expect("lock poisoned").len();
        f.debug_struct("InMemoryKv")
            .field("namespace_count", &count)
            .field("available", &self.is_available())
            .finish()
    }
}

/// Handle onto one namespace of an [`InMemoryKv`].
#[derive(Debug)]
pub struct InMemoryHandle {
    namespaces: Arc<RwLock<Namespaces>>,
    namespace: String,
    mode: OpenMode,
}

impl InMemoryHandle {
    fn ensure_writable(&self) -> KvResult<()> {
        if self.mode.is_writable() {
            Ok(())
        } else {
            Err(KvError::ReadOnly(self.namespace.clone()))
        }
    }
}

impl KvHandle for InMemoryHandle {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn mode(&self) -> OpenMode {
        self.mode
    }

    fn value_len(&self, key: &str) -> KvResult<Option<usize>> {
        validate_name(key)?;
        let map = self.namespaces.read().expect("lock poisoned");
        Ok(map
            .get(&self.namespace)
            .and_then(|ns| ns.get(key))
            .map(Vec::len))
    }

    fn get_bytes(&self, key: &str, buf: &mut [u8]) -> KvResult<usize> {
        validate_name(key)?;
        let map = self.namespaces.read().expect("lock poisoned");
        let Some(value) = map.get(&self.namespace).and_then(|ns| ns.get(key)) else {
            return Ok(0);
        };
        if value.len() > buf.len() {
            return Err(KvError::BufferTooSmall {
                key: key.to_string(),
                needed: value.len(),
                available: buf.len(),
            });
        }
        buf[..value.len()].copy_from_slice(value);
        Ok(value.len())
    }

    fn put_bytes(&mut self, key: &str, bytes: &[u8]) -> KvResult<usize> {
        self.ensure_writable()?;
        validate_name(key)?;
        let mut map = self.namespaces.write().expect("lock poisoned");
        map.entry(self.namespace.clone())
            .or_default()
            .insert(key.to_string(), bytes.to_vec());
        Ok(bytes.len())
    }

    fn remove(&mut self, key: &str) -> KvResult<bool> {
        self.ensure_writable()?;
        validate_name(key)?;
        let mut map = self.namespaces.write().expect("lock poisoned");
        Ok(map
            .get_mut(&self.namespace)
            .is_some_and(|ns| ns.remove(key).is_some()))
    }

    fn clear(&mut self) -> KvResult<()> {
        self.ensure_writable()?;
        let mut map = self.namespaces.write().expect("lock poisoned");
        if let Some(ns) = map.get_mut(&self.namespace) {
            ns.clear();
        }
        Ok(())
    }
}
