use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{KvError, KvResult};
use crate::names::validate_name;
use crate::traits::{KvBackend, KvHandle, OpenMode};

/// Flush strategy for value writes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMode {
    /// `fsync` every value file before it replaces the old one.
    EveryWrite,
    /// Rely on OS page-cache buffering (fastest, least durable).
    #[default]
    OsDefault,
}

/// Configuration for the filesystem backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsKvConfig {
    /// Directory holding one subdirectory per namespace.
    pub root: PathBuf,
    /// Sync strategy for writes.
    pub sync_mode: SyncMode,
}

impl Default for FsKvConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(".nvcfg"),
            sync_mode: SyncMode::default(),
        }
    }
}

/// Filesystem-backed key-value store.
///
/// Layout:
/// ```text
/// <root>/<namespace>/<key>
/// ```
///
/// Each value is written to a temporary file in the namespace directory and
/// renamed over the key file, so readers see either the old or the new value.
#[derive(Clone, Debug)]
pub struct FsKv {
    config: FsKvConfig,
}

impl FsKv {
    /// Create a backend from a configuration. No I/O is performed.
    pub fn new(config: FsKvConfig) -> Self {
        Self { config }
    }

    /// Create a backend rooted at `root` with default settings.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self::new(FsKvConfig {
            root: root.into(),
            ..Default::default()
        })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// The active configuration.
    pub fn config(&self) -> &FsKvConfig {
        &self.config
    }

    /// Sorted list of namespaces present under the root.
    ///
    /// A missing root directory yields an empty list. Directories whose names
    /// are not valid namespace names are ignored.
    pub fn namespaces(&self) -> KvResult<Vec<String>> {
        let entries = match fs::read_dir(&self.config.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if validate_name(name).is_ok() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

impl KvBackend for FsKv {
    type Handle = FsHandle;

    fn open(&self, namespace: &str, mode: OpenMode) -> KvResult<FsHandle> {
        validate_name(namespace)?;
        let dir = self.config.root.join(namespace);

        if mode.is_writable() {
            fs::create_dir_all(&dir)?;
        } else if !dir.is_dir() {
            return Err(KvError::NamespaceNotFound(namespace.to_string()));
        }
        debug!(namespace, %mode, dir = %dir.display(), "opened namespace directory");

        Ok(FsHandle {
            namespace: namespace.to_string(),
            dir,
            mode,
            sync_mode: self.config.sync_mode.clone(),
        })
    }
}

/// File length as `usize`, saturating where `usize` is narrower than `u64`
/// so an oversized file can never alias a small expected length.
fn file_len(len: u64) -> usize {
    usize::try_from(len).unwrap_or(usize::MAX)
}

/// Handle onto one namespace directory of an [`FsKv`].
#[derive(Debug)]
pub struct FsHandle {
    namespace: String,
    dir: PathBuf,
    mode: OpenMode,
    sync_mode: SyncMode,
}

impl FsHandle {
    fn key_path(&self, key: &str) -> KvResult<PathBuf> {
        validate_name(key)?;
        Ok(self.dir.join(key))
    }

    fn ensure_writable(&self) -> KvResult<()> {
        if self.mode.is_writable() {
            Ok(())
        } else {
            Err(KvError::ReadOnly(self.namespace.clone()))
        }
    }
}

impl KvHandle for FsHandle {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn mode(&self) -> OpenMode {
        self.mode
    }

    fn value_len(&self, key: &str) -> KvResult<Option<usize>> {
        match fs::metadata(self.key_path(key)?) {
            Ok(meta) if meta.is_file() => Ok(Some(file_len(meta.len()))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn get_bytes(&self, key: &str, buf: &mut [u8]) -> KvResult<usize> {
        let value = match fs::read(self.key_path(key)?) {
            Ok(value) => value,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        if value.len() > buf.len() {
            return Err(KvError::BufferTooSmall {
                key: key.to_string(),
                needed: value.len(),
                available: buf.len(),
            });
        }
        buf[..value.len()].copy_from_slice(&value);
        Ok(value.len())
    }

    fn put_bytes(&mut self, key: &str, bytes: &[u8]) -> KvResult<usize> {
        self.ensure_writable()?;
        let path = self.key_path(key)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        if self.sync_mode == SyncMode::EveryWrite {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(&path).map_err(|e| KvError::Io(e.error))?;

        debug!(namespace = %self.namespace, key, len = bytes.len(), "value written");
        Ok(bytes.len())
    }

    fn remove(&mut self, key: &str) -> KvResult<bool> {
        self.ensure_writable()?;
        match fs::remove_file(self.key_path(key)?) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&mut self) -> KvResult<()> {
        self.ensure_writable()?;
        let mut removed = 0usize;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
                removed += 1;
            } else {
                warn!(path = %entry.path().display(), "skipping non-file entry in namespace");
            }
        }
        debug!(namespace = %self.namespace, removed, "namespace cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_kv() -> (tempfile::TempDir, FsKv) {
        let dir = tempfile::tempdir().unwrap();
        let kv = FsKv::with_root(dir.path().join("store"));
        (dir, kv)
    }

    #[test]
    fn default_config() {
        let c = FsKvConfig::default();
        assert_eq!(c.root, PathBuf::from(".nvcfg"));
        assert_eq!(c.sync_mode, SyncMode::OsDefault);
    }

    #[test]
    fn read_only_open_of_missing_namespace_fails() {
        let (_dir, kv) = temp_kv();
        assert!(matches!(
            kv.open("main", OpenMode::ReadOnly),
            Err(KvError::NamespaceNotFound(_))
        ));
    }

    #[test]
    fn read_write_open_creates_directory() {
        let (_dir, kv) = temp_kv();
        kv.open("main", OpenMode::ReadWrite).unwrap();
        assert!(kv.root().join("main").is_dir());
        assert!(kv.open("main", OpenMode::ReadOnly).is_ok());
    }

    #[test]
    fn put_then_get() {
        let (_dir, kv) = temp_kv();
        let mut h = kv.open("main", OpenMode::ReadWrite).unwrap();
        assert_eq!(h.put_bytes("config", &[1, 2, 3]).unwrap(), 3);
        drop(h);

        let h = kv.open("main", OpenMode::ReadOnly).unwrap();
        assert_eq!(h.value_len("config").unwrap(), Some(3));
        let mut buf = [0u8; 3];
        assert_eq!(h.get_bytes("config", &mut buf).unwrap(), 3);
        assert_eq!(buf, [1, 2, 3]);
    }

    #[test]
    fn put_replaces_and_leaves_no_temp_files() {
        let (_dir, kv) = temp_kv();
        let mut h = kv.open("main", OpenMode::ReadWrite).unwrap();
        h.put_bytes("config", b"a longer first value").unwrap();
        h.put_bytes("config", b"short").unwrap();
        assert_eq!(h.value_len("config").unwrap(), Some(5));

        let files: Vec<_> = fs::read_dir(kv.root().join("main")).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn every_write_sync_mode_writes() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FsKv::new(FsKvConfig {
            root: dir.path().to_path_buf(),
            sync_mode: SyncMode::EveryWrite,
        });
        let mut h = kv.open("main", OpenMode::ReadWrite).unwrap();
        h.put_bytes("config", b"durable").unwrap();
        assert_eq!(fs::read(dir.path().join("main/config")).unwrap(), b"durable");
    }

    #[test]
    fn missing_key() {
        let (_dir, kv) = temp_kv();
        let h = kv.open("main", OpenMode::ReadWrite).unwrap();
        assert_eq!(h.value_len("config").unwrap(), None);
        let mut buf = [0u8; 1];
        assert_eq!(h.get_bytes("config", &mut buf).unwrap(), 0);
    }

    #[test]
    fn get_into_small_buffer_fails() {
        let (_dir, kv) = temp_kv();
        let mut h = kv.open("main", OpenMode::ReadWrite).unwrap();
        h.put_bytes("config", &[0; 10]).unwrap();
        let mut buf = [0u8; 4];
        assert!(matches!(
            h.get_bytes("config", &mut buf),
            Err(KvError::BufferTooSmall { needed: 10, available: 4, .. })
        ));
    }

    #[test]
    fn read_only_handle_rejects_writes() {
        let (_dir, kv) = temp_kv();
        kv.open("main", OpenMode::ReadWrite)
            .unwrap()
            .put_bytes("config", b"keep")
            .unwrap();

        let mut h = kv.open("main", OpenMode::ReadOnly).unwrap();
        assert!(matches!(h.put_bytes("config", b"x"), Err(KvError::ReadOnly(_))));
        assert!(matches!(h.clear(), Err(KvError::ReadOnly(_))));
        assert_eq!(fs::read(kv.root().join("main/config")).unwrap(), b"keep");
    }

    #[test]
    fn remove_and_clear() {
        let (_dir, kv) = temp_kv();
        let mut h = kv.open("main", OpenMode::ReadWrite).unwrap();
        h.put_bytes("config", b"1").unwrap();
        h.put_bytes("extra", b"2").unwrap();

        assert!(h.remove("extra").unwrap());
        assert!(!h.remove("extra").unwrap());

        h.clear().unwrap();
        assert_eq!(h.value_len("config").unwrap(), None);
        // The namespace itself survives a clear.
        assert!(kv.open("main", OpenMode::ReadOnly).is_ok());
    }

    #[test]
    fn namespaces_are_isolated_and_listed() {
        let (_dir, kv) = temp_kv();
        assert!(kv.namespaces().unwrap().is_empty());

        kv.open("wifi", OpenMode::ReadWrite)
            .unwrap()
            .put_bytes("config", b"w")
            .unwrap();
        kv.open("main", OpenMode::ReadWrite)
            .unwrap()
            .put_bytes("config", b"m")
            .unwrap();

        assert_eq!(kv.namespaces().unwrap(), vec!["main", "wifi"]);

        let h = kv.open("wifi", OpenMode::ReadOnly).unwrap();
        let mut buf = [0u8; 1];
        h.get_bytes("config", &mut buf).unwrap();
        assert_eq!(&buf, b"w");
    }

    #[test]
    fn file_len_saturates() {
        assert_eq!(file_len(0), 0);
        assert_eq!(file_len(10), 10);
        assert_eq!(file_len(u64::MAX), usize::MAX);
        if usize::BITS < 64 {
            assert_eq!(file_len(u64::from(u32::MAX) + 1), usize::MAX);
        }
    }

    #[test]
    fn invalid_key_rejected() {
        let (_dir, kv) = temp_kv();
        let h = kv.open("main", OpenMode::ReadWrite).unwrap();
        assert!(matches!(
            h.value_len("../escape"),
            Err(KvError::InvalidName { .. })
        ));
    }
}
