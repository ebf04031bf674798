//! Checksummed configuration records for namespaced key-value storage.
//!
//! A [`ConfigStore`] binds a fixed-layout record type to one namespace of a
//! [`KvBackend`](nvcfg_kv::KvBackend). The record's raw byte image is stored
//! under the key `"config"` with a CRC-16 trailer:
//!
//! ```text
//! [size_of::<T>() bytes: record image]
//! [2 bytes: CRC-16 of the image, little-endian]
//! ```
//!
//! On load the stored length and checksum are verified before the bytes are
//! trusted. Any failure (missing namespace, missing key, wrong length,
//! checksum mismatch, invalid field bit pattern) resets the record to
//! `T::default()` and writes the defaults back, so the in-memory record is
//! always usable.
//!
//! There is no schema versioning. Changing the layout of `T` changes its
//! size or byte image, and previously stored records fail verification.
//!
//! # Example
//!
//! ```
//! use bytemuck::{CheckedBitPattern, NoUninit};
//! use nvcfg_config::ConfigStore;
//! use nvcfg_kv::InMemoryKv;
//!
//! #[repr(C)]
//! #[derive(Clone, Copy, Debug, PartialEq, NoUninit, CheckedBitPattern)]
//! struct Settings {
//!     level: u8,
//!     enabled: bool,
//! }
//!
//! impl Default for Settings {
//!     fn default() -> Self {
//!         Self { level: 1, enabled: true }
//!     }
//! }
//!
//! let kv = InMemoryKv::new();
//! let mut store: ConfigStore<Settings, _> = ConfigStore::new("main", kv.clone());
//! assert!(!store.load()); // nothing stored yet, defaults restored
//! store.data.level += 1;
//! assert!(store.save());
//!
//! let mut fresh: ConfigStore<Settings, _> = ConfigStore::new("main", kv);
//! assert!(fresh.load());
//! assert_eq!(fresh.data.level, 2);
//! ```

pub mod crc16;
pub mod error;
pub mod record;
pub mod store;

pub use crc16::checksum;
pub use error::{ConfigError, ConfigResult};
pub use record::{decode, encode, encoded_len, Record, CHECKSUM_LEN};
pub use store::{ConfigStore, CONFIG_KEY};
