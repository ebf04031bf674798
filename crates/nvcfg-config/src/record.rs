//! Record trait and blob encoding.
//!
//! Blob layout:
//! ```text
//! [size_of::<T>() bytes: raw record image]
//! [2 bytes: CRC-16 of the image, little-endian]
//! ```

use std::mem::size_of;

use bytemuck::{CheckedBitPattern, NoUninit};

use crate::crc16::checksum;
use crate::error::{ConfigError, ConfigResult};

/// Length of the checksum trailer in bytes.
pub const CHECKSUM_LEN: usize = 2;

/// A fixed-layout configuration record.
///
/// Implemented for every `Default + NoUninit + CheckedBitPattern` type.
/// Derive the bytemuck traits on a `#[repr(C)]` struct of plain scalar and
/// `bool` fields; `NoUninit` refuses layouts with padding, so the byte image
/// is fully determined by the field values. `Default` supplies the fallback
/// value used whenever a stored record cannot be trusted.
pub trait Record: Default + NoUninit + CheckedBitPattern {}

impl<T: Default + NoUninit + CheckedBitPattern> Record for T {}

/// Encoded blob length for `T`: the record image plus the trailer.
pub const fn encoded_len<T: Record>() -> usize {
    size_of::<T>() + CHECKSUM_LEN
}

/// Encode `record` as image + little-endian CRC-16 trailer.
pub fn encode<T: Record>(record: &T) -> Vec<u8> {
    let image = bytemuck::bytes_of(record);
    let mut blob = Vec::with_capacity(encoded_len::<T>());
    blob.extend_from_slice(image);
    blob.extend_from_slice(&checksum(image).to_le_bytes());
    blob
}

/// Verify and decode a blob produced by [`encode`].
///
/// Checks run in order: length, checksum, field bit patterns. The checksum is
/// never computed for a blob of the wrong length.
pub fn decode<T: Record>(blob: &[u8]) -> ConfigResult<T> {
    let expected = encoded_len::<T>();
    if blob.len() != expected {
        return Err(ConfigError::LengthMismatch {
            expected,
            found: Some(blob.len()),
        });
    }

    let (image, trailer) = blob.split_at(size_of::<T>());
    let stored = u16::from_le_bytes([trailer[0], trailer[1]]);
    let computed = checksum(image);
    if stored != computed {
        return Err(ConfigError::ChecksumMismatch { stored, computed });
    }

    bytemuck::checked::try_pod_read_unaligned(image).map_err(|_| ConfigError::InvalidRecord {
        type_name: std::any::type_name::<T>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    #[derive(Clone, Copy, Debug, PartialEq, NoUninit, CheckedBitPattern)]
    struct Pair {
        level: u8,
        enabled: bool,
    }

    impl Default for Pair {
        fn default() -> Self {
            Self {
                level: 1,
                enabled: true,
            }
        }
    }

    #[test]
    fn encoded_len_adds_trailer() {
        assert_eq!(encoded_len::<Pair>(), 4);
        assert_eq!(encoded_len::<u32>(), 6);
        assert_eq!(encoded_len::<[u8; 16]>(), 18);
    }

    #[test]
    fn known_blob_layout() {
        // CRC-16 of [0x01, 0x01] is 0xE0C1, stored low byte first.
        assert_eq!(encode(&Pair::default()), vec![0x01, 0x01, 0xC1, 0xE0]);
    }

    #[test]
    fn decode_known_blob() {
        let pair: Pair = decode(&[0x01, 0x01, 0xC1, 0xE0]).unwrap();
        assert_eq!(pair, Pair::default());
    }

    #[test]
    fn decode_preserves_every_field() {
        let original = Pair {
            level: 200,
            enabled: false,
        };
        let decoded: Pair = decode(&encode(&original)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn truncated_blob_is_length_mismatch() {
        let blob = encode(&Pair::default());
        let err = decode::<Pair>(&blob[..blob.len() - 1]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::LengthMismatch {
                expected: 4,
                found: Some(3)
            }
        ));
    }

    #[test]
    fn oversized_blob_is_length_mismatch() {
        let mut blob = encode(&Pair::default());
        blob.push(0);
        assert!(matches!(
            decode::<Pair>(&blob),
            Err(ConfigError::LengthMismatch { found: Some(5), .. })
        ));
    }

    #[test]
    fn corrupted_trailer_is_checksum_mismatch() {
        let mut blob = encode(&Pair::default());
        blob[3] ^= 0x80;
        assert!(matches!(
            decode::<Pair>(&blob),
            Err(ConfigError::ChecksumMismatch {
                stored: 0x60C1,
                computed: 0xE0C1
            })
        ));
    }

    #[test]
    fn invalid_bool_with_valid_checksum_is_rejected() {
        let image = [0x05, 0x02];
        let mut blob = image.to_vec();
        blob.extend_from_slice(&checksum(&image).to_le_bytes());
        let err = decode::<Pair>(&blob).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRecord { type_name } if type_name.ends_with("Pair")));
    }

    #[test]
    fn plain_integer_records() {
        let blob = encode(&0xDEAD_BEEFu32);
        assert_eq!(blob.len(), 6);
        assert_eq!(decode::<u32>(&blob).unwrap(), 0xDEAD_BEEF);
    }
}
