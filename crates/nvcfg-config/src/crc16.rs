//! CRC-16 used for record trailers.
//!
//! Reflected polynomial `0xA001`, initial value `0xFFFF`, no final xor,
//! processed least-significant bit first (the CRC-16/MODBUS parameter set).
//! Existing stored records depend on this exact bit-serial form.

/// Initial register value.
pub const INIT: u16 = 0xFFFF;

/// Reflected generator polynomial.
pub const POLY: u16 = 0xA001;

/// Compute the checksum of `data`.
///
/// ```
/// assert_eq!(nvcfg_config::checksum(b""), 0xFFFF);
/// assert_eq!(nvcfg_config::checksum(b"123456789"), 0x4B37);
/// ```
pub fn checksum(data: &[u8]) -> u16 {
    data.iter().fold(INIT, |crc, &byte| {
        let mut crc = crc ^ u16::from(byte);
        for _ in 0..8 {
            crc = if crc & 0x0001 != 0 {
                (crc >> 1) ^ POLY
            } else {
                crc >> 1
            };
        }
        crc
    })
}
