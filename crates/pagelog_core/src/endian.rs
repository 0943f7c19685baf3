//! Byte-order normalization for header integers.
//!
//! Every multi-byte integer in the region header is little-endian on disk,
//! because the consuming reader may run on a different architecture or a
//! runtime with a different default byte order. Rather than scattering
//! `to_le_bytes` calls, the header code routes through one normalization
//! function that converts between host order and the disk convention.
//! Byte reversal is its own inverse, so the same function serves both
//! directions.

use std::sync::OnceLock;

/// Returns whether the host CPU is big-endian.
///
/// Detected once by writing a known integer and inspecting its first
/// byte; the result is cached for the process lifetime.
#[must_use]
pub fn host_is_big_endian() -> bool {
    static BIG_ENDIAN: OnceLock<bool> = OnceLock::new();
    *BIG_ENDIAN.get_or_init(|| {
        let probe: u32 = 1;
        probe.to_ne_bytes()[0] != 1
    })
}

/// Converts a 4-byte integer between host order and the on-disk
/// little-endian convention.
///
/// On a little-endian host this is the identity; on a big-endian host the
/// four bytes are reversed. Self-inverse, so it is used both when writing
/// a header field and when reading one back.
#[must_use]
pub fn normalize(bytes: [u8; 4]) -> [u8; 4] {
    normalize_for(host_is_big_endian(), bytes)
}

/// Normalization with an explicit byte-order flag, so tests can exercise
/// both orders on any host.
pub(crate) fn normalize_for(big_endian: bool, mut bytes: [u8; 4]) -> [u8; 4] {
    if big_endian {
        bytes.swap(0, 3);
        bytes.swap(1, 2);
    }
    bytes
}

/// Encodes a `u32` into its 4 on-disk bytes.
#[must_use]
pub fn encode_u32(value: u32) -> [u8; 4] {
    normalize(value.to_ne_bytes())
}

/// Decodes a `u32` from its 4 on-disk bytes.
#[must_use]
pub fn decode_u32(bytes: [u8; 4]) -> u32 {
    u32::from_ne_bytes(normalize(bytes))
}

/// Encodes a `u16` into its 2 on-disk bytes.
///
/// Widens through the 4-byte normalizer and keeps the two low-order
/// little-endian bytes, matching how the header writes its 2-byte
/// path-length field.
#[must_use]
pub fn encode_u16(value: u16) -> [u8; 2] {
    let wide = normalize(u32::from(value).to_ne_bytes());
    [wide[0], wide[1]]
}

/// Decodes a `u16` from its 2 on-disk bytes.
#[must_use]
pub fn decode_u16(bytes: [u8; 2]) -> u16 {
    decode_u32([bytes[0], bytes[1], 0, 0]) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn detection_matches_target_endian() {
        assert_eq!(host_is_big_endian(), cfg!(target_endian = "big"));
    }

    #[test]
    fn little_endian_host_is_identity() {
        assert_eq!(
            normalize_for(false, [0x01, 0x02, 0x03, 0x04]),
            [0x01, 0x02, 0x03, 0x04]
        );
    }

    #[test]
    fn big_endian_host_reverses() {
        assert_eq!(
            normalize_for(true, [0x01, 0x02, 0x03, 0x04]),
            [0x04, 0x03, 0x02, 0x01]
        );
    }

    #[test]
    fn u32_round_trip() {
        for value in [0u32, 1, 0x1234_5678, u32::MAX] {
            assert_eq!(decode_u32(encode_u32(value)), value);
        }
    }

    #[test]
    fn u32_is_little_endian_on_disk() {
        assert_eq!(encode_u32(0x0403_0201), [0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn u16_round_trip() {
        for value in [0u16, 1, 1024, u16::MAX] {
            assert_eq!(decode_u16(encode_u16(value)), value);
        }
    }

    #[test]
    fn u16_is_little_endian_on_disk() {
        assert_eq!(encode_u16(0x0201), [0x01, 0x02]);
    }

    proptest! {
        #[test]
        fn normalize_is_self_inverse(bytes in prop::array::uniform4(any::<u8>()), big in any::<bool>()) {
            prop_assert_eq!(normalize_for(big, normalize_for(big, bytes)), bytes);
        }

        #[test]
        fn simulated_orders_agree_on_value(value in any::<u32>()) {
            // Writing on one order and reading on the same order recovers
            // the value regardless of which order it is.
            let le_disk = normalize_for(false, value.to_le_bytes());
            let be_disk = normalize_for(true, value.to_be_bytes());
            prop_assert_eq!(le_disk, be_disk);
        }
    }
}
