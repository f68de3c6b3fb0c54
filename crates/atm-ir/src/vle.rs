//! Variable-length unsigned integers.
//!
//! Big-endian groups of 7 bits; every byte except the last has its high bit
//! set. Used for long delays and relative jumps.

use arrayvec::ArrayVec;

/// Longest encoding we emit or accept (5 × 7 bits covers `u32`).
pub const MAX_LEN: usize = 5;

/// Encode `value`, most significant group first.
pub fn encode(value: u32) -> ArrayVec<u8, MAX_LEN> {
    let mut groups = ArrayVec::<u8, MAX_LEN>::new();
    let mut rest = value;
    loop {
        groups.push((rest & 0x7F) as u8);
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    let mut out = ArrayVec::new();
    let last = groups.len() - 1;
    for (i, group) in groups.iter().rev().enumerate() {
        out.push(if i == last { *group } else { *group | 0x80 });
    }
    out
}

/// Decode a value from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed, or `None` if the
/// input ends mid-value or the encoding is longer than [`MAX_LEN`].
pub fn decode(bytes: &[u8]) -> Option<(u32, usize)> {
    let mut value: u32 = 0;
    for (i, &byte) in bytes.iter().take(MAX_LEN).enumerate() {
        value = (value << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_byte_values() {
        assert_eq!(encode(0).as_slice(), &[0x00]);
        assert_eq!(encode(0x7F).as_slice(), &[0x7F]);
        assert_eq!(decode(&[0x05, 0xFF]), Some((5, 1)));
    }

    #[test]
    fn multi_byte_layout() {
        assert_eq!(encode(0x80).as_slice(), &[0x81, 0x00]);
        assert_eq!(encode(300).as_slice(), &[0x82, 0x2C]);
        assert_eq!(decode(&[0x82, 0x2C]), Some((300, 2)));
    }

    #[test]
    fn round_trip_21_bit_range() {
        for value in 0..(1u32 << 21) {
            let bytes = encode(value);
            assert!(bytes.len() <= 3);
            assert_eq!(decode(&bytes), Some((value, bytes.len())), "value {value}");
        }
    }

    #[test]
    fn round_trip_u32_max() {
        let bytes = encode(u32::MAX);
        assert_eq!(bytes.len(), MAX_LEN);
        assert_eq!(decode(&bytes), Some((u32::MAX, MAX_LEN)));
    }

    #[test]
    fn truncated_input_is_rejected() {
        assert_eq!(decode(&[]), None);
        assert_eq!(decode(&[0x81]), None);
        assert_eq!(decode(&[0xFF; 6]), None);
    }
}
