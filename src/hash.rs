//! Non-cryptographic 32-bit checksum used for frame integrity.
//!
//! `murmur4` is MurmurHash3 (x86, 32-bit) with a zero seed, computed by the
//! `murmur3` crate. It only has to be fast and agree between peers; it offers
//! no protection against an active attacker.

use crate::byte_order::write_wire_u32_at;

/// Hash `data` in one shot.
///
/// # Examples
///
/// ```
/// use hashframe::hash::murmur4;
///
/// assert_eq!(murmur4(b""), 0);
/// assert_eq!(murmur4(b"hello"), 0x248b_fa47);
/// ```
#[must_use]
pub fn murmur4(data: &[u8]) -> u32 { murmur3_32(data, 0) }

/// Hash `data` and write the digest into the first four bytes of `out`.
///
/// Returns `false` without touching `out` when it is shorter than four bytes.
pub fn murmur_into(data: &[u8], out: &mut [u8]) -> bool {
    write_wire_u32_at(out, 0, murmur4(data))
}

// Reading from a slice cannot fail, so the error arm is unreachable.
fn murmur3_32(mut data: &[u8], seed: u32) -> u32 {
    murmur3::murmur3_32(&mut data, seed).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::empty(b"".as_slice(), 0x0000_0000)]
    #[case::hello(b"hello".as_slice(), 0x248b_fa47)]
    #[case::fox(b"The quick brown fox jumps over the lazy dog".as_slice(), 0x2e4f_f723)]
    fn murmur4_matches_reference_vectors(#[case] input: &[u8], #[case] expected: u32) {
        assert_eq!(murmur4(input), expected);
    }

    #[test]
    fn seed_participates_in_hash() {
        assert_eq!(murmur3_32(b"", 1), 0x514e_28b7);
    }

    #[test]
    fn murmur_into_writes_little_endian_digest() {
        let mut out = [0xff_u8; 6];
        assert!(murmur_into(b"hello", &mut out));
        assert_eq!(&out[..4], &0x248b_fa47_u32.to_le_bytes());
        assert_eq!(&out[4..], &[0xff, 0xff]);
    }

    #[test]
    fn murmur_into_rejects_short_output() {
        let mut out = [0_u8; 3];
        assert!(!murmur_into(b"hello", &mut out));
        assert_eq!(out, [0, 0, 0]);
    }
}
