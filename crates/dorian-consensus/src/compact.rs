//! Compact difficulty target encoding and work computation.
//!
//! Headers store their 256-bit target in a 32-bit "compact" form similar
//! to IEEE754 floating point: the most significant 8 bits are an unsigned
//! base-256 exponent, bit 23 is the sign, and the low 23 bits are the
//! mantissa, so
//!
//! ```text
//! N = (-1^sign) * mantissa * 256^(exponent-3)
//! ```
//!
//! Targets are always unsigned in practice, but the sign bit is kept for
//! compatibility with Litecoin Core. The encoding carries only 23 bits of
//! precision: re-encoding after decoding is stable only for values already
//! in canonical compact form.

use num_bigint::{BigInt, Sign};
use num_traits::{One, Zero};

/// Convert a compact representation to the full target value.
///
/// No bounds check is performed; the result is a signed integer that
/// callers treat as a target only after verifying positivity.
pub fn compact_to_target(compact: u32) -> BigInt {
    let mantissa = compact & 0x007f_ffff;
    let is_negative = compact & 0x0080_0000 != 0;
    let exponent = compact >> 24;

    // The base-256 exponent counts the bytes of the full number, so the
    // mantissa shifts right or left by whole bytes.
    let mut target = if exponent <= 3 {
        BigInt::from(mantissa >> (8 * (3 - exponent)))
    } else {
        BigInt::from(mantissa) << (8 * (exponent - 3))
    };

    if is_negative {
        target = -target;
    }

    target
}

/// Convert a target to its compact representation.
///
/// Values wider than the 23-bit mantissa keep only their most significant
/// digits. When the truncated mantissa lands on the sign bit it is shifted
/// right one more byte and the exponent bumped, losing a further byte of
/// precision.
pub fn target_to_compact(target: &BigInt) -> u32 {
    if target.is_zero() {
        return 0;
    }

    let (sign, bytes) = target.to_bytes_be();
    let mut exponent = bytes.len() as u32;

    let mut mantissa: u32 = if exponent <= 3 {
        let mut low = 0u32;
        for byte in &bytes {
            low = (low << 8) | u32::from(*byte);
        }
        low << (8 * (3 - exponent))
    } else {
        (u32::from(bytes[0]) << 16) | (u32::from(bytes[1]) << 8) | u32::from(bytes[2])
    };

    if mantissa & 0x0080_0000 != 0 {
        mantissa >>= 8;
        exponent += 1;
    }

    let mut compact = (exponent << 24) | mantissa;
    if sign == Sign::Minus {
        compact |= 0x0080_0000;
    }
    compact
}

/// Calculate the work value contributed by a block with the given compact
/// target.
///
/// Chain selection accumulates the inverse of the target, so
/// `work = 2^256 / (target + 1)`. The `+ 1` avoids division by zero and
/// slightly underestimates the true work. Non-positive targets, only
/// reachable from malformed blocks, contribute zero work.
pub fn calc_work(bits: u32) -> BigInt {
    let target = compact_to_target(bits);
    if target.sign() != Sign::Plus {
        return BigInt::zero();
    }

    (BigInt::one() << 256u32) / (target + 1)
}

/// Interpret a block hash as an integer for target comparisons.
///
/// Hashes are little-endian on the wire; the bytes are reversed before
/// being read as a big-endian magnitude.
pub fn hash_to_big(hash: &[u8; 32]) -> BigInt {
    let mut buf = *hash;
    buf.reverse();
    BigInt::from_bytes_be(Sign::Plus, &buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_bitcoin_limit() {
        // 0x1d00ffff is the classic easiest target: 0xffff followed by
        // 26 zero bytes.
        let target = compact_to_target(0x1d00ffff);
        assert_eq!(target, BigInt::from(0xffff) << (8 * 26));
    }

    #[test]
    fn test_canonical_roundtrip() {
        let bits = 0x1b0404cb;
        assert_eq!(target_to_compact(&compact_to_target(bits)), bits);
    }

    #[test]
    fn test_genesis_work() {
        assert_eq!(calc_work(0x1d00ffff), BigInt::from(0x0000000100010001u64));
    }

    #[test]
    fn test_zero_is_zero() {
        assert_eq!(compact_to_target(0), BigInt::zero());
        assert_eq!(target_to_compact(&BigInt::zero()), 0);
    }

    #[test]
    fn test_small_exponents_shift_right() {
        // exponent 1 keeps only the mantissa's top byte.
        assert_eq!(compact_to_target(0x01123456), BigInt::from(0x12));
        assert_eq!(compact_to_target(0x02123456), BigInt::from(0x1234));
        assert_eq!(compact_to_target(0x03123456), BigInt::from(0x123456));
    }

    #[test]
    fn test_sign_bit_decodes_negative() {
        let target = compact_to_target(0x03923456);
        assert_eq!(target, BigInt::from(-0x123456));
    }

    #[test]
    fn test_negative_encodes_sign_bit() {
        let compact = target_to_compact(&BigInt::from(-0x123456));
        assert_eq!(compact, 0x03923456);
    }

    #[test]
    fn test_mantissa_sign_bit_normalisation() {
        // 0x800000 would set the sign bit, so the mantissa shifts down a
        // byte and the exponent grows.
        let compact = target_to_compact(&BigInt::from(0x800000));
        assert_eq!(compact, 0x04008000);
        assert_eq!(compact_to_target(compact), BigInt::from(0x800000));
    }

    #[test]
    fn test_encoding_is_lossy_below_mantissa() {
        let compact = target_to_compact(&BigInt::from(0x12345678u32));
        assert_eq!(compact, 0x04123456);
        assert_eq!(compact_to_target(compact), BigInt::from(0x12345600u32));
    }

    #[test]
    fn test_work_of_negative_and_zero_targets() {
        assert_eq!(calc_work(0), BigInt::zero());
        assert_eq!(calc_work(0x03923456), BigInt::zero());
    }

    #[test]
    fn test_hash_to_big_reverses_bytes() {
        let mut hash = [0u8; 32];
        hash[0] = 0x01; // little-endian least significant byte
        hash[31] = 0xab;
        let expected = (BigInt::from(0xab) << (8 * 31)) + 1;
        // hash_to_big reads the array as little-endian.
        let mut reversed_expected = [0u8; 32];
        reversed_expected[0] = 0xab;
        reversed_expected[31] = 0x01;
        assert_eq!(hash_to_big(&hash), BigInt::from_bytes_be(Sign::Plus, &reversed_expected));
        assert_eq!(hash_to_big(&hash), expected);
    }

    #[test]
    fn test_hash_to_big_zero() {
        assert_eq!(hash_to_big(&[0u8; 32]), BigInt::zero());
    }

    proptest! {
        // Round-tripping is exact for canonical encodings: full-width
        // mantissa top byte, sign clear.
        #[test]
        fn prop_canonical_compact_roundtrips(
            exponent in 3u32..=34,
            mantissa in 0x010000u32..=0x7fffff,
        ) {
            let compact = (exponent << 24) | mantissa;
            let target = compact_to_target(compact);
            prop_assert_eq!(target_to_compact(&target), compact);
        }

        // Encoding never rounds up, and drops at most the bits below the
        // mantissa (one extra byte when sign normalisation kicks in).
        #[test]
        fn prop_encode_truncates_within_mantissa_precision(
            bytes in proptest::collection::vec(any::<u8>(), 1..32),
        ) {
            let n = BigInt::from_bytes_be(Sign::Plus, &bytes);
            prop_assume!(!n.is_zero());

            let decoded = compact_to_target(target_to_compact(&n));
            prop_assert!(decoded <= n);
            prop_assert!((&n - &decoded) * 32768 <= n);
        }

        // An easier target never claims more work.
        #[test]
        fn prop_work_monotone_in_target(
            a_exp in 4u32..=34, a_man in 0x010000u32..=0x7fffff,
            b_exp in 4u32..=34, b_man in 0x010000u32..=0x7fffff,
        ) {
            let a = (a_exp << 24) | a_man;
            let b = (b_exp << 24) | b_man;
            if compact_to_target(a) <= compact_to_target(b) {
                prop_assert!(calc_work(a) >= calc_work(b));
            } else {
                prop_assert!(calc_work(a) <= calc_work(b));
            }
        }
    }
}
