//! ASERT difficulty algorithm.
//!
//! Absolutely Scheduled Exponentially Rising Targets, after BCH's
//! aserti3-2d by Mark Lundeberg. Difficulty follows the total deviation
//! from an ideal block schedule anchored at the activation block:
//!
//! ```text
//! target = anchor_target * 2^((time_delta - T * height_delta) / halflife)
//! ```
//!
//! The exponential is evaluated in fixed point with 16 fractional bits and
//! a cubic approximation of 2^x on the fractional part. It provably never
//! oscillates and has no window lag.

use crate::compact::{compact_to_target, target_to_compact};
use crate::context::{ChainCtx, HeaderCtx};
use crate::error::{ConsensusError, ConsensusResult};
use num_bigint::BigInt;
use num_traits::{One, Zero};

/// Required difficulty under ASERT.
pub(crate) fn calc_next_required_difficulty<H: HeaderCtx, C: ChainCtx>(
    last_node: &H,
    chain: &C,
) -> ConsensusResult<u32> {
    let params = chain.params();

    // Find the anchor block at the activation height.
    let mut anchor = last_node.clone();
    while anchor.height() > params.asert_height {
        anchor = anchor.parent().ok_or_else(|| {
            ConsensusError::Assert("ASERT anchor block not reachable from tip".to_string())
        })?;
    }

    let anchor_parent = anchor
        .parent()
        .ok_or_else(|| ConsensusError::Assert("ASERT anchor block has no parent".to_string()))?;

    let anchor_target = compact_to_target(params.asert_anchor_bits);

    let time_delta = last_node.timestamp() - anchor_parent.timestamp();
    let next_height = i64::from(last_node.height()) + 1;
    let height_delta = next_height - i64::from(params.asert_height);

    let t = params.target_spacing_secs();
    let half_life = params.asert_half_life;

    // Exponent in fixed point with 16 fractional bits.
    let exponent = ((time_delta - t * height_delta) * 65536) / half_life;

    // Decompose into integer shifts and a fractional part in [0, 65536).
    let shifts: i32;
    let frac: u16;
    if exponent >= 0 {
        shifts = (exponent >> 16) as i32;
        frac = (exponent & 0xffff) as u16;
    } else {
        let abs_exponent = -exponent;
        let remainder = (abs_exponent & 0xffff) as u32;
        if remainder != 0 {
            shifts = -((abs_exponent >> 16) as i32) - 1;
            frac = (65536 - remainder) as u16;
        } else {
            shifts = -((abs_exponent >> 16) as i32);
            frac = 0;
        }
    }

    // factor = 2^(frac/65536) * 65536 via cubic polynomial approximation.
    // The coefficients are consensus-critical and every intermediate
    // product must be accumulated in u64; a narrower type overflows.
    let mut factor: u32 = 65536;
    if frac > 0 {
        let f = u64::from(frac);
        factor = 65536
            + ((195_766_423_245_049u64 * f + 971_821_376u64 * f * f + 5127u64 * f * f * f
                + (1u64 << 47))
                >> 48) as u32;
    }

    let mut next_target = (&anchor_target * factor) >> 16u32;

    // Integer shifts: left is easier, right is harder. Shifting the full
    // 256-bit width either way saturates.
    if shifts > 0 {
        if shifts >= 256 {
            return Ok(target_to_compact(&params.pow_limit));
        }
        next_target <<= shifts as u32;
    } else if shifts < 0 {
        let abs_shifts = -shifts;
        if abs_shifts >= 256 {
            return Ok(target_to_compact(&BigInt::one()));
        }
        next_target >>= abs_shifts as u32;
    }

    // A target of zero would reject every hash; pin at the hardest
    // possible difficulty instead.
    if next_target.is_zero() {
        next_target = BigInt::one();
    }

    if next_target > params.pow_limit {
        next_target = params.pow_limit.clone();
    }

    Ok(target_to_compact(&next_target))
}
