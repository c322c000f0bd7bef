//! LWMA difficulty algorithms.
//!
//! The linearly-weighted moving average weights recent solvetimes more
//! heavily than old ones, responding to hashrate changes much faster than
//! the legacy interval retarget. The v2 variant replaces the previous
//! block's target with the target at the start of the window as the
//! adjustment reference, which breaks the feedback loop behind v1's
//! oscillations, and tightens the total adjustment clamp from 10x to 3x.
//!
//! Reference: https://github.com/zawy12/difficulty-algorithms/issues/3

use crate::compact::{compact_to_target, target_to_compact};
use crate::context::{ChainCtx, HeaderCtx};
use crate::error::ConsensusResult;

/// Number of blocks in the averaging window for the block after
/// `last_node`, capped by the configured window size.
///
/// Both variants count from the original LWMA activation so the window is
/// already full by the time v2 activates.
fn window_len<H: HeaderCtx, C: ChainCtx>(last_node: &H, chain: &C) -> i64 {
    let params = chain.params();
    let height = i64::from(last_node.height()) + 1;
    let blocks = height - i64::from(params.lwma_height);
    blocks.min(params.lwma_window)
}

/// Accumulate weighted solvetimes over `blocks` gaps ending at
/// `last_node`, the most recent gap weighted heaviest.
///
/// Solvetimes clamp to `[1, 6T]` before weighting; negative values from
/// permitted timestamp skew become 1. A missing parent ends the walk
/// early with the sums accumulated so far.
fn weighted_solvetimes<H: HeaderCtx>(last_node: &H, blocks: i64, t: i64) -> (i64, i64) {
    let mut sum_weighted_solvetimes = 0i64;
    let mut sum_weights = 0i64;

    let mut block = last_node.clone();
    let mut weight = blocks;
    while weight >= 1 {
        let Some(prev) = block.parent() else {
            break;
        };

        let solvetime = (block.timestamp() - prev.timestamp()).clamp(1, 6 * t);
        sum_weighted_solvetimes += solvetime * weight;
        sum_weights += weight;

        block = prev;
        weight -= 1;
    }

    (sum_weighted_solvetimes, sum_weights)
}

/// Required difficulty under LWMA v1.
pub(crate) fn calc_next_required_difficulty<H: HeaderCtx, C: ChainCtx>(
    last_node: &H,
    chain: &C,
) -> ConsensusResult<u32> {
    let params = chain.params();
    let t = params.target_spacing_secs();

    let blocks = window_len(last_node, chain);
    if blocks < 3 {
        return Ok(last_node.bits());
    }

    let prev_target = compact_to_target(last_node.bits());
    let (sum_weighted_solvetimes, sum_weights) = weighted_solvetimes(last_node, blocks, t);

    // Symmetric caps: limit adjustment to 10x per calculation.
    let expected = sum_weights * t;
    let sum = sum_weighted_solvetimes.clamp(expected / 10, expected * 10);

    let mut next_target = (&prev_target * sum) / expected;
    if next_target > params.pow_limit {
        next_target = params.pow_limit.clone();
    }

    Ok(target_to_compact(&next_target))
}

/// Required difficulty under the stabilized LWMA v2.
pub(crate) fn calc_next_required_difficulty_v2<H: HeaderCtx, C: ChainCtx>(
    last_node: &H,
    chain: &C,
) -> ConsensusResult<u32> {
    let params = chain.params();
    let t = params.target_spacing_secs();

    let blocks = window_len(last_node, chain);
    if blocks < 3 {
        return Ok(last_node.bits());
    }

    // The window-start target is the adjustment reference.
    let mut window_start = last_node.clone();
    for _ in 0..blocks {
        match window_start.parent() {
            Some(prev) => window_start = prev,
            None => break,
        }
    }
    let reference_target = compact_to_target(window_start.bits());

    let (sum_weighted_solvetimes, sum_weights) = weighted_solvetimes(last_node, blocks, t);

    // Tighter caps than v1: the window-start reference is more stable.
    let expected = sum_weights * t;
    let sum = sum_weighted_solvetimes.clamp(expected / 3, expected * 3);

    let mut next_target = (&reference_target * sum) / expected;
    if next_target > params.pow_limit {
        next_target = params.pow_limit.clone();
    }

    Ok(target_to_compact(&next_target))
}
