//! Difficulty retargeting: algorithm dispatch and the legacy retarget.
//!
//! Doriancoin started on the original BTC-style retarget and transitioned
//! to LWMA, then the stabilized LWMAv2, then ASERT, each at a per-network
//! activation height. The dispatcher selects the algorithm governing the
//! next block; the legacy algorithm itself lives here, the successors in
//! their own modules.

use crate::compact::{compact_to_target, target_to_compact};
use crate::context::{ChainCtx, HeaderCtx};
use crate::error::{ConsensusError, ConsensusResult};
use crate::{asert, lwma};
use dorian_chaincfg::Params;
use tracing::debug;

/// The difficulty algorithm governing a block at a given height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyAlgo {
    /// Original BTC-style retarget every `blocks_per_retarget` blocks.
    Legacy,
    /// Linearly-weighted moving average over a fixed window.
    Lwma,
    /// LWMA referencing the window-start target, with tighter clamps.
    LwmaV2,
    /// Exponential schedule-deviation targeting (aserti3-2d family).
    Asert,
}

impl DifficultyAlgo {
    /// Select the algorithm for the block at `next_height`.
    ///
    /// The ASERT comparison is strict: the anchor block itself still uses
    /// the rules it was mined under, only its descendants switch.
    pub fn for_height(next_height: i32, params: &Params) -> Self {
        if params.asert_height > 0 && next_height > params.asert_height {
            return Self::Asert;
        }
        if params.lwma_fix_height > 0 && next_height >= params.lwma_fix_height {
            return Self::LwmaV2;
        }
        if params.lwma_height > 0 && next_height >= params.lwma_height {
            return Self::Lwma;
        }
        Self::Legacy
    }
}

/// Calculate the required difficulty for the block after `last_node`.
///
/// `last_node` is the chain tip the new block builds on (absent for the
/// genesis block) and `new_block_time` the proposed header timestamp in
/// Unix seconds. Errors indicate corrupted chain storage; every other
/// input yields a valid compact target.
pub fn calc_next_required_difficulty<H: HeaderCtx, C: ChainCtx>(
    last_node: Option<&H>,
    new_block_time: i64,
    chain: &C,
) -> ConsensusResult<u32> {
    let params = chain.params();

    // Emulate the same behavior as Litecoin Core that for regtest there
    // is no difficulty retargeting.
    if params.pow_no_retargeting {
        return Ok(params.pow_limit_bits);
    }

    // Genesis block.
    let Some(last_node) = last_node else {
        return Ok(params.pow_limit_bits);
    };

    match DifficultyAlgo::for_height(last_node.height() + 1, params) {
        DifficultyAlgo::Asert => asert::calc_next_required_difficulty(last_node, chain),
        DifficultyAlgo::LwmaV2 => lwma::calc_next_required_difficulty_v2(last_node, chain),
        DifficultyAlgo::Lwma => lwma::calc_next_required_difficulty(last_node, chain),
        DifficultyAlgo::Legacy => calc_legacy_difficulty(last_node, new_block_time, chain),
    }
}

/// Original BTC-style difficulty retarget.
fn calc_legacy_difficulty<H: HeaderCtx, C: ChainCtx>(
    last_node: &H,
    new_block_time: i64,
    chain: &C,
) -> ConsensusResult<u32> {
    let params = chain.params();
    let next_height = last_node.height() + 1;

    // Return the previous block's difficulty requirements if this block
    // is not at a difficulty retarget interval.
    if next_height % chain.blocks_per_retarget() != 0 {
        if params.reduce_min_difficulty {
            // Test networks allow a minimum-difficulty block once too much
            // time has elapsed without mining one.
            let allow_min_time = last_node.timestamp() + params.min_diff_reduction_secs();
            if new_block_time > allow_min_time {
                return Ok(params.pow_limit_bits);
            }

            // Mined within the desired timeframe: use the difficulty of
            // the last block that did not have the special rule applied.
            return Ok(find_prev_testnet_difficulty(last_node, chain));
        }

        return Ok(last_node.bits());
    }

    // Only go back the full interval unless this is the first retarget
    // after genesis; going back one block short of it otherwise closes the
    // window a 51% miner could exploit through the boundary timestamp.
    let distance = if next_height == chain.blocks_per_retarget() {
        chain.blocks_per_retarget() - 1
    } else {
        chain.blocks_per_retarget()
    };

    let first_node = last_node.relative_ancestor(distance).ok_or_else(|| {
        ConsensusError::Assert("unable to obtain previous retarget block".to_string())
    })?;

    // Limit the amount of adjustment that can occur to the previous
    // difficulty.
    let actual_timespan = last_node.timestamp() - first_node.timestamp();
    let adjusted_timespan =
        actual_timespan.clamp(chain.min_retarget_timespan(), chain.max_retarget_timespan());

    // newTarget = currentTarget * adjustedTimespan / targetTimespan,
    // rounded down by integer division as in Litecoin Core.
    let old_target = compact_to_target(last_node.bits());
    let mut new_target = (&old_target * adjusted_timespan) / params.target_timespan_secs();

    if new_target > params.pow_limit {
        new_target = params.pow_limit.clone();
    }

    let new_target_bits = target_to_compact(&new_target);
    debug!(
        height = next_height,
        old_bits = format!("{:08x}", last_node.bits()),
        new_bits = format!("{:08x}", new_target_bits),
        actual_timespan,
        adjusted_timespan,
        target_timespan = params.target_timespan_secs(),
        "difficulty retarget"
    );

    Ok(new_target_bits)
}

/// Difficulty of the most recent block that did not have the testnet
/// minimum-difficulty rule applied.
fn find_prev_testnet_difficulty<H: HeaderCtx, C: ChainCtx>(start_node: &H, chain: &C) -> u32 {
    let pow_limit_bits = chain.params().pow_limit_bits;

    // Search backwards until a retarget boundary or a block mined at a
    // real difficulty.
    let mut node = start_node.clone();
    loop {
        if node.height() % chain.blocks_per_retarget() == 0 || node.bits() != pow_limit_bits {
            return node.bits();
        }
        match node.parent() {
            Some(parent) => node = parent,
            None => return pow_limit_bits,
        }
    }
}

/// Easiest difficulty a block could legitimately claim given starting bits
/// and an elapsed duration.
///
/// Used to sanity-check claimed proof of work against a known good
/// checkpoint: the result is the starting target grown by the maximum
/// adjustment factor once per retarget the duration allows.
pub fn calc_easiest_difficulty<C: ChainCtx>(bits: u32, duration_secs: i64, chain: &C) -> u32 {
    let params = chain.params();

    // The test network rules allow minimum difficulty blocks after more
    // than twice the desired block time has elapsed.
    if params.reduce_min_difficulty && duration_secs > params.min_diff_reduction_secs() {
        return params.pow_limit_bits;
    }

    let mut new_target = compact_to_target(bits);
    let mut remaining = duration_secs;
    while remaining > 0 && new_target < params.pow_limit {
        new_target = new_target * params.retarget_adjustment_factor;
        remaining -= chain.max_retarget_timespan();
    }

    if new_target > params.pow_limit {
        new_target = params.pow_limit.clone();
    }

    target_to_compact(&new_target)
}
