//! Per-network consensus parameters (difficulty subset).
//!
//! Doriancoin inherits Litecoin's proof-of-work rules and layers three
//! successive difficulty algorithm transitions on top of the original
//! BTC-style retarget: LWMA, then a stabilized LWMAv2, then ASERT. Each
//! transition is gated by a per-network activation height; a height of 0
//! means the algorithm never activates on that network.

use num_bigint::BigInt;
use num_traits::One;
use std::time::Duration;

/// Network-specific consensus parameters.
///
/// Only the fields consulted by difficulty retargeting live here; address
/// encodings, seeds, and deployment schedules belong to higher layers.
#[derive(Debug, Clone)]
pub struct Params {
    /// Network name, unique across the registry.
    pub name: String,

    /// Highest allowed proof-of-work target (minimum difficulty).
    pub pow_limit: BigInt,

    /// `pow_limit` in compact form, as stored in headers.
    pub pow_limit_bits: u32,

    /// Disables retargeting entirely; every block gets `pow_limit_bits`.
    /// Matches Litecoin Core behavior for regtest.
    pub pow_no_retargeting: bool,

    /// Desired elapsed time per legacy retarget window.
    pub target_timespan: Duration,

    /// Desired time between blocks.
    pub target_time_per_block: Duration,

    /// Limit on a single legacy retarget step: the adjusted timespan is
    /// clamped to `timespan/factor .. timespan*factor`.
    pub retarget_adjustment_factor: i64,

    /// Test-network rule: allow a minimum-difficulty block once too much
    /// time has elapsed without finding one.
    pub reduce_min_difficulty: bool,

    /// Elapsed time after which `reduce_min_difficulty` kicks in.
    pub min_diff_reduction_time: Duration,

    /// Height at which LWMA replaces the legacy retarget. 0 = never.
    pub lwma_height: i32,

    /// Height at which the stabilized LWMAv2 replaces LWMA. 0 = never.
    pub lwma_fix_height: i32,

    /// Number of blocks in the LWMA averaging window.
    pub lwma_window: i64,

    /// Height of the ASERT anchor block. Blocks strictly after this height
    /// use ASERT. 0 = never.
    pub asert_height: i32,

    /// ASERT halflife in seconds: schedule deviation that doubles or halves
    /// the target.
    pub asert_half_life: i64,

    /// Compact target of the ASERT anchor block, fixed at activation.
    pub asert_anchor_bits: u32,
}

/// The highest target mainnet and testnet4 allow.
fn standard_pow_limit() -> BigInt {
    BigInt::parse_bytes(
        b"0fffff000000000000000000000000000000000000000000000000000000",
        16,
    )
    .expect("valid pow limit hex")
}

/// The highest target the regression and simulation networks allow,
/// 2^255 - 1.
fn permissive_pow_limit() -> BigInt {
    (BigInt::one() << 255u32) - 1
}

impl Params {
    /// Parameters for the main Doriancoin network.
    pub fn mainnet() -> Self {
        Self {
            name: "mainnet".to_string(),
            pow_limit: standard_pow_limit(),
            pow_limit_bits: 0x1e0ffff0,
            pow_no_retargeting: false,
            target_timespan: Duration::from_secs(3 * 24 * 3600 + 12 * 3600), // 3.5 days
            target_time_per_block: Duration::from_secs(150), // 2.5 minutes
            retarget_adjustment_factor: 4,                   // 25% less, 400% more
            reduce_min_difficulty: false,
            min_diff_reduction_time: Duration::ZERO,
            lwma_height: 1_243_845,
            lwma_fix_height: 1_244_300,
            lwma_window: 45,
            asert_height: 1_246_000,
            asert_half_life: 3600,
            asert_anchor_bits: 0x1d18ffe7,
        }
    }

    /// Parameters for the test network (version 4).
    pub fn testnet4() -> Self {
        Self {
            name: "testnet4".to_string(),
            pow_limit: standard_pow_limit(),
            pow_limit_bits: 0x1e0fffff,
            pow_no_retargeting: false,
            target_timespan: Duration::from_secs(3 * 24 * 3600 + 12 * 3600),
            target_time_per_block: Duration::from_secs(150),
            retarget_adjustment_factor: 4,
            reduce_min_difficulty: true,
            min_diff_reduction_time: Duration::from_secs(5 * 60),
            lwma_height: 100,
            lwma_fix_height: 200,
            lwma_window: 45,
            asert_height: 300,
            asert_half_life: 3600,
            asert_anchor_bits: 0x1d18ffe7,
        }
    }

    /// Parameters for the regression test network. Retargeting is disabled
    /// outright, as in Litecoin Core.
    pub fn regtest() -> Self {
        Self {
            name: "regtest".to_string(),
            pow_limit: permissive_pow_limit(),
            pow_limit_bits: 0x207fffff,
            pow_no_retargeting: true,
            target_timespan: Duration::from_secs(3 * 24 * 3600 + 12 * 3600),
            target_time_per_block: Duration::from_secs(150),
            retarget_adjustment_factor: 4,
            reduce_min_difficulty: true,
            min_diff_reduction_time: Duration::from_secs(20 * 60),
            lwma_height: 500,
            lwma_fix_height: 600,
            lwma_window: 45,
            asert_height: 700,
            asert_half_life: 3600,
            asert_anchor_bits: 0x1d18ffe7,
        }
    }

    /// Parameters for the simulation test network. Pre-LWMA rules only.
    pub fn simnet() -> Self {
        Self {
            name: "simnet".to_string(),
            pow_limit: permissive_pow_limit(),
            pow_limit_bits: 0x207fffff,
            pow_no_retargeting: false,
            target_timespan: Duration::from_secs(3 * 24 * 3600 + 12 * 3600),
            target_time_per_block: Duration::from_secs(150),
            retarget_adjustment_factor: 4,
            reduce_min_difficulty: true,
            min_diff_reduction_time: Duration::from_secs(20 * 60),
            lwma_height: 0,
            lwma_fix_height: 0,
            lwma_window: 0,
            asert_height: 0,
            asert_half_life: 0,
            asert_anchor_bits: 0,
        }
    }

    /// Parameters for the public signet network. Pre-LWMA rules only.
    pub fn signet() -> Self {
        Self {
            name: "signet".to_string(),
            pow_limit: BigInt::from(0x0377ae) << 216u32,
            pow_limit_bits: 0x207fffff,
            pow_no_retargeting: false,
            target_timespan: Duration::from_secs(3 * 24 * 3600 + 12 * 3600),
            target_time_per_block: Duration::from_secs(150),
            retarget_adjustment_factor: 4,
            reduce_min_difficulty: false,
            min_diff_reduction_time: Duration::from_secs(20 * 60),
            lwma_height: 0,
            lwma_fix_height: 0,
            lwma_window: 0,
            asert_height: 0,
            asert_half_life: 0,
            asert_anchor_bits: 0,
        }
    }

    /// Desired retarget-window timespan in seconds.
    pub fn target_timespan_secs(&self) -> i64 {
        self.target_timespan.as_secs() as i64
    }

    /// Desired per-block spacing in seconds.
    pub fn target_spacing_secs(&self) -> i64 {
        self.target_time_per_block.as_secs() as i64
    }

    /// Minimum-difficulty reduction delay in seconds.
    pub fn min_diff_reduction_secs(&self) -> i64 {
        self.min_diff_reduction_time.as_secs() as i64
    }

    /// Number of blocks between legacy retargets.
    pub fn blocks_per_retarget(&self) -> i32 {
        (self.target_timespan_secs() / self.target_spacing_secs()) as i32
    }

    /// Lower clamp on the legacy retarget timespan, in seconds.
    pub fn min_retarget_timespan(&self) -> i64 {
        self.target_timespan_secs() / self.retarget_adjustment_factor
    }

    /// Upper clamp on the legacy retarget timespan, in seconds.
    pub fn max_retarget_timespan(&self) -> i64 {
        self.target_timespan_secs() * self.retarget_adjustment_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_difficulty_values() {
        let params = Params::mainnet();
        assert_eq!(params.pow_limit_bits, 0x1e0ffff0);
        assert_eq!(params.target_timespan_secs(), 302_400);
        assert_eq!(params.target_spacing_secs(), 150);
        assert_eq!(params.retarget_adjustment_factor, 4);
        assert_eq!(params.lwma_height, 1_243_845);
        assert_eq!(params.lwma_fix_height, 1_244_300);
        assert_eq!(params.lwma_window, 45);
        assert_eq!(params.asert_height, 1_246_000);
        assert_eq!(params.asert_half_life, 3600);
        assert_eq!(params.asert_anchor_bits, 0x1d18ffe7);
        assert!(!params.pow_no_retargeting);
        assert!(!params.reduce_min_difficulty);
    }

    #[test]
    fn test_derived_retarget_quantities() {
        let params = Params::mainnet();
        assert_eq!(params.blocks_per_retarget(), 2016);
        assert_eq!(params.min_retarget_timespan(), 75_600);
        assert_eq!(params.max_retarget_timespan(), 1_209_600);
    }

    #[test]
    fn test_mainnet_pow_limit_matches_compact_form() {
        // 0x1e0ffff0 decodes to 0x0ffff0 << (8 * (0x1e - 3)), which must not
        // exceed the full-precision limit.
        let params = Params::mainnet();
        let decoded = BigInt::from(0x0ffff0) << (8 * (0x1e - 3));
        assert!(decoded <= params.pow_limit);
    }

    #[test]
    fn test_activation_height_ordering() {
        // The dispatcher assumes ASERT > LWMAv2 > LWMA when all are set.
        for params in [Params::mainnet(), Params::testnet4(), Params::regtest()] {
            assert!(params.asert_height > params.lwma_fix_height);
            assert!(params.lwma_fix_height > params.lwma_height);
            assert!(params.lwma_height > 0);
        }
    }

    #[test]
    fn test_lwma_disabled_networks() {
        for params in [Params::simnet(), Params::signet()] {
            assert_eq!(params.lwma_height, 0);
            assert_eq!(params.lwma_fix_height, 0);
            assert_eq!(params.asert_height, 0);
        }
    }

    #[test]
    fn test_permissive_pow_limit_value() {
        let expected = (BigInt::one() << 255u32) - 1;
        assert_eq!(Params::regtest().pow_limit, expected);
        assert_eq!(Params::simnet().pow_limit, expected);
    }

    #[test]
    fn test_signet_pow_limit_value() {
        assert_eq!(Params::signet().pow_limit, BigInt::from(0x0377ae) << 216u32);
    }

    #[test]
    fn test_regtest_no_retargeting() {
        assert!(Params::regtest().pow_no_retargeting);
    }
}
