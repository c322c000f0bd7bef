//! Loading `Params` for custom networks from configuration.
//!
//! All fields are optional so partial configs can be validated with clear
//! errors. Activation heights default to 0 (algorithm disabled), matching
//! how networks that never scheduled a transition omit them.

use crate::Params;
use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Error when constructing `Params` from configuration.
#[derive(Error, Debug, Clone)]
#[error("chain params error for '{field}': {message}")]
pub struct ChainParamsError {
    /// The field that is missing or invalid.
    pub field: &'static str,
    /// Description of the error.
    pub message: String,
}

impl ChainParamsError {
    fn missing(field: &'static str) -> Self {
        Self {
            field,
            message: "required field missing".to_string(),
        }
    }
}

/// Configuration for a custom network, loadable from TOML/JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParamsConfig {
    /// Network name.
    pub name: Option<String>,
    /// Proof-of-work limit as a hex string, optional "0x" prefix.
    pub pow_limit_hex: Option<String>,
    /// Proof-of-work limit in compact form.
    pub pow_limit_bits: Option<u32>,
    /// Disable retargeting entirely (regtest-style networks).
    #[serde(default)]
    pub pow_no_retargeting: bool,
    /// Legacy retarget window in seconds.
    pub target_timespan_secs: Option<u64>,
    /// Desired block spacing in seconds.
    pub target_time_per_block_secs: Option<u64>,
    /// Legacy retarget clamp factor.
    pub retarget_adjustment_factor: Option<i64>,
    /// Allow minimum-difficulty blocks after a long gap.
    #[serde(default)]
    pub reduce_min_difficulty: bool,
    /// Gap after which minimum difficulty is allowed, in seconds.
    #[serde(default)]
    pub min_diff_reduction_secs: u64,
    /// LWMA activation height (0 = never).
    #[serde(default)]
    pub lwma_height: i32,
    /// LWMAv2 activation height (0 = never).
    #[serde(default)]
    pub lwma_fix_height: i32,
    /// LWMA averaging window in blocks.
    #[serde(default)]
    pub lwma_window: i64,
    /// ASERT anchor height (0 = never).
    #[serde(default)]
    pub asert_height: i32,
    /// ASERT halflife in seconds.
    #[serde(default)]
    pub asert_half_life: i64,
    /// Compact target of the ASERT anchor block.
    #[serde(default)]
    pub asert_anchor_bits: u32,
}

impl Params {
    /// Create `Params` from configuration.
    ///
    /// Returns an error naming the specific field if any required field is
    /// missing or invalid. `pow_limit_hex` is trimmed and accepts an
    /// optional "0x" prefix.
    pub fn from_config(config: &ParamsConfig) -> Result<Self, ChainParamsError> {
        let name = config
            .name
            .as_ref()
            .ok_or_else(|| ChainParamsError::missing("name"))?;

        let pow_limit_hex = config
            .pow_limit_hex
            .as_ref()
            .ok_or_else(|| ChainParamsError::missing("pow_limit_hex"))?;

        let hex_cleaned = pow_limit_hex.trim();
        let hex_cleaned = hex_cleaned
            .strip_prefix("0x")
            .or_else(|| hex_cleaned.strip_prefix("0X"))
            .unwrap_or(hex_cleaned);

        let pow_limit =
            BigInt::parse_bytes(hex_cleaned.as_bytes(), 16).ok_or_else(|| ChainParamsError {
                field: "pow_limit_hex",
                message: format!("invalid hex string: '{}'", pow_limit_hex),
            })?;

        if pow_limit.is_zero() {
            return Err(ChainParamsError {
                field: "pow_limit_hex",
                message: "pow limit cannot be zero".to_string(),
            });
        }

        let target_time_per_block_secs = config
            .target_time_per_block_secs
            .ok_or_else(|| ChainParamsError::missing("target_time_per_block_secs"))?;
        if target_time_per_block_secs == 0 {
            return Err(ChainParamsError {
                field: "target_time_per_block_secs",
                message: "block spacing cannot be zero".to_string(),
            });
        }

        let retarget_adjustment_factor = config
            .retarget_adjustment_factor
            .ok_or_else(|| ChainParamsError::missing("retarget_adjustment_factor"))?;
        if retarget_adjustment_factor <= 0 {
            return Err(ChainParamsError {
                field: "retarget_adjustment_factor",
                message: "adjustment factor must be positive".to_string(),
            });
        }

        Ok(Self {
            name: name.clone(),
            pow_limit,
            pow_limit_bits: config
                .pow_limit_bits
                .ok_or_else(|| ChainParamsError::missing("pow_limit_bits"))?,
            pow_no_retargeting: config.pow_no_retargeting,
            target_timespan: Duration::from_secs(
                config
                    .target_timespan_secs
                    .ok_or_else(|| ChainParamsError::missing("target_timespan_secs"))?,
            ),
            target_time_per_block: Duration::from_secs(target_time_per_block_secs),
            retarget_adjustment_factor,
            reduce_min_difficulty: config.reduce_min_difficulty,
            min_diff_reduction_time: Duration::from_secs(config.min_diff_reduction_secs),
            lwma_height: config.lwma_height,
            lwma_fix_height: config.lwma_fix_height,
            lwma_window: config.lwma_window,
            asert_height: config.asert_height,
            asert_half_life: config.asert_half_life,
            asert_anchor_bits: config.asert_anchor_bits,
        })
    }
}
