//! # dorian-consensus
//!
//! Proof-of-work difficulty retargeting for the Doriancoin node.
//!
//! This crate provides:
//! - The compact target codec and work computation
//! - The four difficulty algorithms Doriancoin has used over its history
//!   (BTC-style retarget, LWMA, LWMAv2, ASERT) and the activation-height
//!   dispatcher selecting between them
//! - The header/chain capability traits the algorithms consume
//! - An in-memory main-chain index with a locked, concurrency-safe entry
//!   point
//!
//! The algorithms are pure functions of the supplied headers and
//! parameters, and their results are consensus-critical: every clamp,
//! rounding direction, and fixed-point constant matches Doriancoin Core
//! bit for bit. Deviating forks the chain.

mod asert;
mod chain;
mod compact;
mod context;
mod difficulty;
mod error;
mod lwma;

#[cfg(test)]
mod testutil;

pub use chain::{Chain, HeaderIndex, HeaderView, StoredHeader};
pub use compact::{calc_work, compact_to_target, hash_to_big, target_to_compact};
pub use context::{ChainCtx, HeaderCtx};
pub use difficulty::{calc_easiest_difficulty, calc_next_required_difficulty, DifficultyAlgo};
pub use error::{ConsensusError, ConsensusResult};
