//! Error types for difficulty computation.

use thiserror::Error;

/// Errors surfaced by the difficulty retargeting core.
///
/// Assertion failures indicate corrupted chain storage, not recoverable
/// conditions; callers abort validation of the offending header. Every
/// other input, including malformed compact targets and exotic timestamps,
/// produces well-defined output through clamping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    /// A chain-storage invariant was violated, such as a mandatory
    /// ancestor missing from the supplied chain.
    #[error("chain state assertion failed: {0}")]
    Assert(String),

    /// A header was appended out of sequence with the stored main chain.
    #[error("non-sequential header height: expected {expected}, got {got}")]
    NonSequentialHeight { expected: i32, got: i32 },
}

/// Result type for difficulty operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;
