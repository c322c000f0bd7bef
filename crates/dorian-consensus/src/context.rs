//! Capability traits the caller supplies to the difficulty algorithms.
//!
//! The core walks ancestors and reads network parameters exclusively
//! through these two traits; it never mutates the chain. Implementations
//! are expected to make traversal cheap — the algorithms walk at most one
//! retarget interval or one LWMA window per call.

use dorian_chaincfg::Params;

/// Read-only view of a single block header and its ancestry.
///
/// Implementations are lightweight handles (the provided [`Chain`] storage
/// hands out copyable index views), so `Clone` is expected to be trivial.
///
/// [`Chain`]: crate::Chain
pub trait HeaderCtx: Clone {
    /// Height of this header.
    fn height(&self) -> i32;

    /// Header timestamp in Unix seconds.
    fn timestamp(&self) -> i64;

    /// Compact difficulty target stored in the header.
    fn bits(&self) -> u32;

    /// The parent header, absent at genesis or when the backing store
    /// holds only a chain suffix.
    fn parent(&self) -> Option<Self>;

    /// The ancestor `distance` generations back, absent if the chain is
    /// too short.
    ///
    /// The provided implementation walks one parent at a time; stores with
    /// height-indexed access should override it.
    fn relative_ancestor(&self, distance: i32) -> Option<Self> {
        let mut node = self.clone();
        for _ in 0..distance {
            node = node.parent()?;
        }
        Some(node)
    }
}

/// Difficulty-relevant chain state: the network parameters plus the
/// retarget quantities derived from them.
pub trait ChainCtx {
    /// Consensus parameters of the network this chain follows.
    fn params(&self) -> &Params;

    /// Number of blocks between legacy retargets,
    /// `target_timespan / target_time_per_block`.
    fn blocks_per_retarget(&self) -> i32;

    /// Lower clamp on the legacy retarget timespan, in seconds.
    fn min_retarget_timespan(&self) -> i64;

    /// Upper clamp on the legacy retarget timespan, in seconds.
    fn max_retarget_timespan(&self) -> i64;
}
