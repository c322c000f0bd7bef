//! In-memory main-chain header storage and the locked difficulty entry
//! points.
//!
//! [`HeaderIndex`] holds a contiguous run of main-chain headers and hands
//! out copyable [`HeaderView`]s with O(1) ancestor access. [`Chain`] wraps
//! an index behind a coarse lock together with the network parameters and
//! the retarget quantities derived from them; it is the caller-visible
//! concurrent surface. No I/O or blocking happens inside the critical
//! section.

use crate::context::{ChainCtx, HeaderCtx};
use crate::difficulty;
use crate::error::{ConsensusError, ConsensusResult};
use dorian_chaincfg::Params;
use parking_lot::RwLock;

/// A stored main-chain header, reduced to the difficulty-relevant fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredHeader {
    /// Block height.
    pub height: i32,
    /// Header timestamp in Unix seconds.
    pub timestamp: i64,
    /// Compact difficulty target.
    pub bits: u32,
}

/// A contiguous run of main-chain headers.
///
/// The run usually starts at genesis, but may start higher when only a
/// chain suffix is available; the first stored header then has no parent.
#[derive(Debug, Default)]
pub struct HeaderIndex {
    base_height: i32,
    headers: Vec<StoredHeader>,
}

impl HeaderIndex {
    /// An empty index starting at genesis.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// An empty index whose first header will sit at `base_height`.
    pub fn starting_at(base_height: i32) -> Self {
        Self {
            base_height,
            headers: Vec::new(),
        }
    }

    /// Number of stored headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether the index holds no headers.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Height the next pushed header will occupy.
    pub fn next_height(&self) -> i32 {
        self.base_height + self.headers.len() as i32
    }

    /// Append a header at the next height and return that height.
    pub fn push(&mut self, timestamp: i64, bits: u32) -> i32 {
        let height = self.next_height();
        self.headers.push(StoredHeader {
            height,
            timestamp,
            bits,
        });
        height
    }

    /// View of the highest stored header.
    pub fn tip(&self) -> Option<HeaderView<'_>> {
        if self.headers.is_empty() {
            return None;
        }
        Some(HeaderView {
            index: self,
            pos: self.headers.len() - 1,
        })
    }

    /// View of the header at the given height.
    pub fn at_height(&self, height: i32) -> Option<HeaderView<'_>> {
        let pos = height.checked_sub(self.base_height)?;
        if pos < 0 || pos as usize >= self.headers.len() {
            return None;
        }
        Some(HeaderView {
            index: self,
            pos: pos as usize,
        })
    }
}

/// Copyable view of a stored header; the [`HeaderCtx`] the difficulty
/// algorithms walk.
#[derive(Debug, Clone, Copy)]
pub struct HeaderView<'a> {
    index: &'a HeaderIndex,
    pos: usize,
}

impl HeaderView<'_> {
    fn stored(&self) -> &StoredHeader {
        &self.index.headers[self.pos]
    }
}

impl HeaderCtx for HeaderView<'_> {
    fn height(&self) -> i32 {
        self.stored().height
    }

    fn timestamp(&self) -> i64 {
        self.stored().timestamp
    }

    fn bits(&self) -> u32 {
        self.stored().bits
    }

    fn parent(&self) -> Option<Self> {
        let pos = self.pos.checked_sub(1)?;
        Some(HeaderView {
            index: self.index,
            pos,
        })
    }

    fn relative_ancestor(&self, distance: i32) -> Option<Self> {
        if distance < 0 {
            return None;
        }
        let pos = self.pos.checked_sub(distance as usize)?;
        Some(HeaderView {
            index: self.index,
            pos,
        })
    }
}

/// A main chain with its network parameters, safe for concurrent access.
#[derive(Debug)]
pub struct Chain {
    params: Params,
    blocks_per_retarget: i32,
    min_retarget_timespan: i64,
    max_retarget_timespan: i64,
    index: RwLock<HeaderIndex>,
}

impl Chain {
    /// Create an empty chain following the given network.
    pub fn new(params: Params) -> Self {
        let blocks_per_retarget = params.blocks_per_retarget();
        let min_retarget_timespan = params.min_retarget_timespan();
        let max_retarget_timespan = params.max_retarget_timespan();
        Self {
            params,
            blocks_per_retarget,
            min_retarget_timespan,
            max_retarget_timespan,
            index: RwLock::new(HeaderIndex::new()),
        }
    }

    /// Append a header to the main chain.
    ///
    /// The height must be the next in sequence; anything else indicates
    /// the caller's storage and this index have diverged.
    pub fn connect_header(&self, height: i32, timestamp: i64, bits: u32) -> ConsensusResult<()> {
        let mut index = self.index.write();
        let expected = index.next_height();
        if height != expected {
            return Err(ConsensusError::NonSequentialHeight {
                expected,
                got: height,
            });
        }
        index.push(timestamp, bits);
        Ok(())
    }

    /// Height of the current tip, absent while the chain is empty.
    pub fn tip_height(&self) -> Option<i32> {
        let index = self.index.read();
        index.tip().map(|tip| tip.height())
    }

    /// Required difficulty for the block after the current tip.
    ///
    /// Takes the chain lock for the duration of the calculation. This
    /// function is safe for concurrent access.
    pub fn calc_next_required_difficulty(&self, new_block_time: i64) -> ConsensusResult<u32> {
        let index = self.index.read();
        let tip = index.tip();
        difficulty::calc_next_required_difficulty(tip.as_ref(), new_block_time, self)
    }

    /// Easiest difficulty a block could claim given starting bits and an
    /// elapsed duration. See [`difficulty::calc_easiest_difficulty`].
    ///
    /// [`difficulty::calc_easiest_difficulty`]: crate::calc_easiest_difficulty
    pub fn calc_easiest_difficulty(&self, bits: u32, duration_secs: i64) -> u32 {
        difficulty::calc_easiest_difficulty(bits, duration_secs, self)
    }
}

impl ChainCtx for Chain {
    fn params(&self) -> &Params {
        &self.params
    }

    fn blocks_per_retarget(&self) -> i32 {
        self.blocks_per_retarget
    }

    fn min_retarget_timespan(&self) -> i64 {
        self.min_retarget_timespan
    }

    fn max_retarget_timespan(&self) -> i64 {
        self.max_retarget_timespan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::TestCtx;
    use dorian_chaincfg::Params;

    #[test]
    fn test_connect_requires_sequential_heights() {
        let chain = Chain::new(Params::mainnet());
        chain.connect_header(0, 1_000_000, 0x1d00ffff).unwrap();
        chain.connect_header(1, 1_000_150, 0x1d00ffff).unwrap();

        let err = chain.connect_header(5, 1_000_300, 0x1d00ffff).unwrap_err();
        assert_eq!(
            err,
            ConsensusError::NonSequentialHeight {
                expected: 2,
                got: 5
            }
        );
        assert_eq!(chain.tip_height(), Some(1));
    }

    #[test]
    fn test_empty_chain_gets_pow_limit_bits() {
        let chain = Chain::new(Params::mainnet());
        assert_eq!(chain.tip_height(), None);
        let bits = chain.calc_next_required_difficulty(1_000_000).unwrap();
        assert_eq!(bits, Params::mainnet().pow_limit_bits);
    }

    #[test]
    fn test_locked_wrapper_matches_pure_entry_point() {
        let params = Params::mainnet();
        let chain = Chain::new(params.clone());

        let mut index = HeaderIndex::new();
        for i in 0..100i64 {
            let timestamp = 1_000_000 + i * 150;
            chain.connect_header(i as i32, timestamp, 0x1b0404cb).unwrap();
            index.push(timestamp, 0x1b0404cb);
        }

        let new_block_time = 1_000_000 + 100 * 150;
        let locked = chain.calc_next_required_difficulty(new_block_time).unwrap();

        let ctx = TestCtx::new(params);
        let tip = index.tip();
        let pure =
            difficulty::calc_next_required_difficulty(tip.as_ref(), new_block_time, &ctx).unwrap();

        assert_eq!(locked, pure);
        assert_eq!(locked, 0x1b0404cb);
    }

    #[test]
    fn test_steady_chain_keeps_difficulty_across_transitions() {
        // On-schedule blocks at constant canonical bits must keep the same
        // requirement through the legacy -> LWMA -> LWMAv2 -> ASERT
        // transitions.
        let mut params = Params::regtest();
        params.pow_no_retargeting = false;
        params.lwma_height = 10;
        params.lwma_fix_height = 20;
        params.asert_height = 30;
        params.asert_anchor_bits = 0x1b0404cb;
        let chain = Chain::new(params);

        let start = 1_000_000i64;
        chain.connect_header(0, start, 0x1b0404cb).unwrap();
        for height in 1..60i32 {
            let timestamp = start + i64::from(height) * 150;
            let required = chain.calc_next_required_difficulty(timestamp).unwrap();
            assert_eq!(required, 0x1b0404cb, "at height {height}");
            chain.connect_header(height, timestamp, required).unwrap();
        }
    }

    #[test]
    fn test_header_view_ancestor_walks() {
        let mut index = HeaderIndex::new();
        for i in 0..10i64 {
            index.push(1_000_000 + i * 150, 0x1d00ffff);
        }

        let tip = index.tip().unwrap();
        assert_eq!(tip.height(), 9);
        assert_eq!(tip.parent().unwrap().height(), 8);
        assert_eq!(tip.relative_ancestor(9).unwrap().height(), 0);
        assert!(tip.relative_ancestor(10).is_none());
        assert!(tip.relative_ancestor(-1).is_none());
    }

    #[test]
    fn test_header_index_suffix_has_no_parent_below_base() {
        let mut index = HeaderIndex::starting_at(100);
        index.push(1_000_000, 0x1d00ffff);
        index.push(1_000_150, 0x1d00ffff);

        let first = index.at_height(100).unwrap();
        assert!(first.parent().is_none());
        assert!(index.at_height(99).is_none());
        assert_eq!(index.tip().unwrap().height(), 101);
        assert_eq!(index.next_height(), 102);
    }
}
