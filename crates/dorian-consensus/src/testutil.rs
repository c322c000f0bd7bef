//! Shared helpers for the difficulty tests.

use crate::chain::HeaderIndex;
use crate::context::ChainCtx;
use dorian_chaincfg::Params;

/// A bare [`ChainCtx`] over a parameter set, for exercising the
/// algorithms without going through [`Chain`](crate::Chain).
pub(crate) struct TestCtx {
    params: Params,
    blocks_per_retarget: i32,
    min_retarget_timespan: i64,
    max_retarget_timespan: i64,
}

impl TestCtx {
    pub(crate) fn new(params: Params) -> Self {
        let blocks_per_retarget = params.blocks_per_retarget();
        let min_retarget_timespan = params.min_retarget_timespan();
        let max_retarget_timespan = params.max_retarget_timespan();
        Self {
            params,
            blocks_per_retarget,
            min_retarget_timespan,
            max_retarget_timespan,
        }
    }
}

impl ChainCtx for TestCtx {
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

/// Build an index of `count` headers starting at `base_height`, with the
/// given timestamp spacing and constant bits.
pub(crate) fn spaced_index(
    base_height: i32,
    count: i64,
    start_time: i64,
    spacing: i64,
    bits: u32,
) -> HeaderIndex {
    let mut index = HeaderIndex::starting_at(base_height);
    for i in 0..count {
        index.push(start_time + i * spacing, bits);
    }
    index
}
