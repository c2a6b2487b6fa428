//! Gap-array computation: the core of the merge algorithm.
//!
//! Given two finalized indexes `e0`/`e1`, walk the LF-mapping backwards
//! over `e1` while tracking the corresponding row of `e0`, recording at
//! each step how many `e1` rows sort immediately after a given `e0`
//! row. Grounded directly on `original_source/merge.c`'s
//! `compute_gap_array` (dense) and `compute_gap_hash` (sparse); both
//! backends share the walk itself via [`walk_gap`], driving a `bump`
//! callback instead of duplicating the loop.

use std::collections::HashMap;

use tracing::info;

use crate::bwt::alphabet::Symbol;
use crate::bwt::error::RlBwtError;
use crate::bwt::index::RlBwt;
use crate::logging::Verbosity;

/// Largest value the dense gap array stores inline. Values that would
/// exceed this spill to the overflow vector, matching
/// `original_source/merge.c`'s `GAP_MAX` (`INT32_MAX`).
pub const GAP_MAX: u32 = i32::MAX as u32;

/// How often (in LF-walk steps) a progress message is emitted at
/// [`Verbosity::Progress`] or above, matching `MSG_SIZE` in the
/// original.
const PROGRESS_STRIDE: u64 = 10_000_000;

/// One dense gap-array slot: either the count itself, or — once it
/// would overflow [`GAP_MAX`] — an index into the overflow vector.
/// Replaces the original's sign-bit reuse with an explicit tagged
/// variant, per spec.md §9's design note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GapCount {
    Inline(u32),
    Spilled(u32),
}

/// Dense gap array: one counter per position of `e0`, with an
/// overflow vector for counts that exceed [`GAP_MAX`].
#[derive(Debug, Clone)]
pub struct GapArray {
    slots: Vec<GapCount>,
    overflow: Vec<u64>,
}

impl GapArray {
    fn new(n0: u64) -> Self {
        Self {
            slots: vec![GapCount::Inline(0); n0 as usize],
            overflow: Vec::new(),
        }
    }

    fn bump(&mut self, j: u64) {
        let slot = &mut self.slots[j as usize];
        match *slot {
            GapCount::Spilled(idx) => {
                self.overflow[idx as usize] += 1;
            }
            GapCount::Inline(v) if v == GAP_MAX => {
                self.overflow.push(1 + GAP_MAX as u64);
                *slot = GapCount::Spilled(self.overflow.len() as u32 - 1);
            }
            GapCount::Inline(v) => {
                *slot = GapCount::Inline(v + 1);
            }
        }
    }

    /// Effective gap count at position `i`.
    pub fn get(&self, i: u64) -> u64 {
        match self.slots[i as usize] {
            GapCount::Inline(v) => v as u64,
            GapCount::Spilled(idx) => self.overflow[idx as usize],
        }
    }

    pub fn len(&self) -> u64 {
        self.slots.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Sum of every effective gap value. Used by property tests to
    /// check the gap-sum identity (spec.md §8 property 2).
    pub fn sum(&self) -> u64 {
        (0..self.len()).map(|i| self.get(i)).sum()
    }
}

/// Sparse gap hash: `e0`'s positions are partitioned into blocks of
/// `2^BLOCK_BITS` positions, each with its own `{position -> count}`
/// map. Per spec.md §9's design note, this reimplements the original's
/// packed-key hash table as an explicit map with
/// `entry().and_modify().or_insert()` rather than the micro-optimized
/// single-key trick.
pub const BLOCK_BITS: u32 = 16;

#[derive(Debug, Clone)]
pub struct GapHash {
    n0: u64,
    blocks: Vec<HashMap<u64, u64>>,
}

impl GapHash {
    fn new(n0: u64) -> Self {
        let n_blocks = ((n0 + (1 << BLOCK_BITS) - 1) >> BLOCK_BITS).max(1);
        Self {
            n0,
            blocks: vec![HashMap::new(); n_blocks as usize],
        }
    }

    fn bump(&mut self, j: u64) {
        let block = (j >> BLOCK_BITS) as usize;
        let within = j & ((1u64 << BLOCK_BITS) - 1);
        self.blocks[block]
            .entry(within)
            .and_modify(|c| *c += 1)
            .or_insert(1);
    }

    pub fn n0(&self) -> u64 {
        self.n0
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Sorted `(position, count)` pairs within block `block_idx`, in
    /// ascending position order — the order the merger streams in.
    pub fn sorted_block(&self, block_idx: usize) -> Vec<(u64, u64)> {
        let base = (block_idx as u64) << BLOCK_BITS;
        let mut entries: Vec<(u64, u64)> = self.blocks[block_idx]
            .iter()
            .map(|(&within, &count)| (base + within, count))
            .collect();
        entries.sort_unstable_by_key(|&(pos, _)| pos);
        entries
    }

    /// Effective gap count at position `i`, the slow path used only by
    /// tests comparing dense and sparse parity.
    pub fn get(&self, i: u64) -> u64 {
        let block = (i >> BLOCK_BITS) as usize;
        let within = i & ((1u64 << BLOCK_BITS) - 1);
        self.blocks[block].get(&within).copied().unwrap_or(0)
    }

    pub fn sum(&self) -> u64 {
        self.blocks.iter().map(|b| b.values().sum::<u64>()).sum()
    }
}

/// The shared LF back-trace, parameterized over a `bump(position)`
/// callback that records one insertion at that `e0` position. See
/// spec.md §4.3 for the algorithm and §9 for why the increment/reset
/// ordering below is exactly this and not the more "obvious" reading.
fn walk_gap(e0: &RlBwt, e1: &RlBwt, verbosity: Verbosity, mut bump: impl FnMut(u64)) -> Result<(), RlBwtError> {
    let n1 = e1.mcnt(0);
    if e0.mcnt(1) == 0 {
        return Err(RlBwtError::MissingSentinel);
    }
    if n1 == 0 {
        // e1 is empty: no LF steps to walk, nothing to bump.
        return Ok(());
    }
    if e1.mcnt(1) == 0 {
        return Err(RlBwtError::MissingSentinel);
    }

    let mut x = e1.mcnt(1) - 1; // index of the last sentinel of e1
    let mut k = x;
    let mut l = x;
    let mut i = e0.mcnt(1) - 1; // position in e0 where the last sentinel lands
    let mut j = i;
    bump(j);

    let mut n_processed: u64 = 1;
    loop {
        // `e1.rank11` counts occurrences *strictly before* a row (the
        // standard FM-index Occ convention used throughout index.rs),
        // so the symbol sitting at the single-row interval [k, l] is
        // found by comparing counts before and after that row, i.e.
        // `rank2a(k + 1, l + 1)` rather than the closed-interval
        // `rank2a(k, l)` spec.md describes literally — both identify
        // the same unique symbol, only the rank convention differs.
        // This shift is specific to locating `e1`'s own row; it does not
        // carry over to the `e0` cross-LF step below, which needs the
        // closed-prefix count at `i` exactly as spec.md states it.
        let (ok, ol) = e1.rank2a(k + 1, l + 1);
        let mut c: Option<Symbol> = None;
        for sym in 0..e1.asize() {
            if ok[sym as usize] < ol[sym as usize] {
                c = Some(sym);
                break;
            }
        }
        let c = c.expect("single-row interval in e1 must have exactly one predecessor symbol");

        if c == 0 {
            j = e0.mcnt(1) - 1;
            if x == 0 {
                break;
            }
            x -= 1;
            k = x;
            l = x;
        } else {
            // Spec §4.3 step d: `j = cnt[c] + rank11(e0, i, c) - 1`, where
            // that rank11 is the *closed* prefix [0..i]. `e0.rank11` here
            // is half-open [0, i), so the closed-prefix count at i is
            // `e0.rank11(i + 1, c)`. Unlike the e1 self-LF above, `c` is
            // not necessarily `e0`'s own symbol at row `i`, so this is not
            // interchangeable with a half-open read at `i` — dropping the
            // `+ 1 .. - 1` here silently picks the wrong row whenever
            // `e0`'s BWT at `i` differs from `c`.
            j = e0.cnt(c as usize) + e0.rank11(i + 1, c) - 1;
            k = e1.cnt(c as usize) + ok[c as usize];
            l = k;
        }
        bump(j);
        i = j;

        n_processed += 1;
        if verbosity >= Verbosity::Progress && n_processed % PROGRESS_STRIDE == 0 {
            info!(
                symbols_processed = n_processed,
                "gap computation progress"
            );
        }
    }

    Ok(())
}

/// Compute the dense gap array for `(e0, e1)`.
pub fn compute_gap_dense(e0: &RlBwt, e1: &RlBwt, verbosity: Verbosity) -> Result<GapArray, RlBwtError> {
    check_structural_compat(e0, e1)?;
    let mut gap = GapArray::new(e0.mcnt(0));
    walk_gap(e0, e1, verbosity, |j| gap.bump(j))?;
    Ok(gap)
}

/// Compute the sparse gap hash for `(e0, e1)`.
pub fn compute_gap_sparse(e0: &RlBwt, e1: &RlBwt, verbosity: Verbosity) -> Result<GapHash, RlBwtError> {
    check_structural_compat(e0, e1)?;
    let mut gap = GapHash::new(e0.mcnt(0));
    walk_gap(e0, e1, verbosity, |j| gap.bump(j))?;
    Ok(gap)
}

fn check_structural_compat(e0: &RlBwt, e1: &RlBwt) -> Result<(), RlBwtError> {
    if e0.asize() != e1.asize() || e0.sbits() != e1.sbits() {
        return Err(RlBwtError::StructuralMismatch);
    }
    Ok(())
}
