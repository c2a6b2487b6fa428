//! Streaming merge: interleave two finalized RL-BWTs under a gap
//! schedule into one freshly encoded RL-BWT.
//!
//! Grounded on `original_source/merge.c`'s `rlditr2_t` (coalescing
//! encoder wrapper), `rld_enc2` (guaranteed adjacent-run coalescence),
//! `dec_enc` (streamed decode-reencode of a run prefix), and
//! `fm_merge_array`/`fm_merge_hash` (the two drivers).

use tracing::info;

use crate::bwt::alphabet::Symbol;
use crate::bwt::error::RlBwtError;
use crate::bwt::gap::{GapArray, GapHash};
use crate::bwt::index::{RlBwt, RunDecoderCursor, RunEncoderCursor};
use crate::logging::Verbosity;

const PROGRESS_STRIDE: u64 = 10_000_000;

/// Coalescing wrapper around a [`RunEncoderCursor`]: holds a pending
/// `(len, symbol)` head run and only flushes it to the index when a
/// differing symbol arrives, guaranteeing the destination index never
/// carries two adjacent runs of the same symbol. The `rld_enc2` of the
/// original.
struct PendingCursor {
    itr: RunEncoderCursor,
    pending_len: u64,
    pending_sym: Option<Symbol>,
}

impl PendingCursor {
    fn new(itr: RunEncoderCursor) -> Self {
        Self {
            itr,
            pending_len: 0,
            pending_sym: None,
        }
    }

    /// Append `len` copies of `sym`, merging with the held head run
    /// when possible.
    fn push(&mut self, dest: &mut RlBwt, len: u64, sym: Symbol) {
        if len == 0 {
            return;
        }
        match self.pending_sym {
            Some(held) if held == sym => {
                self.pending_len += len;
            }
            Some(held) => {
                dest.enc(&mut self.itr, self.pending_len, held);
                self.pending_sym = Some(sym);
                self.pending_len = len;
            }
            None => {
                self.pending_sym = Some(sym);
                self.pending_len = len;
            }
        }
    }

    /// Flush any held run and finalize the destination index.
    fn finish(mut self, dest: &mut RlBwt) -> Result<(), RlBwtError> {
        if let Some(sym) = self.pending_sym {
            if self.pending_len > 0 {
                dest.enc(&mut self.itr, self.pending_len, sym);
            }
        }
        dest.enc_finish(self.itr)
    }
}

/// One source index's decode-side state: a cursor plus a pending
/// `(len, symbol)` run carried over from a previous partial read.
struct SourceCursor<'a> {
    index: &'a RlBwt,
    cursor: RunDecoderCursor,
    pending_len: u64,
    pending_sym: Option<Symbol>,
}

impl<'a> SourceCursor<'a> {
    fn new(index: &'a RlBwt) -> Self {
        Self {
            index,
            cursor: index.begin_decoding(),
            pending_len: 0,
            pending_sym: None,
        }
    }

    fn at_rest(&self) -> bool {
        self.pending_len == 0
    }
}

/// Transfer exactly `k` symbols from `src` into `dest` through `out`.
/// If `src`'s pending run already covers `k`, emit a prefix of it and
/// keep the remainder pending; otherwise drain the pending run, then
/// keep pulling fresh runs from `src` until `k` symbols have been
/// emitted, stashing any leftover as the new pending run. The
/// `dec_enc` of the original.
fn dec_enc(
    out: &mut PendingCursor,
    dest: &mut RlBwt,
    src: &mut SourceCursor,
    mut k: u64,
) -> Result<(), RlBwtError> {
    if k == 0 {
        return Ok(());
    }
    if let Some(sym) = src.pending_sym {
        if src.pending_len >= k {
            out.push(dest, k, sym);
            src.pending_len -= k;
            if src.pending_len == 0 {
                src.pending_sym = None;
            }
            return Ok(());
        }
        out.push(dest, src.pending_len, sym);
        k -= src.pending_len;
        src.pending_len = 0;
        src.pending_sym = None;
    }

    while k > 0 {
        let (len, sym) = src
            .index
            .dec(&mut src.cursor)
            .ok_or(RlBwtError::PrematureEof)?;
        debug_assert!(len > 0, "enc never writes a zero-length run");
        let take = k.min(len);
        out.push(dest, take, sym);
        k -= take;
        let leftover = len - take;
        if leftover > 0 {
            src.pending_len = leftover;
            src.pending_sym = Some(sym);
        }
    }
    Ok(())
}

fn progress(verbosity: Verbosity, processed: u64) {
    if verbosity >= Verbosity::Progress && processed % PROGRESS_STRIDE == 0 {
        info!(symbols_processed = processed, "merge progress");
    }
}

fn check_mergeable(e0: &RlBwt, e1: &RlBwt) -> Result<(), RlBwtError> {
    if e0.asize() != e1.asize() || e0.sbits() != e1.sbits() {
        return Err(RlBwtError::StructuralMismatch);
    }
    Ok(())
}

/// Merge `e0` and `e1` under a precomputed dense gap schedule.
///
/// Mirrors `fm_merge_array`'s accumulate-then-flush loop exactly: runs
/// of consecutive zero-gap positions are counted in `k` and their
/// `e0` symbols are flushed together with the next nonzero-gap
/// position's own symbol, rather than emitting one `e0` symbol per
/// position individually. Both readings produce byte-identical output
/// since `dec_enc`/`PendingCursor` coalesce regardless of how many
/// calls it takes to deliver the same total symbol count.
pub fn merge_dense(e0: &RlBwt, e1: &RlBwt, gap: &GapArray, verbosity: Verbosity) -> Result<RlBwt, RlBwtError> {
    check_mergeable(e0, e1)?;
    let mut dest = RlBwt::init(e0.asize(), e0.sbits())?;
    let itr = dest.begin_encoding()?;
    let mut out = PendingCursor::new(itr);
    let mut src0 = SourceCursor::new(e0);
    let mut src1 = SourceCursor::new(e1);

    let n0 = e0.mcnt(0);
    let mut k: u64 = 0;
    let mut processed: u64 = 0;
    for i in 0..n0 {
        let g = gap.get(i);
        if g > 0 {
            dec_enc(&mut out, &mut dest, &mut src0, k + 1)?;
            dec_enc(&mut out, &mut dest, &mut src1, g)?;
            k = 0;
        } else {
            k += 1;
        }
        processed += 1 + g;
        progress(verbosity, processed);
    }
    if k > 0 {
        dec_enc(&mut out, &mut dest, &mut src0, k)?;
    }

    if !src0.at_rest() || !src1.at_rest() {
        return Err(RlBwtError::PendingSymbolsAfterMerge);
    }
    out.finish(&mut dest)?;
    Ok(dest)
}

/// Merge `e0` and `e1` under a precomputed sparse gap schedule.
/// Mirrors `fm_merge_hash`: iterate blocks in order, within a block
/// iterate sorted `(position, count)` pairs, emitting `position -
/// last_position` symbols from `e0` then `count` symbols from `e1`;
/// after all blocks, flush any trailing `e0` symbols.
pub fn merge_sparse(e0: &RlBwt, e1: &RlBwt, gap: &GapHash, verbosity: Verbosity) -> Result<RlBwt, RlBwtError> {
    check_mergeable(e0, e1)?;
    let mut dest = RlBwt::init(e0.asize(), e0.sbits())?;
    let itr = dest.begin_encoding()?;
    let mut out = PendingCursor::new(itr);
    let mut src0 = SourceCursor::new(e0);
    let mut src1 = SourceCursor::new(e1);

    let n0 = e0.mcnt(0);
    let mut last: i64 = -1;
    let mut processed: u64 = 0;
    for block in 0..gap.num_blocks() {
        for (pos, count) in gap.sorted_block(block) {
            let gap_from_last = pos as i64 - last;
            debug_assert!(gap_from_last >= 1);
            dec_enc(&mut out, &mut dest, &mut src0, gap_from_last as u64)?;
            dec_enc(&mut out, &mut dest, &mut src1, count)?;
            last = pos as i64;
            processed += gap_from_last as u64 + count;
            progress(verbosity, processed);
        }
    }
    if last != n0 as i64 - 1 {
        let remaining = (n0 as i64 - 1 - last) as u64;
        dec_enc(&mut out, &mut dest, &mut src0, remaining)?;
    }

    if !src0.at_rest() || !src1.at_rest() {
        return Err(RlBwtError::PendingSymbolsAfterMerge);
    }
    out.finish(&mut dest)?;
    Ok(dest)
}
