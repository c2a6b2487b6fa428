//! The run-length encoded BWT index: packed bitstream, occurrence
//! tables, and a sampled rank ladder.
//!
//! Layout mirrors the bit-packing style of [`crate::bwt::codec`]'s
//! sibling module `genomics::compressed_dna` in the teacher repo: a
//! flat `BitVec<u8, Msb0>` with small fixed-width fields, rather than
//! a `Vec<u8>` of manually shifted bytes.

use bitvec::prelude::*;

use crate::bwt::alphabet::{Symbol, MAX_ALPHABET_SIZE};
use crate::bwt::error::RlBwtError;

/// Width, in bits, of the inline symbol field. `MAX_ALPHABET_SIZE` is 8,
/// so 3 bits always suffice.
const SYMBOL_BITS: u32 = 3;

/// Width, in bits, of the escape continuation that stores a run length
/// too large for the inline field.
const LEN_CONTINUATION_BITS: u32 = 64;

/// Number of decoded symbols between consecutive rank checkpoints.
/// Smaller values trade memory for faster `rank_all`.
const DEFAULT_SAMPLE_STRIDE: u64 = 1024;

type Bits = BitVec<u8, Msb0>;

fn push_bits(bits: &mut Bits, value: u64, width: u32) {
    for shift in (0..width).rev() {
        bits.push(((value >> shift) & 1) != 0);
    }
}

fn read_bits(bits: &Bits, pos: &mut usize, width: u32) -> u64 {
    let mut value = 0u64;
    for _ in 0..width {
        let bit = bits[*pos];
        value = (value << 1) | (bit as u64);
        *pos += 1;
    }
    value
}

/// A sampled rank checkpoint: cumulative per-symbol counts at a known
/// decoded position and bitstream offset.
#[derive(Debug, Clone)]
struct RankCheckpoint {
    position: u64,
    bit_pos: usize,
    counts: [u64; MAX_ALPHABET_SIZE],
}

/// Opaque encoder cursor. Carries no pending state of its own — all
/// writes append directly to the index's bitstream. Code that needs
/// to coalesce adjacent equal-symbol runs before writing (the merge
/// core) wraps this in [`crate::bwt::merge::PendingCursor`].
#[derive(Debug)]
pub struct RunEncoderCursor {
    _private: (),
}

/// Opaque decoder cursor: just a bit offset into the index's stream.
#[derive(Debug, Clone, Copy)]
pub struct RunDecoderCursor {
    bit_pos: usize,
}

/// A run-length encoded BWT string over a small alphabet, with the
/// occurrence tables and rank ladder needed to support LF-mapping.
#[derive(Debug, Clone)]
pub struct RlBwt {
    asize: u8,
    sbits: u8,
    /// `mcnt[0]` = total length; `mcnt[c+1]` = occurrences of symbol `c`.
    mcnt: [u64; MAX_ALPHABET_SIZE + 1],
    /// `cnt[c]` = occurrences of symbols strictly less than `c`.
    cnt: [u64; MAX_ALPHABET_SIZE + 1],
    bits: Bits,
    samples: Vec<RankCheckpoint>,
    sample_stride: u64,
    finalized: bool,
    working_counts: [u64; MAX_ALPHABET_SIZE + 1],
    working_len: u64,
}

impl RlBwt {
    /// Start a fresh, empty, not-yet-finalized index.
    pub fn init(asize: u8, sbits: u8) -> Result<Self, RlBwtError> {
        if asize == 0 || asize as usize > MAX_ALPHABET_SIZE {
            return Err(RlBwtError::InvalidAlphabetSize(asize));
        }
        if sbits == 0 || sbits as u32 >= LEN_CONTINUATION_BITS {
            return Err(RlBwtError::InvalidSbits(sbits));
        }
        Ok(Self {
            asize,
            sbits,
            mcnt: [0; MAX_ALPHABET_SIZE + 1],
            cnt: [0; MAX_ALPHABET_SIZE + 1],
            bits: Bits::new(),
            samples: Vec::new(),
            sample_stride: DEFAULT_SAMPLE_STRIDE,
            finalized: false,
            working_counts: [0; MAX_ALPHABET_SIZE + 1],
            working_len: 0,
        })
    }

    /// Build the finalized empty index directly (no runs).
    pub fn empty(asize: u8, sbits: u8) -> Result<Self, RlBwtError> {
        let mut e = Self::init(asize, sbits)?;
        let itr = e.begin_encoding()?;
        e.enc_finish(itr)?;
        Ok(e)
    }

    pub fn asize(&self) -> u8 {
        self.asize
    }

    pub fn sbits(&self) -> u8 {
        self.sbits
    }

    pub fn mcnt(&self, idx: usize) -> u64 {
        self.mcnt[idx]
    }

    pub fn cnt(&self, idx: usize) -> u64 {
        self.cnt[idx]
    }

    pub fn len(&self) -> u64 {
        self.mcnt[0]
    }

    pub fn is_empty(&self) -> bool {
        self.mcnt[0] == 0
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn with_sample_stride(mut self, stride: u64) -> Self {
        self.sample_stride = stride.max(1);
        self
    }

    /// Open an encoding cursor. The index must not already be finalized.
    pub fn begin_encoding(&mut self) -> Result<RunEncoderCursor, RlBwtError> {
        if self.finalized {
            return Err(RlBwtError::AlreadyFinalized);
        }
        Ok(RunEncoderCursor { _private: () })
    }

    /// Append a single run of `len` (>= 1) copies of `sym`. Callers are
    /// responsible for coalescing adjacent equal-symbol runs — this
    /// call does not merge with whatever was written before it.
    pub fn enc(&mut self, _itr: &mut RunEncoderCursor, len: u64, sym: Symbol) {
        debug_assert!(len >= 1, "run length must be >= 1");
        debug_assert!((sym as usize) < self.asize as usize, "symbol out of range");

        push_bits(&mut self.bits, sym as u64, SYMBOL_BITS);
        let max_inline = (1u64 << self.sbits) - 1;
        if len < max_inline {
            push_bits(&mut self.bits, len, self.sbits as u32);
        } else {
            push_bits(&mut self.bits, max_inline, self.sbits as u32);
            push_bits(&mut self.bits, len, LEN_CONTINUATION_BITS);
        }

        self.working_counts[sym as usize + 1] += len;
        self.working_len += len;
    }

    /// Finalize the index: freeze the occurrence tables and build the
    /// rank checkpoint ladder. After this call the index is
    /// query-ready and further `enc` calls are rejected.
    pub fn enc_finish(&mut self, itr: RunEncoderCursor) -> Result<(), RlBwtError> {
        drop(itr);
        self.mcnt = self.working_counts;
        self.mcnt[0] = self.working_len;

        let mut acc = 0u64;
        for c in 0..=self.asize as usize {
            self.cnt[c] = acc;
            if c < self.asize as usize {
                acc += self.mcnt[c + 1];
            }
        }

        self.finalized = true;
        self.build_rank_samples();
        self.check_invariants()?;
        Ok(())
    }

    /// Open a fresh decoding cursor positioned at the start of the
    /// bitstream.
    pub fn begin_decoding(&self) -> RunDecoderCursor {
        RunDecoderCursor { bit_pos: 0 }
    }

    /// Decode the next run, or `None` once the stream is exhausted.
    pub fn dec(&self, itr: &mut RunDecoderCursor) -> Option<(u64, Symbol)> {
        if itr.bit_pos >= self.bits.len() {
            return None;
        }
        let sym = read_bits(&self.bits, &mut itr.bit_pos, SYMBOL_BITS) as Symbol;
        let max_inline = (1u64 << self.sbits) - 1;
        let inline = read_bits(&self.bits, &mut itr.bit_pos, self.sbits as u32);
        let len = if inline == max_inline {
            read_bits(&self.bits, &mut itr.bit_pos, LEN_CONTINUATION_BITS)
        } else {
            inline
        };
        Some((len, sym))
    }

    fn build_rank_samples(&mut self) {
        let mut cursor = self.begin_decoding();
        let mut counts = [0u64; MAX_ALPHABET_SIZE];
        let mut position = 0u64;
        let mut samples = vec![RankCheckpoint {
            position: 0,
            bit_pos: 0,
            counts,
        }];

        while let Some((len, sym)) = self.dec(&mut cursor) {
            counts[sym as usize] += len;
            position += len;
            let next_threshold = self.sample_stride * (samples.len() as u64);
            if position >= next_threshold {
                samples.push(RankCheckpoint {
                    position,
                    bit_pos: cursor.bit_pos,
                    counts,
                });
            }
        }
        samples.push(RankCheckpoint {
            position,
            bit_pos: cursor.bit_pos,
            counts,
        });
        self.samples = samples;
    }

    /// Cumulative per-symbol occurrence counts over `[0, i)`.
    pub fn rank_all(&self, i: u64) -> [u64; MAX_ALPHABET_SIZE] {
        let bounded = i.min(self.mcnt[0]);
        let idx = match self
            .samples
            .binary_search_by(|cp| cp.position.cmp(&bounded))
        {
            Ok(pos) => pos,
            Err(pos) => pos.saturating_sub(1),
        };
        let checkpoint = &self.samples[idx];
        let mut counts = checkpoint.counts;
        let mut position = checkpoint.position;
        let mut cursor = RunDecoderCursor {
            bit_pos: checkpoint.bit_pos,
        };

        while position < bounded {
            let (len, sym) = match self.dec(&mut cursor) {
                Some(v) => v,
                None => break,
            };
            let take = len.min(bounded - position);
            counts[sym as usize] += take;
            position += take;
        }
        counts
    }

    /// Occurrences of `c` in `[0, i)`.
    pub fn rank11(&self, i: u64, c: Symbol) -> u64 {
        self.rank_all(i)[c as usize]
    }

    /// `(rank(k-1), rank(l))` in one pass per endpoint — the bulk
    /// variant LF-mapping needs, since a single `rank_all` call already
    /// yields every symbol's count at that position.
    pub fn rank2a(&self, k: u64, l: u64) -> ([u64; MAX_ALPHABET_SIZE], [u64; MAX_ALPHABET_SIZE]) {
        let ok = if k == 0 {
            [0u64; MAX_ALPHABET_SIZE]
        } else {
            self.rank_all(k - 1)
        };
        let ol = self.rank_all(l);
        (ok, ol)
    }

    /// Re-derive the structural invariants from scratch: occurrence
    /// counts sum to the total length, and no two adjacent runs share
    /// a symbol.
    pub fn check_invariants(&self) -> Result<(), RlBwtError> {
        if !self.finalized {
            return Err(RlBwtError::NotFinalized);
        }
        let sum: u64 = (1..=self.asize as usize).map(|c| self.mcnt[c]).sum();
        if sum != self.mcnt[0] {
            return Err(RlBwtError::CountMismatch {
                expected: self.mcnt[0],
                actual: sum,
            });
        }

        let mut cursor = self.begin_decoding();
        let mut prev: Option<Symbol> = None;
        while let Some((_, sym)) = self.dec(&mut cursor) {
            if prev == Some(sym) {
                return Err(RlBwtError::AdjacentEqualRuns);
            }
            prev = Some(sym);
        }
        Ok(())
    }
}
