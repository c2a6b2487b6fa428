//! Run-length encoded BWT index construction and merge core.
//!
//! Module layout mirrors the data flow of spec.md §2: raw symbols flow
//! through [`suffix`] and [`encoder`] to produce an [`index::RlBwt`];
//! appending a new batch flows through [`gap`] and [`merge`], glued
//! together by [`driver`].

pub mod alphabet;
pub mod driver;
pub mod encoder;
pub mod error;
pub mod gap;
pub mod index;
pub mod merge;
pub mod suffix;
#[cfg(feature = "visualize")]
pub mod visualize;

pub use alphabet::{
    dna_ascii_from_symbol, symbol_from_dna_ascii, Symbol, DEFAULT_ASIZE, DEFAULT_SBITS,
    MAX_ALPHABET_SIZE, SENTINEL,
};
pub use driver::{build, BuildConfig, GapBackend};
pub use encoder::BwtEncoder;
pub use error::{BuildError, RlBwtError, SuffixError};
pub use gap::{compute_gap_dense, compute_gap_sparse, GapArray, GapHash, GAP_MAX};
pub use index::{RlBwt, RunDecoderCursor, RunEncoderCursor};
pub use merge::{merge_dense, merge_sparse};
pub use suffix::{BwtBuilder, NaiveSuffixArrayBuilder};
#[cfg(feature = "visualize")]
pub use visualize::{GapArraySummary, GapHashSummary, RlBwtSummary};
