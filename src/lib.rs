//! # rlbwt-merge
//!
//! Run-length encoded Burrows-Wheeler Transform (RL-BWT) index
//! construction and merge core for DNA-like alphabets.
//!
//! Given a concatenation of sentinel-terminated strings over a small
//! alphabet, [`bwt::build`] produces a run-length-encoded BWT index
//! with rank support; [`bwt::build`] with an existing index appends a
//! new batch by computing a gap array (back-tracing LF-mapping over
//! the new batch while rank-querying the old index) and streaming the
//! two indexes' runs together, without re-sorting either one from
//! scratch.
//!
//! ## Usage Example
//!
//! ```
//! use rlbwt_merge::bwt::{build, BuildConfig, NaiveSuffixArrayBuilder};
//!
//! let mut batch1 = vec![1u8, 2, 0]; // "AC$"
//! let cfg = BuildConfig { asize: 5, sbits: 3, ..Default::default() };
//! let e0 = build(None, &NaiveSuffixArrayBuilder, &mut batch1, &cfg).unwrap();
//!
//! let mut batch2 = vec![3u8, 4, 0]; // "GT$"
//! let e01 = build(Some(&e0), &NaiveSuffixArrayBuilder, &mut batch2, &cfg).unwrap();
//! assert_eq!(e01.mcnt(0), 6);
//! assert_eq!(e01.mcnt(1), 2); // two sentinels
//! ```

#![warn(missing_debug_implementations)]

pub mod bwt;
pub mod logging;
