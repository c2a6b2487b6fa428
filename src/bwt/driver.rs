//! Top-level build/append glue: dispatch between a fresh build and an
//! append-by-merge, and pick a gap backend.
//!
//! Grounded on `original_source/build.c`'s `fm_build` (dispatch) and
//! the teacher's `SimulationConfig`-style "plain config struct with a
//! `Default` impl" pattern in `lib.rs`.

use tracing::info;

use crate::bwt::alphabet::{Symbol, DEFAULT_ASIZE, DEFAULT_SBITS};
use crate::bwt::encoder::BwtEncoder;
use crate::bwt::error::BuildError;
use crate::bwt::gap::{compute_gap_dense, compute_gap_sparse};
use crate::bwt::index::RlBwt;
use crate::bwt::merge::{merge_dense, merge_sparse};
use crate::bwt::suffix::{BwtBuilder, NaiveSuffixArrayBuilder};
use crate::logging::Verbosity;

/// Default memory budget, in bytes, for [`GapBackend::Auto`]'s
/// dense-vs-sparse decision.
pub const DEFAULT_DENSE_MEMORY_BUDGET_BYTES: u64 = 256 * 1024 * 1024;

/// Which gap-array backend to use when appending to an existing index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapBackend {
    #[default]
    Dense,
    Sparse,
    /// Sparse when `4 * e0.mcnt[0]` would exceed the configured memory
    /// budget, dense otherwise.
    Auto,
}

/// Configuration shared by a fresh build and an append-merge.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub asize: u8,
    pub sbits: u8,
    pub gap_backend: GapBackend,
    pub dense_memory_budget_bytes: u64,
    pub verbosity: Verbosity,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            asize: DEFAULT_ASIZE,
            sbits: DEFAULT_SBITS,
            gap_backend: GapBackend::Dense,
            dense_memory_budget_bytes: DEFAULT_DENSE_MEMORY_BUDGET_BYTES,
            verbosity: Verbosity::Silent,
        }
    }
}

impl BuildConfig {
    fn resolved_backend(&self, n0: u64) -> GapBackend {
        match self.gap_backend {
            GapBackend::Auto => {
                if 4 * n0 > self.dense_memory_budget_bytes {
                    GapBackend::Sparse
                } else {
                    GapBackend::Dense
                }
            }
            other => other,
        }
    }
}

/// Build a fresh index from a raw symbol buffer, invoking `builder` to
/// compute the BWT in place before run-length encoding it. `symbols`
/// must already be `cfg.asize`-bounded and sentinel-terminated per
/// string.
pub fn build_fresh(
    builder: &dyn BwtBuilder,
    symbols: &mut [Symbol],
    cfg: &BuildConfig,
) -> Result<RlBwt, BuildError> {
    let l = symbols.len() as u64;
    if l == 0 {
        return Ok(RlBwt::empty(cfg.asize, cfg.sbits)?);
    }
    builder.build_bwt_in_place(symbols)?;
    let e = BwtEncoder::encode(cfg.asize, cfg.sbits, symbols)?;
    if e.mcnt(0) != l {
        return Err(BuildError::CountMismatch {
            expected: l,
            actual: e.mcnt(0),
        });
    }
    Ok(e)
}

/// Append a new batch of raw symbols to an existing index by building
/// a temporary index over the batch and merging it in.
pub fn append(
    e0: &RlBwt,
    builder: &dyn BwtBuilder,
    symbols: &mut [Symbol],
    cfg: &BuildConfig,
) -> Result<RlBwt, BuildError> {
    let l = symbols.len() as u64;
    if l == 0 {
        return Ok(e0.clone());
    }
    if e0.asize() != cfg.asize || e0.sbits() != cfg.sbits {
        return Err(BuildError::RlBwt(crate::bwt::error::RlBwtError::StructuralMismatch));
    }

    builder.build_bwt_in_place(symbols)?;
    let e1 = BwtEncoder::encode(cfg.asize, cfg.sbits, symbols)?;

    let backend = cfg.resolved_backend(e0.mcnt(0));
    if cfg.verbosity >= Verbosity::Progress {
        info!(?backend, n0 = e0.mcnt(0), n1 = e1.mcnt(0), "appending batch");
    }

    let merged = match backend {
        GapBackend::Dense => {
            let gap = compute_gap_dense(e0, &e1, cfg.verbosity)?;
            merge_dense(e0, &e1, &gap, cfg.verbosity)?
        }
        GapBackend::Sparse => {
            let gap = compute_gap_sparse(e0, &e1, cfg.verbosity)?;
            merge_sparse(e0, &e1, &gap, cfg.verbosity)?
        }
        GapBackend::Auto => unreachable!("resolved_backend never returns Auto"),
    };

    let expected = e0.mcnt(0) + l;
    if merged.mcnt(0) != expected {
        return Err(BuildError::CountMismatch {
            expected,
            actual: merged.mcnt(0),
        });
    }
    Ok(merged)
}

/// `build(E0?, ...)` of spec.md §4.5: fresh build when `existing` is
/// absent, append-by-merge otherwise.
pub fn build(
    existing: Option<&RlBwt>,
    builder: &dyn BwtBuilder,
    symbols: &mut [Symbol],
    cfg: &BuildConfig,
) -> Result<RlBwt, BuildError> {
    match existing {
        None => build_fresh(builder, symbols, cfg),
        Some(e0) => append(e0, builder, symbols, cfg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_build_of_empty_input_yields_empty_index() {
        let cfg = BuildConfig {
            asize: 4,
            sbits: 3,
            ..Default::default()
        };
        let e = build_fresh(&NaiveSuffixArrayBuilder, &mut [], &cfg).unwrap();
        assert!(e.is_empty());
    }

    #[test]
    fn fresh_build_length_matches_input_length() {
        let cfg = BuildConfig {
            asize: 5,
            sbits: 3,
            ..Default::default()
        };
        let mut s = vec![1u8, 2, 3, 4, 0];
        let e = build_fresh(&NaiveSuffixArrayBuilder, &mut s, &cfg).unwrap();
        assert_eq!(e.mcnt(0), 5);
    }

    #[test]
    fn append_with_empty_batch_returns_e0_unchanged() {
        let cfg = BuildConfig {
            asize: 5,
            sbits: 3,
            ..Default::default()
        };
        let mut s = vec![1u8, 2, 3, 4, 0];
        let e0 = build_fresh(&NaiveSuffixArrayBuilder, &mut s, &cfg).unwrap();
        let merged = append(&e0, &NaiveSuffixArrayBuilder, &mut [], &cfg).unwrap();
        assert_eq!(merged.mcnt(0), e0.mcnt(0));
    }

    #[test]
    fn build_then_append_conserves_total_length() {
        let cfg = BuildConfig {
            asize: 5,
            sbits: 3,
            ..Default::default()
        };
        let mut s1 = vec![1u8, 2, 0];
        let e0 = build_fresh(&NaiveSuffixArrayBuilder, &mut s1, &cfg).unwrap();
        let mut s2 = vec![3u8, 4, 0];
        let merged = append(&e0, &NaiveSuffixArrayBuilder, &mut s2, &cfg).unwrap();
        assert_eq!(merged.mcnt(0), 6);
    }

    #[test]
    fn sparse_and_dense_append_produce_identical_indexes() {
        let mut s1 = vec![1u8, 2, 3, 0, 2, 1, 0];
        let mut s2 = vec![3u8, 1, 0, 1, 1, 2, 0, 3, 0];

        let cfg_dense = BuildConfig {
            asize: 4,
            sbits: 3,
            gap_backend: GapBackend::Dense,
            ..Default::default()
        };
        let e0 = build_fresh(&NaiveSuffixArrayBuilder, &mut s1.clone(), &cfg_dense).unwrap();
        let dense = append(&e0, &NaiveSuffixArrayBuilder, &mut s2.clone(), &cfg_dense).unwrap();

        let cfg_sparse = BuildConfig {
            gap_backend: GapBackend::Sparse,
            ..cfg_dense
        };
        let sparse = append(&e0, &NaiveSuffixArrayBuilder, &mut s2, &cfg_sparse).unwrap();

        assert_eq!(dense.mcnt(0), sparse.mcnt(0));
        for c in 0..=4usize {
            assert_eq!(dense.mcnt(c), sparse.mcnt(c));
        }
        let _ = s1;
    }

    #[test]
    fn auto_backend_picks_sparse_under_a_tiny_memory_budget() {
        let cfg = BuildConfig {
            asize: 4,
            sbits: 3,
            gap_backend: GapBackend::Auto,
            dense_memory_budget_bytes: 1,
            ..Default::default()
        };
        assert_eq!(cfg.resolved_backend(1_000), GapBackend::Sparse);
    }

    #[test]
    fn auto_backend_picks_dense_under_a_generous_memory_budget() {
        let cfg = BuildConfig {
            gap_backend: GapBackend::Auto,
            ..Default::default()
        };
        assert_eq!(cfg.resolved_backend(1_000), GapBackend::Dense);
    }
}
