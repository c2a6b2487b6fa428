use thiserror::Error;

/// Errors raised by the run-length BWT codec itself.
#[derive(Debug, Error)]
pub enum RlBwtError {
    #[error("alphabet size {0} is outside the supported range 1..={}", crate::bwt::alphabet::MAX_ALPHABET_SIZE)]
    InvalidAlphabetSize(u8),

    #[error("sbits {0} must be at least 1 and small enough to avoid overflowing the inline field")]
    InvalidSbits(u8),

    #[error("encoder was already finalized by enc_finish")]
    AlreadyFinalized,

    #[error("rank/select queried before enc_finish finalized the index")]
    NotFinalized,

    #[error("the two indexes being merged have different asize/sbits")]
    StructuralMismatch,

    #[error("an index involved in a merge has no sentinel run")]
    MissingSentinel,

    #[error("decoder ran out of runs before the requested count was consumed")]
    PrematureEof,

    #[error("merge left a pending run unflushed in E0 or E1")]
    PendingSymbolsAfterMerge,

    #[error("symbol occurrence counts do not sum to the total length: expected {expected}, got {actual}")]
    CountMismatch { expected: u64, actual: u64 },

    #[error("two adjacent runs share the same symbol; the encoder failed to coalesce them")]
    AdjacentEqualRuns,
}

/// Errors raised while constructing a fresh suffix array / BWT.
#[derive(Debug, Error)]
pub enum SuffixError {
    #[error("cannot build a suffix array over an empty buffer")]
    EmptyInput,
}

/// Errors raised by the top-level build/append driver.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("suffix array construction failed: {0}")]
    Suffix(#[from] SuffixError),

    #[error(transparent)]
    RlBwt(#[from] RlBwtError),

    #[error("post-build length mismatch: expected {expected}, got {actual}")]
    CountMismatch { expected: u64, actual: u64 },
}
