use crate::miner::MinedSuffixes;
use alloy_primitives::B256;
use std::fmt;
use thiserror::Error;

/// A field of an input row could not be turned into its typed value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row}: invalid `{field}` value {value:?}: {reason}")]
pub struct ParseError {
    pub row: usize,
    pub field: &'static str,
    pub value: String,
    pub reason: String,
}

/// A field value broke the contract of its declared kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("field `{field}` does not fit in {bits} bits")]
    ValueTooWide { field: &'static str, bits: usize },
    #[error("field `{field}` must be {expected} bytes, got {actual}")]
    WidthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("hash mismatch: expected {expected}, computed {computed}")]
pub struct VerificationMismatch {
    pub expected: B256,
    pub computed: B256,
}

/// Which ceiling stopped a suffix search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    Iterations(u64),
    Duration(std::time::Duration),
    /// The mined field reached its maximum value.
    CandidateSpace,
}

impl fmt::Display for SearchLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iterations(max) => write!(f, "iteration limit of {max}"),
            Self::Duration(max) => write!(f, "time limit of {max:?}"),
            Self::CandidateSpace => f.write_str("end of the candidate space"),
        }
    }
}

/// The search hit its bound before all 16 nibbles were found.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "suffix search stopped by {limit} after {} candidates with {}/16 nibbles found",
    .partial.iterations,
    .partial.nibbles.len()
)]
pub struct MiningTimeout {
    pub limit: SearchLimit,
    pub partial: MinedSuffixes,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MiningError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Timeout(#[from] MiningTimeout),
    #[error("suffix search cancelled after {} candidates", .0.iterations)]
    Cancelled(MinedSuffixes),
}

/// Failure that ends processing of a single record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("encoding failed: {0}")]
    Encoding(#[from] EncodingError),
}

/// Failure at the input/output boundary. These halt the run.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("input is missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
