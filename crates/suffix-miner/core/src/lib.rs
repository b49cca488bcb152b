//! Canonical hashing and suffix mining for type `0x03` blob transactions.
//!
//! - [`encoding`] serializes an [`envelope::BlobTxEnvelope`] into its tagged
//!   canonical bytes
//! - [`hash`] derives the transaction and signing hashes
//! - [`verifier`] checks a recomputed hash against a reference
//! - [`miner`] searches the tip field for all 16 final-byte low nibbles
//! - [`pipeline`] runs input rows through the above on a worker pool
//! - [`csv_io`] reads input rows and writes result rows

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod csv_io;
pub mod encoding;
pub mod envelope;
pub mod error;
pub mod hash;
pub mod miner;
pub mod pipeline;
pub mod record;
pub mod source;
pub mod verifier;

#[cfg(any(test, feature = "test"))]
pub mod test_utils;

pub use envelope::{
    AccessListItem,
    BlobTxEnvelope,
    EncodingForm,
};
pub use error::{
    EncodingError,
    MiningError,
    MiningTimeout,
    ParseError,
    RecordError,
    SourceError,
    VerificationMismatch,
};
pub use hash::{
    canonical_hash,
    signing_hash,
};
pub use miner::{
    MinerConfig,
    SearchBound,
    SuffixMiner,
};
pub use pipeline::{
    PipelineConfig,
    process_batch,
};
pub use record::InputRecord;
pub use verifier::{
    Verification,
    verify,
};
