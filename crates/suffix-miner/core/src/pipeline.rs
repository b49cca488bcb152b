//! Record pipeline: construction, verification and mining per input row.
//!
//! Each record only touches its own envelope, so records are fanned out over
//! a bounded rayon pool. `par_iter().map().collect()` keeps results in input
//! order, which gives the single writer downstream its ordering for free.

use crate::{
    csv_io::SourceRow,
    error::{
        MiningError,
        MiningTimeout,
        PipelineError,
        RecordError,
    },
    miner::{
        MinedSuffixes,
        MinerConfig,
        SuffixMiner,
    },
    verifier::{
        Verification,
        verify,
    },
};
use rayon::prelude::{
    IntoParallelRefIterator,
    ParallelIterator,
};
use serde::Serialize;
use std::time::{
    Duration,
    Instant,
};
use tracing::{
    error,
    info,
    warn,
};

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Worker threads. `0` lets rayon pick one per core.
    pub threads: usize,
    pub miner: MinerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus {
    /// All 16 nibbles found.
    Complete(MinedSuffixes),
    /// The search bound was hit; the partial map is kept.
    TimedOut(MiningTimeout),
    /// The batch was cancelled while this record was being mined.
    Cancelled(MinedSuffixes),
    /// The record never reached the miner.
    Failed(RecordError),
}

impl RecordStatus {
    /// Whatever the miner produced, complete or not.
    pub fn mined(&self) -> Option<&MinedSuffixes> {
        match self {
            Self::Complete(mined) | Self::Cancelled(mined) => Some(mined),
            Self::TimedOut(timeout) => Some(&timeout.partial),
            Self::Failed(_) => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}

/// Result of processing one input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordReport {
    pub row: usize,
    pub original_hash: String,
    /// `None` when the record failed before it could be hashed.
    pub verification: Option<Verification>,
    pub status: RecordStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub records: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub complete: usize,
    pub incomplete: usize,
    pub failed: usize,
    pub elapsed_micros: u128,
}

impl BatchSummary {
    fn from_reports(reports: &[RecordReport], elapsed: Duration) -> Self {
        let mut summary = Self {
            records: reports.len(),
            elapsed_micros: elapsed.as_micros(),
            ..Default::default()
        };
        for report in reports {
            match report.verification {
                Some(verification) if verification.is_match() => summary.matched += 1,
                Some(_) => summary.mismatched += 1,
                None => {}
            }
            match report.status {
                RecordStatus::Complete(_) => summary.complete += 1,
                RecordStatus::TimedOut(_) | RecordStatus::Cancelled(_) => summary.incomplete += 1,
                RecordStatus::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    /// One report per input row, in input order.
    pub reports: Vec<RecordReport>,
    pub summary: BatchSummary,
}

/// Run one row through verification and mining. Never panics on bad data;
/// every failure ends up in the returned status.
pub fn process_record(source: &SourceRow, miner: &SuffixMiner) -> RecordReport {
    let row = source.row;
    let report = |verification, status| RecordReport {
        row,
        original_hash: source.original_hash.clone(),
        verification,
        status,
    };

    let record = match &source.record {
        Ok(record) => record,
        Err(err) => {
            error!(target: "suffix_miner::pipeline", row, error = %err, "skipping malformed row");
            return report(None, RecordStatus::Failed(err.clone().into()));
        }
    };

    let mut envelope = record.envelope();

    let verification = match verify(&envelope, record.hash) {
        Ok(verification) => verification,
        Err(err) => {
            error!(target: "suffix_miner::pipeline", row, error = %err, "failed to encode record");
            return report(None, RecordStatus::Failed(err.into()));
        }
    };
    match verification.ensure_match() {
        Ok(()) => info!(
            target: "suffix_miner::pipeline",
            row,
            hash = %verification.computed,
            "hash verified"
        ),
        Err(mismatch) => warn!(
            target: "suffix_miner::pipeline",
            row,
            expected = %mismatch.expected,
            computed = %mismatch.computed,
            "hash mismatch"
        ),
    }

    let start = envelope.gas_tip_cap;
    let status = match miner.mine(&mut envelope, start) {
        Ok(mined) => {
            info!(
                target: "suffix_miner::pipeline",
                row,
                iterations = mined.iterations,
                time_us = mined.elapsed.as_micros(),
                "all 16 suffixes found"
            );
            RecordStatus::Complete(mined)
        }
        Err(MiningError::Timeout(timeout)) => {
            warn!(target: "suffix_miner::pipeline", row, error = %timeout, "suffix search incomplete");
            RecordStatus::TimedOut(timeout)
        }
        Err(MiningError::Cancelled(partial)) => {
            warn!(
                target: "suffix_miner::pipeline",
                row,
                iterations = partial.iterations,
                found = partial.nibbles.len(),
                "suffix search cancelled"
            );
            RecordStatus::Cancelled(partial)
        }
        Err(MiningError::Encoding(err)) => {
            error!(target: "suffix_miner::pipeline", row, error = %err, "failed to encode record");
            RecordStatus::Failed(err.into())
        }
    };

    report(Some(verification), status)
}

/// Process `rows` on a pool of `config.threads` workers. The returned reports
/// line up with `rows` index for index.
pub fn process_batch(
    rows: &[SourceRow],
    config: &PipelineConfig,
) -> Result<BatchReport, PipelineError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .thread_name(|i| format!("suffix-miner-{i}"))
        .build()?;
    let miner = SuffixMiner::new(config.miner.clone());

    info!(
        target: "suffix_miner::pipeline",
        records = rows.len(),
        threads = pool.current_num_threads(),
        "processing batch"
    );

    let started = Instant::now();
    let reports: Vec<RecordReport> = pool.install(|| {
        rows.par_iter()
            .map(|row| process_record(row, &miner))
            .collect()
    });
    let summary = BatchSummary::from_reports(&reports, started.elapsed());

    info!(
        target: "suffix_miner::pipeline",
        records = summary.records,
        matched = summary.matched,
        mismatched = summary.mismatched,
        complete = summary.complete,
        incomplete = summary.incomplete,
        failed = summary.failed,
        elapsed_us = summary.elapsed_micros,
        "batch done"
    );

    Ok(BatchReport { reports, summary })
}
