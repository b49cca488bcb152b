use crate::cli::{
    CliArgs,
    MineArgs,
};
use anyhow::{
    Context,
    Result,
};
use suffix_miner_core::{
    MinerConfig,
    PipelineConfig,
    csv_io::{
        RecordReader,
        ResultWriter,
    },
    pipeline::{
        BatchSummary,
        RecordStatus,
    },
    process_batch,
};
use tokio_util::sync::CancellationToken;
use tracing::{
    info,
    warn,
};

impl MineArgs {
    /// Read the input CSV, verify and mine every row, and write one result
    /// row per input row.
    pub async fn run(&self, args: &CliArgs, cancel: CancellationToken) -> Result<BatchSummary> {
        let rows = RecordReader::from_path(&self.input)
            .and_then(|mut reader| reader.read_all())
            .with_context(|| format!("failed to read {}", self.input.display()))?;

        info!(input = %self.input.display(), records = rows.len(), "loaded input");

        let config = PipelineConfig {
            threads: self.threads,
            miner: MinerConfig::new(self.search_bound()).with_cancellation(cancel.clone()),
        };
        let batch = tokio::task::spawn_blocking(move || process_batch(&rows, &config))
            .await
            .context("mining task panicked")??;

        let mut writer = ResultWriter::create(&self.output)
            .with_context(|| format!("failed to create {}", self.output.display()))?;
        for report in &batch.reports {
            writer.write_report(report)?;
        }
        writer.flush()?;

        if cancel.is_cancelled() {
            warn!(
                cancelled = batch
                    .reports
                    .iter()
                    .filter(|r| matches!(r.status, RecordStatus::Cancelled(_)))
                    .count(),
                "run interrupted, partial results written"
            );
        }

        print_summary(&batch.summary, self, args)?;
        Ok(batch.summary)
    }
}

fn print_summary(summary: &BatchSummary, mine: &MineArgs, args: &CliArgs) -> Result<()> {
    if args.json_output() {
        println!("{}", serde_json::to_string(summary)?);
        return Ok(());
    }

    println!(
        "Processed {} records in {} us",
        summary.records, summary.elapsed_micros
    );
    println!(
        "  hashes: {} matched, {} mismatched",
        summary.matched, summary.mismatched
    );
    println!(
        "  mining: {} complete, {} incomplete, {} failed",
        summary.complete, summary.incomplete, summary.failed
    );
    println!("Results written to {}", mine.output.display());
    Ok(())
}
