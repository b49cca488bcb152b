//! Command-line configuration for the suffix miner.
//!
//! Every flag can also come from a `SUFFIX_MINER_*` env var so batch runs can
//! be configured from deployment manifests without shell args.

use alloy::primitives::B256;
use clap::Parser;
use std::{
    path::PathBuf,
    time::Duration,
};
use suffix_miner_core::SearchBound;

#[derive(Parser)]
#[command(
    name = "suffix-miner",
    version,
    about = "Verify blob transaction hashes and mine tip values for every final-byte nibble"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
    #[command(flatten)]
    pub args: CliArgs,
}

/// Flags shared by every subcommand.
#[derive(Debug, Parser, Clone, Default)]
pub struct CliArgs {
    /// Print results and errors as JSON.
    #[clap(short, long, global = true)]
    pub json: bool,
}

impl CliArgs {
    pub fn json_output(&self) -> bool {
        self.json
    }
}

#[derive(clap::Subcommand)]
pub enum Commands {
    #[command(name = "mine", about = "Verify and mine every row of an input CSV")]
    Mine(MineArgs),
    #[command(name = "fetch", about = "Fetch a blob transaction from a node and recompute its hashes")]
    Fetch(FetchArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct MineArgs {
    /// Input CSV with one transaction per row.
    #[arg(short, long, env = "SUFFIX_MINER_INPUT", default_value = "tx_data.csv")]
    pub input: PathBuf,

    /// Where to write the result CSV.
    #[arg(
        short,
        long,
        env = "SUFFIX_MINER_OUTPUT",
        default_value = "suffix_mining_results.csv"
    )]
    pub output: PathBuf,

    /// Worker threads. 0 uses one per core.
    #[arg(long, env = "SUFFIX_MINER_THREADS", default_value = "0")]
    pub threads: usize,

    /// Candidates tried per record before giving up. 0 removes the limit.
    #[arg(long, env = "SUFFIX_MINER_MAX_ITERATIONS", default_value = "1048576")]
    pub max_iterations: u64,

    /// Wall-clock limit per record, in milliseconds.
    #[arg(long, env = "SUFFIX_MINER_MAX_DURATION_MS")]
    pub max_duration_ms: Option<u64>,
}

impl MineArgs {
    pub fn search_bound(&self) -> SearchBound {
        let mut bound = if self.max_iterations == 0 {
            SearchBound::unbounded()
        } else {
            SearchBound::iterations(self.max_iterations)
        };
        if let Some(ms) = self.max_duration_ms {
            bound = bound.with_max_duration(Duration::from_millis(ms));
        }
        bound
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct FetchArgs {
    /// JSON-RPC endpoint of an execution node.
    #[arg(long, env = "SUFFIX_MINER_RPC_URL")]
    pub rpc_url: String,

    /// Hash of the blob transaction to fetch.
    pub tx_hash: B256,

    /// Append the transaction as a row to this input CSV.
    #[arg(long)]
    pub append_to: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn mine_defaults() {
        let cli = Cli::try_parse_from(["suffix-miner", "mine"]).unwrap();
        assert!(!cli.args.json_output());
        match cli.command {
            Commands::Mine(args) => {
                assert_eq!(args.input, PathBuf::from("tx_data.csv"));
                assert_eq!(args.output, PathBuf::from("suffix_mining_results.csv"));
                assert_eq!(args.threads, 0);
                assert_eq!(args.search_bound(), SearchBound::iterations(1_048_576));
            }
            Commands::Fetch(_) => panic!("expected mine command"),
        }
    }

    #[test]
    fn mine_with_bounds_and_json() {
        let cli = Cli::try_parse_from([
            "suffix-miner",
            "mine",
            "--json",
            "-i",
            "in.csv",
            "--threads",
            "8",
            "--max-iterations",
            "0",
            "--max-duration-ms",
            "250",
        ])
        .unwrap();

        assert!(cli.args.json_output());
        match cli.command {
            Commands::Mine(args) => {
                assert_eq!(args.input, PathBuf::from("in.csv"));
                assert_eq!(args.threads, 8);
                assert_eq!(
                    args.search_bound(),
                    SearchBound::unbounded().with_max_duration(Duration::from_millis(250))
                );
            }
            Commands::Fetch(_) => panic!("expected mine command"),
        }
    }

    #[test]
    fn fetch_parses_hash_and_append_path() {
        let hash = B256::repeat_byte(0x5d);
        let cli = Cli::try_parse_from([
            "suffix-miner",
            "fetch",
            "--rpc-url",
            "http://localhost:8545",
            &hash.to_string(),
            "--append-to",
            "tx_data.csv",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.tx_hash, hash);
                assert_eq!(args.rpc_url, "http://localhost:8545");
                assert_eq!(args.append_to, Some(PathBuf::from("tx_data.csv")));
            }
            Commands::Mine(_) => panic!("expected fetch command"),
        }
    }

    #[test]
    fn fetch_rejects_malformed_hash() {
        assert!(
            Cli::try_parse_from(["suffix-miner", "fetch", "--rpc-url", "http://x", "0x1234"])
                .is_err()
        );
    }
}
