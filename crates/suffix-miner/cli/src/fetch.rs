use crate::{
    cli::{
        CliArgs,
        FetchArgs,
    },
    json_rpc_client::Client,
};
use alloy::primitives::{
    B256,
    U256,
};
use anyhow::{
    Context,
    Result,
    anyhow,
};
use serde::Serialize;
use suffix_miner_core::{
    BlobTxEnvelope,
    csv_io::append_input_record,
    signing_hash,
    source::{
        FetchedTransaction,
        TransactionSource,
    },
    verify,
};
use tracing::{
    info,
    warn,
};

/// What `fetch` reports about a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchReport {
    pub hash: B256,
    pub computed_hash: B256,
    pub signing_hash: B256,
    pub hash_matches: bool,
    #[serde(flatten)]
    pub envelope: EnvelopeView,
    /// Set when the transaction was appended to an input CSV.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appended_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeView {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_tip_cap: U256,
    pub gas_fee_cap: U256,
    pub gas_limit: u64,
    pub to: String,
    pub value: U256,
    pub data: String,
    pub access_list_len: usize,
    pub blob_fee_cap: U256,
    pub blob_versioned_hashes: Vec<B256>,
    pub v: U256,
    pub r: U256,
    pub s: U256,
}

impl From<&BlobTxEnvelope> for EnvelopeView {
    fn from(env: &BlobTxEnvelope) -> Self {
        Self {
            chain_id: env.chain_id,
            nonce: env.nonce,
            gas_tip_cap: env.gas_tip_cap,
            gas_fee_cap: env.gas_fee_cap,
            gas_limit: env.gas_limit,
            to: env.to.to_string(),
            value: env.value,
            data: env.data.to_string(),
            access_list_len: env.access_list.len(),
            blob_fee_cap: env.blob_fee_cap,
            blob_versioned_hashes: env.blob_versioned_hashes.clone(),
            v: env.v,
            r: env.r,
            s: env.s,
        }
    }
}

impl FetchArgs {
    pub async fn run(&self, args: &CliArgs) -> Result<FetchReport> {
        let client = Client::try_new_with_rpc_url(&self.rpc_url)
            .await
            .with_context(|| format!("failed to connect to {}", self.rpc_url))?;
        let report = self.run_with_source(&client).await?;
        print_report(&report, args)?;
        Ok(report)
    }

    pub async fn run_with_source<S: TransactionSource>(&self, source: &S) -> Result<FetchReport> {
        let fetched = source
            .fetch(self.tx_hash)
            .await
            .with_context(|| format!("failed to fetch {}", self.tx_hash))?
            .ok_or_else(|| anyhow!("transaction {} not found", self.tx_hash))?;

        let mut report = describe(&fetched)?;
        if !report.hash_matches {
            warn!(
                reported = %report.hash,
                computed = %report.computed_hash,
                "recomputed hash differs from the node's"
            );
        }

        if let Some(path) = &self.append_to {
            let record = fetched.to_input_record().ok_or_else(|| {
                anyhow!(
                    "transaction {} sets fields an input row cannot hold \
                     (chain id, value, gas limit, data or access list)",
                    fetched.hash
                )
            })?;
            append_input_record(path, &record)
                .with_context(|| format!("failed to append to {}", path.display()))?;
            info!(path = %path.display(), hash = %fetched.hash, "appended transaction");
            report.appended_to = Some(path.display().to_string());
        }

        Ok(report)
    }
}

fn describe(fetched: &FetchedTransaction) -> Result<FetchReport> {
    let env = &fetched.envelope;
    let verification = verify(env, fetched.hash)?;

    Ok(FetchReport {
        hash: fetched.hash,
        computed_hash: verification.computed,
        signing_hash: signing_hash(env)?,
        hash_matches: verification.is_match(),
        envelope: env.into(),
        appended_to: None,
    })
}

fn print_report(report: &FetchReport, args: &CliArgs) -> Result<()> {
    if args.json_output() {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let env = &report.envelope;
    println!("Transaction hash:    {}", report.hash);
    println!("ChainID:             {}", env.chain_id);
    println!("Nonce:               {}", env.nonce);
    println!("GasTipCap:           {}", env.gas_tip_cap);
    println!("GasFeeCap:           {}", env.gas_fee_cap);
    println!("Gas:                 {}", env.gas_limit);
    println!("To:                  {}", env.to);
    println!("Value:               {}", env.value);
    println!("Data:                {}", env.data);
    println!("AccessList entries:  {}", env.access_list_len);
    println!("BlobGasFeeCap:       {}", env.blob_fee_cap);
    println!("BlobVersionedHashes:");
    for hash in &env.blob_versioned_hashes {
        println!("  {hash}");
    }
    println!("v:                   {}", env.v);
    println!("r:                   {}", env.r);
    println!("s:                   {}", env.s);
    println!("SigHash:             {}", report.signing_hash);
    println!(
        "Computed hash:       {} ({})",
        report.computed_hash,
        if report.hash_matches { "match" } else { "MISMATCH" }
    );
    if let Some(path) = &report.appended_to {
        println!("Appended to {path}");
    }
    Ok(())
}
