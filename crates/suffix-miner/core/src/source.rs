//! Interface to whatever supplies full transactions by hash (usually a node).

use crate::{
    envelope::BlobTxEnvelope,
    record::InputRecord,
};
use alloy_primitives::B256;
use std::future::Future;

/// A blob transaction as reported by a source: the hash it claims plus the
/// fields needed to recompute it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedTransaction {
    pub hash: B256,
    pub envelope: BlobTxEnvelope,
}

impl FetchedTransaction {
    /// Project onto an input row. `None` if the envelope sets fields a row
    /// cannot express: chain id, value, gas limit, data or access list.
    pub fn to_input_record(&self) -> Option<InputRecord> {
        let record = InputRecord {
            hash: self.hash,
            nonce: self.envelope.nonce,
            to: self.envelope.to,
            gas_fee_cap: self.envelope.gas_fee_cap,
            blob_fee_cap: self.envelope.blob_fee_cap,
            gas_tip_cap: self.envelope.gas_tip_cap,
            v: self.envelope.v,
            r: self.envelope.r,
            s: self.envelope.s,
            blob_versioned_hashes: self.envelope.blob_versioned_hashes.clone(),
        };
        (record.envelope() == self.envelope).then_some(record)
    }
}

pub trait TransactionSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Look up `hash`. `Ok(None)` means the source does not know it.
    fn fetch(
        &self,
        hash: B256,
    ) -> impl Future<Output = Result<Option<FetchedTransaction>, Self::Error>> + Send;
}
