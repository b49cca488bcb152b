use alloy::{
    consensus::TxEnvelope,
    primitives::{
        B256,
        U256,
    },
    providers::{
        Provider,
        ProviderBuilder,
        RootProvider,
    },
    transports::TransportError,
};
use anyhow::Result;
use suffix_miner_core::{
    AccessListItem,
    BlobTxEnvelope,
    source::{
        FetchedTransaction,
        TransactionSource,
    },
};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("rpc request failed: {0}")]
    Rpc(#[from] TransportError),
    #[error("transaction {hash} has type {tx_type}, expected a blob transaction")]
    NotBlobTransaction { hash: B256, tx_type: u8 },
}

pub struct Client {
    provider: RootProvider,
}

impl Client {
    pub async fn try_new_with_rpc_url(rpc_url: &str) -> Result<Self> {
        let provider = ProviderBuilder::new().connect(rpc_url).await?;

        Ok(Self {
            provider: provider.root().clone(),
        })
    }
}

impl TransactionSource for Client {
    type Error = FetchError;

    async fn fetch(&self, hash: B256) -> Result<Option<FetchedTransaction>, FetchError> {
        let Some(tx) = self.provider.get_transaction_by_hash(hash).await? else {
            return Ok(None);
        };

        blob_transaction(hash, tx.inner.into_inner()).map(Some)
    }
}

/// Convert a node's transaction into the fields that make up its hash.
/// `hash` is the hash the transaction was looked up by.
fn blob_transaction(hash: B256, envelope: TxEnvelope) -> Result<FetchedTransaction, FetchError> {
    let signed = match envelope {
        TxEnvelope::Eip4844(signed) => signed,
        other => {
            return Err(FetchError::NotBlobTransaction {
                hash,
                tx_type: other.tx_type() as u8,
            });
        }
    };

    let signature = signed.signature();
    let tx = signed.tx().tx();
    let envelope = BlobTxEnvelope {
        chain_id: tx.chain_id,
        nonce: tx.nonce,
        gas_tip_cap: U256::from(tx.max_priority_fee_per_gas),
        gas_fee_cap: U256::from(tx.max_fee_per_gas),
        gas_limit: tx.gas_limit,
        to: tx.to,
        value: tx.value,
        data: tx.input.clone(),
        access_list: tx
            .access_list
            .0
            .iter()
            .map(|item| AccessListItem {
                address: item.address,
                storage_keys: item.storage_keys.clone(),
            })
            .collect(),
        blob_fee_cap: U256::from(tx.max_fee_per_blob_gas),
        blob_versioned_hashes: tx.blob_versioned_hashes.clone(),
        v: U256::from(u8::from(signature.v())),
        r: signature.r(),
        s: signature.s(),
    };

    Ok(FetchedTransaction { hash, envelope })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{
        consensus::{
            SignableTransaction,
            TxEip1559,
            TxEip4844,
            TxEip4844Variant,
        },
        eips::eip2930::{
            AccessList,
            AccessListItem as AlloyAccessListItem,
        },
        primitives::{
            Address,
            Bytes,
            Signature,
            TxKind,
        },
    };
    use suffix_miner_core::{
        canonical_hash,
        test_utils::{
            REFERENCE_BLOB_HASH,
            REFERENCE_HASH,
            REFERENCE_R,
            REFERENCE_S,
            reference_envelope,
        },
    };

    fn reference_signature() -> Signature {
        Signature::new(REFERENCE_R, REFERENCE_S, true)
    }

    fn reference_tx() -> TxEip4844 {
        TxEip4844 {
            chain_id: 1,
            nonce: 0,
            gas_limit: 21_000,
            max_fee_per_gas: 30_000_000_000,
            max_priority_fee_per_gas: 1_000_000_000,
            to: Address::ZERO,
            value: U256::ZERO,
            access_list: AccessList::default(),
            blob_versioned_hashes: vec![REFERENCE_BLOB_HASH],
            max_fee_per_blob_gas: 1_000_000_000,
            input: Bytes::new(),
        }
    }

    fn signed_blob_tx(tx: TxEip4844) -> TxEnvelope {
        TxEnvelope::Eip4844(TxEip4844Variant::TxEip4844(tx).into_signed(reference_signature()))
    }

    #[test]
    fn node_transaction_converts_to_reference_envelope() {
        let fetched = blob_transaction(REFERENCE_HASH, signed_blob_tx(reference_tx())).unwrap();

        assert_eq!(fetched.hash, REFERENCE_HASH);
        assert_eq!(fetched.envelope, reference_envelope());
        assert_eq!(canonical_hash(&fetched.envelope).unwrap(), fetched.hash);
    }

    #[test]
    fn access_list_and_calldata_are_carried() {
        let key = B256::repeat_byte(0x22);
        let tx = TxEip4844 {
            input: Bytes::from_static(&[0xca, 0xfe]),
            access_list: AccessList(vec![AlloyAccessListItem {
                address: Address::repeat_byte(0x11),
                storage_keys: vec![key],
            }]),
            ..reference_tx()
        };
        let envelope = signed_blob_tx(tx);
        let node_hash = *envelope.tx_hash();

        let fetched = blob_transaction(node_hash, envelope).unwrap();
        assert_eq!(fetched.envelope.data, Bytes::from_static(&[0xca, 0xfe]));
        assert_eq!(fetched.envelope.access_list.len(), 1);
        assert_eq!(fetched.envelope.access_list[0].storage_keys, vec![key]);
        assert_eq!(canonical_hash(&fetched.envelope).unwrap(), node_hash);
        assert!(fetched.to_input_record().is_none());
    }

    #[test]
    fn non_blob_transaction_is_rejected() {
        let tx = TxEip1559 {
            chain_id: 1,
            gas_limit: 21_000,
            max_fee_per_gas: 30_000_000_000,
            max_priority_fee_per_gas: 1_000_000_000,
            to: TxKind::Call(Address::ZERO),
            ..Default::default()
        };
        let envelope = TxEnvelope::Eip1559(tx.into_signed(reference_signature()));

        assert!(matches!(
            blob_transaction(B256::ZERO, envelope),
            Err(FetchError::NotBlobTransaction { tx_type: 2, .. })
        ));
    }
}
