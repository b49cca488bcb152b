//! Blob-carrying (type `0x03`) transaction envelope.
//!
//! The envelope holds exactly the fields that feed the canonical hash. Field
//! order and per-field encoding rules live in [`BlobTxEnvelope::fields`] and
//! must never change between calls.

use crate::encoding::{
    Field,
    FieldKind,
};
use alloy_primitives::{
    Address,
    B256,
    Bytes,
    U256,
};

/// EIP-2718 type tag of a blob transaction.
pub const BLOB_TX_TYPE: u8 = 0x03;

/// Chain id used for records that do not carry one.
pub const DEFAULT_CHAIN_ID: u64 = 1;

/// Gas limit of a plain value transfer.
pub const DEFAULT_GAS_LIMIT: u64 = 21_000;

/// Position of `gas_tip_cap` in [`BlobTxEnvelope::fields`].
pub const GAS_TIP_CAP_INDEX: usize = 2;

const ADDRESS_LEN: usize = 20;
const HASH_LEN: usize = 32;

/// Which subset of fields takes part in an encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingForm {
    /// All fields including `v`, `r`, `s`. Produces the transaction hash.
    Identity,
    /// Fields without the signature. Produces the hash that gets signed.
    Signing,
}

/// One entry of an EIP-2930 access list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessListItem {
    pub address: Address,
    pub storage_keys: Vec<B256>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobTxEnvelope {
    pub chain_id: u64,
    pub nonce: u64,
    /// Max priority fee per gas. This is the field the miner walks.
    pub gas_tip_cap: U256,
    /// Max fee per gas.
    pub gas_fee_cap: U256,
    pub gas_limit: u64,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub access_list: Vec<AccessListItem>,
    /// Max fee per blob gas.
    pub blob_fee_cap: U256,
    pub blob_versioned_hashes: Vec<B256>,
    pub v: U256,
    pub r: U256,
    pub s: U256,
}

impl Default for BlobTxEnvelope {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            nonce: 0,
            gas_tip_cap: U256::ZERO,
            gas_fee_cap: U256::ZERO,
            gas_limit: DEFAULT_GAS_LIMIT,
            to: Address::ZERO,
            value: U256::ZERO,
            data: Bytes::new(),
            access_list: Vec::new(),
            blob_fee_cap: U256::ZERO,
            blob_versioned_hashes: Vec::new(),
            v: U256::ZERO,
            r: U256::ZERO,
            s: U256::ZERO,
        }
    }
}

impl BlobTxEnvelope {
    /// Returns the envelope as a list of typed fields in canonical order.
    ///
    /// Format: `[chain_id, nonce, gas_tip_cap, gas_fee_cap, gas_limit, to, value,
    /// data, access_list, blob_fee_cap, blob_versioned_hashes, v, r, s]`, with the
    /// trailing signature omitted for [`EncodingForm::Signing`].
    pub fn fields(&self, form: EncodingForm) -> Vec<Field<'_>> {
        let mut fields = vec![
            Field::uint("chain_id", U256::from(self.chain_id), 64),
            Field::uint("nonce", U256::from(self.nonce), 64),
            Field::uint("gas_tip_cap", self.gas_tip_cap, 256),
            Field::uint("gas_fee_cap", self.gas_fee_cap, 256),
            Field::uint("gas_limit", U256::from(self.gas_limit), 64),
            Field::fixed("to", self.to.as_slice(), ADDRESS_LEN),
            Field::uint("value", self.value, 256),
            Field::bytes("data", &self.data),
            Field::list(
                "access_list",
                self.access_list.iter().map(AccessListItem::field).collect(),
            ),
            Field::uint("blob_fee_cap", self.blob_fee_cap, 256),
            Field::list(
                "blob_versioned_hashes",
                self.blob_versioned_hashes
                    .iter()
                    .map(|hash| Field::fixed("blob_versioned_hash", hash.as_slice(), HASH_LEN))
                    .collect(),
            ),
        ];

        if form == EncodingForm::Identity {
            fields.extend([
                Field::uint("v", self.v, 256),
                Field::uint("r", self.r, 256),
                Field::uint("s", self.s, 256),
            ]);
        }

        fields
    }
}

impl AccessListItem {
    fn field(&self) -> Field<'_> {
        Field {
            name: "access_list_item",
            kind: FieldKind::List(vec![
                Field::fixed("address", self.address.as_slice(), ADDRESS_LEN),
                Field::list(
                    "storage_keys",
                    self.storage_keys
                        .iter()
                        .map(|key| Field::fixed("storage_key", key.as_slice(), HASH_LEN))
                        .collect(),
                ),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_form_has_fourteen_fields_in_order() {
        let envelope = BlobTxEnvelope::default();
        let names: Vec<_> = envelope
            .fields(EncodingForm::Identity)
            .iter()
            .map(|field| field.name)
            .collect();

        assert_eq!(
            names,
            vec![
                "chain_id",
                "nonce",
                "gas_tip_cap",
                "gas_fee_cap",
                "gas_limit",
                "to",
                "value",
                "data",
                "access_list",
                "blob_fee_cap",
                "blob_versioned_hashes",
                "v",
                "r",
                "s",
            ]
        );
    }

    #[test]
    fn tip_index_points_at_tip() {
        for form in [EncodingForm::Identity, EncodingForm::Signing] {
            assert_eq!(
                BlobTxEnvelope::default().fields(form)[GAS_TIP_CAP_INDEX].name,
                "gas_tip_cap"
            );
        }
    }

    #[test]
    fn signing_form_drops_signature() {
        let envelope = BlobTxEnvelope::default();
        let fields = envelope.fields(EncodingForm::Signing);
        assert_eq!(fields.len(), 11);
        assert_eq!(fields.last().map(|f| f.name), Some("blob_versioned_hashes"));
    }

    #[test]
    fn empty_collections_are_kept() {
        let envelope = BlobTxEnvelope::default();
        let fields = envelope.fields(EncodingForm::Identity);
        assert!(matches!(&fields[8].kind, FieldKind::List(items) if items.is_empty()));
        assert!(matches!(&fields[7].kind, FieldKind::Bytes(data) if data.is_empty()));
    }
}
