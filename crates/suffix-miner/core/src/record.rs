//! Typed input records and the text parsing that produces them.
//!
//! Every field either parses into its typed value or yields a [`ParseError`]
//! naming the row and column. Nothing defaults to zero.

use crate::{
    envelope::{
        BlobTxEnvelope,
        DEFAULT_CHAIN_ID,
        DEFAULT_GAS_LIMIT,
    },
    error::ParseError,
};
use alloy_primitives::{
    Address,
    B256,
    Bytes,
    U256,
};
use std::str::FromStr;

/// Separator between entries of the `blob_versioned_hashes` column.
pub const BLOB_HASH_DELIMITER: &str = ";";

/// Input columns, in the order the exporter writes them.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "hash",
    "nonce",
    "to",
    "gas_fee_cap",
    "blob_gas_fee_cap",
    "gas_tip_cap",
    "r",
    "s",
    "v",
    "blob_versioned_hashes",
];

/// One row of source data: the reference hash plus the fields that vary
/// between transactions. Everything else comes from [`InputRecord::envelope`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    pub hash: B256,
    pub nonce: u64,
    pub to: Address,
    pub gas_fee_cap: U256,
    pub blob_fee_cap: U256,
    pub gas_tip_cap: U256,
    pub v: U256,
    pub r: U256,
    pub s: U256,
    pub blob_versioned_hashes: Vec<B256>,
}

/// Untyped cells of one row, keyed by column.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawRecord<'a> {
    pub hash: &'a str,
    pub nonce: &'a str,
    pub to: &'a str,
    pub gas_fee_cap: &'a str,
    pub blob_gas_fee_cap: &'a str,
    pub gas_tip_cap: &'a str,
    pub r: &'a str,
    pub s: &'a str,
    pub v: &'a str,
    pub blob_versioned_hashes: &'a str,
}

impl InputRecord {
    /// Parse the cells of data row `row` (1-based, header excluded).
    pub fn parse(row: usize, raw: &RawRecord<'_>) -> Result<Self, ParseError> {
        let cell = FieldParser { row };
        Ok(Self {
            hash: cell.hex("hash", raw.hash)?,
            nonce: cell.decimal_u64("nonce", raw.nonce)?,
            to: cell.hex("to", raw.to)?,
            gas_fee_cap: cell.decimal_u256("gas_fee_cap", raw.gas_fee_cap)?,
            blob_fee_cap: cell.decimal_u256("blob_gas_fee_cap", raw.blob_gas_fee_cap)?,
            gas_tip_cap: cell.decimal_u256("gas_tip_cap", raw.gas_tip_cap)?,
            v: cell.decimal_u256("v", raw.v)?,
            r: cell.decimal_u256("r", raw.r)?,
            s: cell.decimal_u256("s", raw.s)?,
            blob_versioned_hashes: cell.hash_list("blob_versioned_hashes", raw.blob_versioned_hashes)?,
        })
    }

    /// Build the envelope, filling in the constant fields: chain id 1, zero
    /// value, 21000 gas, empty data and an empty access list.
    pub fn envelope(&self) -> BlobTxEnvelope {
        BlobTxEnvelope {
            chain_id: DEFAULT_CHAIN_ID,
            nonce: self.nonce,
            gas_tip_cap: self.gas_tip_cap,
            gas_fee_cap: self.gas_fee_cap,
            gas_limit: DEFAULT_GAS_LIMIT,
            to: self.to,
            value: U256::ZERO,
            data: Bytes::new(),
            access_list: Vec::new(),
            blob_fee_cap: self.blob_fee_cap,
            blob_versioned_hashes: self.blob_versioned_hashes.clone(),
            v: self.v,
            r: self.r,
            s: self.s,
        }
    }

    /// Cells in [`REQUIRED_COLUMNS`] order.
    pub fn to_cells(&self) -> [String; 10] {
        [
            self.hash.to_string(),
            self.nonce.to_string(),
            self.to.to_string(),
            self.gas_fee_cap.to_string(),
            self.blob_fee_cap.to_string(),
            self.gas_tip_cap.to_string(),
            self.r.to_string(),
            self.s.to_string(),
            self.v.to_string(),
            self.blob_versioned_hashes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(BLOB_HASH_DELIMITER),
        ]
    }
}

struct FieldParser {
    row: usize,
}

impl FieldParser {
    fn error(&self, field: &'static str, value: &str, reason: impl ToString) -> ParseError {
        ParseError {
            row: self.row,
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn decimal_u64(&self, field: &'static str, value: &str) -> Result<u64, ParseError> {
        value
            .trim()
            .parse::<u64>()
            .map_err(|e| self.error(field, value, e))
    }

    fn decimal_u256(&self, field: &'static str, value: &str) -> Result<U256, ParseError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(self.error(field, value, "empty value"));
        }
        U256::from_str_radix(trimmed, 10).map_err(|e| self.error(field, value, e))
    }

    fn hex<T>(&self, field: &'static str, value: &str) -> Result<T, ParseError>
    where
        T: FromStr,
        T::Err: ToString,
    {
        value
            .trim()
            .parse::<T>()
            .map_err(|e| self.error(field, value, e))
    }

    fn hash_list(&self, field: &'static str, value: &str) -> Result<Vec<B256>, ParseError> {
        value
            .split(BLOB_HASH_DELIMITER)
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| self.hex(field, entry))
            .collect()
    }
}
