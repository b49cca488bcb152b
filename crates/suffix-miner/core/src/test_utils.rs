//! Shared fixtures for unit tests, integration tests and benches.
//!
//! The reference vector: `chain_id=1, nonce=0, to=0x00..00, value=0,
//! gas_limit=21000, data=empty`, tip 1 gwei, fee cap 30 gwei, blob fee cap 1 gwei,
//! a single blob hash `0x01abab..ab` and signature `(v=1, r, s)` below.

use crate::{
    envelope::BlobTxEnvelope,
    record::InputRecord,
};
use alloy_primitives::{
    Address,
    B256,
    U256,
    b256,
    uint,
};

pub const REFERENCE_TIP: U256 = uint!(1000000000_U256);
pub const REFERENCE_FEE_CAP: U256 = uint!(30000000000_U256);
pub const REFERENCE_BLOB_FEE_CAP: U256 = uint!(1000000000_U256);
pub const REFERENCE_BLOB_HASH: B256 =
    b256!("01ababababababababababababababababababababababababababababababab");
pub const REFERENCE_R: U256 =
    uint!(0x8a3c0ff5f3b5e2a2b4d1a3a2e0b6b7c9d4e5f60718293a4b5c6d7e8f90a1b2c3_U256);
pub const REFERENCE_S: U256 =
    uint!(0x1f2e3d4c5b6a79880796a5b4c3d2e1f00f1e2d3c4b5a69788796a5b4c3d2e1f0_U256);

/// Transaction hash of [`reference_envelope`].
pub const REFERENCE_HASH: B256 =
    b256!("5dc8493667605b0724c76226a7832f36d594475b674a2b07002c9497d412f2a1");

/// Signing hash of [`reference_envelope`].
pub const REFERENCE_SIGNING_HASH: B256 =
    b256!("33bdd85950d5c8423862b08aff98019e75d7493a9b9159b13079d74e2e018fdf");

/// Candidates the miner needs, starting from [`REFERENCE_TIP`], to fill all 16 slots.
pub const REFERENCE_MINING_ITERATIONS: u64 = 46;

/// First `(tip, hash)` per nibble when mining [`reference_envelope`] from [`REFERENCE_TIP`].
pub const REFERENCE_SUFFIXES: [(u64, B256); 16] = [
    (1_000_000_011, b256!("5fb31d30e9990c9ce647c7e00354e012cab3c77d13b2610ea3146f08579a5a20")),
    (1_000_000_000, b256!("5dc8493667605b0724c76226a7832f36d594475b674a2b07002c9497d412f2a1")),
    (1_000_000_005, b256!("c3e30d14e3be7d2fa9cf03e837b94269f2460719a4006900041317cd3d6b1bf2")),
    (1_000_000_044, b256!("5289cf11d49da25f69d780407482cb801cf261d2bda5d00b722c6f6a30ae9fd3")),
    (1_000_000_006, b256!("54a6fd17e17c72be52302841e30065f0c86f7d1a1d5faa7efef54cc900777304")),
    (1_000_000_007, b256!("d3ce8363fb3133dc705714c3169879cde0d1bb6dfefe55ac1f42c6099dae5855")),
    (1_000_000_045, b256!("9fcce28f879eb9fb50b5d7e1d14aa2eaabd068f6b69c410ef85ec6c2bd133a46")),
    (1_000_000_014, b256!("5bb717ef9d4b50a361a6711f1d8108ac188c7c974be4386333b9e599b96afbb7")),
    (1_000_000_008, b256!("e2855d0ec105a5336794ce48b5bcdc24c3758736fad41d3b7c52c54e39049788")),
    (1_000_000_003, b256!("b9aa26c5cfe96d016dee2c5b684d267a977cec028b3fe33948cbf4ec43501189")),
    (1_000_000_034, b256!("56be96d40b6822355da0fc06329d0089760f4356a58dc1ae5dcbd25e7f0c2cba")),
    (1_000_000_002, b256!("9b7446d07bdc73f75bc4747ff609c5f9b82674eab080e97651b2e4073f290bab")),
    (1_000_000_019, b256!("e3d4a88a05064caaad3162e2cfe4c5cb04e1a80e0786d36c72ddc8b3d75e712c")),
    (1_000_000_018, b256!("31000802e3e62fcc5504498666f95f1d0adb216d69c5c565432c7c905db2045d")),
    (1_000_000_001, b256!("a5f359fc9fbefaab86d300ef285934e6e4da4ffa278a0479ed912ddc75a3f63e")),
    (1_000_000_010, b256!("6beff3881405581fceab53655f02f88d8e013fe5106038c7dfa56758abed181f")),
];

pub fn reference_envelope() -> BlobTxEnvelope {
    BlobTxEnvelope {
        gas_tip_cap: REFERENCE_TIP,
        gas_fee_cap: REFERENCE_FEE_CAP,
        to: Address::ZERO,
        blob_fee_cap: REFERENCE_BLOB_FEE_CAP,
        blob_versioned_hashes: vec![REFERENCE_BLOB_HASH],
        v: U256::from(1),
        r: REFERENCE_R,
        s: REFERENCE_S,
        ..Default::default()
    }
}

pub fn reference_record() -> InputRecord {
    InputRecord {
        hash: REFERENCE_HASH,
        nonce: 0,
        to: Address::ZERO,
        gas_fee_cap: REFERENCE_FEE_CAP,
        blob_fee_cap: REFERENCE_BLOB_FEE_CAP,
        gas_tip_cap: REFERENCE_TIP,
        v: U256::from(1),
        r: REFERENCE_R,
        s: REFERENCE_S,
        blob_versioned_hashes: vec![REFERENCE_BLOB_HASH],
    }
}

/// Header line of an input file, in the column order the exporter writes.
pub const INPUT_HEADER: &str =
    "hash,nonce,to,gas_fee_cap,blob_gas_fee_cap,gas_tip_cap,r,s,v,blob_versioned_hashes";

/// The reference record as one CSV line matching [`INPUT_HEADER`].
pub fn reference_csv_line() -> String {
    format!(
        "{REFERENCE_HASH},0,{},{REFERENCE_FEE_CAP},{REFERENCE_BLOB_FEE_CAP},{REFERENCE_TIP},{REFERENCE_R},{REFERENCE_S},1,{REFERENCE_BLOB_HASH}",
        Address::ZERO
    )
}
