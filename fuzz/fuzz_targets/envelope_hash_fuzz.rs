#![no_main]
use alloy_primitives::{
    Address,
    B256,
    Bytes,
    U256,
};
use libfuzzer_sys::fuzz_target;
use suffix_miner_core::{
    AccessListItem,
    BlobTxEnvelope,
    canonical_hash,
    signing_hash,
    verify,
};

fn word(data: &[u8], offset: usize) -> U256 {
    let mut bytes = [0u8; 32];
    let end = data.len().min(offset + 32);
    if offset < end {
        bytes[..end - offset].copy_from_slice(&data[offset..end]);
    }
    U256::from_be_bytes(bytes)
}

fn envelope_from(data: &[u8]) -> BlobTxEnvelope {
    // 6 words of header, the rest is calldata.
    let header_len = data.len().min(192);
    let hashes = (data.first().copied().unwrap_or_default() % 7) as usize;

    BlobTxEnvelope {
        chain_id: word(data, 0).wrapping_to::<u64>(),
        nonce: word(data, 8).wrapping_to::<u64>(),
        gas_tip_cap: word(data, 16),
        gas_fee_cap: word(data, 48),
        gas_limit: word(data, 80).wrapping_to::<u64>(),
        to: Address::from_word(B256::from(word(data, 88))),
        value: word(data, 96),
        data: Bytes::copy_from_slice(&data[header_len..]),
        access_list: if data.len() % 2 == 0 {
            vec![AccessListItem {
                address: Address::from_word(B256::from(word(data, 104))),
                storage_keys: vec![B256::from(word(data, 120))],
            }]
        } else {
            Vec::new()
        },
        blob_fee_cap: word(data, 128),
        blob_versioned_hashes: (0..hashes).map(|i| B256::from(word(data, i * 16))).collect(),
        v: U256::from(data.len() % 2),
        r: word(data, 136),
        s: word(data, 160),
    }
}

// Every envelope built from in-range fields must hash, verify against its own
// hash, and keep its signing hash independent of the signature.
fuzz_target!(|data: &[u8]| {
    let mut envelope = envelope_from(data);

    let hash = canonical_hash(&envelope).expect("in-range envelope must encode");
    assert!(verify(&envelope, hash).expect("verify").is_match());

    let sighash = signing_hash(&envelope).expect("signing hash");
    envelope.r = envelope.r.wrapping_add(U256::from(1));
    envelope.v = U256::from(1) - envelope.v;
    assert_eq!(signing_hash(&envelope).expect("signing hash"), sighash);
    assert_ne!(canonical_hash(&envelope).expect("hash"), hash);
});
