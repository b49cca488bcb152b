//! Keccak-256 over the tagged canonical encoding.

use crate::{
    encoding::{
        CanonicalEncoder,
        TipTemplate,
    },
    envelope::{
        BlobTxEnvelope,
        EncodingForm,
    },
    error::EncodingError,
};
use alloy_primitives::{
    B256,
    U256,
    keccak256,
};

/// Digest of an already tagged byte sequence.
#[inline]
pub fn digest(tagged: &[u8]) -> B256 {
    keccak256(tagged)
}

/// Transaction hash of `envelope`.
pub fn canonical_hash(envelope: &BlobTxEnvelope) -> Result<B256, EncodingError> {
    CanonicalEncoder::new().hash(envelope, EncodingForm::Identity)
}

/// Hash that a sender signs for `envelope` (the signature fields are left out).
pub fn signing_hash(envelope: &BlobTxEnvelope) -> Result<B256, EncodingError> {
    CanonicalEncoder::new().hash(envelope, EncodingForm::Signing)
}

impl CanonicalEncoder {
    /// Encode and hash in one step, reusing the encoder's buffer.
    pub fn hash(
        &mut self,
        envelope: &BlobTxEnvelope,
        form: EncodingForm,
    ) -> Result<B256, EncodingError> {
        self.encode(envelope, form).map(digest)
    }

    /// Hash `template` with `tip` as the priority fee.
    pub fn hash_with_tip(&mut self, template: &TipTemplate, tip: U256) -> B256 {
        digest(self.encode_with_tip(template, tip))
    }
}
