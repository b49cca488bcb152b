//! Cross-check a recomputed transaction hash against a reference hash.
//!
//! A mismatch is a data-quality signal. Callers log it and keep going.

use crate::{
    envelope::BlobTxEnvelope,
    error::{
        EncodingError,
        VerificationMismatch,
    },
    hash::canonical_hash,
};
use alloy_primitives::B256;

/// Verdict of one verification, with both hashes kept for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    pub expected: B256,
    pub computed: B256,
}

impl Verification {
    pub fn is_match(&self) -> bool {
        self.expected == self.computed
    }

    pub fn ensure_match(&self) -> Result<(), VerificationMismatch> {
        if self.is_match() {
            Ok(())
        } else {
            Err(VerificationMismatch {
                expected: self.expected,
                computed: self.computed,
            })
        }
    }
}

/// Recompute the hash of `envelope` and compare it with `expected`.
pub fn verify(envelope: &BlobTxEnvelope, expected: B256) -> Result<Verification, EncodingError> {
    Ok(Verification {
        expected,
        computed: canonical_hash(envelope)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        REFERENCE_HASH,
        reference_envelope,
    };
    use alloy_primitives::{
        Address,
        B256,
        U256,
    };

    #[test]
    fn reference_vector_matches() {
        let verification = verify(&reference_envelope(), REFERENCE_HASH).unwrap();
        assert!(verification.is_match());
        assert!(verification.ensure_match().is_ok());
    }

    #[test]
    fn any_single_perturbation_mismatches() {
        let perturbations: Vec<Box<dyn Fn(&mut BlobTxEnvelope)>> = vec![
            Box::new(|e| e.chain_id = 5),
            Box::new(|e| e.nonce = 1),
            Box::new(|e| e.gas_tip_cap += U256::from(1)),
            Box::new(|e| e.gas_fee_cap += U256::from(1)),
            Box::new(|e| e.gas_limit = 21_001),
            Box::new(|e| e.to = Address::repeat_byte(0x01)),
            Box::new(|e| e.value = U256::from(1)),
            Box::new(|e| e.data = vec![0x00].into()),
            Box::new(|e| e.blob_fee_cap = U256::ZERO),
            Box::new(|e| e.blob_versioned_hashes.push(B256::ZERO)),
            Box::new(|e| e.v = U256::ZERO),
            Box::new(|e| e.r += U256::from(1)),
            Box::new(|e| e.s += U256::from(1)),
        ];

        for (i, perturb) in perturbations.iter().enumerate() {
            let mut envelope = reference_envelope();
            perturb(&mut envelope);
            let verification = verify(&envelope, REFERENCE_HASH).unwrap();
            assert!(!verification.is_match(), "perturbation {i} still matched");

            let mismatch = verification.ensure_match().unwrap_err();
            assert_eq!(mismatch.expected, REFERENCE_HASH);
            assert_eq!(mismatch.computed, verification.computed);
        }
    }

    #[test]
    fn mixed_case_reference_parses_to_same_hash() {
        let upper = "0x5DC8493667605B0724C76226A7832F36D594475B674A2B07002C9497D412F2A1";
        let expected: B256 = upper.parse().unwrap();
        assert!(verify(&reference_envelope(), expected).unwrap().is_match());
    }
}
