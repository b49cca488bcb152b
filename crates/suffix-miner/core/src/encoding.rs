//! Canonical recursive-length-prefix encoding over a closed set of field kinds.
//!
//! Every envelope field is described as a [`Field`] whose [`FieldKind`] picks
//! the rule:
//! - `Fixed`: byte string with a declared exact width (addresses, hashes)
//! - `Bytes`: variable-length byte string
//! - `Uint`: minimal big-endian integer, zero encodes as the empty string
//! - `List`: length-prefixed concatenation of the encoded elements
//!
//! Leaf values are written through [`alloy_rlp::Encodable`] and list headers
//! with [`alloy_rlp::Header`], sized up front so list payloads are written
//! straight into the output. The encoder never decodes and never skips a field, so empty values produce their canonical empty forms
//! (`0x80` for strings, `0xc0` for lists).

use crate::{
    envelope::{
        BLOB_TX_TYPE,
        BlobTxEnvelope,
        EncodingForm,
        GAS_TIP_CAP_INDEX,
    },
    error::EncodingError,
};
use alloy_primitives::U256;
use alloy_rlp::{
    Encodable,
    Header,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind<'a> {
    Fixed { bytes: &'a [u8], width: usize },
    Bytes(&'a [u8]),
    Uint { value: U256, bits: usize },
    List(Vec<Field<'a>>),
}

/// A named field. The name only shows up in [`EncodingError`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<'a> {
    pub name: &'static str,
    pub kind: FieldKind<'a>,
}

impl<'a> Field<'a> {
    pub const fn fixed(name: &'static str, bytes: &'a [u8], width: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Fixed { bytes, width },
        }
    }

    pub const fn bytes(name: &'static str, bytes: &'a [u8]) -> Self {
        Self {
            name,
            kind: FieldKind::Bytes(bytes),
        }
    }

    pub const fn uint(name: &'static str, value: U256, bits: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Uint { value, bits },
        }
    }

    pub const fn list(name: &'static str, items: Vec<Field<'a>>) -> Self {
        Self {
            name,
            kind: FieldKind::List(items),
        }
    }

    /// Encoded size in bytes, header included.
    pub fn length(&self) -> usize {
        match &self.kind {
            FieldKind::Fixed { bytes, .. } | FieldKind::Bytes(bytes) => Encodable::length(*bytes),
            FieldKind::Uint { value, .. } => Encodable::length(value),
            FieldKind::List(items) => {
                let payload_length = payload_length(items);
                Header {
                    list: true,
                    payload_length,
                }
                .length()
                    + payload_length
            }
        }
    }

    /// Append the encoding of this field to `out`. On error `out` may hold a
    /// partial encoding.
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        match &self.kind {
            FieldKind::Fixed { bytes, width } => {
                if bytes.len() != *width {
                    return Err(EncodingError::WidthMismatch {
                        field: self.name,
                        expected: *width,
                        actual: bytes.len(),
                    });
                }
                Encodable::encode(*bytes, out);
            }
            FieldKind::Bytes(bytes) => Encodable::encode(*bytes, out),
            FieldKind::Uint { value, bits } => {
                if value.bit_len() > *bits {
                    return Err(EncodingError::ValueTooWide {
                        field: self.name,
                        bits: *bits,
                    });
                }
                Encodable::encode(value, out);
            }
            FieldKind::List(items) => encode_list(items, out)?,
        }
        Ok(())
    }
}

fn payload_length(items: &[Field<'_>]) -> usize {
    items.iter().map(Field::length).sum()
}

fn encode_list(items: &[Field<'_>], out: &mut Vec<u8>) -> Result<(), EncodingError> {
    Header {
        list: true,
        payload_length: payload_length(items),
    }
    .encode(out);
    for item in items {
        item.encode(out)?;
    }
    Ok(())
}

/// An envelope encoded once with its priority fee left open.
///
/// Holds the encoded fields before and after `gas_tip_cap`, so a new tip only
/// costs its own encoding plus the outer list header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipTemplate {
    head: Vec<u8>,
    tail: Vec<u8>,
}

impl TipTemplate {
    pub fn new(envelope: &BlobTxEnvelope, form: EncodingForm) -> Result<Self, EncodingError> {
        let fields = envelope.fields(form);
        let (head_fields, rest) = fields.split_at(GAS_TIP_CAP_INDEX);

        let mut head = Vec::with_capacity(payload_length(head_fields));
        for field in head_fields {
            field.encode(&mut head)?;
        }
        let tail_fields = &rest[1..];
        let mut tail = Vec::with_capacity(payload_length(tail_fields));
        for field in tail_fields {
            field.encode(&mut tail)?;
        }

        Ok(Self { head, tail })
    }

    /// Append `type_tag || rlp(fields)` with `tip` as the priority fee.
    pub fn encode_with_tip(&self, tip: U256, out: &mut Vec<u8>) {
        out.push(BLOB_TX_TYPE);
        Header {
            list: true,
            payload_length: self.head.len() + Encodable::length(&tip) + self.tail.len(),
        }
        .encode(out);
        out.extend_from_slice(&self.head);
        Encodable::encode(&tip, out);
        out.extend_from_slice(&self.tail);
    }
}

/// Reusable encoder for `type_tag || rlp(fields)`.
///
/// Keeps its output buffer between calls. Together with a [`TipTemplate`] this
/// lets the miner re-encode an envelope per candidate without allocating.
#[derive(Debug, Default)]
pub struct CanonicalEncoder {
    buf: Vec<u8>,
}

impl CanonicalEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `envelope` and return the tagged bytes. The slice is only valid
    /// until the next call.
    pub fn encode(
        &mut self,
        envelope: &BlobTxEnvelope,
        form: EncodingForm,
    ) -> Result<&[u8], EncodingError> {
        self.buf.clear();
        self.buf.push(BLOB_TX_TYPE);
        encode_list(&envelope.fields(form), &mut self.buf)?;
        Ok(&self.buf)
    }

    /// Encode `template` with `tip` filled in.
    pub fn encode_with_tip(&mut self, template: &TipTemplate, tip: U256) -> &[u8] {
        self.buf.clear();
        template.encode_with_tip(tip, &mut self.buf);
        &self.buf
    }
}

/// Encode `envelope` into a fresh buffer, type tag included.
pub fn encode_canonical(
    envelope: &BlobTxEnvelope,
    form: EncodingForm,
) -> Result<Vec<u8>, EncodingError> {
    let mut encoder = CanonicalEncoder::new();
    encoder.encode(envelope, form).map(<[u8]>::to_vec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        REFERENCE_TIP,
        reference_envelope,
    };

    fn encoded(field: &Field<'_>) -> Vec<u8> {
        let mut out = Vec::new();
        field.encode(&mut out).unwrap();
        out
    }

    #[test]
    fn uint_zero_is_empty_string() {
        assert_eq!(encoded(&Field::uint("n", U256::ZERO, 64)), vec![0x80]);
    }

    #[test]
    fn uint_small_values_encode_as_themselves() {
        assert_eq!(encoded(&Field::uint("n", U256::from(1), 64)), vec![0x01]);
        assert_eq!(encoded(&Field::uint("n", U256::from(0x7f), 64)), vec![0x7f]);
        assert_eq!(encoded(&Field::uint("n", U256::from(0x80), 64)), vec![0x81, 0x80]);
    }

    #[test]
    fn uint_has_no_leading_zero_bytes() {
        assert_eq!(
            encoded(&Field::uint("gas", U256::from(21_000), 64)),
            vec![0x82, 0x52, 0x08]
        );
        assert_eq!(
            encoded(&Field::uint("tip", U256::from(1_000_000_000u64), 256)),
            vec![0x84, 0x3b, 0x9a, 0xca, 0x00]
        );
    }

    #[test]
    fn uint_wider_than_declared_is_rejected() {
        let field = Field::uint("nonce", U256::from(u64::MAX) + U256::from(1), 64);
        let err = field.encode(&mut Vec::new()).unwrap_err();
        assert_eq!(
            err,
            EncodingError::ValueTooWide {
                field: "nonce",
                bits: 64
            }
        );
    }

    #[test]
    fn fixed_width_is_enforced() {
        let short = [0u8; 19];
        let err = Field::fixed("to", &short, 20)
            .encode(&mut Vec::new())
            .unwrap_err();
        assert_eq!(
            err,
            EncodingError::WidthMismatch {
                field: "to",
                expected: 20,
                actual: 19
            }
        );
    }

    #[test]
    fn fixed_address_gets_short_header() {
        let address = [0u8; 20];
        let out = encoded(&Field::fixed("to", &address, 20));
        assert_eq!(out[0], 0x94);
        assert_eq!(out.len(), 21);
    }

    #[test]
    fn empty_bytes_and_list_have_canonical_forms() {
        assert_eq!(encoded(&Field::bytes("data", &[])), vec![0x80]);
        assert_eq!(encoded(&Field::list("access_list", vec![])), vec![0xc0]);
    }

    #[test]
    fn long_string_uses_length_of_length() {
        let payload = [0xaa; 60];
        let out = encoded(&Field::bytes("data", &payload));
        assert_eq!(&out[..2], &[0xb8, 60]);
        assert_eq!(out.len(), 62);
    }

    #[test]
    fn long_list_uses_length_of_length() {
        let hashes = [[0x11u8; 32]; 2];
        let items = hashes
            .iter()
            .map(|h| Field::fixed("hash", h, 32))
            .collect();
        let out = encoded(&Field::list("hashes", items));
        // two 33-byte items = 66 bytes payload
        assert_eq!(&out[..2], &[0xf8, 66]);
        assert_eq!(out.len(), 68);
    }

    #[test]
    fn error_inside_list_propagates() {
        let bad = [0u8; 31];
        let items = vec![Field::fixed("hash", &bad, 32)];
        assert!(Field::list("hashes", items).encode(&mut Vec::new()).is_err());
    }

    #[test]
    fn reference_envelope_encodes_to_known_bytes() {
        let bytes = encode_canonical(&reference_envelope(), EncodingForm::Identity).unwrap();
        let expected = "03f8920180843b9aca008506fc23ac008252089400000000000000000000000000000000000000008080c0843b9aca00e1a001ababababababababababababababababababababababababababababababab01a08a3c0ff5f3b5e2a2b4d1a3a2e0b6b7c9d4e5f60718293a4b5c6d7e8f90a1b2c3a01f2e3d4c5b6a79880796a5b4c3d2e1f00f1e2d3c4b5a69788796a5b4c3d2e1f0";
        assert_eq!(alloy_primitives::hex::encode(bytes), expected);
    }

    #[test]
    fn encoder_reuse_matches_fresh_encoding() {
        let mut envelope = reference_envelope();
        let mut encoder = CanonicalEncoder::new();

        let first = encoder
            .encode(&envelope, EncodingForm::Identity)
            .unwrap()
            .to_vec();
        envelope.data = vec![0xde, 0xad, 0xbe, 0xef].into();
        let _ = encoder.encode(&envelope, EncodingForm::Identity).unwrap();
        envelope.data = Default::default();
        let again = encoder
            .encode(&envelope, EncodingForm::Identity)
            .unwrap()
            .to_vec();

        assert_eq!(first, again);
    }

    #[test]
    fn lengths_match_encoded_sizes() {
        let envelope = reference_envelope();
        for field in envelope.fields(EncodingForm::Identity) {
            assert_eq!(field.length(), encoded(&field).len(), "{}", field.name);
        }
        let whole = Field::list("tx", envelope.fields(EncodingForm::Identity));
        assert_eq!(whole.length(), encoded(&whole).len());
    }

    #[test]
    fn tip_template_matches_full_encoding() {
        let mut envelope = reference_envelope();
        envelope.data = vec![0x42; 100].into();
        let template = TipTemplate::new(&envelope, EncodingForm::Identity).unwrap();
        let mut encoder = CanonicalEncoder::new();

        // The payload crosses 255 bytes between the smallest and largest tip.
        for tip in [
            U256::ZERO,
            U256::from(0x7f),
            U256::from(0x80),
            U256::from(1_000_000_000u64),
            U256::MAX,
        ] {
            envelope.gas_tip_cap = tip;
            let expected = encode_canonical(&envelope, EncodingForm::Identity).unwrap();
            assert_eq!(encoder.encode_with_tip(&template, tip), expected.as_slice());
        }
    }

    #[test]
    fn tip_template_supports_signing_form() {
        let envelope = reference_envelope();
        let template = TipTemplate::new(&envelope, EncodingForm::Signing).unwrap();
        let mut out = Vec::new();
        template.encode_with_tip(REFERENCE_TIP, &mut out);
        assert_eq!(out, encode_canonical(&envelope, EncodingForm::Signing).unwrap());
    }
}
