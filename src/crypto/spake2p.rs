//! SPAKE2+ verifier handling for PASE.
//!
//! A verifier is the pair `(w0, L)` a commissionee stores in place of its
//! passcode. It is serialized as the 32-byte big-endian `w0` scalar followed
//! by `L` as an uncompressed SEC1 point.

use crypto_bigint::Encoding;
use crypto_bigint::U384;
use elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use elliptic_curve::PrimeField;

use crate::constants::{
    CRYPTO_GROUP_SIZE_BYTES, CRYPTO_PUBLIC_KEY_SIZE_BYTES, CRYPTO_W_SIZE_BYTES,
    SPAKE2P_VERIFIER_SERIALIZED_LENGTH,
};
use crate::error::VerifierError;

use super::pbkdf2_hmac;

/// Order of the P-256 group, big-endian.
const P256_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xbc, 0xe6, 0xfa, 0xad, 0xa7, 0x17, 0x9e, 0x84, 0xf3, 0xb9, 0xca, 0xc2, 0xfc, 0x63,
    0x25, 0x51,
];

#[derive(Clone, PartialEq, Eq)]
pub struct Spake2pVerifier {
    w0: [u8; CRYPTO_GROUP_SIZE_BYTES],
    l: [u8; CRYPTO_PUBLIC_KEY_SIZE_BYTES],
}

impl Spake2pVerifier {
    /// Derive a verifier from a setup passcode.
    ///
    /// The passcode is fed to PBKDF2-HMAC-SHA256 as 4 little-endian bytes,
    /// and the 80 byte output split into `w0s || w1s`. Both halves are
    /// reduced modulo the group order, and `L = w1 * G`.
    pub fn generate(iterations: u32, salt: &[u8], passcode: u32) -> Result<Self, VerifierError> {
        let mut w0w1 = [0u8; CRYPTO_W_SIZE_BYTES * 2];
        pbkdf2_hmac(&passcode.to_le_bytes(), iterations, salt, &mut w0w1)?;

        let (w0s, w1s) = w0w1.split_at(CRYPTO_W_SIZE_BYTES);
        let w0 = Self::compute_w_scalar(w0s)?;
        let w1 = Self::compute_w_scalar(w1s)?;
        let l = (p256::AffinePoint::GENERATOR * w1).to_encoded_point(false);

        let mut verifier = Self {
            w0: [0; CRYPTO_GROUP_SIZE_BYTES],
            l: [0; CRYPTO_PUBLIC_KEY_SIZE_BYTES],
        };
        let w0_bytes: [u8; CRYPTO_GROUP_SIZE_BYTES] = w0.to_repr().into();
        verifier.w0 = w0_bytes;
        verifier.l.copy_from_slice(l.as_bytes());
        Ok(verifier)
    }

    /// Parse a serialized verifier, checking that `w0` is a canonical scalar
    /// and `L` lies on the curve.
    pub fn deserialize(data: &[u8]) -> Result<Self, VerifierError> {
        if data.len() != SPAKE2P_VERIFIER_SERIALIZED_LENGTH {
            return Err(VerifierError::InvalidLength {
                expected: SPAKE2P_VERIFIER_SERIALIZED_LENGTH,
                actual: data.len(),
            });
        }
        let (w0, l) = data.split_at(CRYPTO_GROUP_SIZE_BYTES);

        let mut w0_bytes = [0u8; CRYPTO_GROUP_SIZE_BYTES];
        w0_bytes.copy_from_slice(w0);
        let w0_scalar: Option<p256::Scalar> =
            p256::Scalar::from_repr(p256::FieldBytes::from(w0_bytes)).into();
        if w0_scalar.is_none() {
            return Err(VerifierError::InvalidScalar);
        }

        // Only the uncompressed form is part of the serialized verifier
        if l[0] != 0x04 {
            return Err(VerifierError::InvalidPoint);
        }
        let encoded = p256::EncodedPoint::from_bytes(l).map_err(|_| VerifierError::InvalidPoint)?;
        let point: Option<p256::AffinePoint> =
            p256::AffinePoint::from_encoded_point(&encoded).into();
        if point.is_none() {
            return Err(VerifierError::InvalidPoint);
        }

        let mut verifier = Self {
            w0: [0; CRYPTO_GROUP_SIZE_BYTES],
            l: [0; CRYPTO_PUBLIC_KEY_SIZE_BYTES],
        };
        verifier.w0.copy_from_slice(w0);
        verifier.l.copy_from_slice(l);
        Ok(verifier)
    }

    /// Write the serialized verifier into `out`, which must be exactly
    /// [`SPAKE2P_VERIFIER_SERIALIZED_LENGTH`] bytes.
    pub fn serialize(&self, out: &mut [u8]) -> Result<(), VerifierError> {
        if out.len() != SPAKE2P_VERIFIER_SERIALIZED_LENGTH {
            return Err(VerifierError::BufferSize {
                expected: SPAKE2P_VERIFIER_SERIALIZED_LENGTH,
                actual: out.len(),
            });
        }
        let (w0, l) = out.split_at_mut(CRYPTO_GROUP_SIZE_BYTES);
        w0.copy_from_slice(&self.w0);
        l.copy_from_slice(&self.l);
        Ok(())
    }

    pub fn to_bytes(&self) -> [u8; SPAKE2P_VERIFIER_SERIALIZED_LENGTH] {
        let mut out = [0u8; SPAKE2P_VERIFIER_SERIALIZED_LENGTH];
        out[..CRYPTO_GROUP_SIZE_BYTES].copy_from_slice(&self.w0);
        out[CRYPTO_GROUP_SIZE_BYTES..].copy_from_slice(&self.l);
        out
    }

    pub fn w0(&self) -> &[u8] {
        &self.w0
    }

    pub fn l(&self) -> &[u8] {
        &self.l
    }

    /// Reduce a 40 byte `ws` value modulo the group order
    fn compute_w_scalar(w: &[u8]) -> Result<p256::Scalar, VerifierError> {
        let mut expanded = [0u8; 384 / 8];
        expanded[16..].copy_from_slice(&P256_ORDER);
        let big_order = U384::from_be_slice(&expanded);
        let mut expanded = [0u8; 384 / 8];
        expanded[8..].copy_from_slice(w);
        let big_w = U384::from_be_slice(&expanded);
        let w_res: Option<U384> = big_w.reduce(&big_order).into();
        let w_res = w_res.ok_or(VerifierError::InvalidScalar)?;
        let mut w_out = [0u8; 32];
        w_out.copy_from_slice(&w_res.to_be_bytes()[16..]);

        Option::from(p256::Scalar::from_repr(p256::FieldBytes::from(w_out)))
            .ok_or(VerifierError::InvalidScalar)
    }
}

impl core::fmt::Debug for Spake2pVerifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Spake2pVerifier")
            .field("w0", &hex::encode(self.w0))
            .field("l", &hex::encode(self.l))
            .finish()
    }
}
