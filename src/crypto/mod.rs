use elliptic_curve::subtle::ConstantTimeEq;
use rand::{CryptoRng, RngCore};

use crate::error::VerifierError;

pub mod spake2p;

// Random bytes generator
pub fn fill_random<R: RngCore + CryptoRng>(rng: &mut R, out: &mut [u8]) {
    rng.fill_bytes(out);
}

#[inline(always)]
pub fn pbkdf2_hmac(
    data: &[u8],
    iter: u32,
    salt: &[u8],
    key: &mut [u8],
) -> Result<(), VerifierError> {
    pbkdf2::pbkdf2::<hmac::Hmac<sha2::Sha256>>(data, salt, iter, key)
        .map_err(|_| VerifierError::Kdf)
}

/// Compares two byte strings without short-circuiting on the first difference.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}
