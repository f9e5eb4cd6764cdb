//! All the constants used by commissioning.
//! Limits follow the PASE parameters defined by Matter.

/// The minimum number of PBKDF iterations used,
pub const SPAKE2P_MIN_PBKDF_ITERATIONS: u32 = 1000;
pub const SPAKE2P_MAX_PBKDF_ITERATIONS: u32 = 100000;
/// Used when no iteration count is configured.
pub const SPAKE2P_DEFAULT_PBKDF_ITERATIONS: u32 = SPAKE2P_MIN_PBKDF_ITERATIONS;

pub const SPAKE2P_MIN_PBKDF_SALT_LENGTH: usize = 16;
pub const SPAKE2P_MAX_PBKDF_SALT_LENGTH: usize = 32;
/// Length of salts we generate ourselves.
pub const SPAKE2P_GENERATED_SALT_LENGTH: usize = SPAKE2P_MAX_PBKDF_SALT_LENGTH;

pub const CRYPTO_GROUP_SIZE_BYTES: usize = 32;
pub const CRYPTO_PUBLIC_KEY_SIZE_BYTES: usize = CRYPTO_GROUP_SIZE_BYTES * 2 + 1;
pub const CRYPTO_W_SIZE_BYTES: usize = CRYPTO_GROUP_SIZE_BYTES + 8;

/// W0 scalar followed by the uncompressed L point.
pub const SPAKE2P_VERIFIER_SERIALIZED_LENGTH: usize =
    CRYPTO_GROUP_SIZE_BYTES + CRYPTO_PUBLIC_KEY_SIZE_BYTES;

/// Discriminators are 12 bits wide.
pub const MAX_DISCRIMINATOR_VALUE: u16 = 0xFFF;
/// Setup passcodes are 27 bits wide.
pub const MAX_SETUP_PASSCODE_VALUE: u32 = 0x7FF_FFFF;
