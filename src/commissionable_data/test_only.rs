use crate::constants::SPAKE2P_VERIFIER_SERIALIZED_LENGTH;
use crate::error::Result;

use super::CommissionableDataProvider;

/// Well-known commissioning material for development and certification
/// test setups. Never ship a device armed with these values.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestOnlyCommissionableData;

impl TestOnlyCommissionableData {
    pub const SETUP_PASSCODE: u32 = 20202021;
    pub const SETUP_DISCRIMINATOR: u16 = 3840;
    pub const SPAKE2P_ITERATION_COUNT: u32 = 1000;
    pub const SPAKE2P_SALT: &'static [u8] = b"SPAKE2P Key Salt";
    /// Verifier for the passcode, salt and iteration count above.
    pub const SPAKE2P_VERIFIER: [u8; SPAKE2P_VERIFIER_SERIALIZED_LENGTH] = [
        0xb9, 0x61, 0x70, 0xaa, 0xe8, 0x03, 0x34, 0x68, 0x84, 0x72, 0x4f, 0xe9, 0xa3, 0xb2, 0x87,
        0xc3, 0x03, 0x30, 0xc2, 0xa6, 0x60, 0x37, 0x5d, 0x17, 0xbb, 0x20, 0x5a, 0x8c, 0xf1, 0xae,
        0xcb, 0x35, 0x04, 0x57, 0xf8, 0xab, 0x79, 0xee, 0x25, 0x3a, 0xb6, 0xa8, 0xe4, 0x6b, 0xb0,
        0x9e, 0x54, 0x3a, 0xe4, 0x22, 0x73, 0x6d, 0xe5, 0x01, 0xe3, 0xdb, 0x37, 0xd4, 0x41, 0xfe,
        0x34, 0x49, 0x20, 0xd0, 0x95, 0x48, 0xe4, 0xc1, 0x82, 0x40, 0x63, 0x0c, 0x4f, 0xf4, 0x91,
        0x3c, 0x53, 0x51, 0x38, 0x39, 0xb7, 0xc0, 0x7f, 0xcc, 0x06, 0x27, 0xa1, 0xb8, 0x57, 0x3a,
        0x14, 0x9f, 0xcd, 0x1f, 0xa4, 0x66, 0xcf,
    ];
}

impl CommissionableDataProvider for TestOnlyCommissionableData {
    fn setup_discriminator(&self) -> Result<u16> {
        Ok(Self::SETUP_DISCRIMINATOR)
    }

    fn spake2p_iteration_count(&self) -> Result<u32> {
        Ok(Self::SPAKE2P_ITERATION_COUNT)
    }

    fn spake2p_salt(&self) -> Result<&[u8]> {
        Ok(Self::SPAKE2P_SALT)
    }

    fn spake2p_verifier(&self) -> Result<&[u8]> {
        Ok(&Self::SPAKE2P_VERIFIER[..])
    }

    fn setup_passcode(&self) -> Result<u32> {
        Ok(Self::SETUP_PASSCODE)
    }
}
