//! Commissioning options gathered by the surrounding application.
//!
//! Options arrive already parsed; this module only holds them, fills in
//! development defaults, and can read them from a JSON document.

use base64::Engine;
use bitflags::bitflags;
use serde::Deserialize;

use crate::commissionable_data::test_only::TestOnlyCommissionableData;
use crate::constants::MAX_SETUP_PASSCODE_VALUE;
use crate::error::ConfigError;

bitflags! {
    /// Technologies a device can be discovered over (5.1.1.8).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DiscoveryCapabilities: u8 {
        const SOFT_AP = 1 << 0;
        const BLE = 1 << 1;
        const ON_NETWORK = 1 << 2;
    }
}

impl Default for DiscoveryCapabilities {
    fn default() -> Self {
        Self::empty()
    }
}

/// Custom flow (5.1.1.6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommissioningFlow {
    #[default]
    Standard = 0,
    UserActionRequired = 1,
    Custom = 2,
}

impl CommissioningFlow {
    /// Only the lower 2 bits are meaningful. `3` is reserved and read as standard.
    pub fn from_bits(value: u8) -> Self {
        match value & 0b11 {
            1 => Self::UserActionRequired,
            2 => Self::Custom,
            _ => Self::Standard,
        }
    }
}

/// Values encoded into the onboarding payload (QR and manual pairing codes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadContents {
    pub version: u8,
    pub vendor_id: u16,
    pub product_id: u16,
    pub commissioning_flow: CommissioningFlow,
    pub discovery_capabilities: DiscoveryCapabilities,
    pub discriminator: u16,
    pub setup_pin_code: u32,
}

#[derive(Debug, Clone, Default)]
pub struct CommissioningOptions {
    /// `0` when not configured
    pub passcode: u32,
    /// `0` when not configured
    pub discriminator: u16,
    /// Serialized SPAKE2+ verifier overriding the one derived from the passcode
    pub spake2p_verifier: Option<Vec<u8>>,
    pub spake2p_salt: Option<Vec<u8>>,
    /// `0` selects the default iteration count
    pub spake2p_iterations: u32,
    pub payload: PayloadContents,
}

impl CommissioningOptions {
    pub fn has_verifier(&self) -> bool {
        self.spake2p_verifier
            .as_ref()
            .is_some_and(|verifier| !verifier.is_empty())
    }

    /// Fill in the passcode and discriminator from the test-only defaults when
    /// they are not configured, and mirror the effective values into the
    /// payload so pairing codes match what gets armed.
    ///
    /// A configured passcode or an external verifier both suppress the
    /// passcode fallback.
    pub fn resolve_defaults(&mut self) {
        if self.passcode == 0 && !self.has_verifier() {
            tracing::warn!("no passcode or verifier configured, using the test-only passcode");
            self.passcode = TestOnlyCommissionableData::SETUP_PASSCODE;
        }
        self.payload.setup_pin_code = self.passcode;

        if self.discriminator == 0 {
            tracing::warn!(
                discriminator = TestOnlyCommissionableData::SETUP_DISCRIMINATOR,
                "no discriminator configured, using the test-only discriminator"
            );
            self.discriminator = TestOnlyCommissionableData::SETUP_DISCRIMINATOR;
        }
        self.payload.discriminator = self.discriminator;
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let file: OptionsFile = serde_json::from_str(s)?;
        file.try_into()
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, ConfigError> {
        let file: OptionsFile = serde_json::from_reader(reader)?;
        file.try_into()
    }
}

/// On-disk shape of the options, keyed like the command line flags.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct OptionsFile {
    version: u8,
    vendor_id: u16,
    product_id: u16,
    custom_flow: u8,
    capabilities: u8,
    discriminator: u16,
    passcode: u32,
    spake2p_verifier_base64: Option<String>,
    spake2p_salt_base64: Option<String>,
    spake2p_iterations: u32,
}

impl TryFrom<OptionsFile> for CommissioningOptions {
    type Error = ConfigError;

    fn try_from(file: OptionsFile) -> Result<Self, Self::Error> {
        if file.passcode > MAX_SETUP_PASSCODE_VALUE {
            return Err(ConfigError::PasscodeOutOfRange(file.passcode));
        }
        let spake2p_verifier =
            decode_base64("spake2p-verifier-base64", file.spake2p_verifier_base64)?;
        let spake2p_salt = decode_base64("spake2p-salt-base64", file.spake2p_salt_base64)?;

        Ok(Self {
            passcode: file.passcode,
            discriminator: file.discriminator,
            spake2p_verifier,
            spake2p_salt,
            spake2p_iterations: file.spake2p_iterations,
            payload: PayloadContents {
                version: file.version,
                vendor_id: file.vendor_id,
                product_id: file.product_id,
                commissioning_flow: CommissioningFlow::from_bits(file.custom_flow),
                discovery_capabilities: DiscoveryCapabilities::from_bits_truncate(
                    file.capabilities,
                ),
                discriminator: file.discriminator,
                setup_pin_code: file.passcode,
            },
        })
    }
}

fn decode_base64(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<Vec<u8>>, ConfigError> {
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(encoded) => base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map(Some)
            .map_err(|source| ConfigError::Base64 { field, source }),
    }
}
