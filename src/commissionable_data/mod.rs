//! Commissionable data: the discriminator, passcode and SPAKE2+ parameters
//! a device uses to accept PASE sessions.

use crate::error::{Error, Result};

mod cell;
mod provider;
pub mod test_only;

pub use cell::CommissionableDataCell;
pub use provider::{CommissionableData, CommissionableDataBuilder};
pub use test_only::TestOnlyCommissionableData;

/// Read access to commissionable data, used by PASE and discovery.
pub trait CommissionableDataProvider {
    fn setup_discriminator(&self) -> Result<u16>;
    fn spake2p_iteration_count(&self) -> Result<u32>;
    fn spake2p_salt(&self) -> Result<&[u8]>;
    fn spake2p_verifier(&self) -> Result<&[u8]>;
    fn setup_passcode(&self) -> Result<u32>;

    /// Upper 4 bits of the discriminator, advertised during discovery.
    fn setup_short_discriminator(&self) -> Result<u8> {
        Ok((self.setup_discriminator()? >> 8) as u8)
    }
}

/// The provider a node runs with, chosen once at startup.
#[derive(Debug)]
pub enum CommissionableDataSource {
    Configured(CommissionableDataCell),
    TestOnly(TestOnlyCommissionableData),
}

impl Default for CommissionableDataSource {
    fn default() -> Self {
        Self::TestOnly(TestOnlyCommissionableData)
    }
}

impl CommissionableDataSource {
    /// An empty configured source, to be initialized before use.
    pub fn configured() -> Self {
        Self::Configured(CommissionableDataCell::new())
    }

    /// Test-only sources carry fixed data and can't be initialized.
    pub fn initialize(&self, builder: CommissionableDataBuilder) -> Result<&CommissionableData> {
        match self {
            Self::Configured(cell) => cell.initialize(builder),
            Self::TestOnly(_) => Err(Error::IncorrectState),
        }
    }

    fn provider(&self) -> &dyn CommissionableDataProvider {
        match self {
            Self::Configured(cell) => cell,
            Self::TestOnly(test_only) => test_only,
        }
    }
}

impl CommissionableDataProvider for CommissionableDataSource {
    fn setup_discriminator(&self) -> Result<u16> {
        self.provider().setup_discriminator()
    }

    fn spake2p_iteration_count(&self) -> Result<u32> {
        self.provider().spake2p_iteration_count()
    }

    fn spake2p_salt(&self) -> Result<&[u8]> {
        self.provider().spake2p_salt()
    }

    fn spake2p_verifier(&self) -> Result<&[u8]> {
        self.provider().spake2p_verifier()
    }

    fn setup_passcode(&self) -> Result<u32> {
        self.provider().setup_passcode()
    }
}
