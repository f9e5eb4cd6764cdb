use once_cell::sync::OnceCell;

use crate::config::CommissioningOptions;
use crate::error::{Error, Result};

use super::{CommissionableData, CommissionableDataBuilder, CommissionableDataProvider};

/// Holds the process' commissionable data, which can be set exactly once.
///
/// Create one at startup and hand out references. Concurrent initializers
/// are serialized; only the first one runs.
#[derive(Debug, Default)]
pub struct CommissionableDataCell {
    data: OnceCell<CommissionableData>,
}

impl CommissionableDataCell {
    pub const fn new() -> Self {
        Self {
            data: OnceCell::new(),
        }
    }

    /// Fails with [`Error::IncorrectState`] if the cell is already initialized.
    /// A failed build leaves the cell empty.
    pub fn initialize(&self, builder: CommissionableDataBuilder) -> Result<&CommissionableData> {
        let mut ran = false;
        let data = self.data.get_or_try_init(|| {
            ran = true;
            builder.build()
        })?;
        if !ran {
            tracing::error!("Commissionable data is already initialized");
            return Err(Error::IncorrectState);
        }
        Ok(data)
    }

    /// Resolve test defaults into `options`, then initialize from them.
    pub fn initialize_from_options(
        &self,
        options: &mut CommissioningOptions,
    ) -> Result<&CommissionableData> {
        if self.is_initialized() {
            return Err(Error::IncorrectState);
        }
        options.resolve_defaults();
        self.initialize(CommissionableDataBuilder::from_options(options))
    }

    /// Return the stored data, running `f` if nothing is stored yet.
    pub fn get_or_try_init<F>(&self, f: F) -> Result<&CommissionableData>
    where
        F: FnOnce() -> Result<CommissionableData>,
    {
        self.data.get_or_try_init(f)
    }

    pub fn get(&self) -> Result<&CommissionableData> {
        self.data.get().ok_or(Error::IncorrectState)
    }

    pub fn is_initialized(&self) -> bool {
        self.data.get().is_some()
    }
}

impl CommissionableDataProvider for CommissionableDataCell {
    fn setup_discriminator(&self) -> Result<u16> {
        self.get()?.setup_discriminator()
    }

    fn spake2p_iteration_count(&self) -> Result<u32> {
        self.get()?.spake2p_iteration_count()
    }

    fn spake2p_salt(&self) -> Result<&[u8]> {
        self.get()?.spake2p_salt()
    }

    fn spake2p_verifier(&self) -> Result<&[u8]> {
        self.get()?.spake2p_verifier()
    }

    fn setup_passcode(&self) -> Result<u32> {
        self.get()?.setup_passcode()
    }
}
