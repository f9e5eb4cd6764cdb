//! PASE commissioning credentials for Matter devices.
//!
//! Validates the setup passcode, discriminator and SPAKE2+ parameters a
//! device is configured with, and exposes the result read-only to the
//! session establishment and discovery layers.
//!
//! ```no_run
//! use matter_commissioning::{
//!     commissionable_data::{CommissionableDataCell, CommissionableDataProvider},
//!     config::CommissioningOptions,
//! };
//!
//! let commissionable_data = CommissionableDataCell::new();
//!
//! let mut options = CommissioningOptions::from_json_str(r#"{"passcode": 34567890}"#).unwrap();
//! let data = commissionable_data
//!     .initialize_from_options(&mut options)
//!     .unwrap();
//! assert_eq!(data.setup_passcode().unwrap(), 34567890);
//! ```

/// Commissionable data providers
pub mod commissionable_data;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod error;

pub use error::{Error, ErrorKind, Result};
