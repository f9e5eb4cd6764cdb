use rand::{CryptoRng, RngCore};

use crate::config::CommissioningOptions;
use crate::constants::*;
use crate::crypto::{constant_time_eq, fill_random, spake2p::Spake2pVerifier};
use crate::error::{Error, InvalidArgument, Result};

use super::CommissionableDataProvider;

/// Collects commissioning inputs and validates them into [`CommissionableData`].
///
/// Zero passcode or iteration count, and empty salt or verifier, all mean
/// "not configured".
#[derive(Clone, Default)]
pub struct CommissionableDataBuilder {
    discriminator: u16,
    passcode: u32,
    iteration_count: u32,
    salt: Option<Vec<u8>>,
    verifier: Option<Vec<u8>>,
}

impl CommissionableDataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the options as they are. Run
    /// [`CommissioningOptions::resolve_defaults`] first to apply test defaults.
    pub fn from_options(options: &CommissioningOptions) -> Self {
        Self {
            discriminator: options.discriminator,
            passcode: options.passcode,
            iteration_count: options.spake2p_iterations,
            salt: options.spake2p_salt.clone(),
            verifier: options.spake2p_verifier.clone(),
        }
    }

    pub fn discriminator(mut self, discriminator: u16) -> Self {
        self.discriminator = discriminator;
        self
    }

    pub fn passcode(mut self, passcode: u32) -> Self {
        self.passcode = passcode;
        self
    }

    pub fn iteration_count(mut self, iteration_count: u32) -> Self {
        self.iteration_count = iteration_count;
        self
    }

    pub fn salt(mut self, salt: impl Into<Vec<u8>>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    /// A serialized SPAKE2+ verifier supplied from outside, e.g. by a
    /// manufacturing tool. It requires the salt it was generated with.
    pub fn verifier(mut self, verifier: impl Into<Vec<u8>>) -> Self {
        self.verifier = Some(verifier.into());
        self
    }

    /// Validate with salts drawn from the thread-local CSPRNG.
    pub fn build(self) -> Result<CommissionableData> {
        self.build_with_rng(&mut rand::thread_rng())
    }

    pub fn build_with_rng<R: RngCore + CryptoRng>(self, rng: &mut R) -> Result<CommissionableData> {
        if self.discriminator > MAX_DISCRIMINATOR_VALUE {
            tracing::error!(discriminator = self.discriminator, "Discriminator value invalid");
            return Err(InvalidArgument::DiscriminatorOutOfRange(self.discriminator).into());
        }
        if self.passcode > MAX_SETUP_PASSCODE_VALUE {
            tracing::error!("Setup passcode exceeds 27 bits");
            return Err(InvalidArgument::PasscodeOutOfRange(self.passcode).into());
        }

        let iteration_count = if self.iteration_count == 0 {
            SPAKE2P_DEFAULT_PBKDF_ITERATIONS
        } else {
            self.iteration_count
        };
        if !(SPAKE2P_MIN_PBKDF_ITERATIONS..=SPAKE2P_MAX_PBKDF_ITERATIONS).contains(&iteration_count)
        {
            tracing::error!(iteration_count, "PASE iteration count invalid");
            return Err(InvalidArgument::IterationCountOutOfRange(iteration_count).into());
        }
        tracing::debug!(iteration_count, "PASE PBKDF iterations set");

        let external_verifier = self.verifier.filter(|verifier| !verifier.is_empty());
        if let Some(verifier) = &external_verifier {
            if verifier.len() != SPAKE2P_VERIFIER_SERIALIZED_LENGTH {
                tracing::error!(len = verifier.len(), "PASE verifier size invalid");
                return Err(InvalidArgument::VerifierLength(verifier.len()).into());
            }
            if let Err(e) = Spake2pVerifier::deserialize(verifier) {
                tracing::error!(error = %e, "Failed to deserialize PASE verifier");
                return Err(e.into());
            }
            tracing::info!("Got externally provided verifier, using it");
        }

        let salt = self.salt.filter(|salt| !salt.is_empty());
        if external_verifier.is_some() && salt.is_none() {
            tracing::error!("Got a PASE verifier without a PASE salt: ambiguous data");
            return Err(InvalidArgument::VerifierWithoutSalt.into());
        }

        let salt = match salt {
            Some(salt) => {
                if !(SPAKE2P_MIN_PBKDF_SALT_LENGTH..=SPAKE2P_MAX_PBKDF_SALT_LENGTH)
                    .contains(&salt.len())
                {
                    tracing::error!(len = salt.len(), "PASE salt length invalid");
                    return Err(InvalidArgument::SaltLength(salt.len()).into());
                }
                salt
            }
            None => {
                tracing::info!("No PASE salt configured, generating one");
                generate_pase_salt(rng)
            }
        };

        let passcode = (self.passcode != 0).then_some(self.passcode);
        let passcode_verifier = match passcode {
            Some(passcode) => {
                let verifier = Spake2pVerifier::generate(iteration_count, &salt, passcode)
                    .map_err(|e| {
                        tracing::error!(error = %e, "Failed to generate PASE verifier from passcode");
                        e
                    })?;
                let mut serialized = [0u8; SPAKE2P_VERIFIER_SERIALIZED_LENGTH];
                verifier.serialize(&mut serialized).map_err(|e| {
                    tracing::error!(error = %e, "Failed to serialize PASE verifier from passcode");
                    e
                })?;
                Some(serialized)
            }
            None => None,
        };

        let final_verifier: &[u8] = match (&external_verifier, &passcode_verifier) {
            (None, None) => {
                tracing::error!("Missing both externally provided verifier and passcode");
                return Err(InvalidArgument::MissingPasscodeAndVerifier.into());
            }
            (Some(external), Some(derived)) => {
                if !constant_time_eq(external, derived) {
                    tracing::error!("Mismatching verifier between passcode and external verifier");
                    return Err(InvalidArgument::VerifierMismatch.into());
                }
                tracing::info!("Externally provided verifier matches the passcode");
                external.as_slice()
            }
            (Some(external), None) => external.as_slice(),
            (None, Some(derived)) => &derived[..],
        };

        let verifier =
            heapless::Vec::from_slice(final_verifier).map_err(|_| Error::Internal("verifier"))?;
        let salt = heapless::Vec::from_slice(&salt).map_err(|_| Error::Internal("salt"))?;

        tracing::info!(
            discriminator = self.discriminator,
            iteration_count,
            salt_len = salt.len(),
            has_passcode = passcode.is_some(),
            "Commissionable data initialized"
        );

        Ok(CommissionableData {
            discriminator: self.discriminator,
            passcode,
            verifier,
            salt,
            iteration_count,
        })
    }
}

impl core::fmt::Debug for CommissionableDataBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommissionableDataBuilder")
            .field("discriminator", &self.discriminator)
            .field("has_passcode", &(self.passcode != 0))
            .field("iteration_count", &self.iteration_count)
            .field("salt", &self.salt.as_ref().map(hex::encode))
            .field("verifier", &self.verifier.as_ref().map(hex::encode))
            .finish()
    }
}

fn generate_pase_salt<R: RngCore + CryptoRng>(rng: &mut R) -> Vec<u8> {
    let mut salt = vec![0u8; SPAKE2P_GENERATED_SALT_LENGTH];
    fill_random(rng, &mut salt);
    salt
}

/// Validated PASE material. Cannot be changed once built.
#[derive(Clone, PartialEq, Eq)]
pub struct CommissionableData {
    discriminator: u16,
    passcode: Option<u32>,
    verifier: heapless::Vec<u8, SPAKE2P_VERIFIER_SERIALIZED_LENGTH>,
    salt: heapless::Vec<u8, SPAKE2P_MAX_PBKDF_SALT_LENGTH>,
    iteration_count: u32,
}

impl CommissionableData {
    pub fn builder() -> CommissionableDataBuilder {
        CommissionableDataBuilder::new()
    }
}

impl CommissionableDataProvider for CommissionableData {
    fn setup_discriminator(&self) -> Result<u16> {
        Ok(self.discriminator)
    }

    fn spake2p_iteration_count(&self) -> Result<u32> {
        Ok(self.iteration_count)
    }

    fn spake2p_salt(&self) -> Result<&[u8]> {
        Ok(self.salt.as_slice())
    }

    fn spake2p_verifier(&self) -> Result<&[u8]> {
        if self.verifier.len() != SPAKE2P_VERIFIER_SERIALIZED_LENGTH {
            tracing::error!(len = self.verifier.len(), "Stored PASE verifier has the wrong size");
            return Err(Error::Internal("stored verifier length"));
        }
        Ok(self.verifier.as_slice())
    }

    /// Fails with [`Error::NotImplemented`] when only a verifier was provided.
    fn setup_passcode(&self) -> Result<u32> {
        self.passcode.ok_or(Error::NotImplemented)
    }
}

impl core::fmt::Debug for CommissionableData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommissionableData")
            .field("discriminator", &self.discriminator)
            .field("has_passcode", &self.passcode.is_some())
            .field("iteration_count", &self.iteration_count)
            .field("salt", &hex::encode(&self.salt))
            .field("verifier", &hex::encode(&self.verifier))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::error::{ErrorKind, VerifierError};

    const SALT: &[u8] = b"SPAKE2P Key Salt";

    fn valid_verifier() -> [u8; SPAKE2P_VERIFIER_SERIALIZED_LENGTH] {
        Spake2pVerifier::generate(1000, SALT, 20202021)
            .unwrap()
            .to_bytes()
    }

    fn invalid_argument(result: Result<CommissionableData>) -> InvalidArgument {
        match result {
            Err(Error::InvalidArgument(reason)) => reason,
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_passcode_only() {
        // passcode=20202021, discriminator=3840, nothing else configured
        let data = CommissionableData::builder()
            .passcode(20202021)
            .discriminator(3840)
            .build()
            .unwrap();

        assert_eq!(data.setup_discriminator().unwrap(), 3840);
        assert_eq!(
            data.spake2p_iteration_count().unwrap(),
            SPAKE2P_DEFAULT_PBKDF_ITERATIONS
        );
        let salt = data.spake2p_salt().unwrap();
        assert!((16..=32).contains(&salt.len()));
        assert_eq!(
            data.spake2p_verifier().unwrap().len(),
            SPAKE2P_VERIFIER_SERIALIZED_LENGTH
        );
        assert_eq!(data.setup_passcode().unwrap(), 20202021);

        // The stored verifier belongs to the generated salt
        let expected = Spake2pVerifier::generate(1000, salt, 20202021).unwrap();
        assert_eq!(data.spake2p_verifier().unwrap(), &expected.to_bytes()[..]);
    }

    #[test]
    fn test_known_salt_gives_known_verifier() {
        let data = CommissionableData::builder()
            .passcode(20202021)
            .salt(SALT)
            .iteration_count(1000)
            .build()
            .unwrap();
        assert_eq!(data.spake2p_verifier().unwrap(), &valid_verifier()[..]);
        assert_eq!(data.spake2p_salt().unwrap(), SALT);
    }

    #[test]
    fn test_verifier_only() {
        let data = CommissionableData::builder()
            .verifier(&valid_verifier()[..])
            .salt(SALT)
            .iteration_count(1000)
            .discriminator(0xABC)
            .build()
            .unwrap();
        assert_eq!(data.spake2p_verifier().unwrap(), &valid_verifier()[..]);
        assert_eq!(data.setup_discriminator().unwrap(), 0xABC);
        assert_eq!(data.setup_short_discriminator().unwrap(), 0xA);
        let err = data.setup_passcode().unwrap_err();
        assert_eq!(err, Error::NotImplemented);
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
    }

    #[test]
    fn test_passcode_and_matching_verifier() {
        let data = CommissionableData::builder()
            .passcode(20202021)
            .verifier(&valid_verifier()[..])
            .salt(SALT)
            .iteration_count(1000)
            .build()
            .unwrap();
        assert_eq!(data.setup_passcode().unwrap(), 20202021);
        assert_eq!(data.spake2p_verifier().unwrap(), &valid_verifier()[..]);
    }

    #[test]
    fn test_passcode_and_mismatching_verifier() {
        let builder = CommissionableData::builder()
            .verifier(&valid_verifier()[..])
            .salt(SALT)
            .iteration_count(1000);

        let result = builder.clone().passcode(20202022).build();
        assert_eq!(invalid_argument(result), InvalidArgument::VerifierMismatch);

        // Same passcode, but the verifier was made with another iteration count
        let result = builder.passcode(20202021).iteration_count(2000).build();
        assert_eq!(invalid_argument(result), InvalidArgument::VerifierMismatch);
    }

    #[test]
    fn test_discriminator_range() {
        for discriminator in [0, 1, 0x800, 0xFFF] {
            let data = CommissionableData::builder()
                .passcode(20202021)
                .salt(SALT)
                .discriminator(discriminator)
                .build()
                .unwrap();
            assert_eq!(data.setup_discriminator().unwrap(), discriminator);
        }
        for discriminator in [0x1000, 0x8000, u16::MAX] {
            let result = CommissionableData::builder()
                .passcode(20202021)
                .salt(SALT)
                .discriminator(discriminator)
                .build();
            assert_eq!(
                invalid_argument(result),
                InvalidArgument::DiscriminatorOutOfRange(discriminator)
            );
        }
    }

    #[test]
    fn test_discriminator_checked_first() {
        // passcode=20202021, discriminator=4096
        let result = CommissionableData::builder()
            .passcode(20202021)
            .discriminator(4096)
            .iteration_count(1)
            .build();
        assert_eq!(
            invalid_argument(result),
            InvalidArgument::DiscriminatorOutOfRange(4096)
        );
    }

    #[test]
    fn test_iteration_count_range() {
        for iteration_count in [1, 999, 100001, u32::MAX] {
            let result = CommissionableData::builder()
                .passcode(20202021)
                .iteration_count(iteration_count)
                .build();
            assert_eq!(
                invalid_argument(result),
                InvalidArgument::IterationCountOutOfRange(iteration_count)
            );
        }

        for iteration_count in [1000, 1500] {
            let data = CommissionableData::builder()
                .passcode(20202021)
                .iteration_count(iteration_count)
                .build()
                .unwrap();
            assert_eq!(data.spake2p_iteration_count().unwrap(), iteration_count);
        }

        // The upper bound without paying for 100000 PBKDF rounds
        let verifier = Spake2pVerifier::deserialize(&valid_verifier()).unwrap();
        let data = CommissionableData::builder()
            .verifier(&verifier.to_bytes()[..])
            .salt(SALT)
            .iteration_count(SPAKE2P_MAX_PBKDF_ITERATIONS)
            .build()
            .unwrap();
        assert_eq!(
            data.spake2p_iteration_count().unwrap(),
            SPAKE2P_MAX_PBKDF_ITERATIONS
        );
    }

    #[test]
    fn test_salt_length() {
        for len in [1, 15, 33, 64] {
            let result = CommissionableData::builder()
                .passcode(20202021)
                .salt(vec![0x5a; len])
                .build();
            assert_eq!(invalid_argument(result), InvalidArgument::SaltLength(len));
        }
        for len in [16, 24, 32] {
            let data = CommissionableData::builder()
                .passcode(20202021)
                .salt(vec![0x5a; len])
                .build()
                .unwrap();
            assert_eq!(data.spake2p_salt().unwrap(), &vec![0x5a; len][..]);
        }
    }

    #[test]
    fn test_empty_salt_is_generated() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = CommissionableData::builder()
            .passcode(20202021)
            .salt(Vec::new())
            .build_with_rng(&mut rng)
            .unwrap();
        let b = CommissionableData::builder()
            .passcode(20202021)
            .build_with_rng(&mut rng)
            .unwrap();
        assert_eq!(
            a.spake2p_salt().unwrap().len(),
            SPAKE2P_GENERATED_SALT_LENGTH
        );
        assert_ne!(a.spake2p_salt().unwrap(), b.spake2p_salt().unwrap());
        assert_ne!(a.spake2p_verifier().unwrap(), b.spake2p_verifier().unwrap());
    }

    #[test]
    fn test_verifier_without_salt() {
        // Rejected whether or not the verifier itself is usable
        let verifiers = [
            valid_verifier().to_vec(),
            vec![0xff; SPAKE2P_VERIFIER_SERIALIZED_LENGTH],
            vec![0u8; 32],
        ];
        for verifier in verifiers {
            let result = CommissionableData::builder()
                .passcode(20202021)
                .verifier(verifier)
                .build();
            assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidArgument);
        }

        let result = CommissionableData::builder()
            .verifier(&valid_verifier()[..])
            .build();
        assert_eq!(invalid_argument(result), InvalidArgument::VerifierWithoutSalt);
    }

    #[test]
    fn test_verifier_length() {
        for len in [1, 32, 65, 96, 98] {
            // 32 byte verifier with a 16 byte salt at 1000 iterations
            let result = CommissionableData::builder()
                .verifier(vec![0u8; len])
                .salt(vec![0x11; 16])
                .iteration_count(1000)
                .build();
            assert_eq!(invalid_argument(result), InvalidArgument::VerifierLength(len));
        }
    }

    #[test]
    fn test_verifier_decode_error_is_propagated() {
        let mut verifier = valid_verifier();
        verifier[32] = 0x05;
        let err = CommissionableData::builder()
            .verifier(&verifier[..])
            .salt(SALT)
            .build()
            .unwrap_err();
        assert_eq!(err, Error::Verifier(VerifierError::InvalidPoint));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_missing_passcode_and_verifier() {
        // salt only
        let result = CommissionableData::builder().salt(vec![0x11; 16]).build();
        assert_eq!(
            invalid_argument(result),
            InvalidArgument::MissingPasscodeAndVerifier
        );

        let result = CommissionableData::builder().verifier(Vec::new()).build();
        assert_eq!(
            invalid_argument(result),
            InvalidArgument::MissingPasscodeAndVerifier
        );
    }

    #[test]
    fn test_from_options() {
        let mut options = CommissioningOptions {
            spake2p_iterations: 1200,
            spake2p_salt: Some(SALT.to_vec()),
            ..Default::default()
        };
        options.resolve_defaults();
        let data = CommissionableDataBuilder::from_options(&options)
            .build()
            .unwrap();
        assert_eq!(data.setup_passcode().unwrap(), options.payload.setup_pin_code);
        assert_eq!(
            data.setup_discriminator().unwrap(),
            options.payload.discriminator
        );
        assert_eq!(data.spake2p_iteration_count().unwrap(), 1200);
    }

    #[test]
    fn test_passcode_width() {
        for passcode in [0x0800_0000, u32::MAX] {
            let result = CommissionableData::builder()
                .passcode(passcode)
                .salt(SALT)
                .build();
            assert_eq!(
                invalid_argument(result),
                InvalidArgument::PasscodeOutOfRange(passcode)
            );
        }

        let data = CommissionableData::builder()
            .passcode(MAX_SETUP_PASSCODE_VALUE)
            .salt(SALT)
            .build()
            .unwrap();
        assert_eq!(data.setup_passcode().unwrap(), MAX_SETUP_PASSCODE_VALUE);
    }

    #[test]
    fn test_wrong_stored_verifier_length_is_internal() {
        let data = CommissionableData {
            discriminator: 3840,
            passcode: None,
            verifier: heapless::Vec::from_slice(&valid_verifier()[..96]).unwrap(),
            salt: heapless::Vec::from_slice(SALT).unwrap(),
            iteration_count: 1000,
        };
        let err = data.spake2p_verifier().unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);
        // The other accessors are unaffected
        assert_eq!(data.setup_discriminator().unwrap(), 3840);
    }

    #[test]
    fn test_debug_hides_passcode() {
        let data = CommissionableData::builder()
            .passcode(20202021)
            .salt(SALT)
            .build()
            .unwrap();
        let builder = CommissionableData::builder().passcode(20202021);
        assert!(!format!("{data:?}").contains("20202021"));
        assert!(!format!("{builder:?}").contains("20202021"));
    }
}
