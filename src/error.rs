//! Errors returned while provisioning commissioning credentials.

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied configuration that fails a validation rule.
    InvalidArgument,
    /// The operation was called in the wrong lifecycle phase.
    IncorrectState,
    /// The operation or value is permanently unavailable.
    NotImplemented,
    /// A stored invariant was found broken. Treat as fatal.
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),
    #[error("incorrect state")]
    IncorrectState,
    #[error("not implemented")]
    NotImplemented,
    #[error("internal error: {0}")]
    Internal(&'static str),
    #[error(transparent)]
    Verifier(#[from] VerifierError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::IncorrectState => ErrorKind::IncorrectState,
            Error::NotImplemented => ErrorKind::NotImplemented,
            Error::Internal(_) => ErrorKind::Internal,
            Error::Verifier(e) => e.kind(),
        }
    }
}

/// The validation rule an input broke.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidArgument {
    #[error("discriminator {0} exceeds 12 bits")]
    DiscriminatorOutOfRange(u16),
    #[error("passcode {0} exceeds 27 bits")]
    PasscodeOutOfRange(u32),
    #[error("PBKDF iteration count {0} out of range")]
    IterationCountOutOfRange(u32),
    #[error("PASE verifier size invalid: {0}")]
    VerifierLength(usize),
    #[error("got a PASE verifier without its salt")]
    VerifierWithoutSalt,
    #[error("PASE salt length invalid: {0}")]
    SaltLength(usize),
    #[error("missing both passcode and verifier")]
    MissingPasscodeAndVerifier,
    #[error("verifier derived from passcode does not match the provided verifier")]
    VerifierMismatch,
}

/// Failures of the SPAKE2+ verifier codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifierError {
    #[error("serialized verifier must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("W0 is not a valid P-256 scalar")]
    InvalidScalar,
    #[error("L is not an uncompressed P-256 point")]
    InvalidPoint,
    #[error("output buffer must be {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },
    #[error("PBKDF2 key derivation failed")]
    Kdf,
}

impl VerifierError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VerifierError::Kdf => ErrorKind::Internal,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

/// Errors loading [`CommissioningOptions`](crate::config::CommissioningOptions).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid options document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} is not valid base64: {source}")]
    Base64 {
        field: &'static str,
        source: base64::DecodeError,
    },
    #[error("passcode {0} exceeds 27 bits")]
    PasscodeOutOfRange(u32),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
