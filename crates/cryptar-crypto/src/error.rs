use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

/// Failures surfaced by sealing and opening.
///
/// `Decrypt` carries nothing: truncation, tampering and a wrong
/// passphrase must be indistinguishable to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("secure random source failed")]
    Randomness,

    #[error("encryption failed")]
    Encrypt,

    #[error("decryption failed")]
    Decrypt,

    #[error("invalid key derivation parameters: {0}")]
    InvalidCost(String),
}
