//! Passphrase envelopes: salt, key derivation and AEAD in one blob
//!
//! Envelope format (binary):
//! ```text
//! [32 bytes: salt][24 bytes: nonce][N bytes: ciphertext][16 bytes: tag]
//! ```
//!
//! Nothing else is stored. The KDF cost is not recorded, so an envelope can
//! only be opened with the parameters it was sealed with.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::cipher;
use crate::error::{CryptoError, CryptoResult};
use crate::kdf::{derive_key, CostParams, CostPreset};
use crate::{OVERHEAD, SALT_SIZE};

/// Length of the envelope produced for a plaintext of `plaintext_len` bytes.
pub fn sealed_len(plaintext_len: usize) -> usize {
    plaintext_len + OVERHEAD
}

/// Seal `plaintext` under `passphrase`, drawing salt and nonce from the OS RNG.
pub fn seal(passphrase: &[u8], plaintext: &[u8], cost: &CostParams) -> CryptoResult<Vec<u8>> {
    seal_with_rng(passphrase, plaintext, cost, &mut OsRng)
}

/// Seal `plaintext` under `passphrase`, drawing salt and nonce from `rng`.
///
/// If `rng` fails for either value the call returns
/// [`CryptoError::Randomness`] and no envelope bytes.
pub fn seal_with_rng<R>(
    passphrase: &[u8],
    plaintext: &[u8],
    cost: &CostParams,
    rng: &mut R,
) -> CryptoResult<Vec<u8>>
where
    R: RngCore + CryptoRng,
{
    let mut salt = [0u8; SALT_SIZE];
    rng.try_fill_bytes(&mut salt)
        .map_err(|_| CryptoError::Randomness)?;

    let key = derive_key(passphrase, &salt, cost)?;
    let sealed = cipher::encrypt_with_rng(&key, plaintext, rng);
    drop(key);
    let sealed = sealed?;

    let mut envelope = Vec::with_capacity(SALT_SIZE + sealed.len());
    envelope.extend_from_slice(&salt);
    envelope.extend_from_slice(&sealed);

    tracing::debug!(
        plaintext_len = plaintext.len(),
        envelope_len = envelope.len(),
        "sealed envelope"
    );
    Ok(envelope)
}

/// Recover the plaintext of an envelope produced by [`seal`].
///
/// Envelopes shorter than [`OVERHEAD`] are rejected before any key is
/// derived. Malformed input, a wrong passphrase and corrupted bytes all give
/// [`CryptoError::Decrypt`]. There are no retries.
pub fn open(passphrase: &[u8], envelope: &[u8], cost: &CostParams) -> CryptoResult<Vec<u8>> {
    if envelope.len() < OVERHEAD {
        return Err(CryptoError::Decrypt);
    }

    let (salt, sealed) = envelope.split_at(SALT_SIZE);
    let salt: &[u8; SALT_SIZE] = salt.try_into().map_err(|_| CryptoError::Decrypt)?;

    let key = derive_key(passphrase, salt, cost)?;
    let plaintext = cipher::decrypt(&key, sealed);
    drop(key);

    let plaintext = plaintext?;
    tracing::debug!(
        envelope_len = envelope.len(),
        plaintext_len = plaintext.len(),
        "opened envelope"
    );
    Ok(plaintext)
}

/// Immutable sealing context: the KDF cost is fixed when it is built.
///
/// Cheap to copy and safe to share between threads; each call owns its own
/// salt, nonce and key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sealer {
    cost: CostParams,
}

impl Sealer {
    /// Build a sealer, rejecting parameters Argon2 would refuse.
    pub fn new(cost: CostParams) -> CryptoResult<Self> {
        cost.validate()?;
        Ok(Self { cost })
    }

    pub fn from_preset(preset: CostPreset) -> Self {
        Self {
            cost: preset.params(),
        }
    }

    pub fn cost(&self) -> &CostParams {
        &self.cost
    }

    pub fn seal(&self, passphrase: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        seal(passphrase, plaintext, &self.cost)
    }

    pub fn seal_with_rng<R>(
        &self,
        passphrase: &[u8],
        plaintext: &[u8],
        rng: &mut R,
    ) -> CryptoResult<Vec<u8>>
    where
        R: RngCore + CryptoRng,
    {
        seal_with_rng(passphrase, plaintext, &self.cost, rng)
    }

    pub fn open(&self, passphrase: &[u8], envelope: &[u8]) -> CryptoResult<Vec<u8>> {
        open(passphrase, envelope, &self.cost)
    }
}
