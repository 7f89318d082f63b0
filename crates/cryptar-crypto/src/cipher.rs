//! XChaCha20-Poly1305 encryption/decryption under a derived key
//!
//! Sealed format (binary):
//! ```text
//! [24 bytes: random nonce][N bytes: ciphertext][16 bytes: Poly1305 tag]
//! ```
//!
//! The nonce travels with its ciphertext so a sealed buffer is self-describing.
//! 192-bit random nonces make collisions under one key negligible.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::Key;
use crate::{NONCE_SIZE, TAG_SIZE};

/// Encrypt `plaintext` under `key` with a fresh nonce from the OS RNG.
///
/// Returns: `[24-byte nonce][ciphertext][16-byte tag]`
pub fn encrypt(key: &Key, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    encrypt_with_rng(key, plaintext, &mut OsRng)
}

/// Encrypt `plaintext` under `key`, drawing the nonce from `rng`.
///
/// Fails with [`CryptoError::Randomness`] if `rng` cannot supply the nonce.
pub fn encrypt_with_rng<R>(key: &Key, plaintext: &[u8], rng: &mut R) -> CryptoResult<Vec<u8>>
where
    R: RngCore + CryptoRng,
{
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rng.try_fill_bytes(&mut nonce_bytes)
        .map_err(|_| CryptoError::Randomness)?;
    let nonce = XNonce::from_slice(&nonce_bytes);

    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::Encrypt)?;

    let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);
    Ok(result)
}

/// Decrypt `[24-byte nonce][ciphertext][16-byte tag]` under `key`.
///
/// Input too short to hold a nonce and tag is rejected before any cipher
/// work. Every failure is the same [`CryptoError::Decrypt`].
pub fn decrypt(key: &Key, input: &[u8]) -> CryptoResult<Vec<u8>> {
    if input.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::Decrypt);
    }

    let (nonce_bytes, ciphertext) = input.split_at(NONCE_SIZE);
    let nonce = XNonce::from_slice(nonce_bytes);
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::Decrypt)
}
