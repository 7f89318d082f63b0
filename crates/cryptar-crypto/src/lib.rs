//! cryptar-crypto: passphrase-sealed envelopes for archives at rest
//!
//! Architecture: Argon2id-derived key + XChaCha20-Poly1305
//!
//! Pipeline: passphrase + random salt → Argon2id → key → random nonce → AEAD
//!
//! Envelope layout:
//! ```text
//! [32 bytes: Argon2id salt][24 bytes: XChaCha20 nonce][N bytes: ciphertext][16 bytes: Poly1305 tag]
//! ```
//!
//! The derived key never outlives the call that produced it: [`Key`] erases
//! itself on drop, so every exit path (success, `?`, unwinding) zeroes it.

pub mod cipher;
pub mod envelope;
pub mod erase;
pub mod error;
pub mod kdf;

pub use cipher::{decrypt, encrypt, encrypt_with_rng};
pub use envelope::{open, seal, seal_with_rng, sealed_len, Sealer};
pub use erase::erase;
pub use error::{CryptoError, CryptoResult};
pub use kdf::{derive_key, CostParams, CostPreset, Key};

/// Size of a derived key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of the Argon2id salt stored at the front of every envelope
pub const SALT_SIZE: usize = 32;

/// Size of an XChaCha20-Poly1305 nonce (192-bit)
pub const NONCE_SIZE: usize = 24;

/// Size of a Poly1305 authentication tag
pub const TAG_SIZE: usize = 16;

/// Bytes an envelope adds on top of its plaintext
pub const OVERHEAD: usize = SALT_SIZE + NONCE_SIZE + TAG_SIZE;
