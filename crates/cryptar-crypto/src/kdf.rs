//! Key derivation: Argon2id passphrase + salt → envelope key

use std::time::Instant;

use argon2::{Algorithm, Argon2, Params, Version};

use crate::erase::erase;
use crate::error::{CryptoError, CryptoResult};
use crate::{KEY_SIZE, SALT_SIZE};

/// A 256-bit key derived from a passphrase via Argon2id.
///
/// Not `Clone`: each derivation owns exactly one copy, and that copy is
/// erased on drop.
pub struct Key {
    bytes: [u8; KEY_SIZE],
}

impl Key {
    /// Wrap raw key bytes. The caller's copy of `bytes` is not erased.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    fn zeroed() -> Self {
        Self {
            bytes: [0u8; KEY_SIZE],
        }
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        erase(&mut self.bytes);
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Key").field("bytes", &"[REDACTED]").finish()
    }
}

/// Named cost settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CostPreset {
    /// High cost for archives: ~1 GiB of memory, seconds per derivation.
    #[default]
    Archival,
    /// Low cost for frequent use: 64 MiB, well under a second.
    Interactive,
}

impl CostPreset {
    pub fn params(self) -> CostParams {
        match self {
            Self::Archival => CostParams {
                mem_cost_kib: 1024 * 1024,
                time_cost: 4,
                parallelism: 1,
            },
            Self::Interactive => CostParams {
                mem_cost_kib: 64 * 1024,
                time_cost: 3,
                parallelism: 4,
            },
        }
    }
}

/// Argon2id parameters for KDF.
///
/// Not stored in the envelope: opening must use the same parameters that
/// sealing used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostParams {
    /// Memory cost in KiB
    pub mem_cost_kib: u32,
    /// Time cost / iterations
    pub time_cost: u32,
    /// Parallelism (lanes)
    pub parallelism: u32,
}

impl Default for CostParams {
    fn default() -> Self {
        CostPreset::default().params()
    }
}

impl From<CostPreset> for CostParams {
    fn from(preset: CostPreset) -> Self {
        preset.params()
    }
}

impl CostParams {
    pub fn new(mem_cost_kib: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            mem_cost_kib,
            time_cost,
            parallelism,
        }
    }

    /// Check the parameters against Argon2's limits without deriving anything.
    pub fn validate(&self) -> CryptoResult<()> {
        self.argon2_params().map(|_| ())
    }

    fn argon2_params(&self) -> CryptoResult<Params> {
        Params::new(
            self.mem_cost_kib,
            self.time_cost,
            self.parallelism,
            Some(KEY_SIZE),
        )
        .map_err(|e| CryptoError::InvalidCost(e.to_string()))
    }
}

/// Derive a 256-bit key from a passphrase and salt using Argon2id.
///
/// Deterministic: the same passphrase, salt and parameters always give the
/// same key. Invalid parameters are an error, never a fallback to cheaper
/// ones.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8; SALT_SIZE],
    cost: &CostParams,
) -> CryptoResult<Key> {
    let params = cost.argon2_params()?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    #[cfg(test)]
    derivations::count();

    let started = Instant::now();
    // Hash straight into the key so a failure leaves nothing but an erased buffer.
    let mut key = Key::zeroed();
    argon2
        .hash_password_into(passphrase, salt, &mut key.bytes)
        .map_err(|e| CryptoError::InvalidCost(e.to_string()))?;

    tracing::debug!(
        mem_cost_kib = cost.mem_cost_kib,
        time_cost = cost.time_cost,
        parallelism = cost.parallelism,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "derived envelope key"
    );

    Ok(key)
}

/// Per-thread derivation counter, so tests can prove a path never derived.
#[cfg(test)]
pub(crate) mod derivations {
    use std::cell::Cell;

    thread_local! {
        static DERIVATIONS: Cell<usize> = const { Cell::new(0) };
    }

    pub(crate) fn count() {
        DERIVATIONS.with(|n| n.set(n.get() + 1));
    }

    pub(crate) fn total() -> usize {
        DERIVATIONS.with(Cell::get)
    }
}
