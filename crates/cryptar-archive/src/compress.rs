//! zstd compression for packed bundles
//!
//! A bundle is a single zstd frame around the whole tar stream. The envelope
//! needs the complete plaintext in memory anyway, so there is nothing to gain
//! from seekable frames here.

use anyhow::{Context, Result};

/// Default level: close to zstd's maximum, favouring size over pack time.
pub const DEFAULT_LEVEL: i32 = 19;

/// Compress `data` at `level` (1..=22).
pub fn compress(data: &[u8], level: i32) -> Result<Vec<u8>> {
    zstd::encode_all(data, level).context("zstd compress bundle")
}

/// Decompress a bundle produced by [`compress`].
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    zstd::decode_all(data).context("zstd decompress bundle")
}
