//! Secret-material erasure
//!
//! Zeroing goes through `zeroize`, which performs volatile writes followed by
//! a compiler fence, so the stores survive dead-store elimination even when
//! the buffer is never read again.

use zeroize::Zeroize;

/// Overwrite every byte of `buf` with zero.
pub fn erase(buf: &mut [u8]) {
    #[cfg(test)]
    let before = buf.to_vec();

    buf.zeroize();

    #[cfg(test)]
    audit::record(before, buf);
}
