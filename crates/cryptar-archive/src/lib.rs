//! cryptar-archive: pack file trees into compressed bundles and back
//!
//! # Overview
//! - `bundle`: tar stream of regular files and directories (`pack_paths`,
//!   `unpack`, `list`)
//! - `compress`: zstd around the tar stream
//!
//! A bundle is opaque bytes to the envelope layer: it is what gets sealed,
//! and what `open` hands back.

pub mod bundle;
pub mod compress;

pub use bundle::{list, pack_paths, unpack, Packed};
pub use compress::{compress, decompress, DEFAULT_LEVEL};
