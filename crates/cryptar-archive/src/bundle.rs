//! Tar bundles of regular files and directories
//!
//! Only regular files and directories are packed. Symlinks, sockets, FIFOs
//! and device nodes abort the pack with an error naming the offending path,
//! and are likewise refused when unpacking.
//!
//! Entry names are the given paths with root, prefix and `.` components
//! dropped, so `/home/me/.ssh/config` is stored as `home/me/.ssh/config`.

use anyhow::{bail, Context, Result};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::compress::{compress, decompress};

/// A packed, compressed bundle and the entry names written into it.
#[derive(Debug)]
pub struct Packed {
    pub bytes: Vec<u8>,
    pub entries: Vec<PathBuf>,
}

/// Walk each of `paths` and pack everything found into a zstd-compressed tar.
pub fn pack_paths<P: AsRef<Path>>(paths: &[P], level: i32) -> Result<Packed> {
    let mut builder = tar::Builder::new(Vec::new());
    builder.follow_symlinks(false);
    let mut entries = Vec::new();

    for root in paths {
        let root = root.as_ref();
        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = entry.with_context(|| format!("{} could not be read", root.display()))?;
            let path = entry.path();
            let file_type = entry.file_type();

            if !file_type.is_dir() && !file_type.is_file() {
                bail!(
                    "failed to pack {}: not a regular file or directory",
                    path.display()
                );
            }

            let name = entry_name(path)?;
            if name.as_os_str().is_empty() {
                // "." or "/" itself: its children carry the content
                continue;
            }

            if file_type.is_dir() {
                builder
                    .append_dir(&name, path)
                    .with_context(|| format!("packing directory {}", path.display()))?;
            } else {
                builder
                    .append_path_with_name(path, &name)
                    .with_context(|| format!("packing file {}", path.display()))?;
            }

            tracing::debug!(entry = %name.display(), "packed");
            entries.push(name);
        }
    }

    let tar = builder.into_inner().context("finishing tar stream")?;
    let bytes = compress(&tar, level)?;

    tracing::debug!(
        entries = entries.len(),
        tar_len = tar.len(),
        compressed_len = bytes.len(),
        "bundle packed"
    );
    Ok(Packed { bytes, entries })
}

/// Extract a bundle under `dest`, creating it if needed.
///
/// Every entry is checked before anything is written: entries that would land
/// outside `dest`, or that are neither regular files nor directories, abort
/// the unpack. Files are written first and directories applied afterwards,
/// deepest first, so a read-only directory does not block its own contents.
/// Returns the entry names in the order they were applied.
pub fn unpack(bundle: &[u8], dest: &Path) -> Result<Vec<PathBuf>> {
    let tar = decompress(bundle)?;
    check_entries(&tar, dest)?;

    let mut archive = tar::Archive::new(tar.as_slice());
    archive.set_preserve_permissions(true);

    std::fs::create_dir_all(dest)
        .with_context(|| format!("creating output directory {}", dest.display()))?;

    let mut names = Vec::new();
    let mut directories = Vec::new();
    for entry in archive.entries().context("reading bundle")? {
        let mut entry = entry.context("reading bundle entry")?;
        let name = entry.path().context("bundle entry name")?.into_owned();

        if entry.header().entry_type().is_dir() {
            directories.push((name, entry));
            continue;
        }
        apply(&mut entry, &name, dest)?;
        names.push(name);
    }

    directories.sort_by(|(a, _), (b, _)| b.cmp(a));
    for (name, mut entry) in directories {
        apply(&mut entry, &name, dest)?;
        names.push(name);
    }

    Ok(names)
}

/// Refuse the whole bundle if any entry is unsupported or escapes `dest`.
fn check_entries(tar: &[u8], dest: &Path) -> Result<()> {
    let mut archive = tar::Archive::new(tar);
    for entry in archive.entries().context("reading bundle")? {
        let entry = entry.context("reading bundle entry")?;
        let name = entry.path().context("bundle entry name")?;

        let kind = entry.header().entry_type();
        if !kind.is_file() && !kind.is_dir() {
            bail!("refusing to unpack {}: unsupported entry type {kind:?}", name.display());
        }
        if name.components().any(|c| c == Component::ParentDir) {
            bail!(
                "refusing to unpack {}: path escapes {}",
                name.display(),
                dest.display()
            );
        }
    }
    Ok(())
}

fn apply(entry: &mut tar::Entry<'_, &[u8]>, name: &Path, dest: &Path) -> Result<()> {
    let inside = entry
        .unpack_in(dest)
        .with_context(|| format!("unpacking {}", name.display()))?;
    if !inside {
        bail!(
            "refusing to unpack {}: path escapes {}",
            name.display(),
            dest.display()
        );
    }
    tracing::debug!(entry = %name.display(), "unpacked");
    Ok(())
}

/// List the entry names in a bundle without extracting anything.
pub fn list(bundle: &[u8]) -> Result<Vec<PathBuf>> {
    let tar = decompress(bundle)?;
    let mut archive = tar::Archive::new(tar.as_slice());

    archive
        .entries()
        .context("reading bundle")?
        .map(|entry| -> Result<PathBuf> {
            let entry = entry.context("reading bundle entry")?;
            Ok(entry.path().context("bundle entry name")?.into_owned())
        })
        .collect()
}

/// Archive name for `path`: normal components only, `..` rejected.
fn entry_name(path: &Path) -> Result<PathBuf> {
    let mut name = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => name.push(part),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                bail!("failed to pack {}: '..' is not allowed in paths", path.display())
            }
        }
    }
    Ok(name)
}
