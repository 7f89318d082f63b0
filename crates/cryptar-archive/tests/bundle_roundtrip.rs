//! Pack a directory tree, unpack it elsewhere, and compare.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::create_dir_all(path.parent().unwrap()).expect("create parent");
    fs::write(&path, content).expect("write test file");
    path
}

/// Where an absolute source path lands under `dest` after unpacking.
fn unpacked_path(dest: &Path, src: &Path) -> PathBuf {
    dest.join(src.strip_prefix("/").unwrap_or(src))
}

#[test]
fn pack_unpack_tree_roundtrip() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    let a = write_file(src.path(), "a.txt", b"alpha");
    let b = write_file(src.path(), "nested/deeper/b.bin", &[0u8, 1, 2, 255]);
    let empty = write_file(src.path(), "nested/empty.txt", b"");
    fs::create_dir(src.path().join("hollow")).unwrap();

    let packed = cryptar_archive::pack_paths(&[src.path()], 3).unwrap();
    assert!(!packed.bytes.is_empty());

    let mut names = cryptar_archive::unpack(&packed.bytes, dest.path()).unwrap();
    let mut entries = packed.entries.clone();
    names.sort();
    entries.sort();
    assert_eq!(names, entries);

    assert_eq!(fs::read(unpacked_path(dest.path(), &a)).unwrap(), b"alpha");
    assert_eq!(
        fs::read(unpacked_path(dest.path(), &b)).unwrap(),
        vec![0u8, 1, 2, 255]
    );
    assert!(fs::read(unpacked_path(dest.path(), &empty)).unwrap().is_empty());
    assert!(unpacked_path(dest.path(), &src.path().join("hollow")).is_dir());
}

#[test]
fn list_matches_packed_entries() {
    let src = TempDir::new().unwrap();
    write_file(src.path(), "one.txt", b"1");
    write_file(src.path(), "sub/two.txt", b"2");

    let packed = cryptar_archive::pack_paths(&[src.path()], 3).unwrap();
    let listed = cryptar_archive::list(&packed.bytes).unwrap();

    assert_eq!(listed, packed.entries);
    assert!(listed.iter().any(|p| p.ends_with("sub/two.txt")));
    assert!(listed.iter().any(|p| p.ends_with("one.txt")));
}

#[test]
fn multiple_roots_and_single_file() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let lone = write_file(first.path(), "lone.txt", b"by itself");
    write_file(second.path(), "x/y.txt", b"y");

    let packed = cryptar_archive::pack_paths(&[lone.as_path(), second.path()], 3).unwrap();
    let listed = cryptar_archive::list(&packed.bytes).unwrap();

    assert!(listed.iter().any(|p| p.ends_with("lone.txt")));
    assert!(listed.iter().any(|p| p.ends_with("x/y.txt")));
}

#[test]
fn missing_path_is_an_error() {
    let src = TempDir::new().unwrap();
    let missing = src.path().join("does-not-exist");

    let err = cryptar_archive::pack_paths(&[missing.as_path()], 3).unwrap_err();
    assert!(err.to_string().contains("could not be read"));
}

fn header(kind: tar::EntryType, mode: u32, size: u64) -> tar::Header {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(kind);
    header.set_mode(mode);
    header.set_size(size);
    header
}

#[test]
fn directories_are_applied_after_their_contents() {
    let mut builder = tar::Builder::new(Vec::new());
    let mut dir = header(tar::EntryType::Directory, 0o755, 0);
    builder.append_data(&mut dir, "top", std::io::empty()).unwrap();
    let mut sub = header(tar::EntryType::Directory, 0o755, 0);
    builder.append_data(&mut sub, "top/sub", std::io::empty()).unwrap();
    let mut file = header(tar::EntryType::Regular, 0o644, 5);
    builder.append_data(&mut file, "top/sub/leaf.txt", &b"green"[..]).unwrap();
    let bundle = cryptar_archive::compress(&builder.into_inner().unwrap(), 3).unwrap();

    let dest = TempDir::new().unwrap();
    let names = cryptar_archive::unpack(&bundle, dest.path()).unwrap();

    assert_eq!(
        names,
        vec![
            PathBuf::from("top/sub/leaf.txt"),
            PathBuf::from("top/sub"),
            PathBuf::from("top"),
        ]
    );
    assert_eq!(fs::read(dest.path().join("top/sub/leaf.txt")).unwrap(), b"green");
}

#[test]
fn bad_entry_aborts_before_anything_is_written() {
    let mut builder = tar::Builder::new(Vec::new());
    let mut file = header(tar::EntryType::Regular, 0o644, 2);
    builder.append_data(&mut file, "fine.txt", &b"ok"[..]).unwrap();
    let mut link = header(tar::EntryType::Symlink, 0o777, 0);
    builder.append_link(&mut link, "link", "/etc/passwd").unwrap();
    let bundle = cryptar_archive::compress(&builder.into_inner().unwrap(), 3).unwrap();

    let root = TempDir::new().unwrap();
    let dest = root.path().join("out");
    let err = cryptar_archive::unpack(&bundle, &dest).unwrap_err();

    assert!(err.to_string().contains("unsupported entry type"));
    assert!(!dest.exists());
}

#[test]
fn traversal_entry_is_refused() {
    let mut header = tar::Header::new_gnu();
    let name = b"../escaped.txt";
    header.as_gnu_mut().unwrap().name[..name.len()].copy_from_slice(name);
    header.set_size(4);
    header.set_mode(0o644);
    header.set_entry_type(tar::EntryType::Regular);
    header.set_cksum();

    let mut builder = tar::Builder::new(Vec::new());
    builder.append(&header, &b"evil"[..]).unwrap();
    let tar = builder.into_inner().unwrap();
    let bundle = cryptar_archive::compress(&tar, 3).unwrap();

    let root = TempDir::new().unwrap();
    let dest = root.path().join("out");
    let err = cryptar_archive::unpack(&bundle, &dest).unwrap_err();

    assert!(err.to_string().contains("escapes"));
    assert!(!root.path().join("escaped.txt").exists());
}

#[cfg(unix)]
#[test]
fn symlink_is_refused() {
    let src = TempDir::new().unwrap();
    let target = write_file(src.path(), "target.txt", b"t");
    std::os::unix::fs::symlink(&target, src.path().join("link")).unwrap();

    let err = cryptar_archive::pack_paths(&[src.path()], 3).unwrap_err();
    assert!(err.to_string().contains("not a regular file or directory"));
}

#[cfg(unix)]
#[test]
fn file_mode_is_preserved() {
    use std::os::unix::fs::PermissionsExt;

    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let script = write_file(src.path(), "run.sh", b"#!/bin/sh\n");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o750)).unwrap();

    let packed = cryptar_archive::pack_paths(&[src.path()], 3).unwrap();
    cryptar_archive::unpack(&packed.bytes, dest.path()).unwrap();

    let mode = fs::metadata(unpacked_path(dest.path(), &script))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o750);
}

#[cfg(unix)]
#[test]
fn read_only_directory_roundtrip() {
    use std::os::unix::fs::PermissionsExt;

    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let inner = write_file(src.path(), "ro/inner.txt", b"locked in");
    let ro = src.path().join("ro");
    fs::set_permissions(&ro, fs::Permissions::from_mode(0o555)).unwrap();

    let packed = cryptar_archive::pack_paths(&[ro.as_path()], 3).unwrap();
    let result = cryptar_archive::unpack(&packed.bytes, dest.path());

    let restored = unpacked_path(dest.path(), &ro);
    let restored_mode = fs::metadata(&restored).map(|m| m.permissions().mode());
    let restored_inner = fs::read(unpacked_path(dest.path(), &inner));

    // Let TempDir clean up both trees.
    fs::set_permissions(&ro, fs::Permissions::from_mode(0o755)).unwrap();
    if restored.exists() {
        fs::set_permissions(&restored, fs::Permissions::from_mode(0o755)).unwrap();
    }

    let names = result.unwrap();
    assert!(names.last().unwrap().ends_with("ro"));
    assert_eq!(restored_inner.unwrap(), b"locked in");
    assert_eq!(restored_mode.unwrap() & 0o777, 0o555);
}
