// Copyright (c) 2026-present, xdg-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Reads and writes the `applications.cache` file: a version word, the
//! watched-path list used to decide whether the cache is still valid,
//! and the three trees a freshly scanned [`crate::Library`] builds.
//!
//! Loading maps the file with [`memmap2`] and parses straight out of that
//! mapping rather than copying it into an owned buffer first; the only
//! unsafe in this crate is the single `Mmap::map` call that requires, the
//! same trade every mmap-backed reader in the ecosystem makes in return
//! for not paying for a full read of a file that is already on disk.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::UNIX_EPOCH;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::avl::wire::Encode;
use crate::avl::Tree;
use crate::desktop::model::{App, FileWatcherEntry, MimeAssoc, MimeGroup};
use crate::error::{CacheInvalidReason, Error};
use crate::fs::FileSystem;
use crate::list::List;

/// Bumped whenever the wire format changes incompatibly; an on-disk
/// cache with a different version is always rejected rather than
/// partially trusted.
const CACHE_VERSION: u32 = 1;

/// Everything a freshly built or freshly loaded cache holds.
pub struct CacheContents {
    pub(crate) watchers: List<FileWatcherEntry>,
    pub(crate) apps: Tree<App>,
    pub(crate) mime: MimeGroup,
    pub(crate) assoc: Tree<MimeAssoc>,
}

/// Writes `contents` to `path` as a single file, atomically: the data is
/// written to a temporary file in the same directory and renamed over
/// the destination, so a concurrent reader never observes a half-written
/// cache.
pub fn write_cache(fs: &dyn FileSystem, path: &Path, contents: &CacheContents) -> crate::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp_path = dir.join(format!(
        ".{}.tmp",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("applications.cache")
    ));

    {
        let mut file = fs.create(&tmp_path).map_err(|e| Error::io(e, tmp_path.clone()))?;
        write_into(&mut file, contents).map_err(|e| Error::io(e, tmp_path.clone()))?;
        file.sync_all().map_err(|e| Error::io(e, tmp_path.clone()))?;
    }

    std::fs::rename(&tmp_path, path).map_err(|e| Error::io(e, path.to_path_buf()))?;
    Ok(())
}

fn write_into<W: Write>(writer: &mut W, contents: &CacheContents) -> std::io::Result<()> {
    writer.write_u32::<LittleEndian>(CACHE_VERSION)?;
    contents
        .watchers
        .encode_into(writer)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    contents
        .apps
        .encode_into(writer)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    contents
        .mime
        .encode_into(writer)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    contents
        .assoc
        .encode_into(writer)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    Ok(())
}

/// Maps `path` and parses a [`CacheContents`] out of it, without first
/// validating that the watched paths are still current (see
/// [`is_cache_valid`] for that).
///
/// # Safety note
/// `memmap2::Mmap::map` is unsafe because nothing stops another process
/// from truncating or rewriting the file underneath us; the cache file
/// is always written atomically (see [`write_cache`]) and is only ever
/// read by this crate, which keeps that risk in line with how the rest
/// of the ecosystem uses file-backed mmaps.
pub fn read_cache(path: &Path) -> crate::Result<CacheContents> {
    let file = File::open(path).map_err(|e| Error::io(e, path.to_path_buf()))?;
    let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| Error::io(e, path.to_path_buf()))?;
    parse_cache(&mmap).map_err(Error::CacheInvalid)
}

fn parse_cache(bytes: &[u8]) -> Result<CacheContents, CacheInvalidReason> {
    let mut cursor = bytes;
    let version = cursor.read_u32::<LittleEndian>().map_err(|_| CacheInvalidReason::Truncated)?;
    if version != CACHE_VERSION {
        return Err(CacheInvalidReason::VersionMismatch);
    }

    // Each section is read straight off the shared cursor rather than
    // through `Decode::decode_from` (which takes a self-contained byte
    // slice): the cache concatenates sections back-to-back, and only the
    // cursor knows where one ends and the next begins.
    let watchers = List::<FileWatcherEntry>::decode_from_reader(&mut cursor).map_err(|_| CacheInvalidReason::Truncated)?;
    let apps = crate::avl::wire::map::<_, App>(&mut cursor).map_err(|_| CacheInvalidReason::Truncated)?;
    let mime =
        crate::avl::wire::map::<_, crate::desktop::model::MimeType>(&mut cursor).map_err(|_| CacheInvalidReason::Truncated)?;
    let assoc = crate::avl::wire::map::<_, MimeAssoc>(&mut cursor).map_err(|_| CacheInvalidReason::Truncated)?;

    Ok(CacheContents { watchers, apps, mime, assoc })
}

/// Whether every path `watchers` recorded still has the same
/// modification time (and still exists). A cache failing this check is
/// stale, not corrupt: the directories it describes changed since it was
/// written.
pub fn is_cache_valid(fs: &dyn FileSystem, watchers: &List<FileWatcherEntry>) -> bool {
    watchers.iter().all(|entry| {
        let Ok(modified) = fs.modified(Path::new(entry.path())) else {
            return false;
        };
        let Ok(secs) = modified.duration_since(UNIX_EPOCH) else {
            return false;
        };
        secs.as_secs() == entry.mtime_secs()
    })
}

/// Reads `path`'s modification time as seconds since the epoch, for
/// recording in a fresh [`FileWatcherEntry`].
pub fn mtime_secs(fs: &dyn FileSystem, path: &Path) -> std::io::Result<u64> {
    let modified = fs.modified(path)?;
    let secs = modified
        .duration_since(UNIX_EPOCH)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidData, "modified time before epoch"))?;
    Ok(secs.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::StdFileSystem;

    fn sample_contents() -> CacheContents {
        let mut apps: Tree<App> = Tree::new();
        *apps.lookup_or_insert("gedit.desktop") = App::new();

        CacheContents {
            watchers: List::new(),
            apps,
            mime: MimeGroup::new(),
            assoc: Tree::new(),
        }
    }

    #[test_log::test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("applications.cache");
        let fs = StdFileSystem;

        write_cache(&fs, &path, &sample_contents()).unwrap();
        let loaded = read_cache(&path).unwrap();
        assert_eq!(loaded.apps.len(), 1);
        assert!(loaded.apps.lookup("gedit.desktop").is_some());
    }

    #[test_log::test]
    fn rejects_a_file_with_the_wrong_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("applications.cache");
        std::fs::write(&path, [0xFFu8, 0xFF, 0xFF, 0xFF]).unwrap();

        let err = read_cache(&path).unwrap_err();
        assert!(matches!(err, Error::CacheInvalid(CacheInvalidReason::VersionMismatch)));
    }

    #[test_log::test]
    fn validity_check_detects_a_changed_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let watched = dir.path().join("applications");
        std::fs::create_dir(&watched).unwrap();
        let fs = StdFileSystem;

        let secs = mtime_secs(&fs, &watched).unwrap();
        let watchers: List<FileWatcherEntry> =
            [FileWatcherEntry::new(watched.to_string_lossy().into_owned(), secs)].into_iter().collect();
        assert!(is_cache_valid(&fs, &watchers));

        let stale: List<FileWatcherEntry> =
            [FileWatcherEntry::new(watched.to_string_lossy().into_owned(), secs + 1)].into_iter().collect();
        assert!(!is_cache_valid(&fs, &stale));
    }

    #[test_log::test]
    fn validity_check_detects_a_removed_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let watchers: List<FileWatcherEntry> = [FileWatcherEntry::new(missing.to_string_lossy().into_owned(), 0)].into_iter().collect();
        assert!(!is_cache_valid(&StdFileSystem, &watchers));
    }
}
