// Copyright (c) 2026-present, xdg-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A pluggable filesystem seam.
//!
//! The indexer only ever goes through [`FileSystem`], never `std::fs`
//! directly, so tests can swap in an in-memory implementation instead of
//! touching the real `applications/` folders on disk.

use std::io;
use std::path::{Path, PathBuf};

/// One entry yielded by [`FileSystem::read_dir`].
#[derive(Debug, Clone)]
pub struct DirEntry {
    path: PathBuf,
    is_dir: bool,
}

impl DirEntry {
    /// Full path of the entry.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name component of the entry.
    #[must_use]
    pub fn file_name(&self) -> &std::ffi::OsStr {
        self.path.file_name().unwrap_or_default()
    }

    /// Whether the entry is a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }
}

/// Filesystem operations the indexer needs, abstracted so tests can run
/// against an in-memory tree instead of the real one.
pub trait FileSystem: Send + Sync {
    /// Opens an existing file for reading.
    fn open(&self, path: &Path) -> io::Result<std::fs::File>;

    /// Creates (truncating if needed) a file for writing.
    fn create(&self, path: &Path) -> io::Result<std::fs::File>;

    /// Reads an entire file into memory.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Reads an entire file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Lists the immediate children of a directory. Returns an empty list,
    /// rather than an error, for a directory that does not exist: an
    /// absent `applications/` folder is not a failure.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Returns the modification time of `path`, if it exists.
    fn modified(&self, path: &Path) -> io::Result<std::time::SystemTime>;

    /// Creates every missing component of `path`.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Whether something exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}

/// The real filesystem, via `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn open(&self, path: &Path) -> io::Result<std::fs::File> {
        std::fs::File::open(path)
    }

    fn create(&self, path: &Path) -> io::Result<std::fs::File> {
        std::fs::File::create(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let iter = match std::fs::read_dir(path) {
            Ok(iter) => iter,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut out = Vec::new();
        for entry in iter {
            let entry = entry?;
            let file_type = entry.file_type()?;
            out.push(DirEntry {
                path: entry.path(),
                is_dir: file_type.is_dir(),
            });
        }
        Ok(out)
    }

    fn modified(&self, path: &Path) -> io::Result<std::time::SystemTime> {
        std::fs::metadata(path)?.modified()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
