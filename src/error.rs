// Copyright (c) 2026-present, xdg-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use std::path::PathBuf;

/// Represents errors that can occur while indexing or querying desktop-entry metadata
#[derive(Debug)]
pub enum Error {
    /// I/O error on a specific path (open/read/stat/mmap/write)
    Io {
        /// Underlying I/O error
        source: std::io::Error,
        /// Path the operation was performed on
        path: PathBuf,
    },

    /// The on-disk cache is unusable: wrong version, truncated stream, or stale watcher entries
    CacheInvalid(CacheInvalidReason),

    /// A `.desktop` or `.list` file line could not be parsed; the remainder of that
    /// file was abandoned and whatever had already been parsed was kept
    ParseSkip {
        /// File the malformed line was found in
        path: PathBuf,
        /// 1-based line number
        line: usize,
    },

    /// Allocation failure while indexing live data; fatal for the current operation
    OutOfMemory,
}

/// Why a cache file was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheInvalidReason {
    /// The version word did not match the version this build writes
    VersionMismatch,
    /// The byte stream ended before a complete record was read
    Truncated,
    /// A watched path's mtime changed (or its presence changed) since the cache was written
    Stale,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { source, path } => write!(f, "I/O error on {}: {source}", path.display()),
            Self::CacheInvalid(reason) => write!(f, "cache invalid: {reason:?}"),
            Self::ParseSkip { path, line } => {
                write!(f, "parse error in {} at line {line}", path.display())
            }
            Self::OutOfMemory => write!(f, "out of memory"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Error {
    /// Wraps an I/O error with the path it occurred on
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }
}

/// Library result
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a [`crate::Library::refresh`] call for a single folder
#[derive(Debug)]
pub struct RefreshOutcome {
    /// The `applications/` folder that failed to refresh, if any
    pub failed_folder: Option<PathBuf>,
    /// The error that caused the failure
    pub error: Option<Error>,
}

impl RefreshOutcome {
    pub(crate) fn ok() -> Self {
        Self {
            failed_folder: None,
            error: None,
        }
    }

    pub(crate) fn failed(folder: PathBuf, error: Error) -> Self {
        Self {
            failed_folder: Some(folder),
            error: Some(error),
        }
    }

    /// Returns `true` if no folder failed to refresh
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
