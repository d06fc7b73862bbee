// Copyright (c) 2026-present, xdg-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use std::path::PathBuf;
use std::sync::Arc;

use crate::fs::{FileSystem, StdFileSystem};

/// Configures a [`crate::Library`] before it is opened.
///
/// Every setter consumes and returns `self`, so a configuration is built
/// up with a chain of calls and handed to [`crate::Library::open`] once:
///
/// ```
/// use xdg_index::Config;
///
/// let config = Config::default()
///     .use_cache(true)
///     .cache_file_name("applications.cache");
/// ```
pub struct Config {
    pub(crate) data_home: Option<PathBuf>,
    pub(crate) data_dirs: Option<Vec<PathBuf>>,
    pub(crate) use_cache: bool,
    pub(crate) cache_file_name: String,
    pub(crate) filesystem: Arc<dyn FileSystem>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_home: None,
            data_dirs: None,
            use_cache: true,
            cache_file_name: "applications.cache".to_owned(),
            filesystem: Arc::new(StdFileSystem),
        }
    }
}

impl Config {
    /// Overrides `$XDG_DATA_HOME` for base-directory resolution.
    #[must_use]
    pub fn data_home(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_home = Some(path.into());
        self
    }

    /// Overrides `$XDG_DATA_DIRS` for base-directory resolution.
    #[must_use]
    pub fn data_dirs(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.data_dirs = Some(paths.into_iter().collect());
        self
    }

    /// Whether to read and write an `applications.cache` file at all.
    /// Disabling this always rebuilds the index from `.desktop` files
    /// on [`crate::Library::open`].
    #[must_use]
    pub fn use_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    /// The cache file's name within each `applications/` folder.
    #[must_use]
    pub fn cache_file_name(mut self, name: impl Into<String>) -> Self {
        self.cache_file_name = name.into();
        self
    }

    /// Swaps in a non-default [`FileSystem`], mainly for tests.
    #[must_use]
    pub fn filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.filesystem = fs;
        self
    }
}
