// Copyright (c) 2026-present, xdg-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Resolves the XDG Base Directory Specification's data directories into
//! the ordered list of `applications/` folders the indexer scans.

use std::path::PathBuf;

use crate::config::Config;

const DEFAULT_DATA_DIRS: &str = "/usr/local/share/:/usr/share/";

/// Returns the `applications/` folders to scan, most specific first:
/// `$XDG_DATA_HOME/applications`, then one per `$XDG_DATA_DIRS` entry.
///
/// A folder appears in this list whether or not it currently exists; the
/// indexer treats a missing folder as simply empty rather than an error.
#[must_use]
pub fn base_directories(config: &Config) -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    let data_home = config.data_home.clone().unwrap_or_else(data_home_default);
    dirs.push(data_home.join("applications"));

    let data_dirs = config.data_dirs.clone().unwrap_or_else(data_dirs_default);
    for dir in data_dirs {
        dirs.push(dir.join("applications"));
    }

    dirs
}

fn data_home_default() -> PathBuf {
    std::env::var_os("XDG_DATA_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".local/share"))
}

fn data_dirs_default() -> Vec<PathBuf> {
    let raw = std::env::var("XDG_DATA_DIRS").ok().filter(|v| !v.is_empty());
    let raw = raw.as_deref().unwrap_or(DEFAULT_DATA_DIRS);
    std::env::split_paths(raw).filter(|p| !p.as_os_str().is_empty()).collect()
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn data_home_takes_priority_over_data_dirs() {
        let config = Config::default()
            .data_home("/home/alice/.local/share")
            .data_dirs([PathBuf::from("/usr/local/share"), PathBuf::from("/usr/share")]);

        let dirs = base_directories(&config);
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/home/alice/.local/share/applications"),
                PathBuf::from("/usr/local/share/applications"),
                PathBuf::from("/usr/share/applications"),
            ]
        );
    }

    #[test_log::test]
    fn empty_data_dirs_override_falls_back_to_defaults() {
        let config = Config::default().data_home("/home/alice/.local/share");
        let dirs = base_directories(&config);
        assert!(dirs.len() >= 2, "expected the XDG_DATA_DIRS default to contribute entries");
    }
}
