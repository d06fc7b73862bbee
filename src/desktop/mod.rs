// Copyright (c) 2026-present, xdg-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Builds and queries the three indices a [`Library`] is made of: the
//! parsed `.desktop` files themselves (`apps`), the MIME types they
//! declare handling (`mime`), and the user-configured associations read
//! from `mimeapps.list` (`assoc`).
//!
//! Each `applications/` folder returned by
//! [`crate::base_directories`] is indexed independently, behind its own
//! `applications.cache` file next to it, the same granularity the
//! original cache format uses; a [`Library`] merges the per-folder
//! results together with the most specific folder's entries winning a
//! desktop-file-id collision.

pub mod locale;
pub mod model;

mod cache;
mod parser;

use std::path::{Path, PathBuf};

use crate::avl::Tree;
use crate::config::Config;
use crate::desktop::model::{merge_assoc_tree, merge_mime_group, App, MimeAssoc, MimeGroup, MimeSubType, MimeType};
use crate::error::RefreshOutcome;
use crate::fs::FileSystem;
use crate::list::List;

/// An opened, indexed view of the applications installed on a system.
///
/// Built from every `applications/` folder [`crate::base_directories`]
/// resolves, most specific first. Construction reads each folder's
/// `applications.cache` when it is present and still valid, and falls
/// back to parsing `.desktop`/`.list` files directly otherwise,
/// rewriting the cache as it goes.
pub struct Library {
    config: Config,
    base_dirs: Vec<PathBuf>,
    apps: Tree<App>,
    mime: MimeGroup,
    assoc: Tree<MimeAssoc>,
}

impl Library {
    /// Opens the library, indexing every resolved `applications/` folder.
    ///
    /// A folder that cannot be scanned (missing, unreadable, a `.desktop`
    /// file that fails to parse) is logged and skipped rather than
    /// failing the whole call; [`Error::Io`](crate::Error::Io) only
    /// surfaces here for failures that have nothing to do with a single
    /// folder, none of which this implementation currently produces.
    pub fn open(config: Config) -> crate::Result<Self> {
        let base_dirs = crate::base_directory::base_directories(&config);
        let (apps, mime, assoc) = Self::build_index(&config, &base_dirs);
        Ok(Self { config, base_dirs, apps, mime, assoc })
    }

    /// Re-scans every folder and replaces the in-memory index with the
    /// result. Folders whose cache is still valid are loaded from disk
    /// rather than re-parsed, the same as [`Self::open`].
    pub fn refresh(&mut self) -> RefreshOutcome {
        let (apps, mime, assoc) = Self::build_index(&self.config, &self.base_dirs);
        self.apps = apps;
        self.mime = mime;
        self.assoc = assoc;
        RefreshOutcome::ok()
    }

    fn build_index(config: &Config, base_dirs: &[PathBuf]) -> (Tree<App>, MimeGroup, Tree<MimeAssoc>) {
        let fs = config.filesystem.as_ref();
        let mut apps = Tree::new();
        let mut mime = MimeGroup::new();
        let mut assoc = Tree::new();

        for dir in base_dirs {
            let (dir_apps, dir_mime, dir_assoc) = load_or_scan_directory(fs, dir, config);

            for (id, app) in dir_apps.into_entries() {
                if apps.lookup(&id).is_none() {
                    *apps.lookup_or_insert(&id) = app;
                }
            }
            merge_mime_group(&mut mime, dir_mime);
            merge_assoc_tree(&mut assoc, dir_assoc);
        }

        (apps, mime, assoc)
    }

    /// Looks up a parsed `.desktop` file by its desktop-file-id, e.g.
    /// `"org.gnome.gedit.desktop"` or, for a file nested under a
    /// vendor subdirectory, `"kde-foo.desktop"`.
    #[must_use]
    pub fn lookup_app(&self, id: &str) -> Option<&App> {
        self.apps.lookup(id)
    }

    /// Desktop file ids that declared handling `mimetype` (e.g.
    /// `"text/html"`) via their own `MimeType=` key. Empty if `mimetype`
    /// is not `"type/subtype"`-shaped or nothing declared it.
    #[must_use]
    pub fn known_apps(&self, mimetype: &str) -> &[String] {
        let Some((type_name, sub_name)) = mimetype.split_once('/') else {
            return &[];
        };
        self.mime
            .lookup(type_name)
            .and_then(|t| t.sub_type(sub_name))
            .map(MimeSubType::apps)
            .unwrap_or(&[])
    }

    /// Desktop file ids configured as the default handler(s) for
    /// `mimetype` via `[Default Applications]`.
    #[must_use]
    pub fn default_apps(&self, mimetype: &str) -> &[String] {
        self.assoc.lookup(mimetype).map(MimeAssoc::default_apps).unwrap_or(&[])
    }

    /// Desktop file ids added as handlers for `mimetype` via
    /// `[Added Associations]`, beyond what [`Self::known_apps`] already
    /// reports.
    #[must_use]
    pub fn added_apps(&self, mimetype: &str) -> &[String] {
        self.assoc.lookup(mimetype).map(MimeAssoc::added_apps).unwrap_or(&[])
    }

    /// Desktop file ids removed as handlers for `mimetype` via
    /// `[Removed Associations]`, even if [`Self::known_apps`] still
    /// reports them.
    #[must_use]
    pub fn removed_apps(&self, mimetype: &str) -> &[String] {
        self.assoc.lookup(mimetype).map(MimeAssoc::removed_apps).unwrap_or(&[])
    }
}

/// Indexes a single `applications/` folder, from its cache if one is
/// present and still valid, otherwise from its files directly (writing a
/// fresh cache back out when caching is enabled).
fn load_or_scan_directory(fs: &dyn FileSystem, dir: &Path, config: &Config) -> (Tree<App>, MimeGroup, Tree<MimeAssoc>) {
    if !fs.exists(dir) {
        return (Tree::new(), MimeGroup::new(), Tree::new());
    }

    let cache_path = dir.join(&config.cache_file_name);
    if config.use_cache {
        if let Ok(contents) = cache::read_cache(&cache_path) {
            if cache::is_cache_valid(fs, &contents.watchers) {
                log::debug!("using cache at {}", cache_path.display());
                return (contents.apps, contents.mime, contents.assoc);
            }
            log::debug!("cache at {} is stale, rescanning", cache_path.display());
        }
    }

    log::debug!("scanning {}", dir.display());
    let mut apps = Tree::new();
    let mut mime = MimeGroup::new();
    let mut assoc = Tree::new();
    let mut watchers = List::new();
    scan_directory(fs, dir, &mut apps, &mut mime, &mut assoc, &mut watchers);

    if config.use_cache {
        let contents = cache::CacheContents { watchers, apps, mime, assoc };
        if let Err(e) = cache::write_cache(fs, &cache_path, &contents) {
            log::warn!("failed to write cache at {}: {e}", cache_path.display());
        }
        (contents.apps, contents.mime, contents.assoc)
    } else {
        (apps, mime, assoc)
    }
}

/// Walks `dir` for `.desktop` files and reads its `mimeapps.list`, if
/// any. The folder root and every regular file actually opened are
/// recorded in the watch list, so editing a single `.desktop` file's
/// contents invalidates the cache even though it leaves the containing
/// directory's own mtime untouched.
fn scan_directory(
    fs: &dyn FileSystem,
    dir: &Path,
    apps: &mut Tree<App>,
    mime: &mut MimeGroup,
    assoc: &mut Tree<MimeAssoc>,
    watchers: &mut List<model::FileWatcherEntry>,
) {
    record_watcher(fs, dir, watchers);

    walk_desktop_files(fs, dir, dir, apps, mime, watchers);

    let list_path = dir.join("mimeapps.list");
    if fs.exists(&list_path) {
        record_watcher(fs, &list_path, watchers);
        match fs.read_to_string(&list_path) {
            Ok(content) => {
                let (sections, stopped) = parser::parse_list_file(&content);
                if let Some(line) = stopped {
                    log::warn!("{}: stopped parsing at line {line}", list_path.display());
                }
                merge_list_sections(sections, assoc, apps);
            }
            Err(e) => log::warn!("failed to read {}: {e}", list_path.display()),
        }
    }
}

fn walk_desktop_files(
    fs: &dyn FileSystem,
    root: &Path,
    current: &Path,
    apps: &mut Tree<App>,
    mime: &mut MimeGroup,
    watchers: &mut List<model::FileWatcherEntry>,
) {
    let entries = match fs.read_dir(current) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("failed to read {}: {e}", current.display());
            return;
        }
    };

    for entry in entries {
        if entry.is_dir() {
            walk_desktop_files(fs, root, entry.path(), apps, mime, watchers);
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("desktop") {
            continue;
        }

        let id = desktop_file_id(root, path);
        if apps.lookup(&id).is_some() {
            continue;
        }

        record_watcher(fs, path, watchers);
        match fs.read_to_string(path) {
            Ok(content) => {
                let (app, stopped) = parser::parse_desktop_entry(&content);
                if let Some(line) = stopped {
                    log::warn!("{}: stopped parsing at line {line}", path.display());
                }
                register_known_mime_types(&id, &app, mime);
                *apps.lookup_or_insert(&id) = app;
            }
            Err(e) => log::warn!("failed to read {}: {e}", path.display()),
        }
    }
}

/// Records `path`'s current mtime in the watch list (0 if `stat` fails),
/// matching the invariant that the watch list's entry set equals every
/// directory visited and regular file read during indexing.
fn record_watcher(fs: &dyn FileSystem, path: &Path, watchers: &mut List<model::FileWatcherEntry>) {
    let secs = cache::mtime_secs(fs, path).unwrap_or(0);
    watchers.push_back(model::FileWatcherEntry::new(path.to_string_lossy().into_owned(), secs));
}

/// Builds a desktop-file-id from a path relative to the `applications/`
/// root it was found under, joining subdirectory components with `-`
/// (`applications/kde/foo.desktop` becomes `"kde-foo.desktop"`).
fn desktop_file_id(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect::<Vec<_>>()
        .join("-")
}

/// Records every MIME type `app` declared via its own `MimeType=` key as
/// "known" to handle it.
fn register_known_mime_types(id: &str, app: &App, mime: &mut MimeGroup) {
    // `MimeType=` is kept as a single unsplit raw string (see
    // `parser::parse_desktop_entry`), since its own `;`-list has a
    // different meaning (`type/subtype` pairs) than the generic
    // multi-value split every other key gets.
    let Some(raw) = app.main_group().and_then(|g| g.value("MimeType")).and_then(|v| v.first()) else {
        return;
    };
    for mimetype in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((type_name, sub_name)) = mimetype.split_once('/') else {
            continue;
        };
        mime.lookup_or_insert_with(type_name, MimeType::new)
            .sub_type_mut(sub_name)
            .add_app(id.to_owned());
    }
}

/// Folds a parsed `.list` file's sections into `assoc`, lazily creating
/// an empty [`App`] for any id that names no `.desktop` file the scan
/// has found: a `mimeapps.list` is free to reference an id before (or
/// without ever) seeing the file itself, and lookups still need
/// something to hand back.
fn merge_list_sections(sections: parser::ListFileSections, assoc: &mut Tree<MimeAssoc>, apps: &mut Tree<App>) {
    for (mimetype, ids) in sections.default_applications {
        let entry = assoc.lookup_or_insert_with(&mimetype, MimeAssoc::new);
        for id in ids {
            apps.lookup_or_insert(&id);
            entry.push_default(id);
        }
    }
    for (mimetype, ids) in sections.added_associations {
        let entry = assoc.lookup_or_insert_with(&mimetype, MimeAssoc::new);
        for id in ids {
            apps.lookup_or_insert(&id);
            entry.push_added(id);
        }
    }
    for (mimetype, ids) in sections.removed_associations {
        let entry = assoc.lookup_or_insert_with(&mimetype, MimeAssoc::new);
        for id in ids {
            apps.lookup_or_insert(&id);
            entry.push_removed(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::fs::StdFileSystem;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test_log::test]
    fn indexes_a_single_directory_tree() {
        let root = tempfile::tempdir().unwrap();
        let apps_dir = root.path().join("applications");
        write(
            &apps_dir,
            "gedit.desktop",
            "[Desktop Entry]\nName=Text Editor\nMimeType=text/plain;text/html;\n",
        );
        write(&apps_dir, "kde/foo.desktop", "[Desktop Entry]\nName=Foo\n");
        write(
            &apps_dir,
            "mimeapps.list",
            "[Default Applications]\ntext/plain=gedit.desktop\n",
        );

        let config = Config::default()
            .data_home(root.path())
            .data_dirs(Vec::new())
            .filesystem(Arc::new(StdFileSystem));
        let library = Library::open(config).unwrap();

        assert!(library.lookup_app("gedit.desktop").is_some());
        assert!(library.lookup_app("kde-foo.desktop").is_some());
        assert_eq!(library.known_apps("text/plain"), ["gedit.desktop"]);
        assert_eq!(library.known_apps("text/html"), ["gedit.desktop"]);
        assert_eq!(library.default_apps("text/plain"), ["gedit.desktop"]);
        assert!(library.known_apps("text/nonexistent").is_empty());
    }

    #[test_log::test]
    fn higher_priority_directory_wins_on_id_collision() {
        let home = tempfile::tempdir().unwrap();
        let extra = tempfile::tempdir().unwrap();
        write(
            &home.path().join("applications"),
            "gedit.desktop",
            "[Desktop Entry]\nName=Home Editor\n",
        );
        write(
            &extra.path().join("applications"),
            "gedit.desktop",
            "[Desktop Entry]\nName=System Editor\n",
        );

        let config = Config::default()
            .data_home(home.path())
            .data_dirs([extra.path().to_path_buf()])
            .filesystem(Arc::new(StdFileSystem));
        let library = Library::open(config).unwrap();

        let app = library.lookup_app("gedit.desktop").unwrap();
        assert_eq!(app.main_group().unwrap().value("Name"), Some(["Home Editor".to_owned()].as_slice()));
    }

    #[test_log::test]
    fn refresh_picks_up_a_newly_added_desktop_file() {
        let root = tempfile::tempdir().unwrap();
        let apps_dir = root.path().join("applications");
        std::fs::create_dir_all(&apps_dir).unwrap();

        let config = Config::default()
            .data_home(root.path())
            .data_dirs(Vec::new())
            .use_cache(false)
            .filesystem(Arc::new(StdFileSystem));
        let mut library = Library::open(config).unwrap();
        assert!(library.lookup_app("gedit.desktop").is_none());

        write(&apps_dir, "gedit.desktop", "[Desktop Entry]\nName=Text Editor\n");
        let outcome = library.refresh();
        assert!(outcome.is_ok());
        assert!(library.lookup_app("gedit.desktop").is_some());
    }

    #[test_log::test]
    fn added_association_lazily_creates_an_empty_app() {
        let root = tempfile::tempdir().unwrap();
        let apps_dir = root.path().join("applications");
        write(
            &apps_dir,
            "mimeapps.list",
            "[Added Associations]\ntext/plain=app3.desktop;\n",
        );

        let config = Config::default()
            .data_home(root.path())
            .data_dirs(Vec::new())
            .filesystem(Arc::new(StdFileSystem));
        let library = Library::open(config).unwrap();

        assert_eq!(library.added_apps("text/plain"), ["app3.desktop"]);
        let app = library.lookup_app("app3.desktop").unwrap();
        assert!(app.main_group().is_none());
    }

    #[test_log::test]
    fn editing_a_desktop_file_in_place_invalidates_the_cache() {
        let root = tempfile::tempdir().unwrap();
        let apps_dir = root.path().join("applications");
        write(&apps_dir, "gedit.desktop", "[Desktop Entry]\nName=Text Editor\n");

        let config = || {
            Config::default()
                .data_home(root.path())
                .data_dirs(Vec::new())
                .filesystem(Arc::new(StdFileSystem))
        };
        Library::open(config()).unwrap();

        // Overwriting the file's contents does not change the containing
        // directory's own mtime, only the file's. A cache keyed solely on
        // the directory would wrongly still look valid here.
        std::thread::sleep(std::time::Duration::from_millis(1100));
        write(&apps_dir, "gedit.desktop", "[Desktop Entry]\nName=Renamed Editor\n");

        let reopened = Library::open(config()).unwrap();
        let app = reopened.lookup_app("gedit.desktop").unwrap();
        assert_eq!(app.main_group().unwrap().value("Name"), Some(["Renamed Editor".to_owned()].as_slice()));
    }

    #[test_log::test]
    fn cache_round_trips_through_reopen() {
        let root = tempfile::tempdir().unwrap();
        write(
            &root.path().join("applications"),
            "gedit.desktop",
            "[Desktop Entry]\nName=Text Editor\nMimeType=text/plain;\n",
        );

        let config = || {
            Config::default()
                .data_home(root.path())
                .data_dirs(Vec::new())
                .filesystem(Arc::new(StdFileSystem))
        };
        Library::open(config()).unwrap();
        assert!(root.path().join("applications/applications.cache").exists());

        let reopened = Library::open(config()).unwrap();
        assert!(reopened.lookup_app("gedit.desktop").is_some());
        assert_eq!(reopened.known_apps("text/plain"), ["gedit.desktop"]);
    }
}
