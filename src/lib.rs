// Copyright (c) 2026-present, xdg-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Indexed, allocation-light access to freedesktop.org desktop-entry and
//! icon-theme metadata.
//!
//! ```
//! use xdg_index::{Config, Library};
//!
//! # fn main() -> xdg_index::Result<()> {
//! let data_home = tempfile::tempdir().unwrap();
//! let config = Config::default().data_home(data_home.path()).data_dirs(Vec::new());
//! let library = Library::open(config)?;
//! if let Some(app) = library.lookup_app("org.gnome.gedit.desktop") {
//!     println!("{:?}", app.group("Desktop Entry").and_then(|g| g.value("Name")));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The crate is split into three layers that mirror how it is actually
//! used, outer to inner:
//!
//! - [`desktop`] walks `applications/` folders, parses `.desktop` and
//!   `.list` files, and answers the application/MIME lookup queries.
//! - [`avl`] and [`list`] are the ordered-map and linked-list primitives
//!   the indexer is built from; both understand how to dump themselves to
//!   a byte stream and be rebuilt from one without re-parsing anything.
//! - [`fs`], [`error`], and [`config`] are the ambient plumbing: a
//!   pluggable filesystem trait, the error/result types, and the builder
//!   that configures a [`Library`].

pub mod avl;
mod base_directory;
mod config;
mod desktop;
mod error;
pub mod fs;
pub mod list;

pub use base_directory::base_directories;
pub use config::Config;
pub use desktop::{
    locale::Locale,
    model::{App, AppGroup, AppGroupEntry, MimeGroup, MimeSubType, MimeType},
    Library,
};
pub use error::{CacheInvalidReason, Error, RefreshOutcome, Result};
