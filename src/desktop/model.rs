// Copyright (c) 2026-present, xdg-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The values stored in the three trees a [`crate::Library`] builds: the
//! parsed `.desktop` files themselves, the MIME-type associations they
//! declare, and the user overrides from `mimeapps.list`/`defaults.list`.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::avl::wire::{Decode, DecodeError, Encode, EncodeError};
use crate::avl::Tree;
use crate::list::List;
use crate::desktop::locale::Locale;

/// One `Key=Value` entry inside a group: an untranslated default value
/// list plus any `Key[locale]=` variants, each itself a list since a
/// `Value` is split at `;` into its component strings.
#[derive(Debug, Clone, Default)]
pub struct AppGroupEntry {
    default_value: List<String>,
    localized: Tree<List<String>>,
}

impl AppGroupEntry {
    pub(crate) fn new(default_value: List<String>) -> Self {
        Self {
            default_value,
            localized: Tree::new(),
        }
    }

    /// The untranslated value list, as written after `Key=` in the file,
    /// split at `;`.
    #[must_use]
    pub fn default_value(&self) -> &[String] {
        self.default_value.as_slice()
    }

    /// Resolves this entry's value list for `locale`, falling back through
    /// `lang_COUNTRY@MODIFIER` → `lang_COUNTRY` → `lang@MODIFIER` →
    /// `lang` → the untranslated default.
    #[must_use]
    pub fn value_for_locale(&self, locale: &Locale) -> &[String] {
        for candidate in locale.candidates() {
            if let Some(value) = self.localized.lookup(&candidate) {
                return value.as_slice();
            }
        }
        self.default_value.as_slice()
    }

    pub(crate) fn set_localized(&mut self, locale_tag: &str, value: List<String>) {
        *self.localized.lookup_or_insert(locale_tag) = value;
    }

    pub(crate) fn set_default(&mut self, value: List<String>) {
        self.default_value = value;
    }
}

/// One `[Group Name]` section of a `.desktop` file: a set of keys, each
/// with an optional family of localized variants.
#[derive(Debug, Clone, Default)]
pub struct AppGroup {
    entries: Tree<AppGroupEntry>,
}

impl AppGroup {
    pub(crate) fn new() -> Self {
        Self { entries: Tree::new() }
    }

    /// Looks up a key's entry within this group (e.g. `"Name"`, `"Exec"`).
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&AppGroupEntry> {
        self.entries.lookup(key)
    }

    /// Convenience for the common case: the untranslated value list of
    /// `key`.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&[String]> {
        self.entry(key).map(AppGroupEntry::default_value)
    }

    pub(crate) fn entry_mut(&mut self, key: &str) -> &mut AppGroupEntry {
        self.entries.lookup_or_insert_with(key, || AppGroupEntry::new(List::new()))
    }
}

/// A fully parsed `.desktop` file, keyed in the library by its desktop
/// file id (e.g. `"org.gnome.gedit.desktop"`).
#[derive(Debug, Clone, Default)]
pub struct App {
    groups: Tree<AppGroup>,
}

impl App {
    pub(crate) fn new() -> Self {
        Self { groups: Tree::new() }
    }

    /// Looks up a group by name, e.g. `"Desktop Entry"` or
    /// `"Desktop Action new-window"`.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&AppGroup> {
        self.groups.lookup(name)
    }

    /// The main `[Desktop Entry]` group, present in every valid file.
    #[must_use]
    pub fn main_group(&self) -> Option<&AppGroup> {
        self.group("Desktop Entry")
    }

    pub(crate) fn group_mut(&mut self, name: &str) -> &mut AppGroup {
        self.groups.lookup_or_insert_with(name, AppGroup::new)
    }
}

/// The set of desktop file ids that declared support for one MIME
/// sub-type via `MimeType=` (e.g. every app handling `text/html`).
#[derive(Debug, Clone, Default)]
pub struct MimeSubType {
    apps: List<String>,
}

impl MimeSubType {
    pub(crate) fn new() -> Self {
        Self { apps: List::new() }
    }

    /// Desktop file ids that declared this sub-type, in the order their
    /// `.desktop` files were indexed.
    #[must_use]
    pub fn apps(&self) -> &[String] {
        self.apps.as_slice()
    }

    pub(crate) fn add_app(&mut self, id: String) {
        if !self.apps.as_slice().iter().any(|existing| existing == &id) {
            self.apps.push_back(id);
        }
    }
}

/// One top-level MIME type (`"text"`, `"image"`, ...), holding its known
/// sub-types.
#[derive(Debug, Clone, Default)]
pub struct MimeType {
    sub_types: Tree<MimeSubType>,
}

impl MimeType {
    pub(crate) fn new() -> Self {
        Self { sub_types: Tree::new() }
    }

    /// Looks up a sub-type (e.g. `"html"` within `"text"`).
    #[must_use]
    pub fn sub_type(&self, name: &str) -> Option<&MimeSubType> {
        self.sub_types.lookup(name)
    }

    pub(crate) fn sub_type_mut(&mut self, name: &str) -> &mut MimeSubType {
        self.sub_types.lookup_or_insert_with(name, MimeSubType::new)
    }
}

/// The whole "known associations" index: every MIME type an indexed
/// `.desktop` file declared handling.
pub type MimeGroup = Tree<MimeType>;

/// A mimetype's user-configured associations, from `mimeapps.list` or
/// `defaults.list`: the default handler(s), plus anything explicitly
/// added or removed from the "known" set.
#[derive(Debug, Clone, Default)]
pub struct MimeAssoc {
    default_apps: List<String>,
    added_apps: List<String>,
    removed_apps: List<String>,
}

impl MimeAssoc {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Desktop file ids listed under `[Default Applications]`.
    #[must_use]
    pub fn default_apps(&self) -> &[String] {
        self.default_apps.as_slice()
    }

    /// Desktop file ids listed under `[Added Associations]`.
    #[must_use]
    pub fn added_apps(&self) -> &[String] {
        self.added_apps.as_slice()
    }

    /// Desktop file ids listed under `[Removed Associations]`.
    #[must_use]
    pub fn removed_apps(&self) -> &[String] {
        self.removed_apps.as_slice()
    }

    pub(crate) fn push_default(&mut self, id: String) {
        self.default_apps.push_back(id);
    }

    pub(crate) fn push_added(&mut self, id: String) {
        self.added_apps.push_back(id);
    }

    pub(crate) fn push_removed(&mut self, id: String) {
        self.removed_apps.push_back(id);
    }
}

/// One watched path and the modification time it had when the cache
/// covering it was written; used to decide whether a reloaded cache is
/// still valid.
#[derive(Debug, Clone)]
pub struct FileWatcherEntry {
    path: String,
    mtime_secs: u64,
}

impl FileWatcherEntry {
    pub(crate) fn new(path: String, mtime_secs: u64) -> Self {
        Self { path, mtime_secs }
    }

    /// The watched path, as indexed.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The modification time recorded at index time, as seconds since the
    /// Unix epoch.
    #[must_use]
    pub fn mtime_secs(&self) -> u64 {
        self.mtime_secs
    }
}

// ---- wire format ------------------------------------------------------

impl Encode for AppGroupEntry {
    fn encode_into<W: std::io::Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        self.default_value.encode_into(writer)?;
        self.localized.encode_into(writer)
    }
}

impl Decode for AppGroupEntry {
    fn decode_from(bytes: &[u8]) -> Result<Self, DecodeError> {
        // Both fields are themselves count-prefixed rather than
        // byte-length-prefixed, so a shared cursor (not a precomputed
        // boundary) is what tells us where the default value list ends and
        // the localized sub-tree begins.
        let mut cursor = bytes;
        let default_value = List::<String>::decode_from_reader(&mut cursor)?;
        let localized = crate::avl::wire::map(&mut cursor)?;
        Ok(Self { default_value, localized })
    }
}

impl Encode for AppGroup {
    fn encode_into<W: std::io::Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        self.entries.encode_into(writer)
    }
}

impl Decode for AppGroup {
    fn decode_from(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self { entries: Tree::decode_from(bytes)? })
    }
}

impl Encode for App {
    fn encode_into<W: std::io::Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        self.groups.encode_into(writer)
    }
}

impl Decode for App {
    fn decode_from(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self { groups: Tree::decode_from(bytes)? })
    }
}

impl Encode for MimeSubType {
    fn encode_into<W: std::io::Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        self.apps.encode_into(writer)
    }
}

impl Decode for MimeSubType {
    fn decode_from(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self { apps: List::decode_from(bytes)? })
    }
}

impl Encode for MimeType {
    fn encode_into<W: std::io::Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        self.sub_types.encode_into(writer)
    }
}

impl Decode for MimeType {
    fn decode_from(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self { sub_types: Tree::decode_from(bytes)? })
    }
}

impl Encode for MimeAssoc {
    fn encode_into<W: std::io::Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        self.default_apps.encode_into(writer)?;
        self.added_apps.encode_into(writer)?;
        self.removed_apps.encode_into(writer)
    }
}

impl Decode for MimeAssoc {
    fn decode_from(bytes: &[u8]) -> Result<Self, DecodeError> {
        // Each sub-list is itself length-prefixed at the byte level, so we
        // decode by slicing through `encode_into_vec`'s buffering helper
        // rather than trying to share one cursor across three calls.
        let mut cursor = bytes;
        let (default_apps, rest) = take_list(cursor)?;
        cursor = rest;
        let (added_apps, rest) = take_list(cursor)?;
        cursor = rest;
        let (removed_apps, _rest) = take_list(cursor)?;
        Ok(Self { default_apps, added_apps, removed_apps })
    }
}

/// Reads one length-then-items `List<String>` off the front of `bytes`
/// and returns it along with whatever follows. `List`'s own `Decode`
/// impl expects to own the rest of the slice, so composite values that
/// place more than one list back-to-back re-measure each one by hand.
fn take_list(bytes: &[u8]) -> Result<(List<String>, &[u8]), DecodeError> {
    let mut cursor = bytes;
    let count = cursor.read_u32::<LittleEndian>()?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let len = cursor.read_u32::<LittleEndian>()? as usize;
        if cursor.len() < len {
            return Err(truncated("list item"));
        }
        let (chunk, rest) = cursor.split_at(len);
        items.push(String::decode_from(chunk)?);
        cursor = rest;
    }
    Ok((items.into_iter().collect(), cursor))
}

fn truncated(what: &str) -> DecodeError {
    DecodeError::Io(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, format!("truncated {what}")))
}

impl Encode for FileWatcherEntry {
    fn encode_into<W: std::io::Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        self.path.encode_into(writer)?;
        writer.write_u64::<LittleEndian>(self.mtime_secs)?;
        Ok(())
    }
}

impl Decode for FileWatcherEntry {
    fn decode_from(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < 4 {
            return Err(truncated("file watcher entry"));
        }
        let str_len = u32::from_le_bytes(bytes[..4].try_into().unwrap()) as usize;
        let path = String::decode_from(bytes.get(..4 + str_len).ok_or_else(|| truncated("file watcher path"))?)?;
        let mtime_bytes = bytes.get(4 + str_len..4 + str_len + 8).ok_or_else(|| truncated("file watcher mtime"))?;
        let mtime_secs = u64::from_le_bytes(mtime_bytes.try_into().unwrap());
        Ok(Self { path, mtime_secs })
    }
}

/// Folds `src`'s known-association entries into `dst`, used when a
/// library is assembled from more than one scanned directory: each
/// directory's own [`MimeGroup`] is merged in rather than rebuilt from
/// scratch, so an app list earlier in the merge keeps the ids it already
/// collected.
pub(crate) fn merge_mime_group(dst: &mut MimeGroup, src: MimeGroup) {
    for (type_name, mime_type) in src.into_entries() {
        let dst_type = dst.lookup_or_insert_with(&type_name, MimeType::new);
        for (sub_name, sub_type) in mime_type.sub_types.into_entries() {
            let dst_sub = dst_type.sub_type_mut(&sub_name);
            for id in sub_type.apps {
                dst_sub.add_app(id);
            }
        }
    }
}

/// Folds `src`'s user-configured associations into `dst`, the same way
/// [`merge_mime_group`] folds known associations.
pub(crate) fn merge_assoc_tree(dst: &mut Tree<MimeAssoc>, src: Tree<MimeAssoc>) {
    for (mimetype, assoc) in src.into_entries() {
        let dst_assoc = dst.lookup_or_insert_with(&mimetype, MimeAssoc::new);
        for id in assoc.default_apps {
            dst_assoc.push_default(id);
        }
        for id in assoc.added_apps {
            dst_assoc.push_added(id);
        }
        for id in assoc.removed_apps {
            dst_assoc.push_removed(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(raw: &str) -> List<String> {
        [raw.to_owned()].into_iter().collect()
    }

    #[test]
    fn app_group_entry_falls_back_to_default_without_localized_match() {
        let entry = AppGroupEntry::new(values("Text Editor"));
        assert_eq!(entry.value_for_locale(&Locale::parse("fr_FR")), ["Text Editor"]);
    }

    #[test]
    fn app_group_entry_prefers_more_specific_locale() {
        let mut entry = AppGroupEntry::new(values("Text Editor"));
        entry.set_localized("fr", values("Éditeur de texte"));
        entry.set_localized("fr_CA", values("Éditeur de texte (CA)"));
        assert_eq!(entry.value_for_locale(&Locale::parse("fr_CA")), ["Éditeur de texte (CA)"]);
        assert_eq!(entry.value_for_locale(&Locale::parse("fr_FR")), ["Éditeur de texte"]);
    }

    #[test]
    fn locale_fallback_walks_the_full_chain_before_the_default() {
        let mut entry = AppGroupEntry::new(values("One"));
        entry.set_localized("ru", values("Один"));
        entry.set_localized("ru_RU@ekb", values("Номер Один"));

        assert_eq!(entry.value_for_locale(&Locale::parse("ru_RU@ekb")), ["Номер Один"]);
        // No `ru_RU`, `ru@unknown`, or `ru_RU@unknown` entry exists, so this
        // falls all the way through to the bare `ru` entry.
        assert_eq!(entry.value_for_locale(&Locale::parse("ru_RU@unknown")), ["Один"]);
        assert_eq!(entry.value_for_locale(&Locale::parse("fr_FR")), ["One"]);
    }

    #[test]
    fn app_group_entry_splits_a_multi_value_raw_string() {
        let mut entry = AppGroupEntry::new(List::new());
        entry.set_default(["Utility".to_owned(), "TextEditor".to_owned()].into_iter().collect());
        assert_eq!(entry.default_value(), ["Utility", "TextEditor"]);
    }

    #[test]
    fn mime_sub_type_does_not_duplicate_apps() {
        let mut sub_type = MimeSubType::new();
        sub_type.add_app("gedit.desktop".to_owned());
        sub_type.add_app("gedit.desktop".to_owned());
        assert_eq!(sub_type.apps(), ["gedit.desktop"]);
    }

    #[test]
    fn app_round_trips_through_wire_format() {
        let mut app = App::new();
        app.group_mut("Desktop Entry").entry_mut("Name").set_default(values("Gimp"));
        app.group_mut("Desktop Entry").entry_mut("Name").set_localized("de", values("Gimp (de)"));

        let bytes = app.encode_into_vec();
        let decoded = App::decode_from(&bytes).unwrap();
        let entry = decoded.main_group().unwrap().entry("Name").unwrap();
        assert_eq!(entry.default_value(), ["Gimp"]);
        assert_eq!(entry.value_for_locale(&Locale::parse("de")), ["Gimp (de)"]);
    }

    #[test]
    fn mime_assoc_round_trips_through_wire_format() {
        let mut assoc = MimeAssoc::new();
        assoc.push_default("gedit.desktop".to_owned());
        assoc.push_added("kate.desktop".to_owned());
        assoc.push_removed("gimp.desktop".to_owned());

        let bytes = assoc.encode_into_vec();
        let decoded = MimeAssoc::decode_from(&bytes).unwrap();
        assert_eq!(decoded.default_apps(), ["gedit.desktop"]);
        assert_eq!(decoded.added_apps(), ["kate.desktop"]);
        assert_eq!(decoded.removed_apps(), ["gimp.desktop"]);
    }
}
