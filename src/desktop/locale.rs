// Copyright (c) 2026-present, xdg-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Locale parsing and the fallback order used to resolve `Key[locale]=`
//! entries, matching the freedesktop.org desktop-entry specification:
//! `lang_COUNTRY@MODIFIER` → `lang_COUNTRY` → `lang@MODIFIER` → `lang`.

/// A parsed `lang[_COUNTRY][@MODIFIER]` locale tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    lang: String,
    country: Option<String>,
    modifier: Option<String>,
}

impl Locale {
    /// Parses a locale tag such as `en_US@euro`. Never fails: anything
    /// that does not look like `lang[_COUNTRY][@MODIFIER]` is treated as
    /// a bare language tag.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (without_modifier, modifier) = match raw.split_once('@') {
            Some((head, m)) => (head, Some(m.to_owned())),
            None => (raw, None),
        };
        let (lang, country) = match without_modifier.split_once('_') {
            Some((l, c)) => (l.to_owned(), Some(c.to_owned())),
            None => (without_modifier.to_owned(), None),
        };
        Self { lang, country, modifier }
    }

    /// Candidate keys to try against an entry's localized table, most
    /// specific first, ending with the bare language.
    #[must_use]
    pub fn candidates(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(4);
        match (&self.country, &self.modifier) {
            (Some(c), Some(m)) => {
                out.push(format!("{}_{c}@{m}", self.lang));
                out.push(format!("{}_{c}", self.lang));
                out.push(format!("{}@{m}", self.lang));
                out.push(self.lang.clone());
            }
            (Some(c), None) => {
                out.push(format!("{}_{c}", self.lang));
                out.push(self.lang.clone());
            }
            (None, Some(m)) => {
                out.push(format!("{}@{m}", self.lang));
                out.push(self.lang.clone());
            }
            (None, None) => {
                out.push(self.lang.clone());
            }
        }
        out
    }
}
