// Copyright (c) 2026-present, xdg-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Line-oriented parsing for `.desktop` files and the `.list` association
//! files (`mimeapps.list`, `defaults.list`).
//!
//! Both formats share the same skeleton: `[Group Name]` section headers
//! followed by `Key=Value` or `Key[locale]=Value` lines, `#`-comments,
//! and blank lines. A line that fits none of those shapes does not fail
//! the whole file — parsing stops at that line and returns everything
//! collected before it, matching the "keep what was parseable, report
//! where it broke" error policy used throughout the indexer.

use crate::desktop::model::App;
use crate::list::List;

/// One logical line inside a group: either a plain `Key=Value`, or a
/// locale-qualified `Key[locale]=Value`.
struct Line<'a> {
    key: &'a str,
    locale: Option<&'a str>,
    value: &'a str,
}

fn split_line(line: &str) -> Option<Line<'_>> {
    let (lhs, value) = line.split_once('=')?;
    let lhs = lhs.trim_end();
    if lhs.is_empty() {
        return None;
    }
    match lhs.find('[') {
        Some(open) if lhs.ends_with(']') => {
            let key = &lhs[..open];
            let locale = &lhs[open + 1..lhs.len() - 1];
            if key.is_empty() || locale.is_empty() {
                None
            } else {
                Some(Line { key, locale: Some(locale), value })
            }
        }
        Some(_) => None,
        None => Some(Line { key: lhs, locale: None, value }),
    }
}

/// Parses a `.desktop` file's contents into an [`App`].
///
/// Returns the app built from every well-formed line read before the
/// first malformed one, along with that line's 1-based number if parsing
/// stopped early.
#[must_use]
pub fn parse_desktop_entry(content: &str) -> (App, Option<usize>) {
    let mut app = App::new();
    let mut current_group: Option<String> = None;

    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim_end_matches('\r');
        let trimmed = line.trim_start();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            current_group = Some(name.to_owned());
            continue;
        }

        let Some(group_name) = current_group.as_deref() else {
            return (app, Some(line_no));
        };

        let Some(parsed) = split_line(trimmed) else {
            return (app, Some(line_no));
        };

        // `MimeType=` is special: its value is split on `;` separately, to
        // build the known-associations index (`register_known_mime_types`),
        // so the raw, unsplit value is what's kept here.
        let value = if parsed.key == "MimeType" {
            [parsed.value.to_owned()].into_iter().collect()
        } else {
            split_values(parsed.value)
        };

        let group = app.group_mut(group_name);
        if let Some(locale) = parsed.locale {
            group.entry_mut(parsed.key).set_localized(locale, value);
        } else {
            group.entry_mut(parsed.key).set_default(value);
        }
    }

    (app, None)
}

/// Splits a `Key=Value` line's value at `;` into its ordered component
/// strings, trimming whitespace and dropping empty pieces (a trailing
/// `;` is common and must not produce a spurious empty entry).
fn split_values(raw: &str) -> List<String> {
    raw.split(';').map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned).collect()
}

/// The three association sections a `.list` file can carry.
#[derive(Debug, Default)]
pub struct ListFileSections {
    /// `[Default Applications]`: `MimeType=app1.desktop;app2.desktop;`
    pub default_applications: Vec<(String, Vec<String>)>,
    /// `[Added Associations]`
    pub added_associations: Vec<(String, Vec<String>)>,
    /// `[Removed Associations]`
    pub removed_associations: Vec<(String, Vec<String>)>,
}

#[derive(Clone, Copy)]
enum Section {
    DefaultApplications,
    AddedAssociations,
    RemovedAssociations,
}

/// Parses a `mimeapps.list`/`defaults.list`-style association file.
#[must_use]
pub fn parse_list_file(content: &str) -> (ListFileSections, Option<usize>) {
    let mut sections = ListFileSections::default();
    let mut current: Option<Section> = None;

    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim_end_matches('\r');
        let trimmed = line.trim_start();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            current = match name {
                "Default Applications" => Some(Section::DefaultApplications),
                "Added Associations" => Some(Section::AddedAssociations),
                "Removed Associations" => Some(Section::RemovedAssociations),
                _ => None,
            };
            continue;
        }

        let Some((mimetype, value)) = trimmed.split_once('=') else {
            return (sections, Some(line_no));
        };
        let mimetype = mimetype.trim_end();
        if mimetype.is_empty() {
            return (sections, Some(line_no));
        }

        if let Some(section) = current {
            let ids: Vec<String> = value
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
            if !ids.is_empty() {
                let bucket = match section {
                    Section::DefaultApplications => &mut sections.default_applications,
                    Section::AddedAssociations => &mut sections.added_associations,
                    Section::RemovedAssociations => &mut sections.removed_associations,
                };
                bucket.push((mimetype.to_owned(), ids));
            }
        }
    }

    (sections, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_groups_and_localized_keys() {
        let content = "\
[Desktop Entry]
Type=Application
Name=Text Editor
Name[fr]=Éditeur de texte
Exec=gedit %F
MimeType=text/plain;text/html;
";
        let (app, stopped) = parse_desktop_entry(content);
        assert_eq!(stopped, None);

        let main = app.main_group().unwrap();
        assert_eq!(main.value("Type"), Some(["Application".to_owned()].as_slice()));
        assert_eq!(main.value("Name"), Some(["Text Editor".to_owned()].as_slice()));
        assert_eq!(main.value("Exec"), Some(["gedit %F".to_owned()].as_slice()));
        assert_eq!(main.value("MimeType"), Some(["text/plain;text/html;".to_owned()].as_slice()));

        let entry = main.entry("Name").unwrap();
        assert_eq!(
            entry.value_for_locale(&crate::desktop::locale::Locale::parse("fr_FR")),
            ["Éditeur de texte"]
        );
    }

    #[test]
    fn parses_desktop_action_groups() {
        let content = "\
[Desktop Entry]
Name=Editor

[Desktop Action new-window]
Name=New Window
Exec=gedit --new-window
";
        let (app, stopped) = parse_desktop_entry(content);
        assert_eq!(stopped, None);
        let action = app.group("Desktop Action new-window").unwrap();
        assert_eq!(action.value("Name"), Some(["New Window".to_owned()].as_slice()));
    }

    #[test]
    fn stops_at_a_malformed_line_but_keeps_prior_groups() {
        let content = "\
[Desktop Entry]
Name=Editor
this line has no equals sign
Exec=gedit
";
        let (app, stopped) = parse_desktop_entry(content);
        assert_eq!(stopped, Some(3));
        assert_eq!(app.main_group().unwrap().value("Name"), Some(["Editor".to_owned()].as_slice()));
        assert_eq!(app.main_group().unwrap().value("Exec"), None);
    }

    #[test]
    fn ignores_comments_and_blank_lines() {
        let content = "\
# a comment
[Desktop Entry]

# another comment
Name=Editor
";
        let (app, stopped) = parse_desktop_entry(content);
        assert_eq!(stopped, None);
        assert_eq!(app.main_group().unwrap().value("Name"), Some(["Editor".to_owned()].as_slice()));
    }

    #[test]
    fn parses_list_file_sections() {
        let content = "\
[Default Applications]
text/html=firefox.desktop
text/plain=gedit.desktop;kate.desktop;

[Added Associations]
image/png=gimp.desktop;

[Removed Associations]
text/plain=vim.desktop;
";
        let (sections, stopped) = parse_list_file(content);
        assert_eq!(stopped, None);
        assert_eq!(
            sections.default_applications,
            vec![
                ("text/html".to_owned(), vec!["firefox.desktop".to_owned()]),
                ("text/plain".to_owned(), vec!["gedit.desktop".to_owned(), "kate.desktop".to_owned()]),
            ]
        );
        assert_eq!(
            sections.added_associations,
            vec![("image/png".to_owned(), vec!["gimp.desktop".to_owned()])]
        );
        assert_eq!(
            sections.removed_associations,
            vec![("text/plain".to_owned(), vec!["vim.desktop".to_owned()])]
        );
    }
}
