//! INI document reader.
//!
//! Parses `[section]` headers and `key = value` entries into an ordered
//! [`IniDocument`]. The dialect is fixed:
//!
//! - Full-line comments only: a line whose first non-blank character is `#`
//!   or `;` is skipped. `key = a ; b` has the value `a ; b`.
//! - `=` and `:` both delimit an entry; the first one on the line wins.
//!   Whitespace around keys and values is trimmed.
//! - Keys and section names are case-sensitive and kept verbatim.
//! - `%` has no special meaning.
//! - A line indented deeper than the entry above it continues that entry's
//!   value, joined with `\n`. Blank lines between continuation lines are
//!   kept as empty lines; trailing blank lines are dropped.
//! - A header ends at its first `]`; anything after it is ignored, so
//!   `[General] ; main` opens `General`.
//! - Duplicate sections and duplicate keys within a section are errors.
//! - Entries under `[DEFAULT]` are inherited by every section.
//!
//! # Example
//!
//! ```
//! use inischema::ini::IniDocument;
//!
//! let doc = IniDocument::parse("[General]\ncount = 10\n# comment\nname : demo\n")?;
//! let general = doc.section("General").unwrap();
//! assert_eq!(general.get("count"), Some("10"));
//! assert_eq!(general.get("name"), Some("demo"));
//! assert_eq!(general.get("Count"), None);
//! # Ok::<(), inischema::ini::ParseError>(())
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Name of the section whose entries every other section inherits.
pub const DEFAULT_SECTION: &str = "DEFAULT";

static SECTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(?P<header>[^\]]+)\]").expect("section pattern is valid"));

static ENTRY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<key>.*?)\s*[=:]\s*(?P<value>.*)$").expect("entry pattern is valid")
});

/// Syntax errors found while parsing. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// An entry appears before the first section header.
    #[error("line {line}: entry \"{content}\" appears before any [section] header")]
    MissingSectionHeader { line: usize, content: String },

    /// A section header appears twice.
    #[error("line {line}: duplicate section [{section}]")]
    DuplicateSection { line: usize, section: String },

    /// A key appears twice in the same section.
    #[error("line {line}: duplicate key \"{key}\" in [{section}]")]
    DuplicateKey {
        line: usize,
        section: String,
        key: String,
    },

    /// A line is neither a header, an entry, a comment, nor a continuation.
    #[error("line {line}: expected [section] or key = value, found \"{content}\"")]
    Syntax { line: usize, content: String },
}

/// A named, ordered list of raw entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries in file order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Raw value of `key`, without `[DEFAULT]` fallback.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A section together with the document's `[DEFAULT]` entries.
#[derive(Debug, Clone, Copy)]
pub struct SectionView<'a> {
    section: &'a Section,
    defaults: &'a Section,
}

impl<'a> SectionView<'a> {
    pub fn name(&self) -> &'a str {
        self.section.name()
    }

    /// Raw value of `key`, falling back to `[DEFAULT]`.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.section.get(key).or_else(|| self.defaults.get(key))
    }

    /// The section's own entries in file order, without `[DEFAULT]`.
    pub fn entries(&self) -> &'a [(String, String)] {
        self.section.entries()
    }
}

/// A parsed INI file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniDocument {
    defaults: Section,
    sections: Vec<Section>,
}

impl Default for IniDocument {
    fn default() -> Self {
        Self {
            defaults: Section::new(DEFAULT_SECTION),
            sections: Vec::new(),
        }
    }
}

#[derive(Clone, Copy)]
enum Cursor {
    Defaults,
    Section(usize),
}

impl IniDocument {
    /// Parse INI text.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut doc = IniDocument::default();
        let mut cursor: Option<Cursor> = None;
        // Index of the entry a continuation line would extend, and its indent.
        let mut open_entry: Option<(usize, usize)> = None;
        // Blank lines seen since the open entry's last line.
        let mut pending_blanks = 0;

        for (idx, raw_line) in text.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw_line.trim();

            if trimmed.is_empty() {
                if open_entry.is_some() {
                    pending_blanks += 1;
                }
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indent = raw_line.len() - raw_line.trim_start().len();

            if let (Some(cur), Some((entry, entry_indent))) = (cursor, open_entry) {
                if indent > entry_indent {
                    let value = &mut doc.section_mut(cur).entries[entry].1;
                    for _ in 0..pending_blanks {
                        value.push('\n');
                    }
                    value.push('\n');
                    value.push_str(trimmed);
                    pending_blanks = 0;
                    continue;
                }
            }

            if let Some(caps) = SECTION_PATTERN.captures(trimmed) {
                let header = &caps["header"];
                open_entry = None;
                pending_blanks = 0;

                if header == DEFAULT_SECTION {
                    cursor = Some(Cursor::Defaults);
                    continue;
                }
                if doc.sections.iter().any(|s| s.name == header) {
                    return Err(ParseError::DuplicateSection {
                        line,
                        section: header.to_string(),
                    });
                }
                doc.sections.push(Section::new(header));
                cursor = Some(Cursor::Section(doc.sections.len() - 1));
            } else if let Some(caps) = ENTRY_PATTERN.captures(trimmed) {
                let key = &caps["key"];
                if key.is_empty() {
                    return Err(ParseError::Syntax {
                        line,
                        content: trimmed.to_string(),
                    });
                }

                let Some(cur) = cursor else {
                    return Err(ParseError::MissingSectionHeader {
                        line,
                        content: trimmed.to_string(),
                    });
                };

                let section = doc.section_mut(cur);
                if section.get(key).is_some() {
                    return Err(ParseError::DuplicateKey {
                        line,
                        section: section.name.clone(),
                        key: key.to_string(),
                    });
                }
                section
                    .entries
                    .push((key.to_string(), caps["value"].to_string()));
                open_entry = Some((section.entries.len() - 1, indent));
                pending_blanks = 0;
            } else {
                return Err(ParseError::Syntax {
                    line,
                    content: trimmed.to_string(),
                });
            }
        }

        Ok(doc)
    }

    fn section_mut(&mut self, cursor: Cursor) -> &mut Section {
        match cursor {
            Cursor::Defaults => &mut self.defaults,
            Cursor::Section(idx) => &mut self.sections[idx],
        }
    }

    /// Look up a section by exact name.
    ///
    /// `DEFAULT` always resolves, even when the file has no such header.
    pub fn section(&self, name: &str) -> Option<SectionView<'_>> {
        let section = if name == DEFAULT_SECTION {
            &self.defaults
        } else {
            self.sections.iter().find(|s| s.name == name)?
        };

        Some(SectionView {
            section,
            defaults: &self.defaults,
        })
    }

    /// Regular sections in file order, excluding `[DEFAULT]`.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Entries declared under `[DEFAULT]`.
    pub fn defaults(&self) -> &Section {
        &self.defaults
    }
}
