use indexmap::IndexSet;
use std::fmt;

/// Classification of a single modlist.txt line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Empty line, or a prefix character with nothing after it
    Blank,
    /// Separator or `#` comment
    Separator,
    /// `*` entry managed by the game or MO2 itself (Creation Club content)
    Managed,
    /// `-` entry, installed but disabled
    Disabled,
    /// Any other prefix, normally `+`
    Enabled,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryKind::Blank => "blank line",
            EntryKind::Separator => "separator or comment",
            EntryKind::Managed => "Creation Club mod",
            EntryKind::Disabled => "mod, but disabled",
            EntryKind::Enabled => "mod",
        };
        f.write_str(label)
    }
}

/// One parsed line of modlist.txt.
///
/// Lines are classified in a fixed order: blank, separator/comment, managed,
/// disabled, enabled. A `-` line containing the separator marker is therefore a
/// separator, and a `#` line is a comment whether or not it contains the marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModListEntry {
    raw: String,
    kind: EntryKind,
    name: String,
}

impl ModListEntry {
    /// Parse a raw line, stripping any trailing line terminator first.
    pub fn parse(line: &str, separator_marker: &str) -> Self {
        let raw = line.trim_end_matches(['\n', '\r']).to_string();

        let mut chars = raw.chars();
        let first = chars.next();
        let name = chars.as_str().to_string();

        let kind = match first {
            None => EntryKind::Blank,
            Some(_) if raw.trim().is_empty() => EntryKind::Blank,
            Some(c) if c == '#' || (!separator_marker.is_empty() && raw.contains(separator_marker)) => {
                EntryKind::Separator
            }
            Some('*') => EntryKind::Managed,
            Some('-') => EntryKind::Disabled,
            Some(_) if name.trim().is_empty() => EntryKind::Blank,
            Some(_) => EntryKind::Enabled,
        };

        Self { raw, kind, name }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Text after the prefix character; the mod folder name for enabled entries.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.kind == EntryKind::Enabled
    }
}

/// Mod identifiers that must never be merged, read from an ignore-list file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    names: IndexSet<String>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw file lines. Trailing terminators are stripped and blank lines dropped.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = lines
            .into_iter()
            .map(|line| line.as_ref().trim_end_matches(['\n', '\r']).to_string())
            .filter(|line| !line.trim().is_empty())
            .collect();
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Per-kind line counts gathered while resolving a modlist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub blank: usize,
    pub separators: usize,
    pub managed: usize,
    pub disabled: usize,
    pub ignored: usize,
    pub enabled: usize,
}

impl ResolutionSummary {
    pub(crate) fn record(&mut self, kind: EntryKind) {
        match kind {
            EntryKind::Blank => self.blank += 1,
            EntryKind::Separator => self.separators += 1,
            EntryKind::Managed => self.managed += 1,
            EntryKind::Disabled => self.disabled += 1,
            EntryKind::Enabled => self.enabled += 1,
        }
    }
}

/// Mods to merge, lowest priority first.
///
/// modlist.txt lists the highest priority mod first, so this is the reverse of the
/// accepted lines' file order. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedModList {
    mods: Vec<String>,
    summary: ResolutionSummary,
}

impl ResolvedModList {
    pub(crate) fn new(mods: Vec<String>, summary: ResolutionSummary) -> Self {
        Self { mods, summary }
    }

    pub fn mods(&self) -> &[String] {
        &self.mods
    }

    pub fn summary(&self) -> &ResolutionSummary {
        &self.summary
    }

    pub fn len(&self) -> usize {
        self.mods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.mods.iter().map(String::as_str)
    }

    pub fn into_mods(self) -> Vec<String> {
        self.mods
    }
}

/// Case-insensitive file and folder names excluded from the merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionPatterns {
    names: IndexSet<String>,
}

impl ExclusionPatterns {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        Self { names }
    }

    /// Patterns that match nothing
    pub fn none() -> Self {
        Self {
            names: IndexSet::new(),
        }
    }

    /// Whether a single path segment is excluded
    pub fn matches(&self, segment: &str) -> bool {
        !self.names.is_empty() && self.names.contains(&segment.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ExclusionPatterns {
    fn default() -> Self {
        Self::new(crate::models::config::DEFAULT_EXCLUSIONS)
    }
}
