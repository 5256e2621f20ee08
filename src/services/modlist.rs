//! Mod list resolution.
//!
//! Turns a profile's `modlist.txt` into the ordered list of mod folders to merge.
//! MO2 writes the list highest priority first, so the accepted entries are reversed:
//! the mod that wins conflicts inside MO2 is copied last and overwrites the others.

use crate::models::{EntryKind, IgnoreSet, ModListEntry, ResolutionSummary, ResolvedModList};
use camino::Utf8Path;
use std::fs;
use std::io;

const BOM: char = '\u{feff}';

/// Resolve modlist lines into the merge order.
///
/// Separators, comments, managed (`*`) and disabled (`-`) entries are dropped, as are
/// enabled mods named in `ignore`. Blank lines are dropped before any prefix check.
pub fn resolve<I, S>(lines: I, ignore: &IgnoreSet, separator_marker: &str) -> ResolvedModList
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut accepted = Vec::new();
    let mut summary = ResolutionSummary::default();

    for line in lines {
        let entry = ModListEntry::parse(line.as_ref(), separator_marker);

        match entry.kind() {
            EntryKind::Blank => {
                summary.record(EntryKind::Blank);
            }
            EntryKind::Enabled if ignore.contains(entry.name()) => {
                tracing::info!("\t\"{}\" is in the ignore list, ignoring...", entry.name());
                summary.ignored += 1;
            }
            EntryKind::Enabled => {
                tracing::info!("\t\"{}\" is mod, appending...", entry.name());
                summary.record(EntryKind::Enabled);
                accepted.push(entry.name().to_string());
            }
            kind => {
                tracing::info!("\t\"{}\" is {}, ignoring...", entry.name(), kind);
                summary.record(kind);
            }
        }
    }

    accepted.reverse();

    tracing::debug!(
        "Resolved {} mods ({} disabled, {} managed, {} separators, {} ignored)",
        accepted.len(),
        summary.disabled,
        summary.managed,
        summary.separators,
        summary.ignored
    );

    ResolvedModList::new(accepted, summary)
}

/// Read a plain-text list file into lines without terminators.
///
/// Invalid UTF-8 is replaced rather than rejected; MO2 sometimes writes list files in
/// the system code page. A leading byte-order mark is removed.
pub fn read_list_file(path: &Utf8Path) -> io::Result<Vec<String>> {
    let bytes = fs::read(path)?;
    let contents = String::from_utf8_lossy(&bytes);
    let contents = contents.strip_prefix(BOM).unwrap_or(&contents);

    Ok(contents.lines().map(str::to_string).collect())
}

/// Load an ignore list; one mod folder name per line.
pub fn load_ignore_set(path: &Utf8Path) -> io::Result<IgnoreSet> {
    let lines = read_list_file(path)?;
    let ignore = IgnoreSet::from_lines(lines);
    tracing::info!("Loaded {} ignored mods from {}", ignore.len(), path);
    Ok(ignore)
}
