//! Layered copy merge.
//!
//! Each layer (one mod folder) is copied into the shared destination on top of the
//! layers before it. Work is split in three steps so the interesting part stays pure:
//!
//! 1. [`list_source`] walks the layer and returns a flat, sorted listing
//! 2. [`plan_layer`] turns the listing into [`CopyAction`]s, applying exclusions and
//!    directory name normalization
//! 3. [`execute_plan`] performs the actions against the filesystem
//!
//! Files always overwrite; the last layer to provide a path wins.

use crate::metrics::ExportMetrics;
use crate::models::ExclusionPatterns;
use crate::services::export::ExportError;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::{self, File, FileTimes};
#[cfg(windows)]
use std::fs::OpenOptions;
use std::io;
use walkdir::WalkDir;

/// Kind of a source listing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Directory,
    File,
}

/// One entry of a layer, relative to the layer root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub relative: Utf8PathBuf,
    pub entry_type: EntryType,
}

impl SourceEntry {
    pub fn directory<P: Into<Utf8PathBuf>>(relative: P) -> Self {
        Self {
            relative: relative.into(),
            entry_type: EntryType::Directory,
        }
    }

    pub fn file<P: Into<Utf8PathBuf>>(relative: P) -> Self {
        Self {
            relative: relative.into(),
            entry_type: EntryType::File,
        }
    }
}

/// A single filesystem step; both paths are relative to their roots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyAction {
    CreateDir { dest: Utf8PathBuf },
    CopyFile { source: Utf8PathBuf, dest: Utf8PathBuf },
}

/// Actions for one layer plus the number of listing entries excluded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyPlan {
    pub actions: Vec<CopyAction>,
    pub excluded: u64,
}

/// Walk a layer and list its contents, parents before children.
///
/// Excluded directories are listed but not descended into; the planner drops them.
pub fn list_source(
    source_dir: &Utf8Path,
    exclusions: &ExclusionPatterns,
) -> Result<Vec<SourceEntry>, ExportError> {
    let mut listing = Vec::new();
    let mut walker = WalkDir::new(source_dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|source| ExportError::Walk {
            path: source_dir.to_path_buf(),
            source,
        })?;

        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|_| entry.path().to_path_buf());
        let relative = Utf8PathBuf::try_from(relative)
            .map_err(|e| ExportError::NonUtf8Path(e.into_path_buf()))?;

        let is_dir = entry.file_type().is_dir();
        if is_dir && exclusions.matches(&entry.file_name().to_string_lossy()) {
            walker.skip_current_dir();
        }

        listing.push(SourceEntry {
            relative,
            entry_type: if is_dir {
                EntryType::Directory
            } else {
                EntryType::File
            },
        });
    }

    Ok(listing)
}

/// Compute the copy actions for a layer listing.
///
/// An entry is dropped when any segment of its relative path matches an exclusion, which
/// also drops every descendant of an excluded directory. With `lowercase_directories`,
/// every directory segment of the destination path is lower-cased; file names keep
/// their case.
pub fn plan_layer(
    listing: &[SourceEntry],
    exclusions: &ExclusionPatterns,
    lowercase_directories: bool,
) -> CopyPlan {
    let mut plan = CopyPlan::default();

    for entry in listing {
        if entry
            .relative
            .components()
            .any(|segment| exclusions.matches(segment.as_str()))
        {
            plan.excluded += 1;
            continue;
        }

        let dest = destination_path(&entry.relative, entry.entry_type, lowercase_directories);
        let action = match entry.entry_type {
            EntryType::Directory => CopyAction::CreateDir { dest },
            EntryType::File => CopyAction::CopyFile {
                source: entry.relative.clone(),
                dest,
            },
        };
        plan.actions.push(action);
    }

    plan
}

fn destination_path(
    relative: &Utf8Path,
    entry_type: EntryType,
    lowercase_directories: bool,
) -> Utf8PathBuf {
    if !lowercase_directories {
        return relative.to_path_buf();
    }

    let segments: Vec<&str> = relative.components().map(|c| c.as_str()).collect();
    let last = segments.len().saturating_sub(1);

    segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            if index < last || entry_type == EntryType::Directory {
                segment.to_lowercase()
            } else {
                segment.to_string()
            }
        })
        .collect()
}

/// Apply a plan, copying from `source_root` into `dest_root`.
pub fn execute_plan(
    plan: &CopyPlan,
    source_root: &Utf8Path,
    dest_root: &Utf8Path,
    metrics: &mut ExportMetrics,
) -> Result<(), ExportError> {
    for action in &plan.actions {
        match action {
            CopyAction::CreateDir { dest } => {
                ensure_dir(&dest_root.join(dest), metrics)?;
            }
            CopyAction::CopyFile { source, dest } => {
                let source_path = source_root.join(source);
                let dest_path = dest_root.join(dest);

                if let Some(parent) = dest_path.parent() {
                    ensure_dir(parent, metrics)?;
                }

                let overwrote = dest_path.exists();
                let bytes = copy_file_with_times(&source_path, &dest_path)
                    .map_err(|e| ExportError::io(&source_path, e))?;

                tracing::trace!("Copied {} -> {}", source_path, dest_path);
                metrics.record_file_copied(bytes, overwrote);
            }
        }
    }

    metrics.record_excluded(plan.excluded);
    Ok(())
}

/// Merge one layer into the destination.
pub fn merge_layer(
    source_dir: &Utf8Path,
    dest_root: &Utf8Path,
    exclusions: &ExclusionPatterns,
    lowercase_directories: bool,
    metrics: &mut ExportMetrics,
) -> Result<(), ExportError> {
    ensure_dir(dest_root, metrics)?;

    let listing = list_source(source_dir, exclusions)?;
    let plan = plan_layer(&listing, exclusions, lowercase_directories);

    tracing::debug!(
        "{}: {} entries, {} actions, {} excluded",
        source_dir,
        listing.len(),
        plan.actions.len(),
        plan.excluded
    );

    execute_plan(&plan, source_dir, dest_root, metrics)?;
    metrics.record_layer_merged();
    Ok(())
}

fn ensure_dir(path: &Utf8Path, metrics: &mut ExportMetrics) -> Result<(), ExportError> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| ExportError::io(path, e))?;
    metrics.record_directory_created();
    Ok(())
}

/// Copy a file, replacing any existing destination, and carry over its timestamps.
///
/// The copy takes the source's permissions, so a read-only source yields a read-only
/// destination. A read-only destination left by an earlier layer or run is made
/// writable first, and timestamps are set without opening the file for writing.
pub fn copy_file_with_times(source: &Utf8Path, dest: &Utf8Path) -> io::Result<u64> {
    if dest.is_file() {
        make_writable(dest)?;
    }

    let bytes = fs::copy(source, dest)?;

    let metadata = fs::metadata(source)?;
    let mut times = FileTimes::new().set_modified(metadata.modified()?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    open_for_times(dest)?.set_times(times)?;

    Ok(bytes)
}

fn make_writable(path: &Utf8Path) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    if !permissions.readonly() {
        return Ok(());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        permissions.set_mode(permissions.mode() | 0o200);
    }
    #[cfg(not(unix))]
    {
        permissions.set_readonly(false);
    }

    fs::set_permissions(path, permissions)
}

// futimens only needs ownership, so a read-only handle is enough
#[cfg(not(windows))]
fn open_for_times(path: &Utf8Path) -> io::Result<File> {
    File::open(path)
}

#[cfg(windows)]
fn open_for_times(path: &Utf8Path) -> io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;
    const FILE_WRITE_ATTRIBUTES: u32 = 0x0100;
    OpenOptions::new().access_mode(FILE_WRITE_ATTRIBUTES).open(path)
}
