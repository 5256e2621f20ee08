use crate::metrics::ExportMetrics;
use crate::models::{ExclusionPatterns, ExporterSettings, IgnoreSet, Mo2Instance};
use crate::services::merge::{copy_file_with_times, merge_layer};
use crate::services::modlist::{load_ignore_set, read_list_file, resolve};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that end an export run
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("{0} is missing from the instance")]
    MissingInstanceFolder(String),

    #[error("Missing modlist.txt: {0}")]
    MissingModList(Utf8PathBuf),

    #[error("Missing plugins.txt: {0}")]
    MissingPluginList(Utf8PathBuf),

    #[error("Ignore list not found: {0}")]
    MissingIgnoreList(Utf8PathBuf),

    #[error("Mod folder does not exist or is corrupted: {0}")]
    ModDirectoryMissing(Utf8PathBuf),

    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: Utf8PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl ExportError {
    pub(crate) fn io(path: &Utf8Path, source: io::Error) -> Self {
        ExportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Process exit code for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            ExportError::MissingInstanceFolder(_) => 1,
            ExportError::MissingModList(_) => 2,
            ExportError::MissingPluginList(_) => 3,
            ExportError::MissingIgnoreList(_) => 4,
            ExportError::ModDirectoryMissing(_) => 5,
            ExportError::NonUtf8Path(_) | ExportError::Io { .. } | ExportError::Walk { .. } => 6,
        }
    }
}

/// What to export and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub instance: Utf8PathBuf,
    pub output: Utf8PathBuf,
    pub profile: String,
    pub ignore_list: Option<Utf8PathBuf>,
    /// Merge the instance's overwrite folder as the final layer
    pub include_overwrite: bool,
}

impl ExportRequest {
    pub fn new<I, O>(instance: I, output: O) -> Self
    where
        I: Into<Utf8PathBuf>,
        O: Into<Utf8PathBuf>,
    {
        Self {
            instance: instance.into(),
            output: output.into(),
            profile: crate::models::config::DEFAULT_PROFILE.to_string(),
            ignore_list: None,
            include_overwrite: false,
        }
    }

    pub fn data_dir(&self) -> Utf8PathBuf {
        self.output.join("Data")
    }

    pub fn plugins_output(&self) -> Utf8PathBuf {
        self.output.join("Plugins.txt")
    }
}

/// Outcome of a successful export
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Layers in the order they were merged
    pub merged: Vec<String>,
    pub metrics: ExportMetrics,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub elapsed: Duration,
}

/// Runs the full export pipeline: validate, resolve, merge, copy plugins.
///
/// Synchronous and single-threaded; layers are merged strictly in order so that later
/// mods overwrite earlier ones.
#[derive(Debug, Clone)]
pub struct ExportService {
    settings: ExporterSettings,
    exclusions: ExclusionPatterns,
}

impl ExportService {
    pub fn new(settings: ExporterSettings) -> Self {
        let exclusions = ExclusionPatterns::new(&settings.exclusions);
        Self {
            settings,
            exclusions,
        }
    }

    pub fn settings(&self) -> &ExporterSettings {
        &self.settings
    }

    pub fn exclusions(&self) -> &ExclusionPatterns {
        &self.exclusions
    }

    pub fn run(&self, request: &ExportRequest) -> Result<ExportReport, ExportError> {
        let instance = Mo2Instance::new(&request.instance);

        tracing::info!("Verifying instance & output path...");
        if let Some(folder) = instance.missing_folder(self.settings.require_downloads) {
            tracing::error!("ERROR: {:>12} is missing!", folder);
            return Err(ExportError::MissingInstanceFolder(folder.to_string()));
        }

        tracing::info!("Verifying modlist.txt and plugins.txt...");
        let modlist_path = instance.modlist_path(&request.profile);
        if !modlist_path.is_file() {
            tracing::error!("ERROR: Missing modlist.txt at {}", modlist_path);
            return Err(ExportError::MissingModList(modlist_path));
        }
        tracing::info!("\t{} is good", modlist_path);

        let plugins_path = instance.plugins_path(&request.profile);
        if !plugins_path.is_file() {
            tracing::error!("ERROR: Missing plugins.txt at {}", plugins_path);
            return Err(ExportError::MissingPluginList(plugins_path));
        }
        tracing::info!("\t{} is good", plugins_path);

        let ignore = match &request.ignore_list {
            Some(path) if !path.is_file() => {
                tracing::error!("ERROR: Ignore list not found at {}", path);
                return Err(ExportError::MissingIgnoreList(path.clone()));
            }
            Some(path) => load_ignore_set(path).map_err(|e| ExportError::io(path, e))?,
            None => IgnoreSet::new(),
        };

        let lines = read_list_file(&modlist_path).map_err(|e| ExportError::io(&modlist_path, e))?;
        let resolved = resolve(lines, &ignore, &self.settings.separator_marker);
        tracing::info!("{} mods will be merged", resolved.len());

        let data_dir = request.data_dir();
        fs::create_dir_all(&data_dir).map_err(|e| ExportError::io(&data_dir, e))?;

        tracing::info!("Preparing final package:");
        let started_at = Local::now();
        let mut metrics = ExportMetrics::new();
        let mut merged = Vec::with_capacity(resolved.len() + 1);

        for mod_name in resolved.iter() {
            let mod_path = instance.mod_path(mod_name);
            if !mod_path.is_dir() {
                tracing::error!("ERROR: Mod folder does not exist or is corrupted: {}", mod_path);
                return Err(ExportError::ModDirectoryMissing(mod_path));
            }

            tracing::info!("Copying {}...", mod_name);
            self.merge(&mod_path, &data_dir, &mut metrics)?;
            merged.push(mod_name.to_string());
        }

        if request.include_overwrite {
            tracing::info!("Copying overwrite folder...");
            self.merge(&instance.overwrite_dir, &data_dir, &mut metrics)?;
            merged.push("overwrite".to_string());
        }

        tracing::info!("Copying plugins.txt to final package...");
        let plugins_output = request.plugins_output();
        copy_file_with_times(&plugins_path, &plugins_output)
            .map_err(|e| ExportError::io(&plugins_path, e))?;

        let finished_at = Local::now();
        let elapsed = metrics.elapsed();
        tracing::info!("Start Time: {}", started_at.format("%H:%M:%S%.6f"));
        tracing::info!("End Time: {}", finished_at.format("%H:%M:%S%.6f"));
        tracing::info!("Copy Execution Time: {:.3} s", elapsed.as_secs_f64());
        metrics.log_summary();

        Ok(ExportReport {
            merged,
            metrics,
            started_at,
            finished_at,
            elapsed,
        })
    }

    fn merge(
        &self,
        source: &Utf8Path,
        data_dir: &Utf8Path,
        metrics: &mut ExportMetrics,
    ) -> Result<(), ExportError> {
        merge_layer(
            source,
            data_dir,
            &self.exclusions,
            self.settings.lowercase_directories,
            metrics,
        )
    }
}
