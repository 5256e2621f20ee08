use serde::{Deserialize, Serialize};

/// Profile used when none is given on the command line
pub const DEFAULT_PROFILE: &str = "Default";

/// Substring that marks a modlist.txt line as a separator
pub const DEFAULT_SEPARATOR_MARKER: &str = "_separator";

/// Run log file, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "MO2_Exporter_Log.txt";

/// Folder and file names never copied into the merged Data folder.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "docs",
    "documentation",
    "readme",
    "readmes",
    "tools",
    "fomod",
    "meta.ini",
];

/// Exporter settings from mo2_exporter.yaml
///
/// Every field has a default, so a partial (or absent) file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterSettings {
    /// Profile to export when `--profile` is not given
    pub default_profile: String,

    /// Case-insensitive path segment names skipped during the merge
    pub exclusions: Vec<String>,

    /// Substring identifying separator lines in modlist.txt
    pub separator_marker: String,

    /// Lower-case directory names in the merged tree
    pub lowercase_directories: bool,

    /// Also require a `downloads` folder in the instance
    pub require_downloads: bool,

    /// Path of the per-run log file
    pub log_file: String,

    pub debug_mode: bool,
}

impl Default for ExporterSettings {
    fn default() -> Self {
        Self {
            default_profile: DEFAULT_PROFILE.to_string(),
            exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
            separator_marker: DEFAULT_SEPARATOR_MARKER.to_string(),
            lowercase_directories: true,
            require_downloads: false,
            log_file: DEFAULT_LOG_FILE.to_string(),
            debug_mode: false,
        }
    }
}
