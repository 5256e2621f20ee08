// MO2 Exporter - flatten a Mod Organizer 2 instance into a standalone Data folder
//
// This is the library crate containing the mod list resolver and the layered copy merger.
// The binary crate (main.rs) provides the command-line entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::ExportMetrics;
pub use models::{ExclusionPatterns, ExporterSettings, IgnoreSet, Mo2Instance, ResolvedModList};
pub use services::{ExportError, ExportReport, ExportRequest, ExportService};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Exit code for failures before the export starts (settings, logging)
pub const SETUP_FAILURE_EXIT_CODE: u8 = 10;
