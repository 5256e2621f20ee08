//! MO2 Exporter - merge a Mod Organizer 2 instance into a plain Data folder.
//!
//! Main entry point for the command-line tool.
//!
//! # Execution Flow
//!
//! 1. Parse arguments and load `mo2_exporter.yaml` (plus `MO2_EXPORTER_*` overrides)
//! 2. Open the run log (`MO2_Exporter_Log.txt` by default) and the console logger
//! 3. Verify the instance folders and the profile's `modlist.txt` / `plugins.txt`
//! 4. Merge every enabled mod into `<output>/Data`, lowest priority first
//! 5. Copy `plugins.txt` to `<output>/Plugins.txt` and log timings
//!
//! The process exit code identifies the failure; see [`ExportError::exit_code`].

use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use mo2_exporter::{
    APP_NAME, ConfigManager, ExportError, ExportRequest, ExportService, SETUP_FAILURE_EXIT_CODE,
    VERSION,
};
use std::error::Error;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "mo2-exporter")]
#[command(version)]
#[command(about = "Make a merged Data folder and Plugins.txt from a Mod Organizer 2 instance")]
struct Cli {
    /// MO2 instance folder path
    #[arg(short, long)]
    instance: Utf8PathBuf,

    /// Output folder for Data and Plugins.txt
    #[arg(short, long)]
    output: Utf8PathBuf,

    /// Profile of the instance (defaults to the configured profile, "Default")
    #[arg(short, long)]
    profile: Option<String>,

    /// File listing mod folder names to leave out, one per line
    #[arg(short = 'g', long)]
    ignore_list: Option<Utf8PathBuf>,

    /// Merge the instance's overwrite folder after all mods
    #[arg(long)]
    include_overwrite: bool,

    /// Settings file
    #[arg(short, long, default_value = mo2_exporter::config::DEFAULT_SETTINGS_FILE)]
    config: Utf8PathBuf,

    /// Run log path (overrides the settings file)
    #[arg(long, env = "MO2_EXPORTER_LOG_FILE")]
    log_file: Option<Utf8PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.config);
    let settings_found = config_manager.settings_file_exists();
    let settings = match config_manager.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load settings: {:#}", e);
            return Ok(ExitCode::from(SETUP_FAILURE_EXIT_CODE));
        }
    };

    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| Utf8PathBuf::from(&settings.log_file));
    let _guard = match mo2_exporter::logging::setup_logging(
        &log_file,
        settings.debug_mode || cli.verbose,
        true,
    ) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to set up logging: {:#}", e);
            return Ok(ExitCode::from(SETUP_FAILURE_EXIT_CODE));
        }
    };

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    if !settings_found {
        tracing::warn!(
            "Settings file not found at {}, using defaults",
            config_manager.settings_path()
        );
    }

    let request = ExportRequest {
        instance: cli.instance,
        output: cli.output,
        profile: cli
            .profile
            .unwrap_or_else(|| settings.default_profile.clone()),
        ignore_list: cli.ignore_list,
        include_overwrite: cli.include_overwrite,
    };
    tracing::info!(
        "Exporting profile \"{}\" from {} to {}",
        request.profile,
        request.instance,
        request.output
    );

    let service = ExportService::new(settings);
    let code = match service.run(&request) {
        Ok(report) => {
            tracing::info!(
                "Done! {} layers merged into {}",
                report.merged.len(),
                request.data_dir()
            );
            tracing::info!(
                "Please make a backup of your game's Data folder, then overwrite it and Plugins.txt with the exported copies"
            );
            if !request.include_overwrite {
                tracing::info!(
                    "Tool output left in the overwrite folder (FNIS, Nemesis, Bodyslide) is not included; rerun with --include-overwrite or copy it to Data manually"
                );
            }
            println!("Success! Everything is OK!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_failure(&e);
            println!("Failed, please check log file: {}", log_file);
            ExitCode::from(e.exit_code())
        }
    };

    Ok(code)
}

fn report_failure(error: &ExportError) {
    tracing::error!("Export failed: {}", error);
    let mut source = error.source();
    while let Some(cause) = source {
        tracing::error!("  caused by: {}", cause);
        source = cause.source();
    }
}
