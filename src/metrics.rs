// Export metrics
//
// Counters collected while merging mods, logged once at the end of a run.

use std::time::{Duration, Instant};

/// Counters for a single export run
#[derive(Debug, Clone)]
pub struct ExportMetrics {
    /// Layers merged (mods plus the overwrite folder when included)
    pub layers_merged: usize,

    /// Files written into the destination
    pub files_copied: u64,

    /// Files that replaced one written by an earlier layer (or a previous run); advisory
    pub files_overwritten: u64,

    /// Total bytes copied
    pub bytes_copied: u64,

    /// Destination directories that had to be created
    pub directories_created: u64,

    /// Source entries dropped by exclusion patterns
    pub entries_excluded: u64,

    start_time: Instant,
}

impl ExportMetrics {
    pub fn new() -> Self {
        Self {
            layers_merged: 0,
            files_copied: 0,
            files_overwritten: 0,
            bytes_copied: 0,
            directories_created: 0,
            entries_excluded: 0,
            start_time: Instant::now(),
        }
    }

    pub fn record_layer_merged(&mut self) {
        self.layers_merged += 1;
    }

    /// Record one copied file; `overwrote` is true when the destination already existed.
    ///
    /// The caller checks for the destination before copying, in a separate filesystem
    /// call, so the overwrite count is advisory if anything else writes the destination.
    pub fn record_file_copied(&mut self, bytes: u64, overwrote: bool) {
        self.files_copied += 1;
        self.bytes_copied += bytes;
        if overwrote {
            self.files_overwritten += 1;
        }
    }

    pub fn record_directory_created(&mut self) {
        self.directories_created += 1;
    }

    pub fn record_excluded(&mut self, count: u64) {
        self.entries_excluded += count;
    }

    /// Time since the counters were created
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Export Summary ===");
        tracing::info!("Layers merged: {}", self.layers_merged);
        tracing::info!(
            "Files: {} copied ({} overwritten), {:.2} MB",
            self.files_copied,
            self.files_overwritten,
            self.bytes_copied as f64 / 1_048_576.0
        );
        tracing::info!(
            "Directories created: {}, entries excluded: {}",
            self.directories_created,
            self.entries_excluded
        );
    }
}

impl Default for ExportMetrics {
    fn default() -> Self {
        Self::new()
    }
}
