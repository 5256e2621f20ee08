//! Data models for the MO2 exporter.
//!
//! - [`ExporterSettings`]: user settings loaded from `mo2_exporter.yaml`
//! - [`Mo2Instance`]: folder layout of a Mod Organizer 2 instance
//! - [`ModListEntry`]: one classified line of a profile's `modlist.txt`
//! - [`ResolvedModList`]: the mods to merge, lowest priority first
//! - [`IgnoreSet`] and [`ExclusionPatterns`]: what is left out of the export

pub mod config;
pub mod instance;
pub mod modlist;

pub use config::ExporterSettings;
pub use instance::Mo2Instance;
pub use modlist::{
    EntryKind, ExclusionPatterns, IgnoreSet, ModListEntry, ResolutionSummary, ResolvedModList,
};
