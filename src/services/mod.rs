//! Services module - the export pipeline.
//!
//! Nothing here touches the CLI or logging setup; every input is an explicit parameter,
//! so each step can be driven directly from tests.
//!
//! # Components
//!
//! - [`modlist`]: classifies `modlist.txt` lines and produces the merge order
//!   (lowest priority first), honouring an optional ignore list.
//! - [`merge`]: lists a mod folder, plans the copy as a pure function of the listing,
//!   and executes it with last-writer-wins overwrites.
//! - [`ExportService`]: checks the instance layout and list files, then runs the
//!   resolver and merger and copies `plugins.txt` next to the merged `Data` folder.
//!
//! # Usage Example
//!
//! ```ignore
//! use mo2_exporter::services::{ExportRequest, ExportService};
//! use mo2_exporter::ExporterSettings;
//!
//! let service = ExportService::new(ExporterSettings::default());
//! let mut request = ExportRequest::new("C:/Modding/MO2", "C:/Export");
//! request.profile = "Survival".to_string();
//!
//! let report = service.run(&request)?;
//! println!("merged {} mods", report.merged.len());
//! ```

pub mod export;
pub mod merge;
pub mod modlist;

pub use export::{ExportError, ExportReport, ExportRequest, ExportService};
pub use merge::{CopyAction, CopyPlan, EntryType, SourceEntry, merge_layer, plan_layer};
pub use modlist::{load_ignore_set, read_list_file, resolve};
