//! Integration tests for the export pipeline
//!
//! These tests verify:
//! - Precondition failures and their exit codes
//! - Overwrite ordering between mods
//! - Exclusion of documentation and installer folders
//! - Idempotent reruns
//! - The optional overwrite layer and ignore list

use camino::{Utf8Path, Utf8PathBuf};
use mo2_exporter::services::{CopyAction, SourceEntry, plan_layer};
use mo2_exporter::{ExclusionPatterns, ExportError, ExportRequest, ExportService, ExporterSettings};
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

struct TestInstance {
    _temp_dir: TempDir,
    root: Utf8PathBuf,
}

impl TestInstance {
    fn new(modlist: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        for folder in ["mods", "overwrite", "profiles/Default"] {
            fs::create_dir_all(root.join(folder)).unwrap();
        }
        fs::write(root.join("profiles/Default/modlist.txt"), modlist).unwrap();
        fs::write(
            root.join("profiles/Default/plugins.txt"),
            "# plugins\n*Unofficial Skyrim Special Edition Patch.esp\n",
        )
        .unwrap();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    fn add_file(&self, relative: &str, contents: &str) {
        let path = self.root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn output(&self) -> Utf8PathBuf {
        self.root.join("export")
    }

    fn request(&self) -> ExportRequest {
        ExportRequest::new(&self.root, self.output())
    }
}

fn snapshot(root: &Utf8Path) -> BTreeMap<String, String> {
    let mut files = BTreeMap::new();
    for entry in walkdir::WalkDir::new(root) {
        let entry = entry.unwrap();
        let relative = entry.path().strip_prefix(root).unwrap().to_string_lossy().to_string();
        let contents = if entry.file_type().is_file() {
            fs::read_to_string(entry.path()).unwrap()
        } else {
            "<dir>".to_string()
        };
        files.insert(relative, contents);
    }
    files
}

fn service() -> ExportService {
    ExportService::new(ExporterSettings::default())
}

#[test]
fn test_missing_profiles_folder() {
    let instance = TestInstance::new("+ModA\n");
    fs::remove_dir_all(instance.root.join("profiles")).unwrap();

    let err = service().run(&instance.request()).unwrap_err();

    assert!(matches!(err, ExportError::MissingInstanceFolder(ref f) if f == "profiles"));
    assert_eq!(err.exit_code(), 1);
    assert!(!instance.output().exists());
}

#[test]
fn test_missing_profile() {
    let instance = TestInstance::new("+ModA\n");
    let mut request = instance.request();
    request.profile = "Nonexistent".to_string();

    let err = service().run(&request).unwrap_err();

    assert_eq!(err.exit_code(), 2);
    assert!(!instance.output().exists());
}

#[test]
fn test_missing_ignore_list() {
    let instance = TestInstance::new("+ModA\n");
    instance.add_file("mods/ModA/a.esp", "a");
    let mut request = instance.request();
    request.ignore_list = Some(instance.root.join("missing.txt"));

    let err = service().run(&request).unwrap_err();

    assert!(matches!(err, ExportError::MissingIgnoreList(_)));
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn test_missing_mod_stops_run() {
    // Merge order is Present, Missing, Later
    let instance = TestInstance::new("+Later\n+Missing\n+Present\n");
    instance.add_file("mods/Present/present.esp", "present");
    instance.add_file("mods/Later/later.esp", "later");

    let err = service().run(&instance.request()).unwrap_err();

    assert!(matches!(err, ExportError::ModDirectoryMissing(_)));
    assert_eq!(err.exit_code(), 5);
    let data = instance.output().join("Data");
    assert!(data.join("present.esp").exists());
    assert!(!data.join("later.esp").exists());
    assert!(!instance.output().join("Plugins.txt").exists());
}

#[test]
fn test_higher_priority_mod_wins() {
    // MO2 lists the winning mod first
    let instance = TestInstance::new("+Winner\n+Loser\n");
    instance.add_file("mods/Loser/Textures/sky.dds", "loser");
    instance.add_file("mods/Loser/only_loser.txt", "loser");
    instance.add_file("mods/Winner/textures/sky.dds", "winner");

    let report = service().run(&instance.request()).unwrap();

    let data = instance.output().join("Data");
    assert_eq!(report.merged, vec!["Loser", "Winner"]);
    assert_eq!(fs::read_to_string(data.join("textures/sky.dds")).unwrap(), "winner");
    assert_eq!(fs::read_to_string(data.join("only_loser.txt")).unwrap(), "loser");
    assert_eq!(report.metrics.files_overwritten, 1);
}

#[test]
fn test_exclusions_never_reach_destination() {
    let instance = TestInstance::new("+ModA\n");
    instance.add_file("mods/ModA/meta.ini", "[General]");
    instance.add_file("mods/ModA/FOMOD/ModuleConfig.xml", "<config/>");
    instance.add_file("mods/ModA/Docs/Readme.txt", "docs");
    instance.add_file("mods/ModA/SKSE/Plugins/Tools/helper.exe", "exe");
    instance.add_file("mods/ModA/SKSE/Plugins/mod.dll", "dll");

    service().run(&instance.request()).unwrap();

    let files = snapshot(&instance.output().join("Data"));
    for path in files.keys() {
        for segment in path.split(['/', '\\']) {
            let segment = segment.to_lowercase();
            assert!(
                !["meta.ini", "fomod", "docs", "tools"].contains(&segment.as_str()),
                "{} should have been excluded",
                path
            );
        }
    }
    assert!(files.contains_key("skse/plugins/mod.dll") || files.contains_key("skse\\plugins\\mod.dll"));
}

#[test]
fn test_rerun_is_idempotent() {
    let instance = TestInstance::new("+ModB\n+ModA\n");
    instance.add_file("mods/ModA/Meshes/a.nif", "a");
    instance.add_file("mods/ModA/shared.ini", "a");
    instance.add_file("mods/ModB/shared.ini", "b");

    service().run(&instance.request()).unwrap();
    let first = snapshot(&instance.output());

    service().run(&instance.request()).unwrap();
    let second = snapshot(&instance.output());

    assert_eq!(first, second);
}

#[test]
fn test_plugins_copied_verbatim() {
    let instance = TestInstance::new("");

    let report = service().run(&instance.request()).unwrap();

    assert!(report.merged.is_empty());
    assert!(instance.output().join("Data").is_dir());
    assert_eq!(
        fs::read_to_string(instance.output().join("Plugins.txt")).unwrap(),
        "# plugins\n*Unofficial Skyrim Special Edition Patch.esp\n"
    );
}

#[test]
fn test_include_overwrite_is_last_layer() {
    let instance = TestInstance::new("+ModA\n");
    instance.add_file("mods/ModA/meshes/body.nif", "mod");
    instance.add_file("overwrite/meshes/body.nif", "bodyslide");

    let mut request = instance.request();
    request.include_overwrite = true;
    let report = service().run(&request).unwrap();

    assert_eq!(report.merged, vec!["ModA", "overwrite"]);
    assert_eq!(
        fs::read_to_string(instance.output().join("Data/meshes/body.nif")).unwrap(),
        "bodyslide"
    );
}

#[test]
fn test_overwrite_skipped_by_default() {
    let instance = TestInstance::new("+ModA\n");
    instance.add_file("mods/ModA/a.esp", "a");
    instance.add_file("overwrite/FNIS.esp", "fnis");

    service().run(&instance.request()).unwrap();

    assert!(!instance.output().join("Data/FNIS.esp").exists());
}

#[test]
fn test_ignore_list_skips_missing_mod() {
    let instance = TestInstance::new("+Removed Mod\n+ModA\n");
    instance.add_file("mods/ModA/a.esp", "a");
    instance.add_file("ignore.txt", "Removed Mod\n");

    let mut request = instance.request();
    request.ignore_list = Some(instance.root.join("ignore.txt"));
    let report = service().run(&request).unwrap();

    assert_eq!(report.merged, vec!["ModA"]);
}

#[test]
fn test_keep_directory_case() {
    let instance = TestInstance::new("+ModA\n");
    instance.add_file("mods/ModA/Interface/Translations/ModA_ENGLISH.txt", "$KEY");

    let settings = ExporterSettings {
        lowercase_directories: false,
        ..ExporterSettings::default()
    };
    ExportService::new(settings).run(&instance.request()).unwrap();

    assert!(
        instance
            .output()
            .join("Data/Interface/Translations/ModA_ENGLISH.txt")
            .is_file()
    );
}

#[test]
fn test_plan_is_pure_over_listing() {
    let listing = vec![
        SourceEntry::directory("Readmes"),
        SourceEntry::file("Readmes/changelog.txt"),
        SourceEntry::directory("Scripts"),
        SourceEntry::file("Scripts/Quest.pex"),
    ];

    let plan = plan_layer(&listing, &ExclusionPatterns::default(), true);

    assert_eq!(plan.excluded, 2);
    assert_eq!(
        plan.actions,
        vec![
            CopyAction::CreateDir {
                dest: "scripts".into()
            },
            CopyAction::CopyFile {
                source: "Scripts/Quest.pex".into(),
                dest: "scripts/Quest.pex".into(),
            },
        ]
    );
}

#[cfg(unix)]
#[test]
fn test_read_only_mod_file_exports_twice() {
    use std::os::unix::fs::PermissionsExt;

    let instance = TestInstance::new("+ModA\n");
    instance.add_file("mods/ModA/A.esp", "plugin");
    instance.add_file("mods/ModA/Scripts/Quest.pex", "script");
    let plugin = instance.root.join("mods/ModA/A.esp");
    fs::set_permissions(&plugin, fs::Permissions::from_mode(0o444)).unwrap();

    let report = service().run(&instance.request()).unwrap();
    assert_eq!(report.merged, vec!["ModA"]);
    let first = snapshot(&instance.output());

    let report = service().run(&instance.request()).unwrap();
    assert_eq!(report.metrics.files_overwritten, 2);
    assert_eq!(snapshot(&instance.output()), first);
    assert_eq!(
        fs::read_to_string(instance.output().join("Data/A.esp")).unwrap(),
        "plugin"
    );
}
