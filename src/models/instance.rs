use camino::{Utf8Path, Utf8PathBuf};

/// Folders every exportable instance must contain.
pub const REQUIRED_FOLDERS: &[&str] = &["mods", "overwrite", "profiles"];

/// Paths inside a Mod Organizer 2 instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mo2Instance {
    pub root: Utf8PathBuf,
    pub mods_dir: Utf8PathBuf,
    pub overwrite_dir: Utf8PathBuf,
    pub profiles_dir: Utf8PathBuf,
    pub downloads_dir: Utf8PathBuf,
}

impl Mo2Instance {
    pub fn new<P: AsRef<Utf8Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            mods_dir: root.join("mods"),
            overwrite_dir: root.join("overwrite"),
            profiles_dir: root.join("profiles"),
            downloads_dir: root.join("downloads"),
            root,
        }
    }

    /// Folder names that must exist, with `downloads` added on request.
    pub fn required_folders(require_downloads: bool) -> Vec<&'static str> {
        let mut folders = REQUIRED_FOLDERS.to_vec();
        if require_downloads {
            folders.push("downloads");
        }
        folders
    }

    /// First required folder that is missing, if any.
    pub fn missing_folder(&self, require_downloads: bool) -> Option<&'static str> {
        Self::required_folders(require_downloads)
            .into_iter()
            .find(|folder| !self.root.join(folder).is_dir())
    }

    pub fn mod_path(&self, mod_name: &str) -> Utf8PathBuf {
        self.mods_dir.join(mod_name)
    }

    pub fn profile_path(&self, profile_name: &str) -> Utf8PathBuf {
        self.profiles_dir.join(profile_name)
    }

    pub fn modlist_path(&self, profile_name: &str) -> Utf8PathBuf {
        self.profile_path(profile_name).join("modlist.txt")
    }

    pub fn plugins_path(&self, profile_name: &str) -> Utf8PathBuf {
        self.profile_path(profile_name).join("plugins.txt")
    }
}
