use std::path::{Path, PathBuf};

/// Paths inside the managed addons directory. The manifest, the downloaded
/// artifacts, and the installed module directories all live under one root,
/// matching how the game client expects the directory to look.
#[derive(Debug, Clone)]
pub struct AddonsLayout {
    addons_dir: PathBuf,
}

impl AddonsLayout {
    pub fn new(addons_dir: impl Into<PathBuf>) -> Self {
        Self {
            addons_dir: addons_dir.into(),
        }
    }

    pub fn addons_dir(&self) -> &Path {
        &self.addons_dir
    }

    /// Cache location for a downloaded release artifact.
    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.addons_dir.join(file_name)
    }

    /// Installed location of one module directory.
    pub fn module_path(&self, dir_name: &str) -> PathBuf {
        self.addons_dir.join(dir_name)
    }
}
