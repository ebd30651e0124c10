//! Settings file locations

use std::path::PathBuf;

use crate::filesys::file::File;

/// Name of the per-repository settings file
pub const SETTINGS_FILE_NAME: &str = ".branchdeploy.json";

/// Where settings are looked up, in priority order
#[derive(Debug, Clone)]
pub struct StorageLayout {
    /// Working directory (normally the repository root)
    pub work_dir: PathBuf,

    /// Per-user configuration directory
    pub user_dir: Option<PathBuf>,
}

impl StorageLayout {
    /// Create a new storage layout
    pub fn new(work_dir: impl Into<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            user_dir,
        }
    }

    /// Settings file in the working directory
    pub fn repo_settings_file(&self) -> File {
        File::new(self.work_dir.join(SETTINGS_FILE_NAME))
    }

    /// Settings file in the user configuration directory
    pub fn user_settings_file(&self) -> Option<File> {
        self.user_dir
            .as_ref()
            .map(|dir| File::new(dir.join("branchdeploy").join("settings.json")))
    }

    /// First existing settings file, falling back to the repository one
    pub async fn settings_file(&self) -> File {
        let repo = self.repo_settings_file();
        if repo.exists().await {
            return repo;
        }
        match self.user_settings_file() {
            Some(user) if user.exists().await => user,
            _ => repo,
        }
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        let work_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let user_dir = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME")
                    .or_else(|| std::env::var_os("USERPROFILE"))
                    .map(|home| PathBuf::from(home).join(".config"))
            });

        Self::new(work_dir, user_dir)
    }
}
