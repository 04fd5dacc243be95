use std::{
    env,
    path::{Path, PathBuf},
};

use crate::DESKTOP_HOME_ENV;

/// Directories searched for the backend artifact and the bundled runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LaunchLocations {
    /// Packaged resources (`backend/`, `jre/`), when running from a bundle.
    pub(crate) resource_dir: Option<PathBuf>,
    /// Application directory; holds `backend/` during development.
    pub(crate) app_dir: PathBuf,
}

impl LaunchLocations {
    pub(crate) fn new(resource_dir: Option<PathBuf>, app_dir: PathBuf) -> Self {
        Self {
            resource_dir,
            app_dir,
        }
    }

    /// Locations for a launcher started outside a bundle: resources next
    /// to the executable, the crate directory as application directory.
    pub(crate) fn beside_executable() -> Self {
        let resource_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Self::new(resource_dir, workspace_root_dir())
    }
}

pub fn default_data_root_dir() -> Option<PathBuf> {
    if let Some(custom) = env::var_os(DESKTOP_HOME_ENV) {
        let custom = PathBuf::from(custom);
        if !custom.as_os_str().is_empty() {
            return Some(custom);
        }
    }
    home::home_dir().map(|home| home.join(".microcks-desktop"))
}

pub fn default_log_dir() -> PathBuf {
    log_dir_under(default_data_root_dir())
}

/// Repository root in a dev checkout: the parent of `src-tauri/`.
pub fn workspace_root_dir() -> PathBuf {
    let candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..");
    candidate.canonicalize().unwrap_or(candidate)
}

fn log_dir_under(data_root: Option<PathBuf>) -> PathBuf {
    match data_root {
        Some(root) => root.join("logs"),
        None => env::temp_dir().join("microcks-desktop").join("logs"),
    }
}
