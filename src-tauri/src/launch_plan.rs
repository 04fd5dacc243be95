use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{BackendConfig, LaunchError, LaunchLocations, LaunchPlan};

#[cfg(target_os = "windows")]
const JAVA_BINARY: &str = "java.exe";
#[cfg(not(target_os = "windows"))]
const JAVA_BINARY: &str = "java";

/// Directories scanned for `*.jar`, in priority order.
pub fn artifact_search_dirs(locations: &LaunchLocations) -> Vec<PathBuf> {
    let mut dirs = Vec::with_capacity(2);
    if let Some(resource_dir) = &locations.resource_dir {
        dirs.push(resource_dir.join("backend"));
    }
    dirs.push(locations.app_dir.join("backend"));
    dirs
}

/// Override path first (only when it exists), then the first `.jar` of
/// each search directory.
pub fn find_artifact(
    artifact_override: Option<&Path>,
    locations: &LaunchLocations,
) -> Result<PathBuf, LaunchError> {
    if let Some(path) = artifact_override {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
    }

    let search_dirs = artifact_search_dirs(locations);
    for dir in &search_dirs {
        if let Some(jar) = first_jar_in(dir) {
            return Ok(jar);
        }
    }

    let mut searched: Vec<PathBuf> = artifact_override.map(Path::to_path_buf).into_iter().collect();
    searched.extend(search_dirs);
    Err(LaunchError::ArtifactNotFound { searched })
}

fn first_jar_in(dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut jars: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|extension| extension == "jar")
        })
        .collect();
    jars.sort();
    jars.into_iter().next()
}

/// Bundled runtime, then `JAVA_HOME`, then `java` from `PATH` unchecked.
pub fn find_java_executable(java_home: Option<&Path>, locations: &LaunchLocations) -> PathBuf {
    if let Some(resource_dir) = &locations.resource_dir {
        let packaged_java = resource_dir.join("jre").join("bin").join(JAVA_BINARY);
        if packaged_java.is_file() {
            return packaged_java;
        }
    }
    if let Some(home) = java_home {
        let java_from_home = home.join("bin").join(JAVA_BINARY);
        if java_from_home.is_file() {
            return java_from_home;
        }
    }
    PathBuf::from("java")
}

pub fn build_launch_args(artifact: &Path, port: u16, profile: &str) -> Vec<String> {
    vec![
        "-jar".to_string(),
        artifact.to_string_lossy().to_string(),
        format!("--server.port={port}"),
        format!("--spring.profiles.active={profile}"),
    ]
}

pub fn resolve_launch_plan(
    config: &BackendConfig,
    artifact: &Path,
    locations: &LaunchLocations,
) -> LaunchPlan {
    LaunchPlan {
        cmd: find_java_executable(config.java_home.as_deref(), locations),
        args: build_launch_args(artifact, config.port, &config.profile),
    }
}
