use std::sync::Arc;

use tauri::{AppHandle, Manager};

use crate::{
    lifecycle, main_window::MainWindowSurface, runtime_paths, BackendState, LaunchLocations,
};

fn resolve_launch_locations(app_handle: &AppHandle) -> LaunchLocations {
    LaunchLocations::new(
        app_handle.path().resource_dir().ok(),
        runtime_paths::workspace_root_dir(),
    )
}

pub fn spawn_startup_task<F>(app_handle: AppHandle, log: F)
where
    F: Fn(&str) + Copy + Send + 'static,
{
    let state = Arc::clone(app_handle.state::<Arc<BackendState>>().inner());
    let locations = resolve_launch_locations(&app_handle);
    log(&format!(
        "launch locations: resource_dir={:?}, app_dir={}",
        locations.resource_dir,
        locations.app_dir.display()
    ));

    let surface = Arc::new(MainWindowSurface::new(app_handle));
    tauri::async_runtime::spawn_blocking(move || {
        let phase = lifecycle::run_startup(&state, surface, &locations);
        log(&format!("startup task settled: phase={phase:?}"));
    });
}
