#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_constants;
mod app_helpers;
#[cfg(feature = "desktop")]
mod app_runtime;
mod app_types;
mod backend_config;
mod backend_exit_state;
mod backend_http;
mod backend_launch;
mod backend_output;
mod backend_process_lifecycle;
mod backend_readiness;
mod backend_startup;
#[cfg(feature = "desktop")]
mod desktop_commands;
mod exit_cleanup;
#[cfg(feature = "desktop")]
mod exit_events;
mod exit_state;
mod headless;
mod http_response;
mod launch_error;
mod launch_plan;
mod lifecycle;
mod logging;
#[cfg(feature = "desktop")]
mod main_window;
mod process_control;
mod runtime_paths;
mod shell_surface;
mod status_channel;
#[cfg(feature = "desktop")]
mod startup_task;

use std::sync::Arc;

pub(crate) use app_constants::*;
pub(crate) use app_helpers::{
    append_desktop_log, append_shutdown_log, append_startup_log, build_debug_command,
    desktop_log_path,
};
pub(crate) use app_types::{AtomicFlagGuard, BackendState, LaunchPlan};
pub(crate) use backend_config::BackendConfig;
pub(crate) use launch_error::LaunchError;
pub(crate) use runtime_paths::LaunchLocations;
pub(crate) use shell_surface::{ShellSurface, SurfaceSlot};
pub(crate) use status_channel::{StatusChannel, StatusListener};

const HEADLESS_FLAG: &str = "--headless";

fn headless_requested<I>(args: I) -> bool
where
    I: IntoIterator<Item = String>,
{
    !cfg!(feature = "desktop") || args.into_iter().skip(1).any(|arg| arg == HEADLESS_FLAG)
}

fn main() {
    let state = Arc::new(BackendState::from_env());

    if headless_requested(std::env::args()) {
        std::process::exit(headless::run(state));
    }

    #[cfg(feature = "desktop")]
    app_runtime::run(state);
}
