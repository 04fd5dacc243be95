use std::sync::Arc;

use tauri::{AppHandle, ExitRequestApi, Manager};

use crate::{append_shutdown_log, exit_cleanup, BackendState};

/// What an `ExitRequested` event should do, given the shutdown gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitRoute {
    /// The backend tree is already gone; let the process end.
    Proceed,
    /// First request: hold the exit and stop the backend on a worker.
    StopBackend,
    /// A stop is already running; keep holding the exit.
    Hold,
}

fn route_exit_request(state: &BackendState) -> ExitRoute {
    if state.take_exit_request_allowance() {
        return ExitRoute::Proceed;
    }
    if exit_cleanup::try_begin_exit_cleanup(
        state,
        exit_cleanup::ExitTrigger::ExitRequested,
        append_shutdown_log,
    ) {
        ExitRoute::StopBackend
    } else {
        ExitRoute::Hold
    }
}

fn managed_state(app_handle: &AppHandle) -> Arc<BackendState> {
    Arc::clone(app_handle.state::<Arc<BackendState>>().inner())
}

pub fn handle_exit_requested(app_handle: &AppHandle, api: &ExitRequestApi) {
    let state = managed_state(app_handle);
    let route = route_exit_request(&state);
    append_shutdown_log(&format!("exit requested: {route:?}"));
    if route == ExitRoute::Proceed {
        return;
    }

    api.prevent_exit();
    if route == ExitRoute::Hold {
        return;
    }

    let app_handle = app_handle.clone();
    tauri::async_runtime::spawn_blocking(move || {
        let outcome = exit_cleanup::stop_backend_for_exit(
            &state,
            exit_cleanup::ExitTrigger::ExitRequested,
            append_shutdown_log,
        );
        append_shutdown_log(&format!("backend stopped before exit: {outcome:?}"));
        state.allow_next_exit_request();
        app_handle.exit(0);
    });
}

/// Last chance on `RunEvent::Exit`: stops the backend inline when no
/// `ExitRequested` cleanup ran first.
pub fn handle_exit_event(app_handle: &AppHandle) {
    let state = managed_state(app_handle);
    let outcome = exit_cleanup::shutdown_once(
        &state,
        exit_cleanup::ExitTrigger::ExitFallback,
        append_shutdown_log,
    );
    if outcome.is_some() {
        append_shutdown_log(&format!("backend stopped on exit fallback: {outcome:?}"));
    }
}
