use std::sync::Arc;

use tauri::State;

use crate::{lifecycle::StartupSnapshot, BackendState};

/// Lets the splash page catch up on a phase it missed the event for.
#[tauri::command]
pub(crate) fn desktop_get_startup_state(state: State<'_, Arc<BackendState>>) -> StartupSnapshot {
    state.startup_snapshot()
}
