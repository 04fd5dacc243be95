use tauri::{AppHandle, Emitter, Manager};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

use crate::{
    append_desktop_log, ShellSurface, StatusListener, FAILURE_PAGE, MAIN_WINDOW_LABEL,
    SPLASH_LOG_EVENT, SPLASH_STATUS_EVENT,
};

pub fn show_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        log("show_main_window skipped: main window not found");
        return;
    };

    if let Err(error) = window.unminimize() {
        log(&format!("failed to unminimize main window: {error}"));
    }
    if let Err(error) = window.show() {
        log(&format!("failed to show main window: {error}"));
    }
    if let Err(error) = window.set_focus() {
        log(&format!("failed to focus main window: {error}"));
    }
}

fn replace_location_script(target: &str) -> String {
    let target_json = serde_json::to_string(target).unwrap_or_else(|_| "\"/\"".to_string());
    format!("window.location.replace({target_json});")
}

fn navigate_main_window(app_handle: &AppHandle, target: &str) -> Result<(), String> {
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        return Err("Main window is unavailable.".to_string());
    };
    window
        .eval(&replace_location_script(target))
        .map_err(|error| format!("Failed to navigate main window to {target}: {error}"))
}

/// The Tauri main window as seen by the lifecycle coordinator.
pub(crate) struct MainWindowSurface {
    app_handle: AppHandle,
}

impl MainWindowSurface {
    pub(crate) fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }

    fn emit_line(&self, event: &str, line: &str) {
        if let Err(error) = self.app_handle.emit(event, line) {
            append_desktop_log(&format!("failed to emit {event}: {error}"));
        }
    }
}

impl StatusListener for MainWindowSurface {
    fn on_status(&self, message: &str) {
        self.emit_line(SPLASH_STATUS_EVENT, message);
    }

    fn on_log(&self, line: &str) {
        self.emit_line(SPLASH_LOG_EVENT, line);
    }
}

impl ShellSurface for MainWindowSurface {
    fn load_backend_ui(&self, url: &str) -> Result<(), String> {
        navigate_main_window(&self.app_handle, url)
    }

    fn load_failure_view(&self) -> Result<(), String> {
        navigate_main_window(&self.app_handle, FAILURE_PAGE)
    }

    fn alert_error(&self, title: &str, message: &str) {
        self.app_handle
            .dialog()
            .message(message)
            .title(title)
            .kind(MessageDialogKind::Error)
            .blocking_show();
    }

    fn notify_error(&self, title: &str, message: &str) {
        self.app_handle
            .dialog()
            .message(message)
            .title(title)
            .kind(MessageDialogKind::Error)
            .show(|_| {});
    }
}
