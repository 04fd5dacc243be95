use std::sync::Arc;

use tauri::{Manager, RunEvent, WindowEvent};

use crate::{
    append_desktop_log, append_startup_log, desktop_log_path, exit_events, main_window,
    startup_task, BackendState, MAIN_WINDOW_LABEL,
};

pub(crate) fn run(state: Arc<BackendState>) {
    append_startup_log("desktop process starting");
    append_startup_log(&format!(
        "desktop log path: {}",
        desktop_log_path().display()
    ));

    let app = match tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, _args, _cwd| {
            append_desktop_log("second instance launched, focusing existing window");
            main_window::show_main_window(app, append_desktop_log);
        }))
        .plugin(tauri_plugin_dialog::init())
        .manage(state)
        .invoke_handler(tauri::generate_handler![
            crate::desktop_commands::desktop_get_startup_state,
        ])
        .on_window_event(|window, event| {
            if window.label() != MAIN_WINDOW_LABEL {
                return;
            }
            if let WindowEvent::Destroyed = event {
                append_desktop_log("main window destroyed, dropping error surface");
                window
                    .app_handle()
                    .state::<Arc<BackendState>>()
                    .surface
                    .clear();
            }
        })
        .setup(|app| {
            startup_task::spawn_startup_task(app.handle().clone(), append_startup_log);
            Ok(())
        })
        .build(tauri::generate_context!())
    {
        Ok(app) => app,
        Err(error) => {
            append_startup_log(&format!("failed to build tauri application: {error}"));
            eprintln!("Microcks Desktop failed to start: {error}");
            std::process::exit(1);
        }
    };

    app.run(|app_handle, event| match event {
        RunEvent::ExitRequested { api, .. } => {
            exit_events::handle_exit_requested(app_handle, &api);
        }
        RunEvent::Exit => {
            exit_events::handle_exit_event(app_handle);
        }
        _ => {}
    });
}
