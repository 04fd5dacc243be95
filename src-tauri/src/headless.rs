use std::{
    io::{self, Write},
    sync::{mpsc, Arc},
    thread,
};

use crate::{
    append_desktop_log, append_shutdown_log, append_startup_log, desktop_log_path, exit_cleanup,
    lifecycle::{self, LifecyclePhase},
    BackendState, LaunchLocations, ShellSurface, StatusListener,
};

/// Terminal stand-in for the main window.
#[derive(Debug, Default)]
pub(crate) struct ConsoleSurface;

impl ConsoleSurface {
    fn print(&self, line: &str) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{line}");
        let _ = stdout.flush();
    }
}

impl StatusListener for ConsoleSurface {
    fn on_status(&self, message: &str) {
        self.print(&format!("[status] {message}"));
    }

    fn on_log(&self, line: &str) {
        self.print(line);
    }
}

impl ShellSurface for ConsoleSurface {
    fn load_backend_ui(&self, url: &str) -> Result<(), String> {
        self.print(&format!("Microcks is ready at {url}"));
        Ok(())
    }

    fn load_failure_view(&self) -> Result<(), String> {
        Ok(())
    }

    fn alert_error(&self, title: &str, message: &str) {
        eprintln!("{title}: {message}");
    }

    fn notify_error(&self, title: &str, message: &str) {
        eprintln!("{title}: {message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeadlessEvent {
    Interrupted,
    StartupFinished(LifecyclePhase),
}

/// Runs the launcher without a window until Ctrl-C.
///
/// Returns the process exit code.
pub(crate) fn run(state: Arc<BackendState>) -> i32 {
    append_startup_log("headless launcher starting");
    append_startup_log(&format!(
        "desktop log path: {}",
        desktop_log_path().display()
    ));

    let (events_tx, events_rx) = mpsc::channel();
    let interrupt_tx = events_tx.clone();
    if let Err(error) = ctrlc::set_handler(move || {
        let _ = interrupt_tx.send(HeadlessEvent::Interrupted);
    }) {
        append_desktop_log(&format!("failed to install interrupt handler: {error}"));
    }

    spawn_startup(
        &state,
        Arc::new(ConsoleSurface),
        LaunchLocations::beside_executable(),
        events_tx.clone(),
    );
    // `events_tx` stays alive here, so the wait never ends on a closed channel.
    let code = wait_for_exit(&state, &events_rx);
    drop(events_tx);
    code
}

fn spawn_startup<S>(
    state: &Arc<BackendState>,
    surface: Arc<S>,
    locations: LaunchLocations,
    events: mpsc::Sender<HeadlessEvent>,
) where
    S: ShellSurface + 'static,
{
    let state = Arc::clone(state);
    thread::spawn(move || {
        let phase = lifecycle::run_startup(&state, surface, &locations);
        let _ = events.send(HeadlessEvent::StartupFinished(phase));
    });
}

fn wait_for_exit(state: &BackendState, events: &mpsc::Receiver<HeadlessEvent>) -> i32 {
    loop {
        match events.recv() {
            Ok(HeadlessEvent::StartupFinished(LifecyclePhase::Failed)) => {
                shutdown(state);
                return 1;
            }
            Ok(HeadlessEvent::StartupFinished(phase)) => {
                append_startup_log(&format!("headless startup settled in {phase:?}"));
                println!("Press Ctrl-C to stop Microcks.");
            }
            Ok(HeadlessEvent::Interrupted) | Err(_) => {
                shutdown(state);
                return 0;
            }
        }
    }
}

fn shutdown(state: &BackendState) {
    let outcome =
        exit_cleanup::shutdown_once(state, exit_cleanup::ExitTrigger::Interrupt, append_shutdown_log);
    append_shutdown_log(&format!("headless shutdown finished: {outcome:?}"));
}
