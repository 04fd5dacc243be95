use std::sync::{Arc, MutexGuard};

use serde::Serialize;

use crate::{
    append_desktop_log, append_startup_log, BackendState, LaunchLocations, ShellSurface,
    PRODUCT_NAME,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum LifecyclePhase {
    #[default]
    Splash,
    Starting,
    Ready,
    Failed,
}

/// Splash → Starting → Ready | Failed, each step taken at most once.
#[derive(Debug, Default)]
pub(crate) struct LifecycleMachine {
    phase: LifecyclePhase,
}

impl LifecycleMachine {
    pub(crate) fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub(crate) fn transition(&mut self, next: LifecyclePhase) -> bool {
        let allowed = matches!(
            (self.phase, next),
            (LifecyclePhase::Splash, LifecyclePhase::Starting)
                | (LifecyclePhase::Starting, LifecyclePhase::Ready)
                | (LifecyclePhase::Starting, LifecyclePhase::Failed)
        );
        if allowed {
            self.phase = next;
        }
        allowed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartupSnapshot {
    pub(crate) phase: LifecyclePhase,
    pub(crate) backend_url: String,
}

impl BackendState {
    fn lifecycle(&self) -> MutexGuard<'_, LifecycleMachine> {
        match self.lifecycle.lock() {
            Ok(guard) => guard,
            Err(error) => {
                append_desktop_log(&format!("lifecycle lock poisoned: {error}"));
                error.into_inner()
            }
        }
    }

    pub(crate) fn lifecycle_phase(&self) -> LifecyclePhase {
        self.lifecycle().phase()
    }

    fn enter_phase(&self, next: LifecyclePhase) -> bool {
        let mut machine = self.lifecycle();
        let from = machine.phase();
        let moved = machine.transition(next);
        if moved {
            append_startup_log(&format!("lifecycle: {from:?} -> {next:?}"));
        } else {
            append_startup_log(&format!("lifecycle: rejected {from:?} -> {next:?}"));
        }
        moved
    }

    #[cfg_attr(not(feature = "desktop"), allow(dead_code))]
    pub(crate) fn startup_snapshot(&self) -> StartupSnapshot {
        StartupSnapshot {
            phase: self.lifecycle_phase(),
            backend_url: self.config.backend_url(),
        }
    }
}

/// Drives one startup run against `surface` and returns the phase it
/// settled in.
///
/// Blocks until the backend is ready or startup failed; call it from a
/// worker thread. A second call returns the current phase untouched.
pub(crate) fn run_startup<S>(
    state: &Arc<BackendState>,
    surface: Arc<S>,
    locations: &LaunchLocations,
) -> LifecyclePhase
where
    S: ShellSurface + 'static,
{
    if !state.enter_phase(LifecyclePhase::Starting) {
        return state.lifecycle_phase();
    }

    state.surface.set(surface.clone());
    state.status.attach(surface.clone());
    state.status.send_status("Initializing Microcks Desktop...");
    state
        .status
        .send_log("Splash loaded, starting backend sequence...");

    let outcome = state
        .ensure_backend_ready(locations)
        .map_err(|error| error.to_string());
    state.status.detach();

    let result = outcome.and_then(|outcome| {
        append_startup_log(&format!("backend startup finished: {outcome:?}"));
        surface.load_backend_ui(&state.config.backend_url())
    });
    match result {
        Ok(()) => {
            state.enter_phase(LifecyclePhase::Ready);
            LifecyclePhase::Ready
        }
        Err(message) => {
            fail_startup(state, surface.as_ref(), &message);
            LifecyclePhase::Failed
        }
    }
}

fn fail_startup<S>(state: &BackendState, surface: &S, message: &str)
where
    S: ShellSurface,
{
    append_startup_log(&format!("startup failed: {message}"));
    state.enter_phase(LifecyclePhase::Failed);
    if state.is_quitting() {
        append_startup_log("shutdown in progress, startup failure not surfaced");
        return;
    }
    if let Err(error) = surface.load_failure_view() {
        append_startup_log(&format!("failed to load failure view: {error}"));
    }
    surface.alert_error(PRODUCT_NAME, message);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{run_startup, LifecycleMachine, LifecyclePhase};
    use crate::{
        backend_readiness::{
            test_server::{closed_port, ScriptedServer},
            PollBudget,
        },
        shell_surface::recording::{RecordingSurface, SurfaceEvent},
        BackendConfig, BackendState, LaunchLocations,
    };

    fn state_for(port: u16, dir: &tempfile::TempDir) -> Arc<BackendState> {
        let config = BackendConfig {
            port,
            health_path: "/api/health".to_string(),
            probe: PollBudget::from_millis(300, 50),
            readiness: PollBudget::from_millis(500, 50),
            ..BackendConfig::default()
        };
        Arc::new(BackendState::new(config, dir.path().join("logs")))
    }

    #[test]
    fn machine_only_moves_forward() {
        let mut machine = LifecycleMachine::default();
        assert!(!machine.transition(LifecyclePhase::Ready));
        assert!(machine.transition(LifecyclePhase::Starting));
        assert!(!machine.transition(LifecyclePhase::Starting));
        assert!(machine.transition(LifecyclePhase::Failed));
        assert!(!machine.transition(LifecyclePhase::Starting));
        assert!(!machine.transition(LifecyclePhase::Ready));
        assert_eq!(machine.phase(), LifecyclePhase::Failed);
    }

    #[test]
    fn running_backend_goes_straight_to_ready() {
        let server = ScriptedServer::start(0, 503);
        let dir = tempfile::tempdir().expect("create temp dir");
        let state = state_for(server.port, &dir);
        let surface = Arc::new(RecordingSurface::default());
        let locations = LaunchLocations::new(None, dir.path().join("app"));

        let phase = run_startup(&state, surface.clone(), &locations);

        assert_eq!(phase, LifecyclePhase::Ready);
        assert_eq!(state.lifecycle_phase(), LifecyclePhase::Ready);
        assert!(state.child.lock().expect("lock child").is_none());
        assert_eq!(
            surface.events(),
            vec![SurfaceEvent::BackendUi(format!(
                "http://localhost:{}",
                server.port
            ))]
        );
        assert_eq!(
            surface.listener.statuses(),
            vec!["Initializing Microcks Desktop...", "Checking Microcks status..."]
        );
        assert_eq!(
            surface.listener.logs().first().map(String::as_str),
            Some("Splash loaded, starting backend sequence...")
        );
        assert!(!state.status.is_attached());
    }

    #[test]
    fn missing_artifact_shows_failure_view_and_dialog() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let state = state_for(closed_port(), &dir);
        let surface = Arc::new(RecordingSurface::default());
        let locations = LaunchLocations::new(None, dir.path().join("app"));

        let phase = run_startup(&state, surface.clone(), &locations);

        assert_eq!(phase, LifecyclePhase::Failed);
        assert!(state.child.lock().expect("lock child").is_none());
        assert_eq!(
            surface.events(),
            vec![
                SurfaceEvent::FailureView,
                SurfaceEvent::Alert {
                    title: "Microcks Desktop".to_string(),
                    message: "Microcks JAR not found. Place it under backend/ or set MICROCKS_JAR"
                        .to_string(),
                },
            ]
        );
        assert!(!state.status.is_attached());
    }

    #[test]
    fn failed_run_is_not_restarted() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let state = state_for(closed_port(), &dir);
        let locations = LaunchLocations::new(None, dir.path().join("app"));
        let first = Arc::new(RecordingSurface::default());
        assert_eq!(
            run_startup(&state, first, &locations),
            LifecyclePhase::Failed
        );

        let second = Arc::new(RecordingSurface::default());
        assert_eq!(
            run_startup(&state, second.clone(), &locations),
            LifecyclePhase::Failed
        );
        assert!(second.events().is_empty());
        assert!(second.listener.snapshot().is_empty());
    }

    #[test]
    fn backend_ui_load_failure_ends_in_failed() {
        let server = ScriptedServer::start(0, 503);
        let dir = tempfile::tempdir().expect("create temp dir");
        let state = state_for(server.port, &dir);
        let surface = Arc::new(RecordingSurface {
            fail_backend_ui: true,
            ..RecordingSurface::default()
        });
        let locations = LaunchLocations::new(None, dir.path().join("app"));

        assert_eq!(
            run_startup(&state, surface.clone(), &locations),
            LifecyclePhase::Failed
        );
        assert_eq!(
            surface.events(),
            vec![
                SurfaceEvent::FailureView,
                SurfaceEvent::Alert {
                    title: "Microcks Desktop".to_string(),
                    message: "Main window is unavailable.".to_string(),
                },
            ]
        );
    }

    #[test]
    fn failure_during_shutdown_is_not_surfaced() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let state = state_for(closed_port(), &dir);
        let surface = Arc::new(RecordingSurface::default());
        let locations = LaunchLocations::new(None, dir.path().join("app"));
        assert!(state.try_begin_exit_cleanup());

        assert_eq!(
            run_startup(&state, surface.clone(), &locations),
            LifecyclePhase::Failed
        );
        assert!(surface.events().is_empty());
    }

    #[test]
    fn startup_snapshot_serializes_for_the_splash_page() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let state = state_for(8080, &dir);
        let value = serde_json::to_value(state.startup_snapshot()).expect("serialize snapshot");
        assert_eq!(
            value,
            serde_json::json!({ "phase": "splash", "backendUrl": "http://localhost:8080" })
        );
    }
}
