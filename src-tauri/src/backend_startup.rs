use std::{sync::Arc, time::Duration};

use url::Url;

use crate::{
    append_startup_log, backend_http, backend_readiness, build_debug_command, launch_plan,
    AtomicFlagGuard, BackendState, LaunchError, LaunchLocations, BACKEND_TCP_PROBE_TIMEOUT_MS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StartupOutcome {
    /// A healthy backend was already listening; nothing was spawned.
    AlreadyRunning,
    Spawned { pid: u32 },
}

impl BackendState {
    fn report_status(&self, message: &str) {
        append_startup_log(message);
        self.status.send_status(message);
    }

    fn report_log(&self, line: &str) {
        append_startup_log(line);
        self.status.send_log(line);
    }

    /// Makes sure a healthy backend answers on the configured port,
    /// spawning one when needed.
    pub(crate) fn ensure_backend_ready(
        self: &Arc<Self>,
        locations: &LaunchLocations,
    ) -> Result<StartupOutcome, LaunchError> {
        let _spawn_guard =
            AtomicFlagGuard::try_set(&self.is_spawning).ok_or(LaunchError::AlreadyStarting)?;
        let config = &self.config;
        let health_url = config.health_url();

        self.report_status("Checking Microcks status...");
        if backend_readiness::wait_for_http(&health_url, config.probe).is_ok() {
            self.report_log(&format!("Detected Microcks on port {}", config.port));
            return Ok(StartupOutcome::AlreadyRunning);
        }

        self.report_status("Locating Microcks JAR...");
        let artifact = launch_plan::find_artifact(config.artifact_override.as_deref(), locations)
            .inspect_err(|error| {
                if let LaunchError::ArtifactNotFound { searched } = error {
                    append_startup_log(&format!("backend artifact not found, searched: {searched:?}"));
                }
            })?;
        append_startup_log(&format!("backend artifact: {}", artifact.display()));

        self.report_status("Finding Java runtime...");
        let plan = launch_plan::resolve_launch_plan(config, &artifact, locations);

        self.warn_if_port_taken(&health_url);
        self.report_status(&format!(
            "Starting Microcks backend (profile: {})...",
            config.profile
        ));
        self.report_log(&format!("Running: {}", build_debug_command(&plan)));
        let pid = self.start_backend_process(&plan)?;

        self.report_status("Waiting for service to become ready...");
        let attempts = backend_readiness::wait_for_http(&health_url, config.readiness)?;
        append_startup_log(&format!(
            "backend ready: pid={pid}, attempts={attempts}, url={health_url}"
        ));
        self.report_status("Service is ready. Loading UI...");
        Ok(StartupOutcome::Spawned { pid })
    }

    // The probe failed, but something may still hold the port.
    fn warn_if_port_taken(&self, health_url: &str) {
        let Ok(url) = Url::parse(health_url) else {
            return;
        };
        if backend_http::ping_port(&url, Duration::from_millis(BACKEND_TCP_PROBE_TIMEOUT_MS)) {
            append_startup_log(&format!(
                "port {} accepts connections but the health check failed; a second backend will compete for it",
                self.config.port
            ));
        }
    }
}
