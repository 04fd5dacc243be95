use std::time::Duration;

use crate::{append_shutdown_log, process_control, BackendState, GRACEFUL_STOP_TIMEOUT_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Terminated { pid: u32 },
    NotRunning,
}

impl BackendState {
    /// Terminates the backend process tree, if a child handle is held.
    ///
    /// The handle stays registered when the tree could not be confirmed
    /// dead, so a later call can retry.
    pub(crate) fn stop_backend(&self) -> Result<StopOutcome, String> {
        self.stop_backend_within(Duration::from_millis(GRACEFUL_STOP_TIMEOUT_MS))
    }

    pub(crate) fn stop_backend_within(&self, timeout: Duration) -> Result<StopOutcome, String> {
        let mut guard = self
            .child
            .lock()
            .map_err(|_| "Backend process lock poisoned.".to_string())?;

        let Some(child) = guard.as_mut() else {
            return Ok(StopOutcome::NotRunning);
        };
        let pid = child.id();

        if process_control::stop_process_tree(child, timeout, append_shutdown_log) {
            *guard = None;
            return Ok(StopOutcome::Terminated { pid });
        }

        Err(format!(
            "Backend process {pid} did not exit after {}ms graceful stop timeout.",
            timeout.as_millis()
        ))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::{
        os::unix::process::CommandExt,
        process::{Command, Stdio},
        time::Duration,
    };

    use super::StopOutcome;
    use crate::{BackendConfig, BackendState};

    #[test]
    fn stop_backend_without_child_is_a_no_op() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let state = BackendState::new(BackendConfig::default(), dir.path().to_path_buf());
        assert_eq!(state.stop_backend(), Ok(StopOutcome::NotRunning));
    }

    #[test]
    fn stop_backend_releases_terminated_child() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let state = BackendState::new(BackendConfig::default(), dir.path().to_path_buf());
        let child = Command::new("sleep")
            .arg("30")
            .stdin(Stdio::null())
            .process_group(0)
            .spawn()
            .expect("spawn sleep");
        let pid = child.id();
        *state.child.lock().expect("lock child") = Some(child);

        assert_eq!(
            state.stop_backend_within(Duration::from_secs(5)),
            Ok(StopOutcome::Terminated { pid })
        );
        assert!(state.child.lock().expect("lock child").is_none());
    }
}
