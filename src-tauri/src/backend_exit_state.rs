use std::sync::MutexGuard;

use crate::{append_shutdown_log, exit_state::ShutdownGate, BackendState};

impl BackendState {
    fn shutdown_gate(&self, action: &str) -> MutexGuard<'_, ShutdownGate> {
        match self.shutdown_gate.lock() {
            Ok(guard) => guard,
            Err(error) => {
                append_shutdown_log(&format!(
                    "shutdown gate lock poisoned when {action}: {error}"
                ));
                error.into_inner()
            }
        }
    }

    pub(crate) fn is_quitting(&self) -> bool {
        self.shutdown_gate("reading quitting state").is_quitting()
    }

    pub(crate) fn try_begin_exit_cleanup(&self) -> bool {
        self.shutdown_gate("beginning cleanup").try_begin_cleanup()
    }

    pub(crate) fn allow_next_exit_request(&self) {
        self.shutdown_gate("allowing next exit request")
            .release_for_exit();
    }

    pub(crate) fn take_exit_request_allowance(&self) -> bool {
        self.shutdown_gate("taking exit request allowance")
            .take_exit_allowance()
    }
}
