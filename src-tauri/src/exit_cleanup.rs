use crate::{backend_process_lifecycle::StopOutcome, BackendState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitTrigger {
    ExitRequested,
    ExitFallback,
    Interrupt,
}

pub fn try_begin_exit_cleanup<F>(state: &BackendState, trigger: ExitTrigger, log: F) -> bool
where
    F: Fn(&str),
{
    if state.try_begin_exit_cleanup() {
        return true;
    }

    let message = match trigger {
        ExitTrigger::ExitRequested => "exit requested while backend cleanup is already running",
        ExitTrigger::ExitFallback => {
            "exit fallback cleanup skipped: backend cleanup already running"
        }
        ExitTrigger::Interrupt => "interrupt ignored: backend cleanup already running",
    };
    log(message);
    false
}

pub fn stop_backend_for_exit<F>(
    state: &BackendState,
    trigger: ExitTrigger,
    log: F,
) -> Option<StopOutcome>
where
    F: Fn(&str),
{
    let stop_failure_prefix = match trigger {
        ExitTrigger::ExitRequested => "backend graceful stop on ExitRequested failed",
        ExitTrigger::ExitFallback => "backend fallback stop on Exit failed",
        ExitTrigger::Interrupt => "backend stop on interrupt failed",
    };
    let outcome = match state.stop_backend() {
        Ok(outcome) => Some(outcome),
        Err(error) => {
            log(&format!("{stop_failure_prefix}: {error}"));
            None
        }
    };

    if trigger != ExitTrigger::ExitFallback {
        log("backend stop finished, exiting desktop process");
    }
    outcome
}

/// Claims the shutdown and stops the backend tree.
///
/// Only the first caller does any work; later callers get `None` right
/// away. Afterwards the next exit request is allowed through.
pub fn shutdown_once<F>(state: &BackendState, trigger: ExitTrigger, log: F) -> Option<StopOutcome>
where
    F: Fn(&str) + Copy,
{
    if !try_begin_exit_cleanup(state, trigger, log) {
        return None;
    }
    let outcome = stop_backend_for_exit(state, trigger, log);
    state.allow_next_exit_request();
    outcome
}
