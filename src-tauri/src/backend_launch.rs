use std::{
    fs::{self, File, OpenOptions},
    path::Path,
    process::{Command, ExitStatus, Stdio},
    sync::Arc,
    thread,
};

#[cfg(unix)]
use std::os::unix::process::CommandExt;
#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

use crate::{
    append_desktop_log, backend_output, build_debug_command, logging, BackendState, LaunchError,
    LaunchPlan, BACKEND_LOG_MAX_BYTES, BACKEND_STDERR_LOG_FILE, BACKEND_STDOUT_LOG_FILE,
    CHILD_EXIT_POLL_INTERVAL, LOG_BACKUP_COUNT,
};
#[cfg(target_os = "windows")]
use crate::{CREATE_NEW_PROCESS_GROUP, CREATE_NO_WINDOW};

const BACKEND_EXIT_DIALOG_TITLE: &str = "Microcks backend exited";

fn open_backend_log(log_dir: &Path, file_name: &str) -> Result<File, LaunchError> {
    let path = log_dir.join(file_name);
    logging::rotate_log_if_needed(&path, BACKEND_LOG_MAX_BYTES, LOG_BACKUP_COUNT, file_name);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LaunchError::LogSetup { path, source })
}

impl BackendState {
    /// Spawns the backend described by `plan` and starts its output pumps
    /// and exit watcher.
    ///
    /// Refused while a live child handle exists; a handle whose process
    /// already exited is released first. Also refused once shutdown began:
    /// `stop_backend` takes the same lock, so a child is either stored
    /// before the stop runs or never spawned.
    pub(crate) fn start_backend_process(
        self: &Arc<Self>,
        plan: &LaunchPlan,
    ) -> Result<u32, LaunchError> {
        let mut guard = self.child.lock().map_err(|_| LaunchError::StatePoisoned)?;
        if self.is_quitting() {
            append_desktop_log("shutdown in progress, backend spawn refused");
            return Err(LaunchError::ShuttingDown);
        }
        if let Some(existing) = guard.as_mut() {
            let pid = existing.id();
            match existing.try_wait() {
                Ok(Some(status)) => {
                    append_desktop_log(&format!(
                        "releasing exited backend handle before spawn: pid={pid}, status={status}"
                    ));
                    *guard = None;
                }
                Ok(None) | Err(_) => {
                    append_desktop_log(&format!(
                        "backend child already exists, skip re-spawn: pid={pid}"
                    ));
                    return Err(LaunchError::AlreadyRunning { pid });
                }
            }
        }

        fs::create_dir_all(&self.log_dir).map_err(|source| LaunchError::LogSetup {
            path: self.log_dir.clone(),
            source,
        })?;
        let stdout_log = open_backend_log(&self.log_dir, BACKEND_STDOUT_LOG_FILE)?;
        let stderr_log = open_backend_log(&self.log_dir, BACKEND_STDERR_LOG_FILE)?;

        let mut command = Command::new(&plan.cmd);
        command
            .args(&plan.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            // Own process group so shutdown can signal the whole tree.
            command.process_group(0);
        }
        #[cfg(target_os = "windows")]
        {
            command.creation_flags(CREATE_NO_WINDOW | CREATE_NEW_PROCESS_GROUP);
        }

        let debug_command = build_debug_command(plan);
        let mut child = command.spawn().map_err(|source| LaunchError::Spawn {
            command: debug_command.clone(),
            source,
        })?;
        let pid = child.id();
        append_desktop_log(&format!("spawned backend: pid={pid}, cmd={debug_command}"));

        if let Some(stdout) = child.stdout.take() {
            let state = Arc::clone(self);
            backend_output::spawn_output_pump("stdout", stdout, stdout_log, move |line| {
                state.status.send_log(line)
            });
        }
        if let Some(stderr) = child.stderr.take() {
            let state = Arc::clone(self);
            backend_output::spawn_output_pump("stderr", stderr, stderr_log, move |line| {
                state.status.send_log(line)
            });
        }

        *guard = Some(child);
        drop(guard);

        self.spawn_exit_watcher(pid);
        Ok(pid)
    }

    fn spawn_exit_watcher(self: &Arc<Self>, pid: u32) {
        let state = Arc::clone(self);
        thread::spawn(move || loop {
            thread::sleep(CHILD_EXIT_POLL_INTERVAL);
            let exit_status = {
                let mut guard = match state.child.lock() {
                    Ok(guard) => guard,
                    Err(error) => {
                        append_desktop_log(&format!(
                            "backend child lock poisoned in exit watcher: pid={pid}, error={error}"
                        ));
                        return;
                    }
                };
                let Some(child) = guard.as_mut() else {
                    return;
                };
                if child.id() != pid {
                    return;
                }
                match child.try_wait() {
                    Ok(Some(status)) => {
                        *guard = None;
                        status
                    }
                    Ok(None) => continue,
                    Err(error) => {
                        append_desktop_log(&format!(
                            "failed to poll backend process: pid={pid}, error={error}"
                        ));
                        return;
                    }
                }
            };
            state.report_backend_exit(pid, exit_status);
            return;
        });
    }

    pub(crate) fn report_backend_exit(&self, pid: u32, status: ExitStatus) {
        append_desktop_log(&format!("backend process exited: pid={pid}, status={status}"));
        if status.success() {
            return;
        }
        if self.is_quitting() {
            append_desktop_log("backend exit observed during shutdown, not surfaced");
            return;
        }
        let Some(surface) = self.surface.get() else {
            return;
        };
        let error = LaunchError::ChildExit {
            code: status.code(),
        };
        surface.notify_error(BACKEND_EXIT_DIALOG_TITLE, &error.to_string());
    }
}
