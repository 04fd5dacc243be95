#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;
#[cfg(target_os = "windows")]
use std::process::{Command, ExitStatus, Stdio};
use std::{
    io,
    process::Child,
    thread,
    time::{Duration, Instant},
};

#[cfg(target_os = "windows")]
use crate::CREATE_NO_WINDOW;

const FORCE_STOP_WAIT_MIN_MS: u64 = 200;
const FORCE_STOP_WAIT_MAX_MS: u64 = 2_000;
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn wait_for_child_exit(child: &mut Child, timeout: Duration) -> bool {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(_)) => return true,
            Ok(None) => {
                if start.elapsed() >= timeout {
                    return false;
                }
                thread::sleep(EXIT_POLL_INTERVAL);
            }
            Err(_) => return false,
        }
    }
}

fn compute_followup_wait(timeout: Duration, max_extra_wait: Duration) -> Duration {
    if timeout.is_zero() {
        Duration::ZERO
    } else {
        (timeout / 4)
            .max(Duration::from_millis(FORCE_STOP_WAIT_MIN_MS))
            .min(max_extra_wait)
    }
}

/// Terminates `child` and every process in its tree.
///
/// Asks politely first, waits up to `timeout`, then forces. Returns `true`
/// once the direct child has been reaped. A child that already exited is
/// not signalled.
pub fn stop_process_tree<F>(child: &mut Child, timeout: Duration, log: F) -> bool
where
    F: Fn(&str) + Copy,
{
    let pid = child.id();
    match child.try_wait() {
        Ok(Some(status)) => {
            log(&format!(
                "backend already exited before stop: pid={pid}, status={status}"
            ));
            return true;
        }
        Ok(None) => {}
        Err(error) => log(&format!(
            "failed to poll backend before stop: pid={pid}, error={error}"
        )),
    }

    let graceful = request_graceful_stop(pid, log);
    if wait_for_child_exit(child, timeout) {
        log(&format!("backend tree stopped gracefully: pid={pid}"));
        return true;
    }

    let forced = force_stop(pid, log);
    let followup_wait = compute_followup_wait(timeout, Duration::from_millis(FORCE_STOP_WAIT_MAX_MS));
    log(&format!(
        "graceful stop timed out, force-kill issued: pid={pid}, graceful={graceful:?}, force={forced:?}, followup_wait_ms={}",
        followup_wait.as_millis()
    ));
    if wait_for_child_exit(child, followup_wait) {
        return true;
    }

    // Last resort for the direct child when the tree kill did not land.
    if let Err(error) = child.kill() {
        log(&format!("direct kill failed: pid={pid}, error={error}"));
    }
    wait_for_child_exit(child, followup_wait)
}

#[cfg(unix)]
fn signal_process_group(pid: u32, signal: libc::c_int) -> io::Result<()> {
    let pgid = libc::pid_t::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;
    // The child leads its own group, so the negative pid reaches the tree.
    let result = unsafe { libc::kill(-pgid, signal) };
    if result == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(unix)]
fn request_graceful_stop<F>(pid: u32, log: F) -> io::Result<()>
where
    F: Fn(&str),
{
    let result = signal_process_group(pid, libc::SIGTERM);
    if let Err(error) = &result {
        log(&format!("SIGTERM to process group failed: pid={pid}, error={error}"));
    }
    result
}

#[cfg(unix)]
fn force_stop<F>(pid: u32, log: F) -> io::Result<()>
where
    F: Fn(&str),
{
    let result = signal_process_group(pid, libc::SIGKILL);
    if let Err(error) = &result {
        log(&format!("SIGKILL to process group failed: pid={pid}, error={error}"));
    }
    result
}

#[cfg(target_os = "windows")]
fn run_stop_command<F>(pid: u32, label: &str, args: &[&str], log: F) -> io::Result<ExitStatus>
where
    F: Fn(&str),
{
    let mut command = Command::new("taskkill");
    command
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .stdin(Stdio::null());
    command.creation_flags(CREATE_NO_WINDOW);
    let status = command.status();

    match &status {
        Ok(exit_status) if exit_status.success() => {}
        Ok(exit_status) => log(&format!(
            "{label} returned non-zero: pid={pid}, status={exit_status:?}"
        )),
        Err(error) => log(&format!("{label} failed to start: pid={pid}, error={error}")),
    }
    status
}

#[cfg(target_os = "windows")]
fn request_graceful_stop<F>(pid: u32, log: F) -> io::Result<ExitStatus>
where
    F: Fn(&str),
{
    let pid_arg = pid.to_string();
    run_stop_command(pid, "taskkill graceful stop", &["/pid", &pid_arg, "/t"], log)
}

#[cfg(target_os = "windows")]
fn force_stop<F>(pid: u32, log: F) -> io::Result<ExitStatus>
where
    F: Fn(&str),
{
    let pid_arg = pid.to_string();
    run_stop_command(
        pid,
        "taskkill force stop",
        &["/pid", &pid_arg, "/t", "/f"],
        log,
    )
}
