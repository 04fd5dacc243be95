use std::{
    env,
    ffi::OsString,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};

use crate::DESKTOP_LOG_PATH_ENV;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopLogCategory {
    Startup,
    Runtime,
    Shutdown,
}

impl DesktopLogCategory {
    fn as_label(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Runtime => "runtime",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Renames `path` to `path.1` (shifting older backups up) once it reaches
/// `max_bytes`. Failures are reported on stderr and never abort the caller.
pub fn rotate_log_if_needed(path: &Path, max_bytes: u64, backup_count: usize, log_scope: &str) {
    if max_bytes == 0 || backup_count == 0 {
        return;
    }

    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(error) => {
            if error.kind() != std::io::ErrorKind::NotFound {
                eprintln!(
                    "[log rotation:{log_scope}] failed to read metadata for {}: {}",
                    path.display(),
                    error
                );
            }
            return;
        }
    };
    if metadata.len() < max_bytes {
        return;
    }

    let oldest = rotated_log_path(path, backup_count);
    remove_if_present(&oldest, log_scope);

    for index in (1..backup_count).rev() {
        let source = rotated_log_path(path, index);
        if !source.exists() {
            continue;
        }
        let target = rotated_log_path(path, index + 1);
        remove_if_present(&target, log_scope);
        if let Err(error) = fs::rename(&source, &target) {
            eprintln!(
                "[log rotation:{log_scope}] failed to rename {} to {}: {}",
                source.display(),
                target.display(),
                error
            );
        }
    }

    let rotated = rotated_log_path(path, 1);
    remove_if_present(&rotated, log_scope);
    if let Err(error) = fs::rename(path, &rotated) {
        eprintln!(
            "[log rotation:{log_scope}] failed to rotate {} to {}: {}",
            path.display(),
            rotated.display(),
            error
        );
    }
}

fn remove_if_present(path: &Path, log_scope: &str) {
    if let Err(error) = fs::remove_file(path) {
        if error.kind() != std::io::ErrorKind::NotFound {
            eprintln!(
                "[log rotation:{log_scope}] failed to remove {}: {}",
                path.display(),
                error
            );
        }
    }
}

fn rotated_log_path(path: &Path, index: usize) -> PathBuf {
    let mut value = OsString::from(path.as_os_str());
    value.push(format!(".{index}"));
    PathBuf::from(value)
}

pub fn resolve_desktop_log_path(log_dir: &Path, desktop_log_file: &str) -> PathBuf {
    if let Ok(custom) = env::var(DESKTOP_LOG_PATH_ENV) {
        let candidate = PathBuf::from(custom.trim());
        if !candidate.as_os_str().is_empty() {
            return candidate;
        }
    }
    log_dir.join(desktop_log_file)
}

pub fn format_log_line(category: DesktopLogCategory, message: &str) -> String {
    let timestamp = chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.3f %z")
        .to_string();
    format!("[{}] [{}] {}\n", timestamp, category.as_label(), message)
}

pub fn append_desktop_log(
    category: DesktopLogCategory,
    message: &str,
    path: &Path,
    max_bytes: u64,
    backup_count: usize,
    write_lock: &OnceLock<Mutex<()>>,
) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let _guard = match write_lock.get_or_init(|| Mutex::new(())).lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    rotate_log_if_needed(path, max_bytes, backup_count, "desktop");
    let line = format_log_line(category, message);
    let _ = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(line.as_bytes()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_log_if_needed_shifts_backups() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let log = dir.path().join("backend.out.log");
        fs::write(&log, b"0123456789").expect("write active log");
        fs::write(rotated_log_path(&log, 1), b"older").expect("write first backup");

        rotate_log_if_needed(&log, 8, 3, "test");

        assert!(!log.exists());
        assert_eq!(
            fs::read(rotated_log_path(&log, 1)).expect("read new backup"),
            b"0123456789"
        );
        assert_eq!(
            fs::read(rotated_log_path(&log, 2)).expect("read shifted backup"),
            b"older"
        );
    }

    #[test]
    fn rotate_log_if_needed_ignores_small_or_missing_files() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let log = dir.path().join("desktop.log");
        rotate_log_if_needed(&log, 8, 3, "test");

        fs::write(&log, b"tiny").expect("write active log");
        rotate_log_if_needed(&log, 8, 3, "test");
        assert!(log.exists());
        assert!(!rotated_log_path(&log, 1).exists());
    }

    #[test]
    fn append_desktop_log_writes_categorized_lines() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let log = dir.path().join("logs").join("desktop.log");
        let lock = OnceLock::new();

        append_desktop_log(
            DesktopLogCategory::Startup,
            "desktop process starting",
            &log,
            1024,
            2,
            &lock,
        );
        append_desktop_log(
            DesktopLogCategory::Shutdown,
            "backend stop finished",
            &log,
            1024,
            2,
            &lock,
        );

        let content = fs::read_to_string(&log).expect("read desktop log");
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[startup] desktop process starting"));
        assert!(lines[1].ends_with("[shutdown] backend stop finished"));
    }
}
