use std::time::Duration;

pub(crate) const PRODUCT_NAME: &str = "Microcks Desktop";
#[cfg(feature = "desktop")]
pub(crate) const MAIN_WINDOW_LABEL: &str = "main";

pub(crate) const PORT_ENV: &str = "PORT";
pub(crate) const HEALTH_PATH_ENV: &str = "HEALTH_PATH";
pub(crate) const ARTIFACT_OVERRIDE_ENV: &str = "MICROCKS_JAR";
pub(crate) const JAVA_HOME_ENV: &str = "JAVA_HOME";
pub(crate) const PROFILE_ENV: &str = "MICROCKS_PROFILE";
pub(crate) const BACKEND_TIMEOUT_ENV: &str = "MICROCKS_BACKEND_TIMEOUT_MS";
pub(crate) const BACKEND_POLL_INTERVAL_ENV: &str = "MICROCKS_BACKEND_POLL_INTERVAL_MS";
pub(crate) const BACKEND_PROBE_TIMEOUT_ENV: &str = "MICROCKS_BACKEND_PROBE_TIMEOUT_MS";
pub(crate) const DESKTOP_LOG_PATH_ENV: &str = "MICROCKS_DESKTOP_LOG_PATH";
pub(crate) const DESKTOP_HOME_ENV: &str = "MICROCKS_DESKTOP_HOME";

pub(crate) const DEFAULT_PORT: u16 = 8080;
pub(crate) const DEFAULT_HEALTH_PATH: &str = "/api/health";
pub(crate) const DEFAULT_PROFILE: &str = "uber";

pub(crate) const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 90_000;
pub(crate) const BACKEND_TIMEOUT_MIN_MS: u64 = 1_000;
pub(crate) const BACKEND_TIMEOUT_MAX_MS: u64 = 30 * 60 * 1000;
pub(crate) const DEFAULT_BACKEND_POLL_INTERVAL_MS: u64 = 1_000;
pub(crate) const BACKEND_POLL_INTERVAL_MIN_MS: u64 = 50;
pub(crate) const BACKEND_POLL_INTERVAL_MAX_MS: u64 = 10_000;
pub(crate) const DEFAULT_BACKEND_PROBE_TIMEOUT_MS: u64 = 2_000;
pub(crate) const BACKEND_PROBE_TIMEOUT_MIN_MS: u64 = 100;
pub(crate) const BACKEND_PROBE_TIMEOUT_MAX_MS: u64 = 30_000;
pub(crate) const DEFAULT_BACKEND_PROBE_INTERVAL_MS: u64 = 200;
pub(crate) const HTTP_ATTEMPT_TIMEOUT_MS: u64 = 1_000;
pub(crate) const BACKEND_TCP_PROBE_TIMEOUT_MS: u64 = 300;

pub(crate) const GRACEFUL_STOP_TIMEOUT_MS: u64 = 10_000;
pub(crate) const CHILD_EXIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

pub(crate) const DESKTOP_LOG_FILE: &str = "desktop.log";
pub(crate) const BACKEND_STDOUT_LOG_FILE: &str = "backend.out.log";
pub(crate) const BACKEND_STDERR_LOG_FILE: &str = "backend.err.log";
pub(crate) const DESKTOP_LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub(crate) const BACKEND_LOG_MAX_BYTES: u64 = 20 * 1024 * 1024;
pub(crate) const LOG_BACKUP_COUNT: usize = 5;

#[cfg(feature = "desktop")]
pub(crate) const SPLASH_STATUS_EVENT: &str = "splash:status";
#[cfg(feature = "desktop")]
pub(crate) const SPLASH_LOG_EVENT: &str = "splash:log";
#[cfg(feature = "desktop")]
pub(crate) const FAILURE_PAGE: &str = "error.html";

#[cfg(target_os = "windows")]
pub(crate) const CREATE_NO_WINDOW: u32 = 0x0800_0000;
#[cfg(target_os = "windows")]
pub(crate) const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
