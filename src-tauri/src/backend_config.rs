use std::{env, path::PathBuf};

use crate::{
    backend_readiness::PollBudget, ARTIFACT_OVERRIDE_ENV, BACKEND_POLL_INTERVAL_ENV,
    BACKEND_POLL_INTERVAL_MAX_MS, BACKEND_POLL_INTERVAL_MIN_MS, BACKEND_PROBE_TIMEOUT_ENV,
    BACKEND_PROBE_TIMEOUT_MAX_MS, BACKEND_PROBE_TIMEOUT_MIN_MS, BACKEND_TIMEOUT_ENV,
    BACKEND_TIMEOUT_MAX_MS, BACKEND_TIMEOUT_MIN_MS, DEFAULT_BACKEND_POLL_INTERVAL_MS,
    DEFAULT_BACKEND_PROBE_INTERVAL_MS, DEFAULT_BACKEND_PROBE_TIMEOUT_MS,
    DEFAULT_BACKEND_TIMEOUT_MS, DEFAULT_HEALTH_PATH, DEFAULT_PORT, DEFAULT_PROFILE,
    HEALTH_PATH_ENV, JAVA_HOME_ENV, PORT_ENV, PROFILE_ENV,
};

/// Launcher settings, read once from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BackendConfig {
    pub(crate) port: u16,
    pub(crate) health_path: String,
    pub(crate) artifact_override: Option<PathBuf>,
    pub(crate) java_home: Option<PathBuf>,
    pub(crate) profile: String,
    pub(crate) probe: PollBudget,
    pub(crate) readiness: PollBudget,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            artifact_override: None,
            java_home: None,
            profile: DEFAULT_PROFILE.to_string(),
            probe: PollBudget::from_millis(
                DEFAULT_BACKEND_PROBE_TIMEOUT_MS,
                DEFAULT_BACKEND_PROBE_INTERVAL_MS,
            ),
            readiness: PollBudget::from_millis(
                DEFAULT_BACKEND_TIMEOUT_MS,
                DEFAULT_BACKEND_POLL_INTERVAL_MS,
            ),
        }
    }
}

impl BackendConfig {
    pub(crate) fn from_env<F>(mut log: F) -> Self
    where
        F: FnMut(String),
    {
        let port = match env::var(PORT_ENV) {
            Ok(raw) => parse_port(&raw, PORT_ENV, DEFAULT_PORT, &mut log),
            Err(_) => DEFAULT_PORT,
        };
        let health_path = resolve_health_path(HEALTH_PATH_ENV, DEFAULT_HEALTH_PATH, &mut log);
        let profile = env::var(PROFILE_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        let probe_timeout_ms = read_clamped_env(
            BACKEND_PROBE_TIMEOUT_ENV,
            DEFAULT_BACKEND_PROBE_TIMEOUT_MS,
            BACKEND_PROBE_TIMEOUT_MIN_MS,
            BACKEND_PROBE_TIMEOUT_MAX_MS,
            &mut log,
        );
        let readiness_timeout_ms = read_clamped_env(
            BACKEND_TIMEOUT_ENV,
            DEFAULT_BACKEND_TIMEOUT_MS,
            BACKEND_TIMEOUT_MIN_MS,
            BACKEND_TIMEOUT_MAX_MS,
            &mut log,
        );
        let readiness_interval_ms = read_clamped_env(
            BACKEND_POLL_INTERVAL_ENV,
            DEFAULT_BACKEND_POLL_INTERVAL_MS,
            BACKEND_POLL_INTERVAL_MIN_MS,
            BACKEND_POLL_INTERVAL_MAX_MS,
            &mut log,
        );

        Self {
            port,
            health_path,
            artifact_override: non_empty_path_env(ARTIFACT_OVERRIDE_ENV),
            java_home: non_empty_path_env(JAVA_HOME_ENV),
            profile,
            probe: PollBudget::from_millis(probe_timeout_ms, DEFAULT_BACKEND_PROBE_INTERVAL_MS),
            readiness: PollBudget::from_millis(readiness_timeout_ms, readiness_interval_ms),
        }
    }

    /// Address loaded into the window once the backend is ready.
    pub(crate) fn backend_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    pub(crate) fn health_url(&self) -> String {
        format!("http://localhost:{}{}", self.port, self.health_path)
    }
}

fn non_empty_path_env(env_name: &str) -> Option<PathBuf> {
    env::var_os(env_name)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
}

fn read_clamped_env<F>(env_name: &str, fallback_ms: u64, min_ms: u64, max_ms: u64, log: F) -> u64
where
    F: FnMut(String),
{
    match env::var(env_name) {
        Ok(raw) => parse_clamped_millis(&raw, env_name, fallback_ms, min_ms, max_ms, log),
        Err(_) => fallback_ms,
    }
}

pub fn parse_port<F>(raw: &str, env_name: &str, fallback: u16, mut log: F) -> u16
where
    F: FnMut(String),
{
    match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => port,
        _ => {
            log(format!("invalid {env_name}='{raw}', fallback to {fallback}"));
            fallback
        }
    }
}

pub fn resolve_health_path<F>(env_name: &str, default_path: &str, mut log: F) -> String
where
    F: FnMut(String),
{
    match env::var_os(env_name) {
        Some(raw) => match raw.to_str() {
            Some(raw_utf8) => normalize_health_path(raw_utf8, env_name, default_path, &mut log),
            None => {
                log(format!(
                    "{env_name} contains non-UTF-8 value '{}', fallback to default '{default_path}'",
                    raw.to_string_lossy()
                ));
                default_path.to_string()
            }
        },
        None => default_path.to_string(),
    }
}

fn normalize_health_path<F>(raw: &str, env_name: &str, default_path: &str, mut log: F) -> String
where
    F: FnMut(String),
{
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        log(format!(
            "{env_name} is empty/whitespace, fallback to default '{default_path}'"
        ));
        default_path.to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        let normalized = format!("/{trimmed}");
        log(format!(
            "{env_name} is missing leading '/': '{trimmed}', normalized to '{normalized}'"
        ));
        normalized
    }
}

pub fn parse_clamped_millis<F>(
    raw: &str,
    env_name: &str,
    fallback_ms: u64,
    min_ms: u64,
    max_ms: u64,
    mut log: F,
) -> u64
where
    F: FnMut(String),
{
    match raw.trim().parse::<u128>() {
        Ok(parsed) if parsed > 0 => {
            if parsed < min_ms as u128 {
                log(format!(
                    "{env_name}='{raw}' is below minimum {min_ms}ms, clamped to {min_ms}ms"
                ));
                min_ms
            } else if parsed > max_ms as u128 {
                log(format!(
                    "{env_name}='{raw}' is above maximum {max_ms}ms, clamped to {max_ms}ms"
                ));
                max_ms
            } else {
                parsed as u64
            }
        }
        _ => {
            log(format!(
                "invalid {env_name}='{raw}', fallback to {fallback_ms}ms"
            ));
            fallback_ms
        }
    }
}
