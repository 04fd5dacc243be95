use std::{io, path::PathBuf};

/// Failures of the backend startup sequence.
///
/// Everything except `ChildExit` aborts startup and is rendered by the
/// lifecycle coordinator as the failure view plus a blocking dialog.
#[derive(Debug, thiserror::Error)]
pub(crate) enum LaunchError {
    #[error("Microcks JAR not found. Place it under backend/ or set MICROCKS_JAR")]
    ArtifactNotFound { searched: Vec<PathBuf> },

    #[error("Timed out after {timeout_ms}ms waiting for {url}")]
    Timeout { url: String, timeout_ms: u128 },

    #[error("Failed to start Java process {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Process exited with code {}", display_exit_code(.code))]
    ChildExit { code: Option<i32> },

    #[error("Failed to prepare backend log {}: {source}", .path.display())]
    LogSetup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Backend startup already in progress.")]
    AlreadyStarting,

    #[error("Backend process already running (pid {pid}).")]
    AlreadyRunning { pid: u32 },

    #[error("Desktop shell is shutting down; backend not started.")]
    ShuttingDown,

    #[error("Backend process lock poisoned.")]
    StatePoisoned,
}

fn display_exit_code(code: &Option<i32>) -> String {
    code.map(|code| code.to_string())
        .unwrap_or_else(|| "null".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_exit_renders_missing_code_as_null() {
        assert_eq!(
            LaunchError::ChildExit { code: Some(3) }.to_string(),
            "Process exited with code 3"
        );
        assert_eq!(
            LaunchError::ChildExit { code: None }.to_string(),
            "Process exited with code null"
        );
    }

    #[test]
    fn timeout_mentions_url_and_budget() {
        let error = LaunchError::Timeout {
            url: "http://localhost:8080/api/health".to_string(),
            timeout_ms: 500,
        };
        let message = error.to_string();
        assert!(message.contains("500ms"));
        assert!(message.contains("http://localhost:8080/api/health"));
    }
}
