use std::{
    thread,
    time::{Duration, Instant},
};

use url::Url;

use crate::{backend_http, http_response, LaunchError, HTTP_ATTEMPT_TIMEOUT_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PollBudget {
    pub(crate) timeout: Duration,
    pub(crate) interval: Duration,
}

impl PollBudget {
    pub(crate) fn from_millis(timeout_ms: u64, interval_ms: u64) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
            interval: Duration::from_millis(interval_ms),
        }
    }
}

/// Polls `url` until it answers with a 2xx status.
///
/// Returns the number of attempts issued. The overall timeout is checked
/// between attempts only, so the last attempt may finish past the budget.
pub(crate) fn wait_for_http(url: &str, budget: PollBudget) -> Result<u32, LaunchError> {
    let attempt_timeout = Duration::from_millis(HTTP_ATTEMPT_TIMEOUT_MS);
    let parsed = Url::parse(url).ok();
    let start = Instant::now();
    let mut attempts = 0_u32;

    loop {
        attempts += 1;
        let status = parsed
            .as_ref()
            .and_then(|target| backend_http::request_status_code(target, attempt_timeout));
        if matches!(status, Some(code) if http_response::is_success_status(code)) {
            return Ok(attempts);
        }

        if start.elapsed() > budget.timeout {
            return Err(LaunchError::Timeout {
                url: url.to_string(),
                timeout_ms: budget.timeout.as_millis(),
            });
        }
        thread::sleep(budget.interval);
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    use std::{
        io::{Read, Write},
        net::TcpListener,
        sync::{
            atomic::{AtomicBool, AtomicU32, Ordering},
            Arc,
        },
        thread,
        time::Duration,
    };

    /// Loopback HTTP server answering `failing_status` for the first
    /// `failures` requests and `200` afterwards.
    pub(crate) struct ScriptedServer {
        pub(crate) port: u16,
        requests: Arc<AtomicU32>,
        stop: Arc<AtomicBool>,
    }

    impl ScriptedServer {
        pub(crate) fn start(failures: u32, failing_status: u16) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind scripted server");
            listener
                .set_nonblocking(true)
                .expect("set scripted server nonblocking");
            let port = listener.local_addr().expect("scripted server addr").port();
            let requests = Arc::new(AtomicU32::new(0));
            let stop = Arc::new(AtomicBool::new(false));

            let worker_requests = requests.clone();
            let worker_stop = stop.clone();
            thread::spawn(move || {
                while !worker_stop.load(Ordering::Relaxed) {
                    let (mut stream, _) = match listener.accept() {
                        Ok(accepted) => accepted,
                        Err(_) => {
                            thread::sleep(Duration::from_millis(5));
                            continue;
                        }
                    };
                    let _ = stream.set_nonblocking(false);
                    let _ = stream.set_read_timeout(Some(Duration::from_millis(500)));
                    let mut buffer = [0u8; 2048];
                    let _ = stream.read(&mut buffer);
                    let seen = worker_requests.fetch_add(1, Ordering::SeqCst) + 1;
                    let response = if seen > failures {
                        "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok"
                            .to_string()
                    } else {
                        format!(
                            "HTTP/1.1 {failing_status} Not Ready\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                        )
                    };
                    let _ = stream.write_all(response.as_bytes());
                }
            });

            Self {
                port,
                requests,
                stop,
            }
        }

        pub(crate) fn requests(&self) -> u32 {
            self.requests.load(Ordering::SeqCst)
        }

        pub(crate) fn url(&self, path: &str) -> String {
            format!("http://127.0.0.1:{}{path}", self.port)
        }
    }

    impl Drop for ScriptedServer {
        fn drop(&mut self) {
            self.stop.store(true, Ordering::Relaxed);
        }
    }

    /// A port nothing listens on.
    pub(crate) fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe listener");
        listener.local_addr().expect("probe listener addr").port()
    }
}
