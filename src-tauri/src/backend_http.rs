use std::{
    io::{ErrorKind, Read, Write},
    net::{Shutdown, SocketAddr, TcpStream},
    time::{Duration, Instant},
};

use url::Url;

use crate::http_response;

/// Issues one `GET` on a fresh connection and returns the response status.
///
/// `timeout` bounds the whole attempt (connect, write and read). The
/// connection is closed before returning, whatever the outcome.
pub fn request_status_code(url: &Url, timeout: Duration) -> Option<u16> {
    if url.scheme() != "http" {
        return None;
    }
    let deadline = Instant::now() + timeout;
    let addrs = resolve_socket_addrs(url)?;
    let mut stream = addrs.iter().find_map(|address| {
        let remaining = remaining_until(deadline)?;
        TcpStream::connect_timeout(address, remaining).ok()
    })?;

    let request = build_get_request(url)?;
    let write_timeout = remaining_until(deadline)?;
    let _ = stream.set_write_timeout(Some(write_timeout));
    if stream.write_all(request.as_bytes()).is_err() {
        let _ = stream.shutdown(Shutdown::Both);
        return None;
    }

    let response = read_http_response_bytes(&mut stream, deadline);
    let _ = stream.shutdown(Shutdown::Both);
    http_response::parse_http_status_code(&response?)
}

/// Plain TCP reachability of the URL's host and port.
pub fn ping_port(url: &Url, timeout: Duration) -> bool {
    let Some(addrs) = resolve_socket_addrs(url) else {
        return false;
    };
    let timeout = timeout.max(Duration::from_millis(50));
    addrs
        .iter()
        .any(|address| TcpStream::connect_timeout(address, timeout).is_ok())
}

fn resolve_socket_addrs(url: &Url) -> Option<Vec<SocketAddr>> {
    url.socket_addrs(|| Some(80))
        .ok()
        .filter(|addrs| !addrs.is_empty())
}

fn remaining_until(deadline: Instant) -> Option<Duration> {
    let remaining = deadline.checked_duration_since(Instant::now())?;
    if remaining.is_zero() {
        None
    } else {
        Some(remaining)
    }
}

fn build_get_request(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let host_header = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    let mut request_target = url.path().to_string();
    if let Some(query) = url.query() {
        request_target.push('?');
        request_target.push_str(query);
    }
    if request_target.is_empty() {
        request_target = "/".to_string();
    }

    Some(format!(
        "GET {request_target} HTTP/1.1\r\n\
Host: {host_header}\r\n\
Accept: */*\r\n\
Accept-Encoding: identity\r\n\
User-Agent: microcks-desktop/{}\r\n\
Connection: close\r\n\
\r\n",
        env!("CARGO_PKG_VERSION")
    ))
}

fn read_http_response_bytes(stream: &mut TcpStream, deadline: Instant) -> Option<Vec<u8>> {
    let mut response = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let Some(remaining) = remaining_until(deadline) else {
            break;
        };
        let _ = stream.set_read_timeout(Some(remaining));
        match read_chunk(stream, &mut chunk, &mut response) {
            ReadStep::Continue => {
                if http_response::is_complete_http_response(&response) {
                    break;
                }
            }
            ReadStep::Finished => break,
            ReadStep::Failed => return None,
        }
    }

    if response.is_empty() {
        None
    } else {
        Some(response)
    }
}

enum ReadStep {
    Continue,
    Finished,
    Failed,
}

fn read_chunk<R: Read>(reader: &mut R, chunk: &mut [u8], response: &mut Vec<u8>) -> ReadStep {
    match reader.read(chunk) {
        Ok(0) => ReadStep::Finished,
        Ok(read) => {
            response.extend_from_slice(&chunk[..read]);
            ReadStep::Continue
        }
        Err(error) if error.kind() == ErrorKind::Interrupted => ReadStep::Continue,
        Err(error) if matches!(error.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
            if response.is_empty() {
                ReadStep::Failed
            } else {
                ReadStep::Finished
            }
        }
        Err(_) => ReadStep::Failed,
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Cursor, Error, ErrorKind, Read, Write},
        net::TcpListener,
        thread,
        time::{Duration, Instant},
    };

    use url::Url;

    use super::*;

    #[test]
    fn build_get_request_closes_connection_and_keeps_query() {
        let url = Url::parse("http://localhost:8080/api/health?probe=1").expect("parse url");
        let request = build_get_request(&url).expect("request");
        assert!(request.starts_with("GET /api/health?probe=1 HTTP/1.1\r\n"));
        assert!(request.contains("Host: localhost:8080\r\n"));
        assert!(request.contains("Connection: close\r\n"));
        assert!(request.ends_with("\r\n\r\n"));
    }

    #[test]
    fn read_chunk_keeps_partial_data_on_timeout() {
        let mut reader = TimeoutAfterPayloadReader {
            payload: Cursor::new(b"HTTP/1.1 200 OK\r\nConnection: keep-alive\r\n\r\n".to_vec()),
        };
        let mut chunk = [0u8; 16];
        let mut response = Vec::new();
        while let ReadStep::Continue = read_chunk(&mut reader, &mut chunk, &mut response) {}
        assert!(response.starts_with(b"HTTP/1.1 200 OK\r\n"));

        let mut empty = TimeoutAfterPayloadReader {
            payload: Cursor::new(Vec::new()),
        };
        let mut nothing = Vec::new();
        assert!(matches!(
            read_chunk(&mut empty, &mut chunk, &mut nothing),
            ReadStep::Failed
        ));
    }

    #[test]
    fn request_status_code_reads_status_from_loopback_server() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let port = listener.local_addr().expect("local addr").port();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut buffer = [0u8; 1024];
            let _ = stream.read(&mut buffer);
            stream
                .write_all(b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 4\r\n\r\nbusy")
                .expect("write response");
        });

        let url = Url::parse(&format!("http://127.0.0.1:{port}/api/health")).expect("parse url");
        assert_eq!(
            request_status_code(&url, Duration::from_millis(1_000)),
            Some(503)
        );
        server.join().expect("server thread");
    }

    #[test]
    fn request_status_code_gives_up_at_attempt_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let port = listener.local_addr().expect("local addr").port();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            thread::sleep(Duration::from_millis(600));
            drop(stream);
        });

        let url = Url::parse(&format!("http://127.0.0.1:{port}/")).expect("parse url");
        let started = Instant::now();
        assert_eq!(request_status_code(&url, Duration::from_millis(200)), None);
        assert!(started.elapsed() < Duration::from_millis(550));
        server.join().expect("server thread");
    }

    #[test]
    fn request_status_code_rejects_non_http_scheme() {
        let url = Url::parse("https://127.0.0.1:1/").expect("parse url");
        assert_eq!(request_status_code(&url, Duration::from_millis(100)), None);
    }

    struct TimeoutAfterPayloadReader {
        payload: Cursor<Vec<u8>>,
    }

    impl Read for TimeoutAfterPayloadReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let bytes = self.payload.read(buf)?;
            if bytes > 0 {
                return Ok(bytes);
            }
            Err(Error::new(ErrorKind::TimedOut, "simulated read timeout"))
        }
    }
}
