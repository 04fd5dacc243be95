use std::{
    fs::File,
    io::{BufRead, BufReader, Read, Write},
    thread::{self, JoinHandle},
};

use crate::append_desktop_log;

/// Copies one child output stream into `sink` and hands every non-empty
/// line to `forward`.
///
/// The sink receives the raw bytes, line endings included. Lines are
/// forwarded with CR/LF trimmed and invalid UTF-8 replaced.
pub fn spawn_output_pump<R, F>(
    stream_label: &'static str,
    source: R,
    mut sink: File,
    forward: F,
) -> JoinHandle<()>
where
    R: Read + Send + 'static,
    F: Fn(&str) + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut buffer = Vec::with_capacity(1024);
        loop {
            buffer.clear();
            match reader.read_until(b'\n', &mut buffer) {
                Ok(0) => break,
                Ok(_) => {
                    if let Err(error) = sink.write_all(&buffer) {
                        append_desktop_log(&format!(
                            "backend {stream_label} log append failed: {error}"
                        ));
                    }
                    if let Some(line) = printable_line(&buffer) {
                        forward(&line);
                    }
                }
                Err(error) => {
                    append_desktop_log(&format!("backend {stream_label} read failed: {error}"));
                    break;
                }
            }
        }
        let _ = sink.flush();
    })
}

fn printable_line(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let line = text.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}
