use std::borrow::Cow;

pub fn parse_http_status_code(raw: &[u8]) -> Option<u16> {
    let header_text = parse_http_header_text(raw).unwrap_or_else(|| {
        // A truncated response still carries a usable status line.
        String::from_utf8_lossy(raw)
    });
    parse_http_status_code_from_headers(&header_text)
}

pub fn is_success_status(status_code: u16) -> bool {
    (200..300).contains(&status_code)
}

/// Whether `raw` already holds the whole response, judged by
/// `Content-Length` or the chunked terminator.
pub fn is_complete_http_response(raw: &[u8]) -> bool {
    let Some(header_end) = find_header_end(raw) else {
        return false;
    };
    let header_text = String::from_utf8_lossy(&raw[..header_end + 4]).to_ascii_lowercase();
    let body = &raw[header_end + 4..];

    if header_text.lines().any(|line| {
        line.starts_with("transfer-encoding:") && line.contains("chunked")
    }) {
        return body.windows(5).any(|window| window == b"0\r\n\r\n");
    }

    if let Some(content_length) = header_text
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
    {
        return body.len() >= content_length;
    }

    false
}

fn find_header_end(raw: &[u8]) -> Option<usize> {
    raw.windows(4).position(|window| window == b"\r\n\r\n")
}

fn parse_http_header_text(raw: &[u8]) -> Option<Cow<'_, str>> {
    let header_end = find_header_end(raw)?;
    Some(String::from_utf8_lossy(&raw[..header_end + 4]))
}

fn parse_http_status_code_from_headers(header_text: &str) -> Option<u16> {
    let status_line = header_text.lines().next()?;
    if !status_line.starts_with("HTTP/") {
        return None;
    }
    status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
}
