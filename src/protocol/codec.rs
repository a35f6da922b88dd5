//! Protocol codec
//!
//! Reading and writing HTTP/1.x messages over blocking streams.
//!
//! ## Message Layout
//! ```text
//! ┌──────────────────┬──────────────────────┬──────┬──────────────────┐
//! │ Start line CRLF  │ (Name: value CRLF)*  │ CRLF │ Body             │
//! └──────────────────┴──────────────────────┴──────┴──────────────────┘
//! ```
//!
//! Bodies are framed by `Content-Length`. A response without one runs to
//! the end of the stream.

use std::io::{BufRead, Read, Write};

use crate::error::{Result, SquirrelError};

use super::{Method, Request, Response, StatusCode};

/// Longest start or header line accepted (bytes, including CRLF)
pub const MAX_LINE_LEN: usize = 8 * 1024;

/// Most headers accepted in one message
pub const MAX_HEADERS: usize = 100;

/// Protocol version written on outgoing messages
const HTTP_VERSION: &str = "HTTP/1.0";

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request to bytes
///
/// Any Content-Length header on the request is replaced by the real body
/// length.
pub fn encode_request(request: &Request) -> Vec<u8> {
    let mut head = format!("{} {} {}\r\n", request.method.as_str(), request.path, HTTP_VERSION);

    for (name, value) in &request.headers {
        if name.eq_ignore_ascii_case("content-length") {
            continue;
        }
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    if !request.body.is_empty() {
        head.push_str(&format!("Content-Length: {}\r\n", request.body.len()));
    }
    head.push_str("\r\n");

    let mut message = head.into_bytes();
    message.extend_from_slice(&request.body);
    message
}

/// Read a complete request from a stream
///
/// Returns an `UnexpectedEof` IO error when the peer closes the stream
/// before sending anything.
pub fn read_request<R: BufRead>(reader: &mut R, max_body: usize) -> Result<Request> {
    let request_line = read_line(reader)?.ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "Connection closed")
    })?;

    let mut parts = request_line.split(' ');
    let (method, path, version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(path), Some(version), None)
            if !method.is_empty() && !path.is_empty() =>
        {
            (method, path, version)
        }
        _ => {
            return Err(SquirrelError::Protocol(format!(
                "Malformed request line: {:?}",
                request_line
            )))
        }
    };

    if !version.starts_with("HTTP/") {
        return Err(SquirrelError::Protocol(format!(
            "Unsupported protocol version: {:?}",
            version
        )));
    }

    let headers = read_headers(reader)?;
    let body = match content_length(&headers)? {
        Some(len) => read_body(reader, len, max_body)?,
        None => Vec::new(),
    };

    Ok(Request {
        method: Method::parse(method),
        path: path.to_string(),
        headers,
        body,
    })
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let bytes = encode_request(request);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// The header block is terminated exactly once, followed by the body.
pub fn encode_response(response: &Response) -> Vec<u8> {
    let mut head = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        response.status.code(),
        response.status.reason()
    );

    if let Some(content_type) = &response.content_type {
        head.push_str(&format!("Content-Type: {}\r\n", content_type));
    }
    head.push_str(&format!("Content-Length: {}\r\n", response.body.len()));
    head.push_str("Connection: close\r\n");
    head.push_str("\r\n");

    let mut message = head.into_bytes();
    message.extend_from_slice(&response.body);
    message
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: BufRead>(reader: &mut R, max_body: usize) -> Result<Response> {
    let status_line = read_line(reader)?
        .ok_or_else(|| SquirrelError::Protocol("Empty response".to_string()))?;

    // "HTTP/1.0 404 Not Found" - the reason phrase may contain spaces
    let mut parts = status_line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    let code = parts.next().unwrap_or_default();

    if !version.starts_with("HTTP/") {
        return Err(SquirrelError::Protocol(format!(
            "Malformed status line: {:?}",
            status_line
        )));
    }

    let status = code
        .parse::<u16>()
        .ok()
        .and_then(StatusCode::from_code)
        .ok_or_else(|| SquirrelError::Protocol(format!("Unknown status code: {:?}", code)))?;

    let headers = read_headers(reader)?;
    let content_type = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        .map(|(_, value)| value.clone());

    let body = match content_length(&headers)? {
        Some(len) => read_body(reader, len, max_body)?,
        None => {
            let mut body = Vec::new();
            reader
                .by_ref()
                .take(max_body as u64 + 1)
                .read_to_end(&mut body)?;
            if body.len() > max_body {
                return Err(SquirrelError::Protocol(format!(
                    "Response body too large (max {} bytes)",
                    max_body
                )));
            }
            body
        }
    };

    Ok(Response {
        status,
        content_type,
        body,
    })
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Read one CRLF- (or LF-) terminated line without its terminator
///
/// Returns `None` at end of stream.
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut raw = Vec::new();
    let read = reader
        .by_ref()
        .take(MAX_LINE_LEN as u64)
        .read_until(b'\n', &mut raw)?;

    if read == 0 {
        return Ok(None);
    }
    if raw.last() != Some(&b'\n') {
        if raw.len() >= MAX_LINE_LEN {
            return Err(SquirrelError::Protocol(format!(
                "Line exceeds {} bytes",
                MAX_LINE_LEN
            )));
        }
        return Err(SquirrelError::Protocol("Unterminated line".to_string()));
    }

    raw.pop();
    if raw.last() == Some(&b'\r') {
        raw.pop();
    }

    String::from_utf8(raw)
        .map(Some)
        .map_err(|_| SquirrelError::Protocol("Line is not valid UTF-8".to_string()))
}

/// Read header lines up to and including the blank separator line
fn read_headers<R: BufRead>(reader: &mut R) -> Result<Vec<(String, String)>> {
    let mut headers = Vec::new();

    loop {
        let line = read_line(reader)?
            .ok_or_else(|| SquirrelError::Protocol("Unexpected end of headers".to_string()))?;

        if line.is_empty() {
            return Ok(headers);
        }

        if headers.len() >= MAX_HEADERS {
            return Err(SquirrelError::Protocol(format!(
                "Too many headers (max {})",
                MAX_HEADERS
            )));
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| SquirrelError::Protocol(format!("Malformed header: {:?}", line)))?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }
}

/// Parse the Content-Length header, if present
fn content_length(headers: &[(String, String)]) -> Result<Option<usize>> {
    headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .map(|(_, value)| {
            value.parse::<usize>().map_err(|_| {
                SquirrelError::Protocol(format!("Invalid Content-Length: {:?}", value))
            })
        })
        .transpose()
}

/// Read exactly `len` body bytes
fn read_body<R: Read>(reader: &mut R, len: usize, max_body: usize) -> Result<Vec<u8>> {
    if len > max_body {
        return Err(SquirrelError::Protocol(format!(
            "Body too large: {} bytes (max {})",
            len, max_body
        )));
    }

    let mut body = vec![0u8; len];
    if len > 0 {
        reader.read_exact(&mut body)?;
    }
    Ok(body)
}
