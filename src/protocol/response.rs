//! Response definitions
//!
//! Represents responses sent to clients.

use serde::Serialize;

use crate::error::{Result, SquirrelError};

/// Content type of data-bearing responses
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Content type of fixed message responses
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum StatusCode {
    Ok = 200,
    Created = 201,
    NoContent = 204,
    BadRequest = 400,
    NotFound = 404,
    InternalServerError = 500,
    ServiceUnavailable = 503,
}

impl StatusCode {
    /// Numeric status code
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Reason phrase for the status line
    pub fn reason(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::NoContent => "No Content",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// Map a numeric code back to a known status
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            200 => Some(StatusCode::Ok),
            201 => Some(StatusCode::Created),
            204 => Some(StatusCode::NoContent),
            400 => Some(StatusCode::BadRequest),
            404 => Some(StatusCode::NotFound),
            500 => Some(StatusCode::InternalServerError),
            503 => Some(StatusCode::ServiceUnavailable),
            _ => None,
        }
    }
}

/// A response to send to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: StatusCode,

    /// Content-Type header, omitted for empty bodies
    pub content_type: Option<String>,

    /// Body bytes
    pub body: Vec<u8>,
}

impl Response {
    /// Create a response with no body and no content type
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }

    /// Create a JSON response from a serializable value
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<Self> {
        let body =
            serde_json::to_vec(value).map_err(|e| SquirrelError::Serialization(e.to_string()))?;
        Ok(Self {
            status,
            content_type: Some(CONTENT_TYPE_JSON.to_string()),
            body,
        })
    }

    /// Create a plain-text response
    pub fn text(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            content_type: Some(CONTENT_TYPE_TEXT.to_string()),
            body: message.as_bytes().to_vec(),
        }
    }

    /// "404 Not Found"
    pub fn not_found() -> Self {
        Self::status_text(StatusCode::NotFound)
    }

    /// "400 Bad Request"
    pub fn bad_request() -> Self {
        Self::status_text(StatusCode::BadRequest)
    }

    /// "500 Internal Server Error"
    pub fn internal_error() -> Self {
        Self::status_text(StatusCode::InternalServerError)
    }

    /// "503 Service Unavailable"
    pub fn service_unavailable() -> Self {
        Self::status_text(StatusCode::ServiceUnavailable)
    }

    /// Body as UTF-8, if it is
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Plain-text body of the form "<code> <reason>"
    fn status_text(status: StatusCode) -> Self {
        Self::text(status, &format!("{} {}", status.code(), status.reason()))
    }
}
