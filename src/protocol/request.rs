//! Request definitions
//!
//! Represents parsed HTTP requests.

/// Request methods the router distinguishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,

    /// Anything else (always routed to not-found)
    Other(String),
}

impl Method {
    /// Parse a request-line method token (case-sensitive, as in HTTP)
    pub fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            other => Method::Other(other.to_string()),
        }
    }

    /// The method token as sent on the wire
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Other(token) => token,
        }
    }
}

/// A parsed request
#[derive(Debug, Clone)]
pub struct Request {
    /// Request method
    pub method: Method,

    /// Request target as sent (may include a query string)
    pub path: String,

    /// Headers in arrival order
    pub headers: Vec<(String, String)>,

    /// Raw body bytes (empty when no Content-Length)
    pub body: Vec<u8>,
}

impl Request {
    /// Create a request with no headers and an empty body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Attach a body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Attach a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header value (case-insensitive name)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The path with any query string removed
    pub fn route_path(&self) -> &str {
        match self.path.split_once('?') {
            Some((path, _query)) => path,
            None => &self.path,
        }
    }
}
