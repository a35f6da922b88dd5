//! Blocking HTTP client for the squirrel resource
//!
//! Opens one connection per request, matching the server.

use std::io::BufReader;
use std::net::TcpStream;
use std::time::Duration;

use crate::error::{Result, SquirrelError};
use crate::protocol::{read_response, write_request, Method, Request, Response, StatusCode};
use crate::store::Squirrel;

/// Largest response body the client will read
const MAX_RESPONSE_SIZE: usize = 16 * 1024 * 1024;

/// Client for a running SquirrelDB server
#[derive(Debug, Clone)]
pub struct Client {
    /// Server address (host:port)
    addr: String,

    /// Connect/read/write timeout
    timeout: Duration,
}

impl Client {
    /// Create a client for the server at `addr`
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Set the read/write timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send a raw request and read the response
    pub fn send(&self, request: &Request) -> Result<Response> {
        let stream = TcpStream::connect(&self.addr).map_err(|e| {
            SquirrelError::Network(format!("Failed to connect to {}: {}", self.addr, e))
        })?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;

        let mut writer = stream.try_clone()?;
        write_request(&mut writer, request)?;

        let mut reader = BufReader::new(stream);
        read_response(&mut reader, MAX_RESPONSE_SIZE)
    }

    /// `GET /squirrels`
    pub fn list(&self) -> Result<Vec<Squirrel>> {
        let response = self.send(&Request::new(Method::Get, "/squirrels"))?;
        match response.status {
            StatusCode::Ok => decode_json(&response),
            _ => Err(unexpected(&response)),
        }
    }

    /// `GET /squirrels/{id}`
    pub fn get(&self, id: &str) -> Result<Option<Squirrel>> {
        let response = self.send(&Request::new(Method::Get, member_path(id)))?;
        match response.status {
            StatusCode::Ok => decode_json(&response).map(Some),
            StatusCode::NotFound => Ok(None),
            _ => Err(unexpected(&response)),
        }
    }

    /// `POST /squirrels`
    pub fn create(&self, name: &str, size: &str) -> Result<()> {
        let request = form_request(Method::Post, "/squirrels".to_string(), name, size);
        let response = self.send(&request)?;
        match response.status {
            StatusCode::Created => Ok(()),
            _ => Err(unexpected(&response)),
        }
    }

    /// `PUT /squirrels/{id}`; `false` if no such squirrel
    pub fn update(&self, id: &str, name: &str, size: &str) -> Result<bool> {
        let request = form_request(Method::Put, member_path(id), name, size);
        let response = self.send(&request)?;
        match response.status {
            StatusCode::NoContent => Ok(true),
            StatusCode::NotFound => Ok(false),
            _ => Err(unexpected(&response)),
        }
    }

    /// `DELETE /squirrels/{id}`; `false` if no such squirrel
    pub fn delete(&self, id: &str) -> Result<bool> {
        let response = self.send(&Request::new(Method::Delete, member_path(id)))?;
        match response.status {
            StatusCode::NoContent => Ok(true),
            StatusCode::NotFound => Ok(false),
            _ => Err(unexpected(&response)),
        }
    }
}

fn member_path(id: &str) -> String {
    format!("/squirrels/{}", id)
}

fn form_request(method: Method, path: String, name: &str, size: &str) -> Request {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("name", name)
        .append_pair("size", size)
        .finish();

    Request::new(method, path)
        .with_header("Content-Type", "application/x-www-form-urlencoded")
        .with_body(body)
}

fn decode_json<T: serde::de::DeserializeOwned>(response: &Response) -> Result<T> {
    serde_json::from_slice(&response.body)
        .map_err(|e| SquirrelError::Protocol(format!("Invalid JSON body: {}", e)))
}

fn unexpected(response: &Response) -> SquirrelError {
    SquirrelError::Network(format!(
        "Unexpected response: {} {}",
        response.status.code(),
        response.body_str().unwrap_or("<binary>")
    ))
}
