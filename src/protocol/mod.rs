//! Protocol Module
//!
//! The slice of HTTP/1.x the service speaks.
//!
//! ## Request Format
//! ```text
//! METHOD SP path SP HTTP/1.x CRLF
//! (Header: value CRLF)*
//! CRLF
//! body (Content-Length bytes)
//! ```
//!
//! ## Response Format
//! ```text
//! HTTP/1.0 SP code SP reason CRLF
//! [Content-Type: type CRLF]
//! Content-Length: n CRLF
//! Connection: close CRLF
//! CRLF
//! body
//! ```
//!
//! One request per connection. Request bodies for POST/PUT are
//! `application/x-www-form-urlencoded`.

mod codec;
mod form;
mod request;
mod response;

pub use codec::{
    encode_request, encode_response, read_request, read_response, write_request,
    write_response, MAX_HEADERS, MAX_LINE_LEN,
};
pub use form::Form;
pub use request::{Method, Request};
pub use response::{Response, StatusCode, CONTENT_TYPE_JSON, CONTENT_TYPE_TEXT};
