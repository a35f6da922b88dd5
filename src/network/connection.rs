//! Connection Handler
//!
//! Serves a single request on one client connection.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::time::Duration;

use crate::error::{Result, SquirrelError};
use crate::handler::Handler;
use crate::protocol::{read_request, write_response, Response};
use crate::store::SquirrelRepository;

/// Handles a single client connection
pub struct Connection<S> {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Request handler (holds the store)
    handler: Handler<S>,

    /// Largest request body accepted
    max_body_size: usize,

    /// Peer address for logging
    peer_addr: String,
}

impl<S: SquirrelRepository> Connection<S> {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, handler: Handler<S>, max_body_size: usize) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            handler,
            max_body_size,
            peer_addr,
        })
    }

    /// Configure connection timeouts
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection: read one request, write one response
    ///
    /// Client disconnects and timeouts end the connection quietly.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let request = match read_request(&mut self.reader, self.max_body_size) {
            Ok(request) => request,
            Err(SquirrelError::Io(ref e)) if is_disconnect(e.kind()) => {
                tracing::debug!("Client {} went away before sending a request", self.peer_addr);
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Bad request from {}: {}", self.peer_addr, e);
                let _ = write_response(&mut self.writer, &Response::bad_request());
                return Err(e);
            }
        };

        tracing::trace!(
            "Received {} {} from {}",
            request.method.as_str(),
            request.path,
            self.peer_addr
        );

        let response = self.handler.handle(&request);

        if let Err(e) = write_response(&mut self.writer, &response) {
            if let SquirrelError::Io(ref io_err) = e {
                if is_disconnect(io_err.kind()) {
                    tracing::debug!(
                        "Client {} disconnected before response could be sent: {}",
                        self.peer_addr,
                        e
                    );
                    return Ok(());
                }
            }
            tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
            return Err(e);
        }

        Ok(())
    }
}

/// IO errors that mean the peer is gone (or too slow), not that we failed
fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::WouldBlock
            | ErrorKind::TimedOut
    )
}
