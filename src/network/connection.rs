//! Client Connection
//!
//! Binds one command to one reply over a single blocking transport.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};

use bytes::{Bytes, BytesMut};

use crate::config::Config;
use crate::error::{Result, SsdbError};
use crate::protocol::{decode_reply, encode_command, Command, Status};
use crate::reply::{FailureCause, Reply, Value};

/// Default scratch size for a single socket read (8 KB)
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

/// Item carried by a reply whose framing could not be decoded
const PROTOCOL_FAILURE_MESSAGE: &str = "network error";

/// Item carried by a reply sent over a closed connection
const CLOSED_MESSAGE: &str = "connection closed";

/// A blocking byte stream the connection can drive
pub trait Transport: Read + Write {
    /// Release the underlying handle
    fn shutdown(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for TcpStream {
    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// A single client connection
///
/// Strictly one outstanding request: `execute` writes a command, then blocks
/// on reads until the whole reply is buffered. Not safe to share across
/// threads without external locking (`Connector` does that for a pool).
pub struct Connection<T: Transport = TcpStream> {
    /// Transport handle, `None` once closed
    transport: Option<T>,

    /// Bytes received but not yet consumed by a complete reply
    recv_buf: BytesMut,

    /// Scratch area for a single read
    scratch: Vec<u8>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection<TcpStream> {
    /// Connect to the server named by `config`
    ///
    /// Tries every resolved address in turn, then disables Nagle's algorithm
    /// and applies the configured read/write timeouts.
    pub fn connect(config: &Config) -> Result<Self> {
        config.validate()?;

        let addr = config.addr();
        let mut last_err = None;

        for sock_addr in (config.host.as_str(), config.port).to_socket_addrs()? {
            let attempt = match config.connect_timeout() {
                Some(timeout) => TcpStream::connect_timeout(&sock_addr, timeout),
                None => TcpStream::connect(sock_addr),
            };

            match attempt {
                Ok(stream) => return Self::from_stream(stream, config),
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", sock_addr, e);
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(e) => Err(SsdbError::Io(e)),
            None => Err(SsdbError::Config(format!(
                "{} did not resolve to any address",
                addr
            ))),
        }
    }

    /// Wrap an already connected stream, applying the config's socket options
    pub fn from_stream(stream: TcpStream, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        tracing::debug!("Connected to {}", peer_addr);

        let mut conn = Self::with_read_buffer_size(stream, config.read_buffer_size);
        conn.peer_addr = peer_addr;
        Ok(conn)
    }
}

impl<T: Transport> Connection<T> {
    /// Wrap a transport with the default read size
    pub fn new(transport: T) -> Self {
        Self::with_read_buffer_size(transport, DEFAULT_READ_BUFFER_SIZE)
    }

    pub fn with_read_buffer_size(transport: T, read_buffer_size: usize) -> Self {
        Self {
            transport: Some(transport),
            recv_buf: BytesMut::with_capacity(read_buffer_size),
            scratch: vec![0u8; read_buffer_size.max(1)],
            peer_addr: "unknown".to_string(),
        }
    }

    /// Send one command and wait for its reply
    ///
    /// Never fails: encode errors come back as `client_error`, transport and
    /// framing errors as `fail`, with `Reply::cause` telling them apart.
    pub fn execute(&mut self, command: Command) -> Reply {
        let payload = match encode_command(command.args()) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Rejected command {:?}: {}", command.verb(), e);
                return failure(Status::ClientError, FailureCause::Malformed, e.to_string());
            }
        };

        tracing::trace!(
            "Sending {:?} ({} bytes) to {}",
            command.verb(),
            payload.len(),
            self.peer_addr
        );

        let Some(transport) = self.transport.as_mut() else {
            return closed_reply();
        };

        if let Err(e) = transport.write_all(&payload).and_then(|_| transport.flush()) {
            tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
            self.poison();
            return failure(Status::Fail, FailureCause::Write, e.to_string());
        }

        match self.recv() {
            Ok(blocks) => classify(blocks),
            Err(e) => {
                tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                self.poison();
                match e {
                    SsdbError::Protocol(_) => failure(
                        Status::Fail,
                        FailureCause::Protocol,
                        PROTOCOL_FAILURE_MESSAGE.to_string(),
                    ),
                    SsdbError::ConnectionClosed => closed_reply(),
                    SsdbError::Io(e) => failure(Status::Fail, FailureCause::Read, e.to_string()),
                    e => failure(Status::Fail, FailureCause::Read, e.to_string()),
                }
            }
        }
    }

    /// Release the transport
    ///
    /// Idempotent: closing an already closed connection is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut transport) = self.transport.take() else {
            return Ok(());
        };
        self.recv_buf.clear();

        tracing::debug!("Closing connection to {}", self.peer_addr);

        match transport.shutdown() {
            // Peer already went away
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(()),
            result => result.map_err(SsdbError::from),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_none()
    }

    /// Bytes held in the receive buffer
    pub fn buffered(&self) -> usize {
        self.recv_buf.len()
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Close after a failed exchange
    ///
    /// A reply that is late, partial or corrupt may still be in flight, so
    /// the stream can no longer pair commands with replies.
    fn poison(&mut self) {
        if let Err(e) = self.close() {
            tracing::debug!("Error closing {}: {}", self.peer_addr, e);
        }
    }

    /// Read until the buffer holds one complete reply
    fn recv(&mut self) -> Result<Vec<Bytes>> {
        loop {
            if let Some(blocks) = decode_reply(&mut self.recv_buf)? {
                return Ok(blocks);
            }

            let transport = self.transport.as_mut().ok_or(SsdbError::ConnectionClosed)?;

            let n = match transport.read(&mut self.scratch) {
                Ok(0) => return Err(SsdbError::ConnectionClosed),
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            self.recv_buf.extend_from_slice(&self.scratch[..n]);
            tracing::trace!(
                "Read {} bytes from {} ({} buffered)",
                n,
                self.peer_addr,
                self.recv_buf.len()
            );
        }
    }
}

impl<T: Transport> Drop for Connection<T> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Turn decoded blocks into a reply: the first block must be a status token
fn classify(blocks: Vec<Bytes>) -> Reply {
    let mut blocks = blocks.into_iter();

    match blocks.next().and_then(|first| Status::from_token(&first)) {
        Some(Status::Ok) => Reply::new(Status::Ok, blocks.map(Value::from).collect()),
        Some(status) => Reply::new(status, Vec::new()),
        None => Reply::failure(Status::Fail, FailureCause::UnknownStatus, Vec::new()),
    }
}

fn failure(status: Status, cause: FailureCause, message: String) -> Reply {
    Reply::failure(status, cause, vec![Value::new(message)])
}

pub(crate) fn closed_reply() -> Reply {
    failure(Status::Fail, FailureCause::Closed, CLOSED_MESSAGE.to_string())
}
