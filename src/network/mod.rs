//! Network Module
//!
//! Blocking TCP client connections.
//!
//! ## Architecture
//! - `Connection`: one transport, one receive buffer, one request at a time
//! - `Connector`: fixed pool of connections shared across threads

mod connection;
mod pool;

pub use connection::{Connection, Transport, DEFAULT_READ_BUFFER_SIZE};
pub use pool::Connector;
