//! Connection Pool
//!
//! A fixed set of connections shared by many threads. Each command borrows
//! one idle connection for its whole round trip, so the one-request-per-
//! connection rule holds without any locking inside `Connection`.

use std::net::TcpStream;

use crossbeam::channel::{self, select, Receiver, Sender};
use parking_lot::Mutex;

use super::connection::{closed_reply, Connection, Transport};
use crate::config::Config;
use crate::error::{Result, SsdbError};
use crate::protocol::Command;
use crate::reply::Reply;

/// Pool of connections to one server
pub struct Connector<T: Transport = TcpStream> {
    /// Idle connections ready to be borrowed
    idle_tx: Sender<Connection<T>>,
    idle_rx: Receiver<Connection<T>>,

    /// Dropped on close, which wakes every waiting borrower
    shutdown_tx: Mutex<Option<Sender<()>>>,
    shutdown_rx: Receiver<()>,

    /// Number of connections owned by the pool
    size: usize,
}

impl Connector<TcpStream> {
    /// Open `config.max_connections` connections up front
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;

        let connections = (0..config.max_connections)
            .map(|_| Connection::connect(config))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            "Opened {} connection(s) to {}",
            connections.len(),
            config.addr()
        );

        Self::from_connections(connections)
    }
}

impl<T: Transport> Connector<T> {
    /// Build a pool from already established connections
    pub fn from_connections(connections: Vec<Connection<T>>) -> Result<Self> {
        if connections.is_empty() {
            return Err(SsdbError::Config(
                "a pool needs at least one connection".to_string(),
            ));
        }

        let size = connections.len();
        let (idle_tx, idle_rx) = channel::bounded(size);
        let (shutdown_tx, shutdown_rx) = channel::bounded(0);

        for conn in connections {
            // Capacity equals the connection count, so this never blocks
            idle_tx
                .send(conn)
                .map_err(|_| SsdbError::Config("pool channel disconnected".to_string()))?;
        }

        Ok(Self {
            idle_tx,
            idle_rx,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            shutdown_rx,
            size,
        })
    }

    /// Run one command on the next idle connection
    ///
    /// Blocks while every connection is busy. After `close` it returns a
    /// `fail` reply without touching the network.
    pub fn execute(&self, command: Command) -> Reply {
        if self.is_closed() {
            return closed_reply();
        }

        let mut conn = select! {
            recv(self.idle_rx) -> conn => match conn {
                Ok(conn) => conn,
                Err(_) => return closed_reply(),
            },
            recv(self.shutdown_rx) -> _ => return closed_reply(),
        };

        // Lost a race with close
        if self.is_closed() {
            self.release(conn);
            return closed_reply();
        }

        let reply = conn.execute(command);
        self.release(conn);
        reply
    }

    /// Close every connection; later commands fail fast
    ///
    /// Idempotent. Connections busy when this is called are closed as soon
    /// as their command completes. Returns the first close error, if any.
    pub fn close(&self) -> Result<()> {
        if self.shutdown_tx.lock().take().is_none() {
            return Ok(());
        }

        tracing::debug!("Closing connection pool ({} connections)", self.size);

        let mut first_err = None;
        for mut conn in self.idle_rx.try_iter() {
            if let Err(e) = conn.close() {
                first_err.get_or_insert(e);
            }
        }

        first_err.map_or(Ok(()), Err)
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown_tx.lock().is_none()
    }

    /// Total number of connections owned by the pool
    pub fn size(&self) -> usize {
        self.size
    }

    /// Connections not currently borrowed
    pub fn idle(&self) -> usize {
        self.idle_rx.len()
    }

    /// Hand a connection back, or close it if the pool is shutting down
    fn release(&self, mut conn: Connection<T>) {
        let shutdown = self.shutdown_tx.lock();

        if shutdown.is_none() {
            drop(shutdown);
            let _ = conn.close();
            return;
        }

        if let Err(channel::SendError(mut conn)) = self.idle_tx.send(conn) {
            let _ = conn.close();
        }
    }
}

impl<T: Transport> Drop for Connector<T> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
