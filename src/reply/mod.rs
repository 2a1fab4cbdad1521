//! Reply Module
//!
//! The outcome of one command: a status plus the ordered value blocks that
//! followed it. Replies are built once by the connection and never mutated.

mod value;

pub use value::Value;

use std::fmt;

use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::protocol::Status;

/// Why a reply was produced on the client side instead of by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    /// An argument could not be encoded; nothing was sent
    Malformed,
    /// Writing the command failed
    Write,
    /// Reading the reply failed
    Read,
    /// The peer closed the connection, or it was already closed locally
    Closed,
    /// The peer broke the block framing
    Protocol,
    /// The first block was not a known status token
    UnknownStatus,
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureCause::Malformed => "malformed request",
            FailureCause::Write => "write failed",
            FailureCause::Read => "read failed",
            FailureCause::Closed => "connection closed",
            FailureCause::Protocol => "protocol violation",
            FailureCause::UnknownStatus => "unknown status",
        };
        f.write_str(s)
    }
}

/// The result of one command
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    status: Status,
    items: Vec<Value>,
    cause: Option<FailureCause>,
}

impl Reply {
    /// A reply as decoded from the server
    pub fn new(status: Status, items: Vec<Value>) -> Self {
        Self {
            status,
            items,
            cause: None,
        }
    }

    /// A reply synthesized on the client side
    pub fn failure(status: Status, cause: FailureCause, items: Vec<Value>) -> Self {
        Self {
            status,
            items,
            cause: Some(cause),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Set only for client-side failures
    pub fn cause(&self) -> Option<FailureCause> {
        self.cause
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Status::NotFound
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn list(&self) -> &[Value] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    // -------------------------------------------------------------------------
    // Key/value pairing
    // -------------------------------------------------------------------------

    /// Number of complete key/value pairs
    pub fn kv_len(&self) -> usize {
        self.items.len() / 2
    }

    /// Items taken two at a time as (key, value); a trailing odd item is skipped
    pub fn kv_pairs(&self) -> impl Iterator<Item = (&Value, &Value)> + '_ {
        self.items.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
    }

    /// Call `f` for each pair and return the pair count
    pub fn kv_each<F>(&self, mut f: F) -> usize
    where
        F: FnMut(&Value, &Value),
    {
        for (key, value) in self.kv_pairs() {
            f(key, value);
        }
        self.kv_len()
    }

    // -------------------------------------------------------------------------
    // First-item shortcuts (single-value commands such as get / incr / ttl)
    // -------------------------------------------------------------------------

    /// First item, or an empty value
    pub fn value(&self) -> Value {
        self.items.first().cloned().unwrap_or_default()
    }

    pub fn bytes(&self) -> &[u8] {
        self.items.first().map(Value::as_bytes).unwrap_or_default()
    }

    pub fn string(&self) -> String {
        self.value().as_str().into_owned()
    }

    pub fn int(&self) -> i64 {
        self.value().i64()
    }

    pub fn i64(&self) -> i64 {
        self.value().i64()
    }

    pub fn i32(&self) -> i32 {
        self.value().i32()
    }

    pub fn u64(&self) -> u64 {
        self.value().u64()
    }

    pub fn u32(&self) -> u32 {
        self.value().u32()
    }

    pub fn f64(&self) -> f64 {
        self.value().f64()
    }

    pub fn f32(&self) -> f32 {
        self.value().f32()
    }

    pub fn bool(&self) -> bool {
        self.value().bool()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        self.value().json()
    }
}
