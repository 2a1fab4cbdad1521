//! Reply status tokens
//!
//! The first block of every reply names its outcome class.

use std::fmt;

/// Reply status
///
/// `Fail` doubles as the client-side transport failure status and
/// `ClientError` as the client-side malformed request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    NotFound,
    Error,
    Fail,
    ClientError,
}

impl Status {
    /// Parse a status block; only exact token matches are recognized
    pub fn from_token(token: &[u8]) -> Option<Self> {
        match token {
            b"ok" => Some(Status::Ok),
            b"not_found" => Some(Status::NotFound),
            b"error" => Some(Status::Error),
            b"fail" => Some(Status::Fail),
            b"client_error" => Some(Status::ClientError),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::NotFound => "not_found",
            Status::Error => "error",
            Status::Fail => "fail",
            Status::ClientError => "client_error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
