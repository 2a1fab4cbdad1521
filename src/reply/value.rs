//! Reply values
//!
//! Read-only view over one reply block. Numeric and boolean coercions are
//! best-effort: text that does not parse yields zero / false, never an error.

use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{Result, SsdbError};

/// One decoded block
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Value(Bytes);

impl Value {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The underlying buffer (cheap clone)
    pub fn bytes(&self) -> Bytes {
        self.0.clone()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// UTF-8 view; invalid sequences are replaced
    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    // -------------------------------------------------------------------------
    // Signed integers (narrower widths truncate the parsed i64)
    // -------------------------------------------------------------------------
    pub fn i64(&self) -> i64 {
        self.parse().unwrap_or(0)
    }

    pub fn i32(&self) -> i32 {
        self.i64() as i32
    }

    pub fn i16(&self) -> i16 {
        self.i64() as i16
    }

    pub fn i8(&self) -> i8 {
        self.i64() as i8
    }

    // -------------------------------------------------------------------------
    // Unsigned integers
    // -------------------------------------------------------------------------
    pub fn u64(&self) -> u64 {
        self.parse().unwrap_or(0)
    }

    pub fn u32(&self) -> u32 {
        self.u64() as u32
    }

    pub fn u16(&self) -> u16 {
        self.u64() as u16
    }

    pub fn u8(&self) -> u8 {
        self.u64() as u8
    }

    // -------------------------------------------------------------------------
    // Floats
    // -------------------------------------------------------------------------
    pub fn f64(&self) -> f64 {
        self.parse().unwrap_or(0.0)
    }

    pub fn f32(&self) -> f32 {
        self.f64() as f32
    }

    /// `1 t T TRUE true True` are true; everything else is false
    pub fn bool(&self) -> bool {
        matches!(
            self.as_bytes(),
            b"1" | b"t" | b"T" | b"TRUE" | b"true" | b"True"
        )
    }

    /// Deserialize the payload as JSON
    ///
    /// Payloads shorter than two bytes cannot hold a JSON object, array or
    /// string and are rejected up front.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.0.len() < 2 {
            return Err(SsdbError::Decode(format!(
                "json: payload of {} bytes is too short",
                self.0.len()
            )));
        }
        Ok(serde_json::from_slice(&self.0)?)
    }

    fn parse<T: std::str::FromStr>(&self) -> Option<T> {
        std::str::from_utf8(&self.0).ok()?.parse().ok()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({:?})", self.as_str())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl AsRef<[u8]> for Value {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
