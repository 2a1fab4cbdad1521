//! Command encoder
//!
//! Turns an argument list into the bytes written to the socket.
//!
//! ## Wire Format
//! ```text
//! <len>\n<payload>\n      one block per argument (lists expand in place)
//! ...
//! \n                      blank line ends the command
//! ```

use bytes::{BufMut, BytesMut};

use super::Arg;
use crate::error::{Result, SsdbError};

/// Encode a command
///
/// Fails with `RequestMalformed` before producing any output if an argument
/// has no canonical text form (non-finite floats).
pub fn encode_command(args: &[Arg]) -> Result<BytesMut> {
    let mut buf = BytesMut::with_capacity(encoded_len_hint(args));

    for arg in args {
        match arg {
            Arg::Text(s) => put_block(&mut buf, s.as_bytes()),
            Arg::Bytes(b) => put_block(&mut buf, b),
            Arg::Int(v) => put_block(&mut buf, v.to_string().as_bytes()),
            Arg::Uint(v) => put_block(&mut buf, v.to_string().as_bytes()),
            Arg::Float(v) => {
                if !v.is_finite() {
                    return Err(non_finite(*v));
                }
                put_block(&mut buf, v.to_string().as_bytes());
            }
            Arg::Float32(v) => {
                if !v.is_finite() {
                    return Err(non_finite(f64::from(*v)));
                }
                put_block(&mut buf, v.to_string().as_bytes());
            }
            Arg::Bool(v) => put_block(&mut buf, if *v { b"1" } else { b"0" }),
            Arg::Nil => put_block(&mut buf, b""),
            Arg::TextList(items) => {
                for s in items {
                    put_block(&mut buf, s.as_bytes());
                }
            }
            Arg::BytesList(items) => {
                for b in items {
                    put_block(&mut buf, b);
                }
            }
        }
    }

    buf.put_u8(b'\n');
    Ok(buf)
}

/// Append a single block: decimal length, newline, payload, newline
pub fn put_block(buf: &mut BytesMut, payload: &[u8]) {
    buf.put_slice(payload.len().to_string().as_bytes());
    buf.put_u8(b'\n');
    buf.put_slice(payload);
    buf.put_u8(b'\n');
}

fn non_finite(v: f64) -> SsdbError {
    SsdbError::RequestMalformed(format!("float argument {} has no decimal form", v))
}

/// Rough output size so the common case never reallocates
fn encoded_len_hint(args: &[Arg]) -> usize {
    const BLOCK_OVERHEAD: usize = 8;

    let payload: usize = args
        .iter()
        .map(|arg| match arg {
            Arg::Text(s) => s.len() + BLOCK_OVERHEAD,
            Arg::Bytes(b) => b.len() + BLOCK_OVERHEAD,
            Arg::TextList(items) => items.iter().map(|s| s.len() + BLOCK_OVERHEAD).sum(),
            Arg::BytesList(items) => items.iter().map(|b| b.len() + BLOCK_OVERHEAD).sum(),
            _ => 24 + BLOCK_OVERHEAD,
        })
        .sum();

    payload + 1
}
