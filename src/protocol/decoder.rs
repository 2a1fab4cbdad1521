//! Reply decoder
//!
//! Incremental parser over the connection's receive buffer. A decode attempt
//! either finds a complete reply (and consumes exactly its bytes), reports
//! that more data is needed (and consumes nothing), or fails on a framing
//! violation.
//!
//! The decoder keeps no state between attempts. Everything known about a
//! partially received reply lives in the buffer itself, so an attempt that
//! runs out of data simply rescans from the front on the next call.

use bytes::{Bytes, BytesMut};

use crate::error::{Result, SsdbError};

/// Largest block length accepted from the peer (256 MB)
pub const MAX_BLOCK_SIZE: usize = 256 * 1024 * 1024;

/// Longest length header accepted, the decimal width of `usize::MAX`
pub const MAX_HEADER_LEN: usize = 20;

/// Attempt to decode one reply from the front of `buf`
///
/// Returns:
/// - `Ok(Some(blocks))` when a blank line closes at least one block; the
///   reply's bytes (including any leading stray blank lines) are removed
///   from `buf`
/// - `Ok(None)` when the reply is not complete yet; `buf` is untouched
/// - `Err(Protocol)` when a length header is not a valid block length, or
///   runs past `MAX_HEADER_LEN` bytes without a newline
pub fn decode_reply(buf: &mut BytesMut) -> Result<Option<Vec<Bytes>>> {
    // (start, len) of each payload, relative to the front of buf
    let mut blocks: Vec<(usize, usize)> = Vec::new();
    let mut offset = 0;

    loop {
        let Some(idx) = buf[offset..].iter().position(|&b| b == b'\n') else {
            let pending = buf.len() - offset;
            if pending > MAX_HEADER_LEN {
                return Err(SsdbError::Protocol(format!(
                    "unterminated length header ({} bytes without newline)",
                    pending
                )));
            }
            return Ok(None);
        };

        let line = &buf[offset..offset + idx];
        offset += idx + 1;

        if is_blank(line) {
            if blocks.is_empty() {
                // Noise before the first block
                continue;
            }

            let frame = buf.split_to(offset).freeze();
            let items = blocks
                .into_iter()
                .map(|(start, len)| frame.slice(start..start + len))
                .collect();
            return Ok(Some(items));
        }

        let len = parse_block_len(line)?;

        // Payload plus its trailing newline must be fully buffered
        if buf.len() < offset + len + 1 {
            return Ok(None);
        }
        if buf[offset + len] != b'\n' {
            return Err(SsdbError::Protocol(format!(
                "block of {} bytes not followed by newline (found 0x{:02x})",
                len,
                buf[offset + len]
            )));
        }

        blocks.push((offset, len));
        offset += len + 1;
    }
}

/// An empty line or a lone carriage return
fn is_blank(line: &[u8]) -> bool {
    line.is_empty() || line == b"\r"
}

fn parse_block_len(line: &[u8]) -> Result<usize> {
    let invalid = || {
        SsdbError::Protocol(format!(
            "invalid block length header {:?}",
            String::from_utf8_lossy(line)
        ))
    };

    if line.len() > MAX_HEADER_LEN {
        return Err(invalid());
    }

    // Signed parse so that "-0" reads as zero; real negatives are rejected
    let len = std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(invalid)?;

    if len > MAX_BLOCK_SIZE {
        return Err(SsdbError::Protocol(format!(
            "block too large: {} bytes (max {})",
            len, MAX_BLOCK_SIZE
        )));
    }

    Ok(len)
}
