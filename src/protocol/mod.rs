//! Protocol Module
//!
//! Defines the wire protocol spoken with the server.
//!
//! ## Block Format
//! ```text
//! <decimal-length>\n<payload-bytes>\n
//! ```
//!
//! A command is N blocks followed by a blank line. A reply has the same
//! shape; its first block is a status token.
//!
//! ### Example: `set k v`
//! ```text
//! 3\nset\n1\nk\n1\nv\n\n
//! ```
//!
//! ### Status Tokens
//! - `ok`
//! - `not_found`
//! - `error`
//! - `fail`
//! - `client_error`

mod command;
mod decoder;
mod encoder;
mod status;

pub use command::{Arg, Command};
pub use decoder::{decode_reply, MAX_BLOCK_SIZE, MAX_HEADER_LEN};
pub use encoder::{encode_command, put_block};
pub use status::Status;
