//! # ssdbkv
//!
//! A blocking client for the SSDB key-value protocol:
//! - Length-prefixed text blocks, blank-line terminated
//! - Incremental reply decoding across arbitrary read boundaries
//! - One outstanding request per connection, optional fixed-size pool
//! - Total `execute`: every failure comes back as a reply status
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Connector (optional pool)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ borrow one
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Connection                             │
//! │          execute(Command) -> Reply, close()                 │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │ write                            │ read loop
//!            ▼                                  ▼
//!   ┌─────────────────┐               ┌───────────────────┐
//!   │  Wire Encoder   │               │  Receive Buffer   │
//!   │  Arg -> blocks  │               │  + Frame Decoder  │
//!   └─────────────────┘               └─────────┬─────────┘
//!                                               │ blocks
//!                                               ▼
//!                                     ┌───────────────────┐
//!                                     │  Reply / Value    │
//!                                     └───────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use ssdbkv::{Command, Config, Connection};
//!
//! let config = Config::builder().host("127.0.0.1").port(8888).build();
//! let mut conn = Connection::connect(&config)?;
//!
//! conn.execute(Command::new("set").arg("k").arg("v"));
//! let reply = conn.execute(Command::new("get").arg("k"));
//! if reply.is_ok() {
//!     println!("{}", reply.string());
//! }
//! conn.close()?;
//! # Ok::<(), ssdbkv::SsdbError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod reply;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SsdbError, Result};
pub use config::Config;
pub use protocol::{Arg, Command, Status};
pub use reply::{FailureCause, Reply, Value};
pub use network::{Connection, Connector, Transport};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ssdbkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
