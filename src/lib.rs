//! csql-client - a client for the CSQL engine.
//!
//! Sends one statement per connection, waits for the NUL-terminated reply
//! and decodes its `(v1, v2, ...)` lines into rows.

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod records;
pub mod statement;
pub mod transport;
pub mod workload;

pub use client::{CsqlClient, QueryOutcome};
pub use config::{Config, EngineConfig};
pub use decode::{decode, Row, Value};
pub use error::{CsqlError, Result};
pub use transport::{QueryTransport, TcpTransport};
