//! Query transport layer.
//!
//! Provides a trait-based interface for sending one statement to the engine
//! and receiving its terminated reply, allowing the TCP transport to be
//! swapped for a mock in tests.

mod exchange;
mod frame;
mod mock;
mod tcp;

pub use exchange::{Exchange, ExchangeState};
pub use frame::{NulFrameCodec, READ_CHUNK_SIZE, TERMINATOR};
pub use mock::{FailingTransport, MockTransport};
pub use tcp::TcpTransport;

use crate::config::EngineConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Creates a TCP transport for the given endpoint.
///
/// This is the central factory for transports; it rejects unusable configs
/// before any socket is opened.
pub fn connect(config: &EngineConfig) -> Result<Box<dyn QueryTransport>> {
    config.validate()?;
    Ok(Box::new(TcpTransport::new(config.clone())))
}

/// Trait defining one request/response exchange with the engine.
#[async_trait]
pub trait QueryTransport: Send + Sync {
    /// Sends `sql` and returns the reply text with terminators removed.
    async fn execute(&self, sql: &str) -> Result<String>;

    /// Human-readable endpoint for logs.
    fn endpoint(&self) -> String;
}

#[async_trait]
impl<T: QueryTransport + ?Sized> QueryTransport for Arc<T> {
    async fn execute(&self, sql: &str) -> Result<String> {
        (**self).execute(sql).await
    }

    fn endpoint(&self) -> String {
        (**self).endpoint()
    }
}
