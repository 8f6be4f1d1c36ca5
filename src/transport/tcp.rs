//! TCP transport for the CSQL engine.
//!
//! Every call opens its own connection, writes the statement once, reads
//! until the terminator shows up and closes the socket again. Nothing is
//! pooled or reused between calls.

use super::exchange::{Exchange, ExchangeState};
use super::frame::{NulFrameCodec, READ_CHUNK_SIZE};
use super::QueryTransport;
use crate::config::EngineConfig;
use crate::error::{CsqlError, Result};
use async_trait::async_trait;
use bytes::BytesMut;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Notify;
use tokio_util::codec::Decoder;
use tracing::{debug, warn};

/// Transport bound to one engine endpoint.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    config: EngineConfig,
}

impl TcpTransport {
    /// Creates a transport for the given endpoint.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The endpoint this transport talks to.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Connect, write and receive. The socket is parked in `slot` as soon as
    /// it exists so the caller can close it whatever happens here.
    async fn exchange(&self, sql: &str, slot: &mut Option<TcpStream>) -> Result<String> {
        let address = self.config.address();

        let stream = TcpStream::connect(&address)
            .await
            .map_err(|e| CsqlError::connection(format!("{address}: {e}")))?;
        debug!("Connected to {}", address);
        let stream = slot.insert(stream);

        send_and_receive(stream, sql, self.config.max_response_bytes, &address).await
    }
}

/// Writes `sql` in one send and reads until the terminator.
///
/// Write failures are transport errors; read failures and a peer close
/// before the terminator are connection errors.
pub(crate) async fn send_and_receive<S>(
    stream: &mut S,
    sql: &str,
    max_response_bytes: usize,
    peer: &str,
) -> Result<String>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream
        .write_all(sql.as_bytes())
        .await
        .map_err(|e| CsqlError::transport(format!("write to {peer} failed: {e}")))?;

    let mut codec = NulFrameCodec::new(max_response_bytes);
    let mut read_buf = BytesMut::with_capacity(READ_CHUNK_SIZE);
    let mut reads = 0usize;

    loop {
        read_buf.reserve(READ_CHUNK_SIZE);
        let n = stream
            .read_buf(&mut read_buf)
            .await
            .map_err(|e| CsqlError::connection(format!("read from {peer} failed: {e}")))?;

        if n == 0 {
            return Err(CsqlError::connection(format!(
                "{peer} closed the connection before the terminator ({} bytes received)",
                read_buf.len()
            )));
        }

        reads += 1;
        debug!("Received {} bytes ({} buffered)", n, read_buf.len());

        if let Some(text) = codec.decode(&mut read_buf)? {
            debug!("Terminator found after {} read(s)", reads);
            return Ok(text);
        }
    }
}

#[async_trait]
impl QueryTransport for TcpTransport {
    async fn execute(&self, sql: &str) -> Result<String> {
        if sql.trim().is_empty() {
            return Err(CsqlError::query("refusing to send an empty statement"));
        }

        let deadline = self.config.timeout();
        let exchange = Arc::new(Exchange::new());
        let expired = Arc::new(Notify::new());
        let start = Instant::now();
        let mut slot = None;

        // The deadline settles the exchange from its own task; whichever of
        // it and the socket path settles first decides the outcome.
        let timer = tokio::spawn({
            let exchange = Arc::clone(&exchange);
            let expired = Arc::clone(&expired);
            async move {
                tokio::time::sleep(deadline).await;
                if exchange.settle(ExchangeState::TimedOut) {
                    expired.notify_one();
                }
            }
        });

        let finished = tokio::select! {
            result = self.exchange(sql, &mut slot) => Some(result),
            _ = expired.notified() => None,
        };
        timer.abort();

        let outcome = match finished {
            Some(result) => {
                let terminal = if result.is_ok() {
                    ExchangeState::Succeeded
                } else {
                    ExchangeState::Failed
                };
                if exchange.settle(terminal) {
                    result
                } else {
                    debug!("Deadline fired before the {:?} result was taken", terminal);
                    Err(CsqlError::timeout(deadline))
                }
            }
            None => Err(CsqlError::timeout(deadline)),
        };
        let terminal = exchange.state();

        if let Some(mut stream) = slot.take() {
            if let Err(e) = stream.shutdown().await {
                debug!("Shutdown after {:?} failed: {}", terminal, e);
            }
        }

        match &outcome {
            Ok(text) => debug!(
                "Query settled as {:?} in {:?} ({} bytes)",
                terminal,
                start.elapsed(),
                text.len()
            ),
            Err(e) => warn!("Query settled as {:?} in {:?}: {}", terminal, start.elapsed(), e),
        }

        outcome
    }

    fn endpoint(&self) -> String {
        self.config.address()
    }
}
