//! Mock transports for testing.
//!
//! Provide canned engine replies without a socket, for exercising the layers
//! above the transport.

use super::QueryTransport;
use crate::error::{CsqlError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// A transport that answers from a table of canned replies.
///
/// Replies are the text a real transport would return, i.e. with the
/// terminator already stripped.
pub struct MockTransport {
    replies: HashMap<String, String>,
    default_reply: String,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    /// Creates a mock that answers every statement with an empty reply.
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            default_reply: String::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Registers the reply for an exact statement.
    pub fn with_reply(mut self, sql: impl Into<String>, reply: impl Into<String>) -> Self {
        self.replies.insert(sql.into(), reply.into());
        self
    }

    /// Sets the reply for statements without a registered reply.
    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = reply.into();
        self
    }

    /// Statements received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryTransport for MockTransport {
    async fn execute(&self, sql: &str) -> Result<String> {
        self.calls
            .lock()
            .map_err(|_| CsqlError::internal("mock call log poisoned"))?
            .push(sql.to_string());

        Ok(self
            .replies
            .get(sql)
            .cloned()
            .unwrap_or_else(|| self.default_reply.clone()))
    }

    fn endpoint(&self) -> String {
        "mock".to_string()
    }
}

/// A transport whose every call fails with the same error.
pub struct FailingTransport {
    error: CsqlError,
}

impl FailingTransport {
    pub fn new(error: CsqlError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl QueryTransport for FailingTransport {
    async fn execute(&self, _sql: &str) -> Result<String> {
        Err(self.error.clone())
    }

    fn endpoint(&self) -> String {
        "failing".to_string()
    }
}
