//! Caller-facing client.
//!
//! Composes a [`QueryTransport`] with the decoder. Raw text, decoded rows and
//! typed outcomes are all thin layers over a single `execute` call.

use crate::config::EngineConfig;
use crate::decode::{self, Row};
use crate::error::{CsqlError, Result};
use crate::records::FromRow;
use crate::statement::Statement;
use crate::transport::{self, QueryTransport};
use tracing::{debug, warn};

/// What a statement produced, once the reply has been inspected.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// At least one row decoded.
    Rows(Vec<Row>),
    /// The engine replied without rows or error text.
    Empty,
    /// The engine reported an error line, e.g. `Error: Duplicate key`.
    EngineError(String),
}

impl QueryOutcome {
    /// Rows, if any were returned.
    pub fn rows(&self) -> &[Row] {
        match self {
            Self::Rows(rows) => rows,
            _ => &[],
        }
    }

    /// Converts an engine-reported error into `Err`.
    pub fn into_result(self) -> Result<Vec<Row>> {
        match self {
            Self::Rows(rows) => Ok(rows),
            Self::Empty => Ok(Vec::new()),
            Self::EngineError(msg) => Err(CsqlError::engine(msg)),
        }
    }
}

/// Client for the CSQL engine.
pub struct CsqlClient {
    transport: Box<dyn QueryTransport>,
}

impl CsqlClient {
    /// Creates a client that talks TCP to the configured endpoint.
    pub fn connect(config: &EngineConfig) -> Result<Self> {
        Ok(Self::with_transport(transport::connect(config)?))
    }

    /// Creates a client over an existing transport.
    pub fn with_transport(transport: Box<dyn QueryTransport>) -> Self {
        Self { transport }
    }

    /// The endpoint description of the underlying transport.
    pub fn endpoint(&self) -> String {
        self.transport.endpoint()
    }

    /// Sends a statement and returns the reply text.
    ///
    /// Engine errors are part of the text; only transport failures are `Err`.
    pub async fn execute_query(&self, sql: &str) -> Result<String> {
        debug!("Executing on {}: {}", self.transport.endpoint(), sql);
        self.transport.execute(sql).await
    }

    /// Renders and sends a statement, refusing values that would break
    /// out of their quotes.
    pub async fn execute_statement(&self, statement: &Statement) -> Result<String> {
        if statement.has_quote_hazard() {
            return Err(CsqlError::query(
                "statement value contains a single quote and cannot be sent safely",
            ));
        }
        self.execute_query(&statement.render()).await
    }

    /// Sends a statement and decodes the reply into rows.
    pub async fn fetch_rows(&self, sql: &str) -> Result<Vec<Row>> {
        let text = self.execute_query(sql).await?;
        Ok(decode::decode(&text))
    }

    /// Sends a statement and assembles each row into a record.
    ///
    /// Rows that do not fit the record shape are skipped.
    pub async fn fetch_records<T: FromRow>(&self, sql: &str) -> Result<Vec<T>> {
        let rows = self.run(sql).await?.into_result()?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                let record = T::from_row(row);
                if record.is_none() {
                    warn!("Skipping row that does not fit {}: {}", T::NAME, decode::format_row(row));
                }
                record
            })
            .collect())
    }

    /// Sends a statement and classifies the reply.
    pub async fn run(&self, sql: &str) -> Result<QueryOutcome> {
        let text = self.execute_query(sql).await?;

        if let Some(msg) = decode::engine_error(&text) {
            return Ok(QueryOutcome::EngineError(msg));
        }

        let rows = decode::decode(&text);
        if rows.is_empty() {
            Ok(QueryOutcome::Empty)
        } else {
            Ok(QueryOutcome::Rows(rows))
        }
    }

    /// Terminal passthrough: the reply text, or the failure as text.
    ///
    /// Blank input sends nothing and yields an empty string.
    pub async fn execute_raw(&self, sql: &str) -> String {
        if sql.trim().is_empty() {
            return String::new();
        }

        match self.execute_query(sql).await {
            Ok(text) => text,
            Err(e) => format!("Error: {e}\n"),
        }
    }
}
