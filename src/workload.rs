//! Demo workloads: schema bootstrap and a stress run.

use crate::client::CsqlClient;
use crate::decode;
use crate::error::Result;
use crate::records::{Order, User};
use crate::statement::Statement;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Creates the demo schema and seeds one user and one order.
///
/// Returns `false` without touching anything else if the engine rejects the
/// first statement, which is what happens when the schema already exists.
pub async fn seed(client: &CsqlClient) -> Result<bool> {
    let reply = client
        .execute_statement(&Statement::CreateUsersTable)
        .await?;
    if reply.contains("Error") {
        info!("Schema already present, skipping seed");
        return Ok(false);
    }

    client
        .execute_statement(&Statement::CreateOrdersTable)
        .await?;
    client
        .execute_statement(&Statement::CreateOrdersUserIndex)
        .await?;
    client
        .create_user(&User {
            id: 101,
            username: "Mwaura Mbugua".into(),
            email: "mwaurambugua12@gmail.com".into(),
        })
        .await?;
    client
        .create_order(&Order {
            id: 501,
            user_id: 101,
            item: "Keyboard".into(),
        })
        .await?;

    info!("Database initialized successfully");
    Ok(true)
}

/// Parameters of a stress run.
#[derive(Debug, Clone, Copy)]
pub struct StressOptions {
    /// Users (and orders) to insert.
    pub count: u32,
    /// Inserts in flight at once; 1 reproduces the sequential demo run.
    pub concurrency: usize,
}

impl Default for StressOptions {
    fn default() -> Self {
        Self {
            count: 500,
            concurrency: 1,
        }
    }
}

/// What a stress run observed.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct StressReport {
    pub users_inserted: u32,
    pub user_failures: u32,
    pub orders_inserted: u32,
    pub order_failures: u32,
    pub duplicate_key_rejected: bool,
    pub join_rows: usize,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

/// Length of the text column written by the large-value insert.
const LARGE_VALUE_LEN: usize = 1000;

/// Builds the schema, bulk-inserts users and orders, writes one large value,
/// checks duplicate-key rejection and runs the users/orders join.
///
/// Engine-reported failures are counted. Transport failures abort the run.
pub async fn stress(client: &CsqlClient, options: StressOptions) -> Result<StressReport> {
    let start = Instant::now();
    let concurrency = options.concurrency.max(1);
    let mut report = StressReport::default();

    info!("Creating schema");
    for statement in [
        Statement::CreateUsersTable,
        Statement::CreateOrdersTable,
        Statement::CreateOrdersUserIndex,
    ] {
        client.execute_statement(&statement).await?;
    }

    info!("Bulk inserting {} users", options.count);
    let user_results: Vec<(u32, Result<String>)> = stream::iter(1..=options.count)
        .map(|i| async move {
            let statement = Statement::InsertUser {
                id: i as i64,
                username: format!("user_{i}"),
                email: format!("user_{i}@stress-test.com"),
            };
            (i, client.execute_statement(&statement).await)
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    for (i, result) in user_results {
        let reply = result?;
        match decode::engine_error(&reply) {
            Some(msg) => {
                error!("Failed to insert user {}: {}", i, msg);
                report.user_failures += 1;
            }
            None => report.users_inserted += 1,
        }
    }

    info!("Bulk inserting {} orders", options.count);
    let order_results: Vec<Result<String>> = stream::iter(1..=options.count)
        .map(|i| async move {
            let item = if i % 2 == 0 { "Keyboard" } else { "Monitor" };
            let statement = Statement::InsertOrder {
                id: i as i64 + 5000,
                user_id: i as i64,
                item: item.to_string(),
            };
            client.execute_statement(&statement).await
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    for result in order_results {
        match decode::engine_error(&result?) {
            Some(_) => report.order_failures += 1,
            None => report.orders_inserted += 1,
        }
    }

    info!("Inserting a {}-byte value", LARGE_VALUE_LEN);
    client
        .execute_statement(&Statement::InsertUser {
            id: 9999,
            username: "massive_user".into(),
            email: "A".repeat(LARGE_VALUE_LEN),
        })
        .await?;

    info!("Checking duplicate key rejection");
    let duplicate = client
        .execute_statement(&Statement::InsertUser {
            id: 1,
            username: "duplicate_user".into(),
            email: "fail@test.com".into(),
        })
        .await?;
    report.duplicate_key_rejected = duplicate.contains("Error: Duplicate key");
    if !report.duplicate_key_rejected {
        warn!("Duplicate key was accepted: {}", duplicate.trim());
    }

    info!("Running users/orders join");
    let join = client
        .execute_statement(&Statement::SelectUserOrders)
        .await?;
    report.join_rows = decode::count_rows(&join);

    report.elapsed = start.elapsed();
    info!(
        "Stress run complete in {:?}: join returned {} rows",
        report.elapsed, report.join_rows
    );
    Ok(report)
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}
