//! Client integration tests.
//!
//! Exercise the caller-facing surface end to end over TCP.

use super::fake_engine::{unused_port, FakeEngine, Script};
use csql_client::client::{CsqlClient, QueryOutcome};
use csql_client::config::EngineConfig;
use csql_client::error::CsqlError;
use csql_client::records::User;
use csql_client::workload;
use pretty_assertions::assert_eq;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn test_get_users_over_tcp() {
    let engine = FakeEngine::start(Script::reply(
        "(101, \"Mwaura Mbugua\", \"mwaurambugua12@gmail.com\")\n(102, \"bob\", \"bob@example.com\")\n\0",
    ))
    .await;
    let client = CsqlClient::connect(&engine.config(TIMEOUT)).unwrap();

    let users = client.get_users().await.unwrap();

    assert_eq!(
        users,
        vec![
            User {
                id: 101,
                username: "Mwaura Mbugua".into(),
                email: "mwaurambugua12@gmail.com".into(),
            },
            User {
                id: 102,
                username: "bob".into(),
                email: "bob@example.com".into(),
            },
        ]
    );
    assert_eq!(engine.received(), vec!["SELECT * FROM users;"]);
}

#[tokio::test]
async fn test_malformed_rows_are_skipped() {
    let engine = FakeEngine::start(Script::reply(
        "(1, 'a')\n(2, 'b\n(3, nope)\n(4, 'd')\n\0",
    ))
    .await;
    let client = CsqlClient::connect(&engine.config(TIMEOUT)).unwrap();

    let rows = client.fetch_rows("SELECT * FROM t;").await.unwrap();

    let ids: Vec<i64> = rows.iter().filter_map(|r| r[0].as_i64()).collect();
    assert_eq!(ids, vec![1, 4]);
}

#[tokio::test]
async fn test_duplicate_key_outcome() {
    let engine = FakeEngine::start(Script::reply("Error: Duplicate key\n\0")).await;
    let client = CsqlClient::connect(&engine.config(TIMEOUT)).unwrap();

    let outcome = client
        .run("INSERT INTO users VALUES (1, 'a', 'b');")
        .await
        .unwrap();

    assert_eq!(
        outcome,
        QueryOutcome::EngineError("Error: Duplicate key".into())
    );
}

#[tokio::test]
async fn test_execute_raw_reports_unreachable_engine() {
    let port = unused_port().await;
    let client = CsqlClient::connect(&EngineConfig::new("127.0.0.1", port)).unwrap();

    let text = client.execute_raw("SELECT 1;").await;

    assert!(text.starts_with("Error: Connection error:"), "got {text:?}");
    assert!(text.ends_with('\n'));
}

#[tokio::test]
async fn test_connect_rejects_zero_timeout() {
    let config = EngineConfig::default().with_timeout(Duration::ZERO);
    assert!(matches!(
        CsqlClient::connect(&config),
        Err(CsqlError::Config(_))
    ));
}

#[tokio::test]
async fn test_seed_over_tcp() {
    let engine = FakeEngine::start(Script::reply("OK\n\0")).await;
    let client = CsqlClient::connect(&engine.config(TIMEOUT)).unwrap();

    assert!(workload::seed(&client).await.unwrap());
    assert_eq!(engine.accepted(), 5);
}
