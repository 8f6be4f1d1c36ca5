//! Transport integration tests.
//!
//! Drive `TcpTransport` against the fake engine over real loopback sockets.

use super::fake_engine::{unused_port, FakeEngine, Script};
use csql_client::config::EngineConfig;
use csql_client::decode::{decode, Value};
use csql_client::error::CsqlError;
use csql_client::transport::{QueryTransport, TcpTransport};
use futures::future::join_all;
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};

const TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn test_single_chunk_reply() {
    let engine = FakeEngine::start(Script::reply("(1, \"a\")\n\0")).await;
    let transport = TcpTransport::new(engine.config(TIMEOUT));

    let text = transport.execute("SELECT * FROM t;").await.unwrap();

    assert_eq!(text, "(1, \"a\")\n");
    assert_eq!(engine.received(), vec!["SELECT * FROM t;"]);
}

#[tokio::test]
async fn test_terminator_in_separate_chunk() {
    let engine = FakeEngine::start(Script::Chunks {
        chunks: vec![b"(1,2)\n".to_vec(), b"\0".to_vec()],
        gap: Duration::from_millis(50),
    })
    .await;
    let transport = TcpTransport::new(engine.config(TIMEOUT));

    let text = transport.execute("SELECT * FROM t;").await.unwrap();

    assert_eq!(text, "(1,2)\n");
    assert_eq!(decode(&text), vec![vec![Value::Int(1), Value::Int(2)]]);
}

#[tokio::test]
async fn test_many_chunks_with_terminators_stripped() {
    let engine = FakeEngine::start(Script::Chunks {
        chunks: vec![
            b"(101,'Mwaura ".to_vec(),
            b"Mbugua','mwaurambugua12@gmail.com')".to_vec(),
            b"\n\0\0".to_vec(),
        ],
        gap: Duration::from_millis(20),
    })
    .await;
    let transport = TcpTransport::new(engine.config(TIMEOUT));

    let text = transport.execute("SELECT * FROM users;").await.unwrap();

    assert!(!text.contains('\0'));
    assert_eq!(
        decode(&text),
        vec![vec![
            Value::Int(101),
            Value::String("Mwaura Mbugua".into()),
            Value::String("mwaurambugua12@gmail.com".into()),
        ]]
    );
}

#[tokio::test]
async fn test_timeout_closes_connection() {
    let mut engine = FakeEngine::start(Script::Silent).await;
    let transport = TcpTransport::new(engine.config(Duration::from_millis(200)));

    let start = Instant::now();
    let err = transport.execute("SELECT * FROM users;").await.unwrap_err();

    assert_eq!(err, CsqlError::timeout(Duration::from_millis(200)));
    assert!(start.elapsed() < TIMEOUT);
    assert!(
        engine.wait_client_close(TIMEOUT).await,
        "client socket should be closed after a timeout"
    );
}

#[tokio::test]
async fn test_partial_reply_then_timeout() {
    let mut engine = FakeEngine::start(Script::Chunks {
        chunks: vec![b"(1, \"trunc".to_vec()],
        gap: Duration::ZERO,
    })
    .await;
    let transport = TcpTransport::new(engine.config(Duration::from_millis(200)));

    let err = transport.execute("SELECT 1;").await.unwrap_err();

    assert!(matches!(err, CsqlError::Timeout(_)));
    assert!(engine.wait_client_close(TIMEOUT).await);
}

#[tokio::test]
async fn test_refused_connection() {
    let port = unused_port().await;
    let transport = TcpTransport::new(EngineConfig::new("127.0.0.1", port).with_timeout(TIMEOUT));

    let err = transport.execute("SELECT 1;").await.unwrap_err();

    assert!(matches!(err, CsqlError::Connection(_)), "got {err:?}");
}

#[tokio::test]
async fn test_engine_closes_before_terminator() {
    let engine = FakeEngine::start(Script::CloseAfter(b"(1, 2)\n".to_vec())).await;
    let transport = TcpTransport::new(engine.config(TIMEOUT));

    let err = transport.execute("SELECT 1;").await.unwrap_err();

    assert!(matches!(err, CsqlError::Connection(_)), "got {err:?}");
}

#[tokio::test]
async fn test_engine_error_payload_is_text() {
    let engine = FakeEngine::start(Script::reply("Error: Duplicate key\n\0")).await;
    let transport = TcpTransport::new(engine.config(TIMEOUT));

    let text = transport
        .execute("INSERT INTO users VALUES (1, 'a', 'b');")
        .await
        .unwrap();

    assert!(text.contains("Error"));
    assert!(decode(&text).is_empty());
}

#[tokio::test]
async fn test_one_connection_per_query() {
    let engine = FakeEngine::start(Script::Echo {
        delay: Duration::ZERO,
    })
    .await;
    let transport = TcpTransport::new(engine.config(TIMEOUT));

    transport.execute("SELECT 1;").await.unwrap();
    transport.execute("SELECT 2;").await.unwrap();

    assert_eq!(engine.accepted(), 2);
    assert_eq!(engine.received(), vec!["SELECT 1;", "SELECT 2;"]);
}

#[tokio::test]
async fn test_concurrent_queries_are_isolated() {
    let engine = FakeEngine::start(Script::Echo {
        delay: Duration::from_millis(50),
    })
    .await;
    let transport = TcpTransport::new(engine.config(TIMEOUT));

    let queries: Vec<String> = (0..10).map(|i| format!("SELECT {i};")).collect();
    let replies = join_all(queries.iter().map(|q| transport.execute(q))).await;

    for (query, reply) in queries.iter().zip(replies) {
        let rows = decode(&reply.unwrap());
        assert_eq!(rows, vec![vec![Value::String(query.clone())]]);
    }
    assert_eq!(engine.accepted(), 10);
}

#[tokio::test]
async fn test_oversized_reply_is_transport_error() {
    let mut engine = FakeEngine::start(Script::Chunks {
        chunks: vec![vec![b'x'; 64]],
        gap: Duration::ZERO,
    })
    .await;
    let transport = TcpTransport::new(engine.config(TIMEOUT).with_max_response_bytes(16));

    let err = transport.execute("SELECT * FROM t;").await.unwrap_err();

    assert!(matches!(err, CsqlError::Transport(_)), "got {err:?}");
    assert!(engine.wait_client_close(TIMEOUT).await);
}
