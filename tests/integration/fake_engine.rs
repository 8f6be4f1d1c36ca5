//! In-process stand-in for the CSQL engine.
//!
//! Listens on an ephemeral loopback port and answers every connection
//! according to a [`Script`].

use csql_client::config::EngineConfig;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// How the fake engine answers a query.
#[derive(Debug, Clone)]
pub enum Script {
    /// Write each chunk in turn, pausing `gap` between them.
    Chunks { chunks: Vec<Vec<u8>>, gap: Duration },
    /// Reply `("<query>")\n\0` after `delay`.
    Echo { delay: Duration },
    /// Read the query and never answer.
    Silent,
    /// Write the bytes and close the connection.
    CloseAfter(Vec<u8>),
}

impl Script {
    pub fn reply(text: &str) -> Self {
        Self::Chunks {
            chunks: vec![text.as_bytes().to_vec()],
            gap: Duration::ZERO,
        }
    }
}

pub struct FakeEngine {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<String>>>,
    accepted: Arc<AtomicUsize>,
    closed: mpsc::UnboundedReceiver<()>,
}

impl FakeEngine {
    pub async fn start(script: Script) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let accepted = Arc::new(AtomicUsize::new(0));
        let (closed_tx, closed) = mpsc::unbounded_channel();

        let task_received = Arc::clone(&received);
        let task_accepted = Arc::clone(&accepted);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                task_accepted.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(serve(
                    stream,
                    script.clone(),
                    Arc::clone(&task_received),
                    closed_tx.clone(),
                ));
            }
        });

        Self {
            addr,
            received,
            accepted,
            closed,
        }
    }

    /// Endpoint config pointing at this engine.
    pub fn config(&self, timeout: Duration) -> EngineConfig {
        EngineConfig::new(self.addr.ip().to_string(), self.addr.port()).with_timeout(timeout)
    }

    /// Queries received so far.
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    /// Connections accepted so far.
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Waits until some client connection has been closed by the client.
    pub async fn wait_client_close(&mut self, within: Duration) -> bool {
        matches!(
            tokio::time::timeout(within, self.closed.recv()).await,
            Ok(Some(()))
        )
    }
}

async fn serve(
    mut stream: TcpStream,
    script: Script,
    received: Arc<Mutex<Vec<String>>>,
    closed: mpsc::UnboundedSender<()>,
) {
    let mut buf = vec![0u8; 4096];
    let n = match stream.read(&mut buf).await {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let query = String::from_utf8_lossy(&buf[..n]).into_owned();
    received.lock().unwrap().push(query.clone());

    match script {
        Script::Chunks { chunks, gap } => {
            for chunk in chunks {
                if stream.write_all(&chunk).await.is_err() {
                    return;
                }
                let _ = stream.flush().await;
                tokio::time::sleep(gap).await;
            }
        }
        Script::Echo { delay } => {
            tokio::time::sleep(delay).await;
            let reply = format!("(\"{query}\")\n\0");
            if stream.write_all(reply.as_bytes()).await.is_err() {
                return;
            }
        }
        Script::Silent => {}
        Script::CloseAfter(bytes) => {
            let _ = stream.write_all(&bytes).await;
            return;
        }
    }

    // Hold the connection until the client lets go of it.
    loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => continue,
        }
    }
    let _ = closed.send(());
}

/// A loopback port with nothing listening on it.
pub async fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}
