//! Shared test doubles: local HTTP endpoints and a slow store.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::store::{LocalStore, RemoteStore, StorePath};

/// Endpoint that accepts connections and never answers
pub async fn silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

/// Minimal HTTP/1.1 server answering GETs from a path -> body table.
/// Unknown paths get a 404.
pub async fn page_server(pages: Vec<(&'static str, String)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let pages: HashMap<&'static str, String> = pages.into_iter().collect();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let body = pages.clone();
            tokio::spawn(async move { answer(socket, &body).await });
        }
    });
    format!("http://{}", addr)
}

async fn answer(mut socket: TcpStream, pages: &HashMap<&'static str, String>) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    let request = String::from_utf8_lossy(&request);
    let path = request.split_whitespace().nth(1).unwrap_or("/");
    let (status, body) = match pages.get(path) {
        Some(body) => ("200 OK", body.as_str()),
        None => ("404 Not Found", "not found"),
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Store whose reads take `delay` and which records the peak number of
/// reads in flight at once
pub struct CountingStore {
    inner: LocalStore,
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: LocalStore, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn slow_read(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RemoteStore for CountingStore {
    async fn fetch_shallow(&self, path: &StorePath) -> BTreeSet<String> {
        self.slow_read().await;
        self.inner.fetch_shallow(path).await
    }

    async fn fetch_full(&self, path: &StorePath) -> Option<Value> {
        self.slow_read().await;
        self.inner.fetch_full(path).await
    }

    async fn put(&self, path: &StorePath, value: &Value) -> bool {
        self.inner.put(path, value).await
    }

    async fn patch(&self, path: &StorePath, value: &Value) -> bool {
        self.inner.patch(path, value).await
    }

    async fn delete(&self, path: &StorePath) -> bool {
        self.inner.delete(path).await
    }
}
