//! Common test utilities
//!
//! An in-process Lux_WS server that answers `LOGIN;` with a navigation
//! document and `GET;{id}` with the content page registered for `id`.

#![allow(dead_code)]

pub mod fixtures;

use futures_util::{SinkExt, StreamExt};
use luxtronik_ws::{ClientConfig, ConnectionParams, LuxWebSocketClient};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;

/// How the mock server answers
#[derive(Debug, Clone, Default)]
pub struct MockBehavior {
    /// Reply to `LOGIN;...`
    pub navigation: String,
    /// Reply to `GET;{id}`, keyed by id
    pub pages: HashMap<String, String>,
    /// Accept the connection but never reply
    pub silent: bool,
}

impl MockBehavior {
    pub fn new(navigation: impl Into<String>) -> Self {
        Self {
            navigation: navigation.into(),
            ..Default::default()
        }
    }

    pub fn page(mut self, id: &str, content: impl Into<String>) -> Self {
        self.pages.insert(id.to_string(), content.into());
        self
    }

    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }
}

/// Mock heat pump listening on an ephemeral local port
pub struct MockLuxServer {
    pub addr: SocketAddr,
    frames: Arc<Mutex<Vec<String>>>,
    connections: Arc<AtomicUsize>,
    close_frames: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl MockLuxServer {
    pub async fn start(behavior: MockBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let frames = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));
        let close_frames = Arc::new(AtomicUsize::new(0));
        let behavior = Arc::new(behavior);

        let handle = {
            let frames = frames.clone();
            let connections = connections.clone();
            let close_frames = close_frames.clone();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    connections.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(serve(
                        stream,
                        behavior.clone(),
                        frames.clone(),
                        close_frames.clone(),
                    ));
                }
            })
        };

        Self {
            addr,
            frames,
            connections,
            close_frames,
            handle,
        }
    }

    pub fn params(&self, password: &str) -> ConnectionParams {
        ConnectionParams::new("127.0.0.1", self.addr.port().to_string(), password)
    }

    pub fn client(&self) -> LuxWebSocketClient {
        LuxWebSocketClient::new(self.params("999999"), fast_client_config())
    }

    /// Text frames received so far, in order
    pub fn frames(&self) -> Vec<String> {
        self.frames.lock().unwrap().clone()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Close frames received from clients so far
    pub fn close_count(&self) -> usize {
        self.close_frames.load(Ordering::SeqCst)
    }

    /// Wait up to a second for `expected` close frames
    pub async fn wait_for_closes(&self, expected: usize) -> usize {
        for _ in 0..100 {
            if self.close_count() >= expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.close_count()
    }
}

impl Drop for MockLuxServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Short timeouts so failure tests finish quickly
pub fn fast_client_config() -> ClientConfig {
    ClientConfig {
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_millis(300),
    }
}

async fn serve(
    stream: TcpStream,
    behavior: Arc<MockBehavior>,
    frames: Arc<Mutex<Vec<String>>>,
    close_frames: Arc<AtomicUsize>,
) {
    let accept_subprotocol =
        |_request: &Request, mut response: Response| -> Result<Response, ErrorResponse> {
            response
                .headers_mut()
                .insert("Sec-WebSocket-Protocol", HeaderValue::from_static("Lux_WS"));
            Ok(response)
        };

    let Ok(mut ws) = tokio_tungstenite::accept_hdr_async(stream, accept_subprotocol).await else {
        return;
    };

    while let Some(Ok(message)) = ws.next().await {
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => {
                close_frames.fetch_add(1, Ordering::SeqCst);
                // tungstenite completes the close handshake on the next read
                continue;
            }
            _ => continue,
        };
        frames.lock().unwrap().push(text.clone());

        if behavior.silent {
            continue;
        }

        let reply = if text.starts_with("LOGIN;") {
            behavior.navigation.clone()
        } else if let Some(id) = text.strip_prefix("GET;") {
            behavior
                .pages
                .get(id)
                .cloned()
                .unwrap_or_else(|| "<Error>unknown id</Error>".to_string())
        } else {
            continue;
        };

        if ws.send(Message::Text(reply)).await.is_err() {
            break;
        }
    }
}

/// A local address with nothing listening on it
pub async fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
