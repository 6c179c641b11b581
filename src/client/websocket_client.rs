//! WebSocket session with a Luxtronik controller
//!
//! The protocol is strictly request/reply without message ids: the client
//! sends `LOGIN;{password}` and then one `GET;{id}` per menu entry, reading
//! exactly one reply before the next request. Every fetch opens its own
//! connection and closes it before returning, on success and on error.

use super::navigation::{collect_values, parse_content, parse_navigation, ContentNode, NavigationNode};
use super::{Snapshot, SnapshotSource};
use crate::config::{ClientConfig, ConnectionParams, SUBPROTOCOL};
use crate::error::{LuxtronikError, Result};
use crate::services::key_builder::build_key;
use crate::services::value_parsers::parse_value;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header::SEC_WEBSOCKET_PROTOCOL, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Client for one heat pump
#[derive(Debug, Clone)]
pub struct LuxWebSocketClient {
    params: ConnectionParams,
    config: ClientConfig,
}

impl LuxWebSocketClient {
    pub fn new(params: ConnectionParams, config: ClientConfig) -> Self {
        Self { params, config }
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    /// Fetch every reading the device exposes.
    ///
    /// Performs `1 + N` round trips for `N` menu entries. Any connection,
    /// timeout or protocol failure aborts the whole fetch.
    pub async fn fetch_snapshot(&self) -> Result<Snapshot> {
        let started = Instant::now();
        let mut session = self.open_session().await?;

        let result = session.collect_snapshot(&self.params.password).await;
        session.close().await;

        match &result {
            Ok(snapshot) => info!(
                host = %self.params.host,
                readings = snapshot.len(),
                collisions = snapshot.collisions(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Fetched Luxtronik snapshot"
            ),
            Err(e) => warn!(
                host = %self.params.host,
                error_type = e.error_type(),
                "Luxtronik fetch failed: {}",
                e
            ),
        }

        result
    }

    /// Log in and return the navigation tree without querying any entry
    pub async fn fetch_navigation(&self) -> Result<Vec<NavigationNode>> {
        let mut session = self.open_session().await?;
        let result = session.login(&self.params.password).await;
        session.close().await;
        result
    }

    /// Connectivity probe: a full fetch reduced to success or failure
    pub async fn test_connection(&self) -> bool {
        match self.fetch_snapshot().await {
            Ok(_) => true,
            Err(e) => {
                debug!("Connection test against {} failed: {}", self.params.host, e);
                false
            }
        }
    }

    async fn open_session(&self) -> Result<LuxSession> {
        let url = self.params.ws_url()?;
        debug!("Connecting to {} (subprotocol {})", url, SUBPROTOCOL);

        let mut request = url.as_str().into_client_request()?;
        request
            .headers_mut()
            .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(SUBPROTOCOL));

        let (stream, response) = timeout(self.config.connect_timeout, connect_async(request))
            .await
            .map_err(|_| {
                LuxtronikError::timeout(format!(
                    "Connecting to {url} took longer than {:?}",
                    self.config.connect_timeout
                ))
            })?
            .map_err(|e| LuxtronikError::connection(format!("WebSocket connection to {url} failed: {e}")))?;

        debug!("WebSocket connected, response: {:?}", response.status());

        Ok(LuxSession {
            stream,
            request_timeout: self.config.request_timeout,
        })
    }
}

#[async_trait]
impl SnapshotSource for LuxWebSocketClient {
    async fn fetch_snapshot(&self) -> Result<Snapshot> {
        LuxWebSocketClient::fetch_snapshot(self).await
    }
}

/// One open connection; lives for a single fetch
struct LuxSession {
    stream: WsStream,
    request_timeout: Duration,
}

impl LuxSession {
    async fn login(&mut self, password: &str) -> Result<Vec<NavigationNode>> {
        debug!("→ LOGIN;***");
        let reply = self.request(format!("LOGIN;{password}")).await?;
        parse_navigation(&reply)
    }

    async fn get(&mut self, id: &str) -> Result<Vec<ContentNode>> {
        debug!("→ GET;{}", id);
        let reply = self.request(format!("GET;{id}")).await?;
        parse_content(&reply)
    }

    async fn collect_snapshot(&mut self, password: &str) -> Result<Snapshot> {
        let menu = self.login(password).await?;
        debug!("Navigation lists {} menu entries", menu.len());

        let mut snapshot = Snapshot::new();
        for entry in &menu {
            let content = self.get(&entry.id).await?;

            for leaf in collect_values(&content)? {
                let key = build_key(leaf.ancestors.iter().rev(), &entry.name);
                let reading = parse_value(&leaf.raw);
                trace!("{} = {:?}", key, reading);

                if let Some(previous) = snapshot.insert(key.clone(), reading) {
                    warn!(
                        key = %key,
                        menu_entry = %entry.name,
                        "Duplicate key, replacing earlier reading {}",
                        previous
                    );
                }
            }
        }

        Ok(snapshot)
    }

    /// Send one frame and wait for its reply
    async fn request(&mut self, frame: String) -> Result<String> {
        let deadline = self.request_timeout;
        timeout(deadline, async {
            self.stream.send(Message::Text(frame)).await?;
            self.receive_text().await
        })
        .await
        .map_err(|_| LuxtronikError::timeout(format!("No reply within {deadline:?}")))?
    }

    async fn receive_text(&mut self) -> Result<String> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    trace!("← {} bytes", text.len());
                    return Ok(text);
                }
                Some(Ok(Message::Binary(data))) => {
                    return String::from_utf8(data)
                        .map_err(|e| LuxtronikError::protocol(format!("Reply is not UTF-8: {e}")));
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| format!("{} - {}", f.code, f.reason))
                        .unwrap_or_else(|| "no reason given".to_string());
                    return Err(LuxtronikError::connection(format!(
                        "WebSocket closed by server: {reason}"
                    )));
                }
                // tungstenite answers pings itself
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => return Err(LuxtronikError::connection("WebSocket stream ended")),
            }
        }
    }

    async fn close(mut self) {
        match timeout(self.request_timeout, self.stream.close(None)).await {
            Ok(Ok(())) => debug!("WebSocket closed"),
            Ok(Err(e)) => debug!("WebSocket close failed: {}", e),
            Err(_) => debug!("WebSocket close timed out"),
        }
    }
}
