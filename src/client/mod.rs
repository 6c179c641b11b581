//! Lux_WS protocol client
//!
//! [`LuxWebSocketClient`] performs one self-contained fetch per call: connect,
//! log in, query every menu entry, close. The result is a [`Snapshot`]
//! mapping stable keys to decoded readings.

pub mod navigation;
pub mod websocket_client;

use crate::config::{ClientConfig, ConnectionParams};
use crate::error::Result;
use crate::services::value_parsers::Reading;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

pub use navigation::{ContentNode, NavigationNode, ValueLeaf};
pub use websocket_client::LuxWebSocketClient;

/// All readings produced by one fetch
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    readings: HashMap<String, Reading>,
    fetched_at: DateTime<Utc>,
    collisions: usize,
}

impl Snapshot {
    pub fn new() -> Self {
        Self {
            readings: HashMap::new(),
            fetched_at: Utc::now(),
            collisions: 0,
        }
    }

    /// Insert a reading; an existing reading under the same key is replaced,
    /// counted as a collision and returned.
    pub fn insert(&mut self, key: String, reading: Reading) -> Option<Reading> {
        let previous = self.readings.insert(key, reading);
        if previous.is_some() {
            self.collisions += 1;
        }
        previous
    }

    pub fn get(&self, key: &str) -> Option<&Reading> {
        self.readings.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.readings.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Reading)> {
        self.readings.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.readings.keys()
    }

    /// When the fetch that produced this snapshot started
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Number of keys written more than once during the fetch
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn into_readings(self) -> HashMap<String, Reading> {
        self.readings
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = (&'a String, &'a Reading);
    type IntoIter = std::collections::hash_map::Iter<'a, String, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.iter()
    }
}

/// Anything that can produce a fresh snapshot
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Perform one full fetch
    async fn fetch_snapshot(&self) -> Result<Snapshot>;
}

/// Check that a heat pump is reachable with the given parameters.
///
/// Runs a full fetch and returns the title a host would give the device.
pub async fn validate_connection(params: ConnectionParams, config: ClientConfig) -> Result<String> {
    params.validate()?;
    let title = format!("Luxtronik device at {}", params.host);

    LuxWebSocketClient::new(params, config).fetch_snapshot().await?;
    Ok(title)
}
