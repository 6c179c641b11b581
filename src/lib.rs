//! Client for Luxtronik heat-pump controllers speaking the `Lux_WS` protocol
//!
//! The controller exposes its menu tree over a WebSocket. This crate logs in,
//! walks every menu entry and turns each displayed value into a typed,
//! unit-tagged [`Reading`] under a stable hierarchical key.
//!
//! # Features
//!
//! - Schema-free discovery of all readings
//! - Unit-aware value decoding (temperatures, durations, clock times, ...)
//! - Single-flight polling cache with a fixed refresh interval
//! - Sensor metadata (class, native unit, conversion) per reading
//!
//! ```no_run
//! use luxtronik_ws::{ClientConfig, ConnectionParams, LuxWebSocketClient};
//!
//! # async fn demo() -> luxtronik_ws::Result<()> {
//! let client = LuxWebSocketClient::new(
//!     ConnectionParams::new("192.168.1.20", "8214", "999999"),
//!     ClientConfig::default(),
//! );
//! let snapshot = client.fetch_snapshot().await?;
//! if let Some(reading) = snapshot.get("Temperaturen_Vorlauf") {
//!     println!("flow temperature: {reading}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod services;

// Re-export main types for convenience
pub use client::{validate_connection, LuxWebSocketClient, Snapshot, SnapshotSource};
pub use config::{ClientConfig, ConnectionParams, LuxtronikConfig, PollingConfig};
pub use coordinator::{CoordinatorStats, SnapshotCoordinator, UpdateStatus};
pub use error::{LuxtronikError, Result};
pub use services::{parse_value, Reading, ReadingValue, SensorDescriptor, Unit};
