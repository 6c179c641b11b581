//! Error types for the Luxtronik WebSocket client
//!
//! Connection and protocol failures abort a whole snapshot fetch; value
//! decoding never fails and therefore has no variant here.

use thiserror::Error;

/// Result type alias for Luxtronik operations
pub type Result<T> = std::result::Result<T, LuxtronikError>;

/// Error types for Luxtronik operations
#[derive(Error, Debug)]
pub enum LuxtronikError {
    /// Socket, handshake or closed-by-peer failures
    #[error("Connection error: {0}")]
    Connection(String),

    /// A connect, send or receive deadline elapsed
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Unexpected XML shape, wrong root tag, missing tag or attribute
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A coordinator refresh failed
    #[error("Update failed: {0}")]
    UpdateFailed(String),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LuxtronikError {
    /// Create a connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a protocol error
    pub fn protocol<S: Into<String>>(msg: S) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create an update failure
    pub fn update_failed<S: Into<String>>(msg: S) -> Self {
        Self::UpdateFailed(msg.into())
    }

    /// Stable machine-readable name of the error kind
    pub fn error_type(&self) -> &'static str {
        match self {
            LuxtronikError::Connection(_) => "connection_error",
            LuxtronikError::Timeout(_) => "timeout_error",
            LuxtronikError::Protocol(_) => "protocol_error",
            LuxtronikError::Config(_) => "config_error",
            LuxtronikError::UpdateFailed(_) => "update_failed",
            LuxtronikError::Io(_) => "io_error",
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LuxtronikError::Connection(_)
                | LuxtronikError::Timeout(_)
                | LuxtronikError::UpdateFailed(_)
                | LuxtronikError::Io(_)
        )
    }

    /// True for failures that mean "the device could not be reached"
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            LuxtronikError::Connection(_) | LuxtronikError::Timeout(_) | LuxtronikError::Io(_)
        )
    }

    /// Message safe to hand to status subscribers; release builds drop
    /// hostnames and device replies
    pub fn sanitized_message(&self) -> String {
        #[cfg(debug_assertions)]
        {
            self.to_string()
        }
        #[cfg(not(debug_assertions))]
        {
            match self {
                LuxtronikError::Connection(_) => "Cannot connect to heat pump".to_string(),
                LuxtronikError::Timeout(_) => "Heat pump did not answer in time".to_string(),
                LuxtronikError::Protocol(_) => "Unexpected reply from heat pump".to_string(),
                LuxtronikError::Config(_) => "Configuration error".to_string(),
                LuxtronikError::UpdateFailed(_) => "Update failed".to_string(),
                LuxtronikError::Io(_) => "I/O operation failed".to_string(),
            }
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for LuxtronikError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        LuxtronikError::Connection(format!("WebSocket error: {err}"))
    }
}

impl From<quick_xml::Error> for LuxtronikError {
    fn from(err: quick_xml::Error) -> Self {
        LuxtronikError::Protocol(format!("Malformed XML: {err}"))
    }
}
