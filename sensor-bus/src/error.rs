//! Bus error types

use thiserror::Error;

/// Errors from the bus transport
#[derive(Error, Debug)]
pub enum BusError {
    /// Underlying D-Bus connection, call or message-building failure
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    /// The incoming message stream ended
    #[error("Bus connection closed")]
    Disconnected,

    /// `process`/`wait` called before any match rule was registered
    #[error("No match rule registered")]
    NotSubscribed,

    /// Remote method returned an error reply
    #[error("Remote call failed: {0}")]
    CallFailed(String),
}
