//! Bus transport abstraction for sensor signal monitoring
//!
//! This crate provides the pieces of D-Bus plumbing the threshold monitor
//! treats as a black box:
//!
//! - registering a match rule for the signals of interest
//! - draining received messages one at a time, or waiting for new ones
//! - issuing a `org.freedesktop.DBus.Properties.Set` call
//!
//! Received messages keep their zbus body, so consumers deserialize only
//! the arguments they need with zvariant.

pub mod error;
pub mod memory;
pub mod message;

mod zbus_transport;

pub use error::BusError;
pub use memory::MemoryTransport;
pub use message::{IncomingSignal, MessageKind, PropertyList};
pub use zbus::MatchRule;
pub use zbus_transport::{BusKind, ZbusTransport};

use async_trait::async_trait;

/// Well-known names of the standard properties interface
pub mod names {
    /// Interface carrying property get/set methods and change signals
    pub const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";
    /// Signal emitted when properties change
    pub const PROPERTIES_CHANGED: &str = "PropertiesChanged";
    /// Method setting a single property
    pub const SET: &str = "Set";
}

/// A `Properties.Set` call with a string value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetPropertyRequest {
    /// Bus name of the service owning the object
    pub destination: String,
    pub path: String,
    /// Interface the property belongs to
    pub interface: String,
    pub property: String,
    pub value: String,
}

/// Client-side bus connection as seen by the monitor loop
///
/// The loop is single-threaded, so implementations need not be `Send`.
#[async_trait(?Send)]
pub trait BusTransport {
    /// Subscribe to messages matching `rule`
    async fn add_match(&mut self, rule: MatchRule<'static>) -> Result<(), BusError>;

    /// Take one already-received message without blocking
    ///
    /// # Returns
    /// `None` when no message is pending ("no work done")
    fn process(&mut self) -> Result<Option<IncomingSignal>, BusError>;

    /// Block until the transport has new activity
    async fn wait(&mut self) -> Result<(), BusError>;

    /// Invoke `org.freedesktop.DBus.Properties.Set` and wait for the reply
    async fn set_property(&self, request: &SetPropertyRequest) -> Result<(), BusError>;
}
