//! Received messages as seen by the monitor

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use zbus::message::Body;
use zbus::zvariant::{DynamicType, Endian, Signature, Type, Value};
use zbus::Message;

use crate::error::BusError;
use crate::names;

/// Message type tag from the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    MethodCall,
    MethodReturn,
    Error,
    Signal,
}

impl From<zbus::message::Type> for MessageKind {
    fn from(t: zbus::message::Type) -> Self {
        match t {
            zbus::message::Type::MethodCall => Self::MethodCall,
            zbus::message::Type::MethodReturn => Self::MethodReturn,
            zbus::message::Type::Error => Self::Error,
            zbus::message::Type::Signal => Self::Signal,
        }
    }
}

/// An `a{sv}` that keeps entries in insertion order, repeats included.
///
/// Used to emit `PropertiesChanged` bodies exactly as a sender would
/// marshal them.
#[derive(Debug, Clone, Default)]
pub struct PropertyList<'a>(Vec<(&'a str, Value<'a>)>);

impl<'a> PropertyList<'a> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with(mut self, name: &'a str, value: impl Into<Value<'a>>) -> Self {
        self.0.push((name, value.into()));
        self
    }
}

impl<'a> From<Vec<(&'a str, Value<'a>)>> for PropertyList<'a> {
    fn from(entries: Vec<(&'a str, Value<'a>)>) -> Self {
        Self(entries)
    }
}

impl Type for PropertyList<'_> {
    const SIGNATURE: &'static Signature =
        <HashMap<&'static str, Value<'static>> as Type>::SIGNATURE;
}

impl Serialize for PropertyList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One message taken off the bus, consumed within a single handling pass
#[derive(Debug, Clone)]
pub struct IncomingSignal {
    pub kind: MessageKind,
    pub interface: Option<String>,
    pub member: Option<String>,
    /// Object path the message was emitted from
    pub path: Option<String>,
    message: Message,
}

impl From<Message> for IncomingSignal {
    fn from(message: Message) -> Self {
        let header = message.header();
        Self {
            kind: message.message_type().into(),
            interface: header.interface().map(|i| i.to_string()),
            member: header.member().map(|m| m.to_string()),
            path: header.path().map(|p| p.to_string()),
            message,
        }
    }
}

impl IncomingSignal {
    /// Marshal a signal message without a connection
    pub fn signal<B>(
        path: &str,
        interface: &str,
        member: &str,
        endian: Endian,
        body: &B,
    ) -> Result<Self, BusError>
    where
        B: Serialize + DynamicType,
    {
        let message = Message::signal(path, interface, member)?
            .endian(endian)
            .build(body)?;
        Ok(message.into())
    }

    /// A `PropertiesChanged(interface, changed, [])` signal from `path`
    pub fn properties_changed(
        path: &str,
        interface: &str,
        changed: PropertyList<'_>,
        endian: Endian,
    ) -> Result<Self, BusError> {
        Self::signal(
            path,
            names::PROPERTIES_INTERFACE,
            names::PROPERTIES_CHANGED,
            endian,
            &(interface, changed, Vec::<&str>::new()),
        )
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn body(&self) -> Body {
        self.message.body()
    }

    /// Body signature as a bare list of argument types (e.g. `sa{sv}as`)
    pub fn signature(&self) -> String {
        let rendered = self.message.body().signature().to_string();
        rendered
            .strip_prefix('(')
            .and_then(|inner| inner.strip_suffix(')'))
            .unwrap_or(&rendered)
            .to_string()
    }

    /// True if this is a signal with exactly this interface and member.
    pub fn is_signal(&self, interface: &str, member: &str) -> bool {
        self.kind == MessageKind::Signal
            && self.interface.as_deref() == Some(interface)
            && self.member.as_deref() == Some(member)
    }
}
