//! `BusTransport` over a zbus connection

use std::collections::VecDeque;
use std::fmt;

use async_trait::async_trait;
use futures::{FutureExt, StreamExt};
use tracing::{debug, info};
use zbus::zvariant::Value;
use zbus::{Connection, MatchRule, Message, MessageStream};

use crate::error::BusError;
use crate::message::IncomingSignal;
use crate::{names, BusTransport, SetPropertyRequest};

/// Which bus to connect to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusKind {
    #[default]
    System,
    Session,
}

impl fmt::Display for BusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::System => "system",
            Self::Session => "session",
        })
    }
}

/// Transport backed by one zbus connection and one match-rule stream
pub struct ZbusTransport {
    conn: Connection,
    stream: Option<MessageStream>,
    /// Messages received by `wait()` that `process()` has not handed out yet
    pending: VecDeque<Message>,
}

impl ZbusTransport {
    /// Open a connection to the given bus
    pub async fn connect(bus: BusKind) -> Result<Self, BusError> {
        let conn = match bus {
            BusKind::System => Connection::system().await?,
            BusKind::Session => Connection::session().await?,
        };
        info!(
            "Connected to {bus} bus as {}",
            conn.unique_name()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "<anonymous>".into())
        );
        Ok(Self::from_connection(conn))
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            stream: None,
            pending: VecDeque::new(),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[async_trait(?Send)]
impl BusTransport for ZbusTransport {
    async fn add_match(&mut self, rule: MatchRule<'static>) -> Result<(), BusError> {
        let expr = rule.to_string();
        let stream = MessageStream::for_match_rule(rule, &self.conn, None).await?;
        debug!("Match rule registered: {expr}");
        self.stream = Some(stream);
        Ok(())
    }

    fn process(&mut self) -> Result<Option<IncomingSignal>, BusError> {
        if let Some(msg) = self.pending.pop_front() {
            return Ok(Some(msg.into()));
        }
        let stream = self.stream.as_mut().ok_or(BusError::NotSubscribed)?;
        match stream.next().now_or_never() {
            None => Ok(None),
            Some(None) => Err(BusError::Disconnected),
            Some(Some(Err(e))) => Err(e.into()),
            Some(Some(Ok(msg))) => Ok(Some(msg.into())),
        }
    }

    async fn wait(&mut self) -> Result<(), BusError> {
        if !self.pending.is_empty() {
            return Ok(());
        }
        let stream = self.stream.as_mut().ok_or(BusError::NotSubscribed)?;
        match stream.next().await {
            Some(Ok(msg)) => {
                self.pending.push_back(msg);
                Ok(())
            }
            Some(Err(e)) => Err(e.into()),
            None => Err(BusError::Disconnected),
        }
    }

    async fn set_property(&self, request: &SetPropertyRequest) -> Result<(), BusError> {
        self.conn
            .call_method(
                Some(request.destination.as_str()),
                request.path.as_str(),
                Some(names::PROPERTIES_INTERFACE),
                names::SET,
                &(
                    request.interface.as_str(),
                    request.property.as_str(),
                    Value::from(request.value.as_str()),
                ),
            )
            .await?;
        Ok(())
    }
}
