use crate::events::SourceId;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error(String),
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => f.write_str("Not connected"),
            ConnectionState::Connecting => f.write_str("Connecting"),
            ConnectionState::Connected => f.write_str("Connected"),
            ConnectionState::Error(message) => write!(f, "Error: {}", message),
        }
    }
}

/// Read side of a connection's state, shared with whoever displays it.
#[derive(Debug, Clone, Default)]
pub struct ConnectionStatus(Arc<RwLock<ConnectionState>>);

impl ConnectionStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> ConnectionState {
        self.0.read().clone()
    }

    pub fn is_active(&self) -> bool {
        matches!(
            *self.0.read(),
            ConnectionState::Connecting | ConnectionState::Connected
        )
    }

    fn set(&self, state: ConnectionState) {
        *self.0.write() = state;
    }
}

/// One serial link and its state. Owned by the worker reading the link; the
/// only way to change the state is through the transition methods below.
#[derive(Debug)]
pub struct SourceConnection {
    id: SourceId,
    port_name: String,
    status: ConnectionStatus,
}

impl SourceConnection {
    pub fn new(id: SourceId, port_name: impl Into<String>) -> Self {
        Self::with_status(id, port_name, ConnectionStatus::new())
    }

    /// Reuses an existing status handle so observers keep seeing the same
    /// source across reconnects.
    pub fn with_status(id: SourceId, port_name: impl Into<String>, status: ConnectionStatus) -> Self {
        let connection = Self {
            id,
            port_name: port_name.into(),
            status,
        };
        connection.status.set(ConnectionState::Disconnected);
        connection
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn state(&self) -> ConnectionState {
        self.status.get()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status.clone()
    }

    pub fn connecting(&self) {
        debug!("{}: opening {}", self.id, self.port_name);
        self.status.set(ConnectionState::Connecting);
    }

    pub fn connected(&self) {
        info!("{}: connected to {}", self.id, self.port_name);
        self.status.set(ConnectionState::Connected);
    }

    pub fn failed(&self, message: impl Into<String>) {
        let message = message.into();
        error!("{}: {} failed: {}", self.id, self.port_name, message);
        self.status.set(ConnectionState::Error(message));
    }

    pub fn closed(&self) {
        info!("{}: disconnected from {}", self.id, self.port_name);
        self.status.set(ConnectionState::Disconnected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_are_visible_through_the_status() {
        let connection = SourceConnection::new(SourceId(0), "COM4");
        let status = connection.status();
        assert_eq!(status.get(), ConnectionState::Disconnected);

        connection.connecting();
        assert!(status.is_active());
        connection.connected();
        assert_eq!(status.get(), ConnectionState::Connected);
        connection.failed("device unplugged");
        assert_eq!(
            status.get(),
            ConnectionState::Error("device unplugged".into())
        );
        assert!(!status.is_active());
    }

    #[test]
    fn status_labels() {
        assert_eq!(ConnectionState::Disconnected.to_string(), "Not connected");
        assert_eq!(
            ConnectionState::Error("no such port".into()).to_string(),
            "Error: no such port"
        );
    }

    #[test]
    fn reused_status_starts_disconnected() {
        let status = ConnectionStatus::new();
        let first = SourceConnection::with_status(SourceId(1), "COM5", status.clone());
        first.failed("gone");
        let second = SourceConnection::with_status(SourceId(1), "COM6", status.clone());
        assert_eq!(second.state(), ConnectionState::Disconnected);
        assert_eq!(status.get(), ConnectionState::Disconnected);
    }
}
