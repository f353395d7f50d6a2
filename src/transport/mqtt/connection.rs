//! Session identity, connection state and option building
//!
//! Everything here is pure: turning the `[mqtt]` configuration into rumqttc
//! options with the node's last will registered.

use super::presence;
use crate::config::MqttSection;
use crate::protocol::{TopicBuilder, TopicError};
use rumqttc::v5::MqttOptions;
use rumqttc::Transport as RumqttcTransport;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Largest packet accepted or sent; discovery documents stay far below this
pub const MAX_PACKET_SIZE: u32 = 256 * 1024;

/// Connection state of the node's session
///
/// There is no separate reconnecting state: a lost session goes straight back
/// to `Connecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not started yet, or shut down
    Disconnected,
    /// Waiting for the broker to acknowledge a (re)connect
    Connecting,
    /// Session acknowledged; queued work is being flushed
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        };
        f.write_str(name)
    }
}

/// Random identifier generated once per process
///
/// Mixed into the MQTT client id so two instances sharing one configured
/// identity never kick each other off the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// `{base}-{instance}`
    pub fn client_id(&self, base: &str) -> String {
        format!("{base}-{}", self.0)
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Connection manager errors
#[derive(Debug, Error)]
pub enum MqttError {
    #[error("Connection manager has shut down")]
    ShutDown,
    #[error("Connection manager already started")]
    AlreadyStarted,
    #[error("Invalid topic: {0}")]
    InvalidTopic(#[from] TopicError),
    #[error("Invalid connection options: {0}")]
    InvalidOptions(String),
    #[error("Not connected after {timeout:?} (state: {state})")]
    Timeout {
        timeout: Duration,
        state: ConnectionState,
    },
    #[error("Disconnect failed")]
    DisconnectFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Build rumqttc options for the node's single session
///
/// The last will is registered here and never changes afterwards.
pub fn configure_mqtt_options(
    config: &MqttSection,
    instance: &InstanceId,
) -> Result<MqttOptions, MqttError> {
    config
        .validate()
        .map_err(|e| MqttError::InvalidOptions(e.to_string()))?;

    let topics = TopicBuilder::new(config.node_id.clone())?;
    let client_id = instance.client_id(&config.client_id);
    let mut options = MqttOptions::new(client_id, config.server.clone(), config.port);

    if config.use_tls {
        options.set_transport(RumqttcTransport::tls_with_default_config());
    }

    if let Some((username, password)) = config.credentials() {
        options.set_credentials(username, password);
    }

    options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
    options.set_max_packet_size(Some(MAX_PACKET_SIZE));
    options.set_last_will(presence::last_will(&topics));

    Ok(options)
}
