//! Crate-level error type
//!
//! Each layer has its own error enum; `NodeError` collects them for the
//! binaries and for callers that drive a whole node.

use crate::config::ConfigError;
use crate::discovery::DiscoveryError;
use crate::protocol::TopicError;
use crate::transport::mqtt::MqttError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("MQTT error: {0}")]
    Mqtt(#[from] MqttError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Topic error: {0}")]
    Topic(#[from] TopicError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl NodeError {
    pub fn internal_error<S: Into<String>>(message: S) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Caused by the node's own configuration rather than the environment
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            NodeError::Config(_)
                | NodeError::Topic(_)
                | NodeError::Mqtt(MqttError::InvalidOptions(_))
                | NodeError::Discovery(DiscoveryError::MissingTopic { .. })
        )
    }
}

/// Result type for node operations
pub type NodeResult<T> = Result<T, NodeError>;
