//! Node configuration
//!
//! A TOML file with one `[mqtt]` section describing the broker session and an
//! optional `[[entities]]` array of discovery descriptors, each tagged with
//! its `component` kind.

use crate::discovery::{AnyEntity, Discovery};
use crate::protocol::TopicBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Main node configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeConfig {
    pub mqtt: MqttSection,
    #[serde(default)]
    pub entities: Vec<AnyEntity>,
}

/// Broker session parameters; immutable once the node starts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MqttSection {
    /// Broker host name or address
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Environment variable holding the password, used when `password` is unset
    pub password_env: Option<String>,
    /// Namespace for every topic this node owns
    pub node_id: String,
    /// Base client id; a per-process instance suffix is appended
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
    /// Fixed delay between reconnect attempts
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default)]
    pub use_tls: bool,
    /// Capacity of rumqttc's request channel
    #[serde(default = "default_request_capacity")]
    pub request_capacity: usize,
    /// Events buffered per subscriber before a slow one starts missing events
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    "hamqtt".to_string()
}

fn default_keep_alive_secs() -> u64 {
    60
}

fn default_reconnect_delay_ms() -> u64 {
    5000
}

fn default_request_capacity() -> usize {
    64
}

fn default_event_capacity() -> usize {
    256
}

/// rumqttc refuses shorter keep alive intervals
const MIN_KEEP_ALIVE_SECS: u64 = 5;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Invalid node ID: {0}")]
    InvalidNodeId(String),
    #[error("Duplicate entity: {component} '{unique_id}'")]
    DuplicateEntity {
        component: &'static str,
        unique_id: String,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MqttSection {
    /// Section with defaults for everything but the broker and node id
    pub fn new(server: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            port: default_port(),
            username: None,
            password: None,
            password_env: None,
            node_id: node_id.into(),
            client_id: default_client_id(),
            keep_alive_secs: default_keep_alive_secs(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            use_tls: false,
            request_capacity: default_request_capacity(),
            event_capacity: default_event_capacity(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        TopicBuilder::new(self.node_id.clone())
            .map_err(|e| ConfigError::InvalidNodeId(e.to_string()))?;

        let invalid = |msg: &str| Err(ConfigError::InvalidConfig(msg.to_string()));
        if self.server.trim().is_empty() {
            return invalid("mqtt.server must not be empty");
        }
        if self.port == 0 {
            return invalid("mqtt.port must be non-zero");
        }
        if self.client_id.trim().is_empty() {
            return invalid("mqtt.client_id must not be empty");
        }
        if self.keep_alive_secs < MIN_KEEP_ALIVE_SECS {
            return invalid("mqtt.keep_alive_secs must be at least 5");
        }
        if self.reconnect_delay_ms == 0 {
            return invalid("mqtt.reconnect_delay_ms must be non-zero");
        }
        if self.request_capacity == 0 || self.event_capacity == 0 {
            return invalid("mqtt channel capacities must be non-zero");
        }
        Ok(())
    }

    /// Username and password, reading `password_env` at call time
    ///
    /// `None` unless both halves are available.
    pub fn credentials(&self) -> Option<(String, String)> {
        let username = self.username.clone()?;
        let password = self.password.clone().or_else(|| {
            self.password_env
                .as_ref()
                .and_then(|name| std::env::var(name).ok())
        })?;
        Some((username, password))
    }
}

impl NodeConfig {
    /// Load and validate configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: NodeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mqtt.validate()?;

        let topics = TopicBuilder::new(self.mqtt.node_id.clone())
            .map_err(|e| ConfigError::InvalidNodeId(e.to_string()))?;
        let mut seen = HashSet::new();
        for entity in &self.entities {
            // Every kind publishes a config document, including those without derived topics
            topics.config_topic(entity).map_err(|e| {
                ConfigError::InvalidConfig(format!(
                    "{} '{}': {}",
                    entity.component(),
                    entity.unique_id(),
                    e
                ))
            })?;
            if !seen.insert((entity.component(), entity.unique_id())) {
                return Err(ConfigError::DuplicateEntity {
                    component: entity.component(),
                    unique_id: entity.unique_id().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Copy safe to print: the password is masked
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.mqtt.password.is_some() {
            config.mqtt.password = Some("***".to_string());
        }
        config
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        let toml_content = r#"
[mqtt]
server = "localhost"
node_id = "livingroom"

[[entities]]
component = "fan"
unique_id = "fan1"
name = "Ceiling fan"

[[entities]]
component = "sensor"
unique_id = "temp"
unit_of_measurement = "°C"
availability = []
"#;
        toml::from_str(toml_content).expect("Test config should parse")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_defaults() {
        let config = NodeConfig::from_toml(
            r#"
[mqtt]
server = "broker.local"
node_id = "garage"
"#,
        )
        .unwrap();

        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.mqtt.client_id, "hamqtt");
        assert_eq!(config.mqtt.keep_alive_secs, 60);
        assert_eq!(config.mqtt.reconnect_delay_ms, 5000);
        assert!(!config.mqtt.use_tls);
        assert!(config.entities.is_empty());
        assert_eq!(config.mqtt, MqttSection::new("broker.local", "garage"));
    }

    #[test]
    fn test_entities_tagged_by_component() {
        let config = NodeConfig::test_config();
        config.validate().unwrap();

        assert_eq!(config.entities.len(), 2);
        assert_eq!(config.entities[0].component(), "fan");
        assert_eq!(config.entities[1].unique_id(), "temp");
        assert_eq!(
            config.entities[1].base().availability,
            Some(Vec::new())
        );
    }

    #[test]
    fn test_numeric_entity_fields() {
        let config = NodeConfig::from_toml(
            r#"
[mqtt]
server = "localhost"
node_id = "n"

[[entities]]
component = "cover"
unique_id = "blind"
qos = 1
position_open = 100
position_closed = 0
"#,
        )
        .unwrap();

        match &config.entities[0] {
            AnyEntity::Cover(cover) => {
                assert_eq!(cover.qos, Some(1));
                assert_eq!(cover.position_open, Some(100));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_invalid_node_id() {
        let mut section = MqttSection::new("localhost", "living/room");
        assert!(matches!(section.validate(), Err(ConfigError::InvalidNodeId(_))));

        section.node_id = String::new();
        assert!(matches!(section.validate(), Err(ConfigError::InvalidNodeId(_))));
    }

    #[test]
    fn test_invalid_tuning_values() {
        let mut section = MqttSection::new("localhost", "n");
        section.keep_alive_secs = 1;
        assert!(matches!(section.validate(), Err(ConfigError::InvalidConfig(_))));

        let mut section = MqttSection::new("localhost", "n");
        section.event_capacity = 0;
        assert!(matches!(section.validate(), Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_duplicate_entities_rejected() {
        let result = NodeConfig::from_toml(
            r#"
[mqtt]
server = "localhost"
node_id = "n"

[[entities]]
component = "switch"
unique_id = "relay"

[[entities]]
component = "switch"
unique_id = "relay"
"#,
        );
        assert!(matches!(result, Err(ConfigError::DuplicateEntity { .. })));
    }

    #[test]
    fn test_same_unique_id_different_kinds_allowed() {
        let result = NodeConfig::from_toml(
            r#"
[mqtt]
server = "localhost"
node_id = "n"

[[entities]]
component = "switch"
unique_id = "relay"

[[entities]]
component = "binary_sensor"
unique_id = "relay"
"#,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_unique_id_must_be_a_topic_segment() {
        for unique_id in ["", "front/door", "cam+", "all#"] {
            let result = NodeConfig::from_toml(&format!(
                r#"
[mqtt]
server = "localhost"
node_id = "n"

[[entities]]
component = "camera"
unique_id = "{unique_id}"
topic = "cams/front"
"#
            ));
            assert!(
                matches!(result, Err(ConfigError::InvalidConfig(_))),
                "unique_id {unique_id:?} accepted"
            );
        }
    }

    #[test]
    fn test_device_trigger_with_separator_rejected() {
        let result = NodeConfig::from_toml(
            r#"
[mqtt]
server = "localhost"
node_id = "n"

[[entities]]
component = "device_trigger"
unique_id = "remote/1"
automation_type = "trigger"
topic = "remote/action"
type = "button_short_press"
subtype = "button_1"
"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_component_rejected() {
        let result = NodeConfig::from_toml(
            r#"
[mqtt]
server = "localhost"
node_id = "n"

[[entities]]
component = "toaster"
unique_id = "t"
"#,
        );
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_credentials() {
        let mut section = MqttSection::new("localhost", "n");
        assert_eq!(section.credentials(), None);

        section.username = Some("user".to_string());
        assert_eq!(section.credentials(), None);

        section.password_env = Some("HAMQTT_UNSET_PASSWORD_VAR".to_string());
        assert_eq!(section.credentials(), None);

        section.password = Some("secret".to_string());
        assert_eq!(
            section.credentials(),
            Some(("user".to_string(), "secret".to_string()))
        );
    }

    #[test]
    fn test_redacted_masks_password() {
        let mut config = NodeConfig::test_config();
        config.mqtt.password = Some("secret".to_string());

        let shown = config.redacted();
        assert_eq!(shown.mqtt.password.as_deref(), Some("***"));
        assert_eq!(config.mqtt.password.as_deref(), Some("secret"));
    }
}
