//! Configuration loading and validation tests
//!
//! Exercises the file-based entry point: parse, validate, and report errors
//! with the right variant.

use hamqtt::config::{ConfigError, NodeConfig};
use hamqtt::{AnyEntity, Discovery};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{content}").unwrap();
    temp_file
}

#[test]
fn test_config_loads_successfully_from_valid_toml() {
    let temp_file = write_config(
        r#"
[mqtt]
server = "broker.local"
port = 8883
use_tls = true
username = "node"
password = "secret"
node_id = "livingroom"
keep_alive_secs = 30
reconnect_delay_ms = 250

[[entities]]
component = "fan"
unique_id = "fan1"
name = "Ceiling fan"
availability = []

[[entities]]
component = "button"
unique_id = "reboot"
"#,
    );

    let config = NodeConfig::load_from_file(temp_file.path()).unwrap();

    assert_eq!(config.mqtt.server, "broker.local");
    assert_eq!(config.mqtt.port, 8883);
    assert!(config.mqtt.use_tls);
    assert_eq!(config.mqtt.node_id, "livingroom");
    assert_eq!(config.mqtt.keep_alive_secs, 30);
    assert_eq!(config.mqtt.reconnect_delay_ms, 250);
    assert_eq!(
        config.mqtt.credentials(),
        Some(("node".to_string(), "secret".to_string()))
    );

    assert_eq!(config.entities.len(), 2);
    assert!(matches!(config.entities[0], AnyEntity::Fan(_)));
    assert_eq!(config.entities[0].base().name.as_deref(), Some("Ceiling fan"));
    assert_eq!(config.entities[0].base().availability, Some(Vec::new()));
    assert_eq!(config.entities[1].component(), "button");
    assert_eq!(config.entities[1].base().availability, None);
}

#[test]
fn test_missing_file_is_read_error() {
    let result = NodeConfig::load_from_file(std::path::Path::new("/nonexistent/hamqtt.toml"));
    assert!(matches!(result, Err(ConfigError::FileRead(_))));
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let temp_file = write_config("[mqtt\nserver = ");
    let result = NodeConfig::load_from_file(temp_file.path());
    assert!(matches!(result, Err(ConfigError::TomlParse(_))));
}

#[test]
fn test_missing_required_field_is_parse_error() {
    let temp_file = write_config(
        r#"
[mqtt]
server = "localhost"
"#,
    );
    let result = NodeConfig::load_from_file(temp_file.path());
    assert!(matches!(result, Err(ConfigError::TomlParse(_))));
}

#[test]
fn test_node_id_with_separator_rejected() {
    let temp_file = write_config(
        r#"
[mqtt]
server = "localhost"
node_id = "living/room"
"#,
    );
    let result = NodeConfig::load_from_file(temp_file.path());
    assert!(matches!(result, Err(ConfigError::InvalidNodeId(_))));
}

#[test]
fn test_wildcard_node_id_rejected() {
    let temp_file = write_config(
        r#"
[mqtt]
server = "localhost"
node_id = "node+"
"#,
    );
    let result = NodeConfig::load_from_file(temp_file.path());
    assert!(matches!(result, Err(ConfigError::InvalidNodeId(_))));
}

#[test]
fn test_zero_reconnect_delay_rejected() {
    let temp_file = write_config(
        r#"
[mqtt]
server = "localhost"
node_id = "n"
reconnect_delay_ms = 0
"#,
    );
    let result = NodeConfig::load_from_file(temp_file.path());
    assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
}

#[test]
fn test_password_env_resolved_at_call_time() {
    let temp_file = write_config(
        r#"
[mqtt]
server = "localhost"
node_id = "n"
username = "node"
password_env = "HAMQTT_TEST_CONFIG_PASSWORD"
"#,
    );
    let config = NodeConfig::load_from_file(temp_file.path()).unwrap();

    std::env::set_var("HAMQTT_TEST_CONFIG_PASSWORD", "from-env");
    assert_eq!(
        config.mqtt.credentials(),
        Some(("node".to_string(), "from-env".to_string()))
    );
    std::env::remove_var("HAMQTT_TEST_CONFIG_PASSWORD");
}

#[test]
fn test_redacted_config_round_trips_through_toml() {
    let temp_file = write_config(
        r#"
[mqtt]
server = "localhost"
node_id = "n"
username = "node"
password = "secret"

[[entities]]
component = "sensor"
unique_id = "temp"
unit_of_measurement = "°C"
"#,
    );
    let config = NodeConfig::load_from_file(temp_file.path()).unwrap();

    let rendered = toml::to_string_pretty(&config.redacted()).unwrap();
    assert!(!rendered.contains("secret"));

    let reparsed = NodeConfig::from_toml(&rendered).unwrap();
    assert_eq!(reparsed.entities, config.entities);
    assert_eq!(reparsed.mqtt.password.as_deref(), Some("***"));
}
