//! hamqtt - Home Assistant MQTT discovery node
//!
//! Announces a node and its entities to Home Assistant over MQTT using the
//! discovery convention, and keeps a single broker session alive with
//! broker-enforced availability.
//!
//! # Overview
//!
//! - [`protocol`] - topic layout and message types
//! - [`discovery`] - entity descriptors, capability traits and publication
//! - [`transport`] - the connection manager (rumqttc) behind a [`Transport`] trait
//! - [`config`] - TOML node configuration
//! - [`observability`] - tracing setup
//!
//! # Quick Start
//!
//! ```rust
//! use hamqtt::discovery::entities::Sensor;
//! use hamqtt::discovery::{
//!     add_default_availability_topic, populate_state_topic, publish_discovery_document,
//!     publish_state,
//! };
//! use hamqtt::testing::MockTransport;
//! use hamqtt::transport::Transport;
//!
//! # tokio_test::block_on(async {
//! let transport = MockTransport::new("livingroom")?;
//!
//! let mut sensor = Sensor::new("temperature");
//! sensor.unit_of_measurement = Some("°C".to_string());
//! sensor.base.availability = Some(Vec::new());
//! populate_state_topic(&mut sensor, transport.topics())?;
//! add_default_availability_topic(&mut sensor, transport.topics())?;
//!
//! publish_discovery_document(&transport, &sensor).await?;
//! publish_state(&transport, &sensor, "21.5", true).await?;
//!
//! let published = transport.published().await;
//! assert_eq!(published[0].topic, "homeassistant/sensor/livingroom/temperature/config");
//! assert_eq!(published[1].topic, "homeassistant/sensor/livingroom/temperature/state");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod observability;
pub mod protocol;
pub mod testing;
pub mod transport;

pub use config::{ConfigError, MqttSection, NodeConfig};
pub use discovery::{AnyEntity, Discovery, DiscoveryError};
pub use error::{NodeError, NodeResult};
pub use protocol::*;
pub use transport::mqtt::{ConnectionEvent, ConnectionHandle, InstanceId, MqttConnection};
pub use transport::{ConnectionState, Transport};
