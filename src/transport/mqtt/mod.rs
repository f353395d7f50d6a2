//! MQTT connection manager built on rumqttc (MQTT v5)
//!
//! # Architecture
//!
//! - [`connection`] - session identity, state and option building (pure)
//! - [`state`] - session state transitions (pure)
//! - [`presence`] - online record and last will
//! - [`outbound`] - store-and-forward request queue
//! - [`message_handler`] - routing of polled events (pure)
//! - [`client`] - the supervisor task and the handles callers use
//!
//! # Usage
//!
//! ```rust,no_run
//! use hamqtt::config::MqttSection;
//! use hamqtt::protocol::OutgoingMessage;
//! use hamqtt::transport::mqtt::{InstanceId, MqttConnection};
//! use hamqtt::transport::Transport;
//!
//! # tokio_test::block_on(async {
//! let config = MqttSection::new("localhost", "livingroom");
//! let mut connection = MqttConnection::new(&config, &InstanceId::new())?;
//! connection.start()?;
//!
//! // Accepted immediately, delivered once the broker acknowledges the session
//! let handle = connection.handle();
//! handle
//!     .publish(vec![OutgoingMessage::new("livingroom/uptime", "42")])
//!     .await?;
//!
//! connection.shutdown().await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```

pub mod client;
pub mod connection;
pub mod message_handler;
pub mod outbound;
pub mod presence;
pub mod state;

pub use client::{ConnectionEvent, ConnectionHandle, MqttConnection};
pub use connection::{configure_mqtt_options, ConnectionState, InstanceId, MqttError};
pub use message_handler::{EventRoute, MessageHandler};
pub use outbound::{Command, OutboundQueue, SubscriptionSet};
pub use state::{SessionEvent, SessionStateMachine};
