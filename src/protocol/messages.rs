//! Message types exchanged with the broker
//!
//! Payloads are raw bytes. The core never interprets inbound payloads; it
//! only carries topic, payload and delivery flags.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use rumqttc::v5::mqttbytes::QoS;
use std::borrow::Cow;

/// A message queued for publication
///
/// # Examples
/// ```
/// use hamqtt::protocol::OutgoingMessage;
///
/// let message = OutgoingMessage::new("livingroom/connected", "online").retained();
/// assert!(message.retain);
/// assert_eq!(message.payload.as_ref(), b"online");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub topic: String,
    pub payload: Bytes,
    pub qos: QoS,
    pub retain: bool,
}

impl OutgoingMessage {
    /// Non-retained message delivered at least once
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            qos: QoS::AtLeastOnce,
            retain: false,
        }
    }

    /// Ask the broker to keep this message as the topic's last known value
    pub fn retained(mut self) -> Self {
        self.retain = true;
        self
    }

    pub fn with_qos(mut self, qos: QoS) -> Self {
        self.qos = qos;
        self
    }
}

/// A subscription request
#[derive(Debug, Clone, PartialEq)]
pub struct TopicFilter {
    pub filter: String,
    pub qos: QoS,
}

impl TopicFilter {
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            qos: QoS::AtLeastOnce,
        }
    }

    pub fn with_qos(mut self, qos: QoS) -> Self {
        self.qos = qos;
        self
    }
}

/// A message delivered by the broker on a subscribed topic
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Bytes,
    pub qos: QoS,
    pub retain: bool,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    /// Payload decoded as UTF-8, replacing invalid sequences
    pub fn payload_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}
