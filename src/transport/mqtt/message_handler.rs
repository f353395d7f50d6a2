//! Pure routing of rumqttc events

use crate::protocol::InboundMessage;
use chrono::Utc;
use rumqttc::v5::mqttbytes::v5::{Packet, Publish};
use rumqttc::v5::Event;

pub struct MessageHandler;

impl MessageHandler {
    /// Decide what the supervisor does with a polled event
    pub fn route_mqtt_event(event: &Event) -> EventRoute {
        match event {
            Event::Incoming(incoming) => match incoming {
                Packet::ConnAck(_) => EventRoute::ConnectionAcknowledged,
                Packet::Publish(publish) => {
                    EventRoute::MessageReceived(Self::inbound_message(publish))
                }
                Packet::Disconnect(disconnect) => EventRoute::DisconnectRequested {
                    reason: format!("{:?}", disconnect.reason_code),
                },
                Packet::SubAck(suback) => EventRoute::SubscriptionConfirmed {
                    packet_id: suback.pkid,
                    filters: suback.return_codes.len(),
                },
                other => EventRoute::InfrastructureEvent(format!("{other:?}")),
            },
            Event::Outgoing(_) => EventRoute::OutgoingEvent,
        }
    }

    /// Copy a publish packet into the message handed to subscribers
    ///
    /// The payload is passed through as raw bytes.
    pub fn inbound_message(publish: &Publish) -> InboundMessage {
        InboundMessage {
            topic: String::from_utf8_lossy(&publish.topic).into_owned(),
            payload: publish.payload.clone(),
            qos: publish.qos,
            retain: publish.retain,
            received_at: Utc::now(),
        }
    }
}

/// Routing decisions for polled events
#[derive(Debug, Clone)]
pub enum EventRoute {
    /// Broker accepted the (re)connect
    ConnectionAcknowledged,
    /// Message on a subscribed topic
    MessageReceived(InboundMessage),
    /// Broker announced it is closing the session
    DisconnectRequested { reason: String },
    SubscriptionConfirmed { packet_id: u16, filters: usize },
    /// PingResp, PubAck and friends
    InfrastructureEvent(String),
    /// Outgoing event (handled by rumqttc)
    OutgoingEvent,
}
