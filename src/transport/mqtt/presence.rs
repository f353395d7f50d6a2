//! Node presence: the retained online record and its broker-side last will

use crate::discovery::Availability;
use crate::protocol::{OutgoingMessage, TopicBuilder};
use rumqttc::v5::mqttbytes::v5::LastWill;
use rumqttc::v5::mqttbytes::QoS;

pub const PAYLOAD_ONLINE: &str = "online";
pub const PAYLOAD_OFFLINE: &str = "offline";

/// Retained `online` record published after every successful connect
pub fn online_message(topics: &TopicBuilder) -> OutgoingMessage {
    OutgoingMessage::new(topics.presence_topic(), PAYLOAD_ONLINE).retained()
}

/// Retained `offline` record the broker publishes if the session vanishes
pub fn last_will(topics: &TopicBuilder) -> LastWill {
    LastWill::new(
        topics.presence_topic(),
        PAYLOAD_OFFLINE,
        QoS::AtLeastOnce,
        true,
        None,
    )
}

/// Availability entry pointing entities at this node's presence topic
pub fn default_availability(topics: &TopicBuilder) -> Availability {
    Availability {
        topic: topics.presence_topic(),
        payload_available: Some(PAYLOAD_ONLINE.to_string()),
        payload_not_available: Some(PAYLOAD_OFFLINE.to_string()),
        value_template: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_online_and_will_share_topic() {
        let topics = TopicBuilder::new("livingroom").unwrap();
        let online = online_message(&topics);
        let will = last_will(&topics);

        assert_eq!(online.topic, "livingroom/connected");
        assert_eq!(online.payload.as_ref(), b"online");
        assert!(online.retain);
        assert_eq!(will.topic.as_ref(), online.topic.as_bytes());
        assert_eq!(will.qos, QoS::AtLeastOnce);
        assert!(will.retain);
    }
}
