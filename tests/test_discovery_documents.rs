//! Discovery document behaviour through the public API
//!
//! Covers topic derivation, the minimal document shape, idempotent
//! republication and the availability opt-in guard.

use hamqtt::discovery::entities::{Button, Fan, Select, Sensor, Switch};
use hamqtt::discovery::{
    add_default_availability_topic, populate_command_topic, populate_state_topic,
    publish_discovery_document, publish_state, remove_discovery_document, Availability,
    CommandTopicGetter, DiscoveryError, StateTopicGetter,
};
use hamqtt::testing::MockTransport;
use hamqtt::transport::Transport;
use hamqtt::{AnyEntity, Discovery, TopicBuilder};
use serde_json::Value;

fn parse(payload: &[u8]) -> serde_json::Map<String, Value> {
    match serde_json::from_slice::<Value>(payload).unwrap() {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[test]
fn test_fan_command_topic_layout() {
    let topics = TopicBuilder::new("livingroom").unwrap();
    let mut fan = Fan::new("fan1");

    populate_command_topic(&mut fan, &topics).unwrap();

    assert_eq!(
        fan.command_topic(),
        Some("homeassistant/fan/livingroom/fan1/set")
    );
}

#[test]
fn test_state_and_command_topics_distinct() {
    let topics = TopicBuilder::new("garage").unwrap();
    let mut relay = Switch::new("relay");

    populate_state_topic(&mut relay, &topics).unwrap();
    populate_command_topic(&mut relay, &topics).unwrap();

    assert_eq!(
        relay.state_topic(),
        Some("homeassistant/switch/garage/relay/state")
    );
    assert_ne!(relay.state_topic(), relay.command_topic());
}

#[tokio::test]
async fn test_minimal_document_carries_only_unique_id() {
    // Arrange: a button with only its command topic populated
    let transport = MockTransport::new("livingroom").unwrap();
    let mut button = Button::new("reboot");
    populate_command_topic(&mut button, transport.topics()).unwrap();

    // Act
    publish_discovery_document(&transport, &button).await.unwrap();

    // Assert: unique_id plus the populated topic, nothing else
    let published = transport.published().await;
    assert_eq!(published.len(), 1);
    assert_eq!(
        published[0].topic,
        "homeassistant/button/livingroom/reboot/config"
    );
    assert!(published[0].retain);

    let doc = parse(&published[0].payload);
    assert_eq!(doc.len(), 2);
    assert_eq!(doc["unique_id"], "reboot");
    assert_eq!(
        doc["command_topic"],
        "homeassistant/button/livingroom/reboot/set"
    );
}

#[tokio::test]
async fn test_setting_one_option_adds_one_key() {
    let transport = MockTransport::new("livingroom").unwrap();
    let mut sensor = Sensor::new("temp");
    populate_state_topic(&mut sensor, transport.topics()).unwrap();

    publish_discovery_document(&transport, &sensor).await.unwrap();
    sensor.unit_of_measurement = Some("°C".to_string());
    publish_discovery_document(&transport, &sensor).await.unwrap();

    let published = transport.published().await;
    let before = parse(&published[0].payload);
    let after = parse(&published[1].payload);
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(after["unit_of_measurement"], "°C");
}

#[tokio::test]
async fn test_republication_is_identical() {
    let transport = MockTransport::new("livingroom").unwrap();
    let mut fan = Fan::new("fan1");
    fan.base.name = Some("Ceiling fan".to_string());
    populate_state_topic(&mut fan, transport.topics()).unwrap();
    populate_command_topic(&mut fan, transport.topics()).unwrap();

    publish_discovery_document(&transport, &fan).await.unwrap();
    publish_discovery_document(&transport, &fan).await.unwrap();

    let published = transport.published().await;
    assert_eq!(published.len(), 2);
    assert_eq!(published[0], published[1]);
}

#[tokio::test]
async fn test_missing_required_topic_publishes_nothing() {
    let transport = MockTransport::new("livingroom").unwrap();
    let fan = Fan::new("fan1");

    let result = publish_discovery_document(&transport, &fan).await;

    assert!(matches!(
        result,
        Err(DiscoveryError::MissingTopic {
            field: "command_topic",
            ..
        })
    ));
    assert!(transport.published().await.is_empty());
}

#[test]
fn test_availability_guard_leaves_descriptor_unmodified() {
    let topics = TopicBuilder::new("livingroom").unwrap();
    let mut fan = Fan::new("fan1");
    let before = fan.clone();

    let result = add_default_availability_topic(&mut fan, &topics);

    assert!(matches!(result, Err(DiscoveryError::InvalidState(_))));
    assert_eq!(fan, before);
}

#[test]
fn test_default_availability_appended_once() {
    let topics = TopicBuilder::new("livingroom").unwrap();
    let mut sensor = Sensor::new("temp");
    sensor.base.availability = Some(vec![Availability::new("hub/bridge/connected")]);

    add_default_availability_topic(&mut sensor, &topics).unwrap();
    add_default_availability_topic(&mut sensor, &topics).unwrap();

    let availability = sensor.base.availability.as_ref().unwrap();
    assert_eq!(availability.len(), 2);
    assert_eq!(availability[0].topic, "hub/bridge/connected");
    assert_eq!(availability[1].topic, "livingroom/connected");
    assert_eq!(availability[1].payload_available.as_deref(), Some("online"));
    assert_eq!(availability[1].payload_not_available.as_deref(), Some("offline"));
}

#[tokio::test]
async fn test_select_keeps_caller_command_topic() {
    let transport = MockTransport::new("livingroom").unwrap();
    let mut select = Select::new(
        "mode",
        "custom/mode/set",
        vec!["eco".to_string(), "boost".to_string()],
    );

    let mut entity = AnyEntity::Select(select.clone());
    entity.populate_topics(transport.topics()).unwrap();
    assert_eq!(entity.command_topic(), Some("custom/mode/set"));

    populate_state_topic(&mut select, transport.topics()).unwrap();
    publish_discovery_document(&transport, &select).await.unwrap();

    let doc = parse(&transport.published().await[0].payload);
    assert_eq!(doc["command_topic"], "custom/mode/set");
    assert_eq!(doc["options"], serde_json::json!(["eco", "boost"]));
}

#[tokio::test]
async fn test_state_publication_and_removal() {
    let transport = MockTransport::new("livingroom").unwrap();
    let mut sensor = Sensor::new("temp");

    let unpopulated = publish_state(&transport, &sensor, "20", false).await;
    assert!(matches!(unpopulated, Err(DiscoveryError::MissingTopic { .. })));

    populate_state_topic(&mut sensor, transport.topics()).unwrap();
    publish_state(&transport, &sensor, "21.5", true).await.unwrap();
    remove_discovery_document(&transport, &sensor).await.unwrap();

    let published = transport.published().await;
    assert_eq!(published.len(), 2);
    assert_eq!(published[0].topic, "homeassistant/sensor/livingroom/temp/state");
    assert_eq!(&published[0].payload[..], b"21.5");
    assert!(published[0].retain);

    assert_eq!(published[1].topic, "homeassistant/sensor/livingroom/temp/config");
    assert!(published[1].payload.is_empty());
    assert!(published[1].retain);
}

#[tokio::test]
async fn test_transport_failure_surfaces_as_discovery_error() {
    let transport = MockTransport::with_failure("livingroom").unwrap();
    let mut button = Button::new("reboot");
    populate_command_topic(&mut button, transport.topics()).unwrap();

    let result = publish_discovery_document(&transport, &button).await;

    assert!(matches!(result, Err(DiscoveryError::Transport(_))));
    assert_eq!(button.component(), "button");
}
