//! Topic population and discovery document publication

use super::{
    CommandTopicSetter, Discovery, DiscoveryError, StateTopicGetter, StateTopicSetter,
};
use crate::discovery_span;
use crate::protocol::{OutgoingMessage, TopicBuilder, TopicError};
use crate::transport::mqtt::presence;
use crate::transport::Transport;
use bytes::Bytes;
use tracing::{debug, Instrument};

/// Assign the derived state topic
pub fn populate_state_topic<'a, D>(
    descriptor: &'a mut D,
    topics: &TopicBuilder,
) -> Result<&'a mut D, TopicError>
where
    D: StateTopicSetter + ?Sized,
{
    let topic = topics.state_topic(descriptor)?;
    descriptor.set_state_topic(topic);
    Ok(descriptor)
}

/// Assign the derived command topic
pub fn populate_command_topic<'a, D>(
    descriptor: &'a mut D,
    topics: &TopicBuilder,
) -> Result<&'a mut D, TopicError>
where
    D: CommandTopicSetter + ?Sized,
{
    let topic = topics.command_topic(descriptor)?;
    descriptor.set_command_topic(topic);
    Ok(descriptor)
}

/// Append this node's presence topic to the descriptor's availability list
///
/// The caller must have opted into availability tracking by initializing the
/// list; otherwise this fails and the descriptor is left untouched. Appending
/// the same presence topic twice is a no-op.
pub fn add_default_availability_topic<'a, D>(
    descriptor: &'a mut D,
    topics: &TopicBuilder,
) -> Result<&'a mut D, DiscoveryError>
where
    D: Discovery + ?Sized,
{
    let unique_id = descriptor.unique_id().to_string();
    let Some(availability) = descriptor.base_mut().availability.as_mut() else {
        return Err(DiscoveryError::InvalidState(format!(
            "availability list of '{unique_id}' is not initialized"
        )));
    };

    let entry = presence::default_availability(topics);
    if !availability.iter().any(|a| a.topic == entry.topic) {
        availability.push(entry);
    }
    Ok(descriptor)
}

/// Build the retained config message for a descriptor without sending it
///
/// Fails before any I/O when a topic the kind requires is unset.
pub fn discovery_message<D>(
    topics: &TopicBuilder,
    descriptor: &D,
) -> Result<OutgoingMessage, DiscoveryError>
where
    D: Discovery + ?Sized,
{
    descriptor.validate()?;
    let topic = topics.config_topic(descriptor)?;
    let payload = descriptor.to_json()?;
    Ok(OutgoingMessage::new(topic, payload).retained())
}

/// Publish the descriptor's discovery document, retained, to its config topic
///
/// Republishing an unchanged descriptor produces an identical message, so the
/// broker's retained copy simply converges.
pub async fn publish_discovery_document<T, D>(
    transport: &T,
    descriptor: &D,
) -> Result<(), DiscoveryError>
where
    T: Transport + ?Sized,
    D: Discovery + ?Sized,
{
    let message = discovery_message(transport.topics(), descriptor)?;
    let span = discovery_span!(
        component = descriptor.component(),
        unique_id = descriptor.unique_id(),
        topic = %message.topic
    );

    async move {
        debug!(bytes = message.payload.len(), "Publishing discovery document");
        transport
            .publish(vec![message])
            .await
            .map_err(|e| DiscoveryError::Transport(Box::new(e)))
    }
    .instrument(span)
    .await
}

/// Remove the entity from the hub by clearing its retained document
pub async fn remove_discovery_document<T, D>(
    transport: &T,
    descriptor: &D,
) -> Result<(), DiscoveryError>
where
    T: Transport + ?Sized,
    D: Discovery + ?Sized,
{
    let topic = transport.topics().config_topic(descriptor)?;
    debug!(%topic, "Clearing discovery document");

    transport
        .publish(vec![OutgoingMessage::new(topic, Bytes::new()).retained()])
        .await
        .map_err(|e| DiscoveryError::Transport(Box::new(e)))
}

/// Publish a state value to the descriptor's state topic
///
/// The state topic must already be populated.
pub async fn publish_state<T, D>(
    transport: &T,
    descriptor: &D,
    payload: impl Into<Bytes>,
    retain: bool,
) -> Result<(), DiscoveryError>
where
    T: Transport + ?Sized,
    D: StateTopicGetter + ?Sized,
{
    let Some(topic) = descriptor.state_topic() else {
        return Err(DiscoveryError::MissingTopic {
            component: descriptor.component(),
            unique_id: descriptor.unique_id().to_string(),
            field: "state_topic",
        });
    };

    let mut message = OutgoingMessage::new(topic, payload);
    message.retain = retain;

    transport
        .publish(vec![message])
        .await
        .map_err(|e| DiscoveryError::Transport(Box::new(e)))
}
