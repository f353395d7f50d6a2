//! Capability markers describing which topic fields a descriptor exposes
//!
//! A descriptor implements only the markers that apply to its kind. Topic
//! population helpers are bounded by the setter traits, so asking to populate
//! a topic a kind does not have fails to compile.

use super::Discovery;

/// Exposes the topic the hub reads state from
pub trait StateTopicGetter: Discovery {
    fn state_topic(&self) -> Option<&str>;
}

/// State topic derived by this node rather than authored by the caller
pub trait StateTopicSetter: Discovery {
    fn set_state_topic(&mut self, topic: String);
}

/// Exposes the topic the hub publishes commands to
pub trait CommandTopicGetter: Discovery {
    fn command_topic(&self) -> Option<&str>;
}

/// Command topic derived by this node rather than authored by the caller
pub trait CommandTopicSetter: Discovery {
    fn set_command_topic(&mut self, topic: String);
}

/// Full state capability: readable and populated by this node
pub trait HasStateTopic: StateTopicGetter + StateTopicSetter {}

impl<T: StateTopicGetter + StateTopicSetter + ?Sized> HasStateTopic for T {}

/// Full command capability: readable and populated by this node
pub trait HasCommandTopic: CommandTopicGetter + CommandTopicSetter {}

impl<T: CommandTopicGetter + CommandTopicSetter + ?Sized> HasCommandTopic for T {}
