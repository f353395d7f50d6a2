//! Topic derivation and validation for Home Assistant MQTT discovery
//!
//! Every topic this node owns is derived from three inputs: the entity's
//! component kind, the node identifier and the entity's unique id. Derivation
//! is a pure string join, so the same inputs always yield the same topic.

use crate::discovery::Discovery;
use thiserror::Error;

/// Root of the discovery topic tree watched by Home Assistant
pub const DISCOVERY_PREFIX: &str = "homeassistant";
/// Leaf the hub reads entity state from
pub const STATE_LEAF: &str = "state";
/// Leaf the hub writes commands to
pub const COMMAND_LEAF: &str = "set";
/// Leaf carrying the retained discovery document
pub const CONFIG_LEAF: &str = "config";
/// Leaf of the node presence record (`{node_id}/connected`)
pub const PRESENCE_LEAF: &str = "connected";

/// Topic validation errors
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TopicError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error("{kind} contains invalid character: '{ch}'")]
    InvalidChar { kind: &'static str, ch: char },
    #[error("Invalid topic filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: &'static str },
}

/// Validate a single topic level supplied by a caller (node id, unique id, leaf)
///
/// A level must be non-empty and must not contain the level separator, MQTT
/// wildcards or NUL.
pub fn validate_segment(kind: &'static str, value: &str) -> Result<(), TopicError> {
    if value.is_empty() {
        return Err(TopicError::Empty(kind));
    }

    match value.chars().find(|c| matches!(c, '/' | '+' | '#' | '\0')) {
        Some(ch) => Err(TopicError::InvalidChar { kind, ch }),
        None => Ok(()),
    }
}

/// Validate a concrete topic name used for publishing
pub fn validate_topic_name(topic: &str) -> Result<(), TopicError> {
    if topic.is_empty() {
        return Err(TopicError::Empty("topic"));
    }

    match topic.chars().find(|c| matches!(c, '+' | '#' | '\0')) {
        Some(ch) => Err(TopicError::InvalidChar { kind: "topic", ch }),
        None => Ok(()),
    }
}

/// Validate a subscription filter against the MQTT wildcard rules
///
/// `+` must occupy a whole level; `#` must occupy the whole last level.
pub fn validate_topic_filter(filter: &str) -> Result<(), TopicError> {
    let invalid = |reason| TopicError::InvalidFilter {
        filter: filter.to_string(),
        reason,
    };

    if filter.is_empty() {
        return Err(TopicError::Empty("topic filter"));
    }
    if filter.contains('\0') {
        return Err(invalid("contains NUL"));
    }

    let levels: Vec<&str> = filter.split('/').collect();
    let last = levels.len() - 1;
    for (index, level) in levels.iter().enumerate() {
        if level.contains('#') && (*level != "#" || index != last) {
            return Err(invalid("'#' must be the whole final level"));
        }
        if level.contains('+') && *level != "+" {
            return Err(invalid("'+' must be a whole level"));
        }
    }

    Ok(())
}

/// Derives the topics of one node
///
/// The node id is validated once at construction, so per-entity derivation can
/// only fail on a malformed unique id or leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicBuilder {
    node_id: String,
}

impl TopicBuilder {
    pub fn new(node_id: impl Into<String>) -> Result<Self, TopicError> {
        let node_id = node_id.into();
        validate_segment("node_id", &node_id)?;
        Ok(Self { node_id })
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Presence topic: `{node_id}/connected`
    pub fn presence_topic(&self) -> String {
        format!("{}/{PRESENCE_LEAF}", self.node_id)
    }

    /// Build `homeassistant/{component}/{node_id}/{unique_id}/{leaf}`
    pub fn entity_topic(
        &self,
        component: &str,
        unique_id: &str,
        leaf: &str,
    ) -> Result<String, TopicError> {
        validate_segment("component", component)?;
        validate_segment("unique_id", unique_id)?;
        validate_segment("leaf", leaf)?;

        Ok(format!(
            "{DISCOVERY_PREFIX}/{component}/{}/{unique_id}/{leaf}",
            self.node_id
        ))
    }

    /// Topic for the given descriptor and leaf
    pub fn topic<D: Discovery + ?Sized>(
        &self,
        descriptor: &D,
        leaf: &str,
    ) -> Result<String, TopicError> {
        self.entity_topic(descriptor.component(), descriptor.unique_id(), leaf)
    }

    pub fn state_topic<D: Discovery + ?Sized>(&self, descriptor: &D) -> Result<String, TopicError> {
        self.topic(descriptor, STATE_LEAF)
    }

    pub fn command_topic<D: Discovery + ?Sized>(
        &self,
        descriptor: &D,
    ) -> Result<String, TopicError> {
        self.topic(descriptor, COMMAND_LEAF)
    }

    /// Destination of the descriptor's discovery document
    pub fn config_topic<D: Discovery + ?Sized>(
        &self,
        descriptor: &D,
    ) -> Result<String, TopicError> {
        self.topic(descriptor, CONFIG_LEAF)
    }
}
