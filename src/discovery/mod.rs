//! Home Assistant discovery documents
//!
//! Each entity exposed to the hub is described by a descriptor struct (one per
//! component kind, see [`entities`]). Descriptors implement [`Discovery`] plus
//! whichever capability markers from [`capability`] apply to their kind. The
//! [`publisher`] functions populate derived topics and publish the canonical
//! JSON document.
//!
//! # Example
//!
//! ```
//! use hamqtt::discovery::entities::Switch;
//! use hamqtt::discovery::{discovery_message, populate_command_topic, populate_state_topic};
//! use hamqtt::protocol::TopicBuilder;
//!
//! let topics = TopicBuilder::new("garage")?;
//! let mut relay = Switch::new("relay1");
//! populate_state_topic(&mut relay, &topics)?;
//! populate_command_topic(&mut relay, &topics)?;
//!
//! let message = discovery_message(&topics, &relay)?;
//! assert_eq!(message.topic, "homeassistant/switch/garage/relay1/config");
//! assert!(message.retain);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[macro_use]
mod macros;

pub mod capability;
pub mod entities;
pub mod model;
pub mod publisher;

pub use capability::*;
pub use entities::AnyEntity;
pub use model::*;
pub use publisher::*;

use crate::protocol::TopicError;
use thiserror::Error;

/// Contract shared by every entity descriptor
pub trait Discovery {
    /// Component kind, e.g. `"button"`; selects the topic namespace
    fn component(&self) -> &'static str;

    fn base(&self) -> &EntityBase;

    fn base_mut(&mut self) -> &mut EntityBase;

    fn unique_id(&self) -> &str {
        &self.base().unique_id
    }

    /// Check that every topic this kind cannot work without is set
    fn validate(&self) -> Result<(), DiscoveryError> {
        Ok(())
    }

    /// Canonical single-line JSON encoding of the document
    fn to_json(&self) -> Result<String, DiscoveryError>;
}

/// Errors raised while building or publishing discovery documents
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("{component} '{unique_id}' has no {field}")]
    MissingTopic {
        component: &'static str,
        unique_id: String,
        field: &'static str,
    },

    #[error("Topic error: {0}")]
    Topic(#[from] TopicError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}
