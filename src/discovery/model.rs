//! Schema types shared by every discovery document

use serde::{Deserialize, Serialize};

/// Fields common to every entity kind
///
/// Embedded (flattened) at the start of each descriptor, so these keys lead
/// every serialized document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityBase {
    /// Stable identifier, unique within the hub for this entity
    pub unique_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Presence topics this entity depends on. `None` means the caller has not
    /// opted into availability tracking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Vec<Availability>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_mode: Option<AvailabilityMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Used instead of `name` for automatic generation of the entity id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_by_default: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_category: Option<EntityCategory>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_attributes_template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_attributes_topic: Option<String>,
}

impl EntityBase {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    /// Opt into availability tracking with the given entries (may be empty)
    pub fn with_availability(mut self, availability: Vec<Availability>) -> Self {
        self.availability = Some(availability);
        self
    }
}

/// One presence topic an entity depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub topic: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_available: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_not_available: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_template: Option<String>,
}

impl Availability {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload_available: None,
            payload_not_available: None,
            value_template: None,
        }
    }
}

/// How multiple availability entries combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityMode {
    /// Available only when every topic reports available
    All,
    /// Available when any topic reports available
    Any,
    /// The most recently received availability message wins
    Latest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Config,
    Diagnostic,
}

/// Device registry information shared by the entities of one device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<String>,

    /// `[connection_type, connection_identifier]` pairs, e.g. `["mac", "..."]`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<(String, String)>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sw_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hw_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_area: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via_device: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_url: Option<String>,
}
