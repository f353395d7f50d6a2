//! Per-kind discovery descriptors
//!
//! These are plain schema records. Field names match the hub's wire names and
//! unset optional fields are omitted from the encoded document.

mod binary_sensor;
mod button;
mod camera;
mod cover;
mod device_trigger;
mod fan;
mod select;
mod sensor;
mod switch;
mod vacuum;

pub use binary_sensor::BinarySensor;
pub use button::Button;
pub use camera::Camera;
pub use cover::Cover;
pub use device_trigger::DeviceTrigger;
pub use fan::Fan;
pub use select::Select;
pub use sensor::Sensor;
pub use switch::Switch;
pub use vacuum::Vacuum;

use super::{
    populate_command_topic, populate_state_topic, CommandTopicGetter, Discovery, DiscoveryError,
    EntityBase,
};
use crate::protocol::{TopicBuilder, TopicError};
use serde::{Deserialize, Serialize};

/// Any supported descriptor, tagged by its component kind
///
/// Used where the kind is only known at runtime, such as entities declared in
/// the node configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "component", rename_all = "snake_case")]
pub enum AnyEntity {
    BinarySensor(BinarySensor),
    Button(Button),
    Camera(Camera),
    Cover(Cover),
    DeviceTrigger(DeviceTrigger),
    Fan(Fan),
    Select(Select),
    Sensor(Sensor),
    Switch(Switch),
    Vacuum(Vacuum),
}

macro_rules! dispatch {
    ($value:expr, $entity:ident => $body:expr) => {
        match $value {
            AnyEntity::BinarySensor($entity) => $body,
            AnyEntity::Button($entity) => $body,
            AnyEntity::Camera($entity) => $body,
            AnyEntity::Cover($entity) => $body,
            AnyEntity::DeviceTrigger($entity) => $body,
            AnyEntity::Fan($entity) => $body,
            AnyEntity::Select($entity) => $body,
            AnyEntity::Sensor($entity) => $body,
            AnyEntity::Switch($entity) => $body,
            AnyEntity::Vacuum($entity) => $body,
        }
    };
}

impl AnyEntity {
    /// Fill every topic this node derives for the entity's kind
    pub fn populate_topics(&mut self, topics: &TopicBuilder) -> Result<(), TopicError> {
        match self {
            AnyEntity::BinarySensor(e) => {
                populate_state_topic(e, topics)?;
            }
            AnyEntity::Sensor(e) => {
                populate_state_topic(e, topics)?;
            }
            AnyEntity::Select(e) => {
                populate_state_topic(e, topics)?;
            }
            AnyEntity::Button(e) => {
                populate_command_topic(e, topics)?;
            }
            AnyEntity::Cover(e) => {
                populate_state_topic(e, topics)?;
                populate_command_topic(e, topics)?;
            }
            AnyEntity::Fan(e) => {
                populate_state_topic(e, topics)?;
                populate_command_topic(e, topics)?;
            }
            AnyEntity::Switch(e) => {
                populate_state_topic(e, topics)?;
                populate_command_topic(e, topics)?;
            }
            AnyEntity::Vacuum(e) => {
                populate_state_topic(e, topics)?;
                populate_command_topic(e, topics)?;
            }
            AnyEntity::Camera(_) | AnyEntity::DeviceTrigger(_) => {}
        }
        Ok(())
    }

    /// Topic the hub sends commands to, for kinds that accept commands
    pub fn command_topic(&self) -> Option<&str> {
        match self {
            AnyEntity::Button(e) => e.command_topic(),
            AnyEntity::Cover(e) => e.command_topic(),
            AnyEntity::Fan(e) => e.command_topic(),
            AnyEntity::Select(e) => e.command_topic(),
            AnyEntity::Switch(e) => e.command_topic(),
            AnyEntity::Vacuum(e) => e.command_topic(),
            AnyEntity::BinarySensor(_)
            | AnyEntity::Camera(_)
            | AnyEntity::DeviceTrigger(_)
            | AnyEntity::Sensor(_) => None,
        }
    }
}

impl Discovery for AnyEntity {
    fn component(&self) -> &'static str {
        dispatch!(self, e => e.component())
    }

    fn base(&self) -> &EntityBase {
        dispatch!(self, e => e.base())
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        dispatch!(self, e => e.base_mut())
    }

    fn validate(&self) -> Result<(), DiscoveryError> {
        dispatch!(self, e => e.validate())
    }

    fn to_json(&self) -> Result<String, DiscoveryError> {
        dispatch!(self, e => e.to_json())
    }
}
