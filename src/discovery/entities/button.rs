use crate::discovery::EntityBase;
use serde::{Deserialize, Serialize};

/// A button that triggers an action when pressed in the hub
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Button {
    #[serde(flatten)]
    pub base: EntityBase,

    /// Template used to generate the payload sent to `command_topic`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_available: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_not_available: Option<String>,

    /// Payload sent when the button is pressed (hub default: `PRESS`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_press: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qos: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retain: Option<bool>,
}

impl Button {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            base: EntityBase::new(unique_id),
            ..Default::default()
        }
    }
}

impl_discovery!(Button, "button", requires = [command_topic]);
impl_command_topic!(Button);
