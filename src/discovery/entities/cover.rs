use crate::discovery::EntityBase;
use serde::{Deserialize, Serialize};

/// Blinds, roller shutters, garage doors and similar
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cover {
    #[serde(flatten)]
    pub base: EntityBase,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    /// Defaults to false when a state or position topic is defined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimistic: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_available: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_close: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_not_available: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_open: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_stop: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_closed: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_open: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qos: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retain: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_position_template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_position_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_closed: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_closing: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_open: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_opening: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_stopped: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt_closed_value: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt_command_template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt_command_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt_max: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt_min: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt_opened_value: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt_optimistic: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt_status_template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt_status_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_template: Option<String>,
}

impl Cover {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            base: EntityBase::new(unique_id),
            ..Default::default()
        }
    }
}

impl_discovery!(Cover, "cover");
impl_state_topic!(Cover);
impl_command_topic!(Cover);
