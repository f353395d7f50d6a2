use crate::discovery::EntityBase;
use serde::{Deserialize, Serialize};

/// A robot vacuum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vacuum {
    #[serde(flatten)]
    pub base: EntityBase,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    pub fan_speed_list: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_available: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_clean_spot: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_locate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_not_available: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_pause: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_return_to_base: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_start: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_stop: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qos: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retain: Option<bool>,

    /// Vacuum schema; `state` for state-topic based vacuums
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_command_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_fan_speed_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_topic: Option<String>,

    /// Features supported by the vacuum, e.g. `start`, `stop`, `fan_speed`
    pub supported_features: Vec<String>,
}

impl Vacuum {
    pub fn new(
        unique_id: impl Into<String>,
        fan_speed_list: Vec<String>,
        supported_features: Vec<String>,
    ) -> Self {
        Self {
            base: EntityBase::new(unique_id),
            command_topic: None,
            encoding: None,
            fan_speed_list,
            payload_available: None,
            payload_clean_spot: None,
            payload_locate: None,
            payload_not_available: None,
            payload_pause: None,
            payload_return_to_base: None,
            payload_start: None,
            payload_stop: None,
            qos: None,
            retain: None,
            schema: None,
            send_command_topic: None,
            set_fan_speed_topic: None,
            state_topic: None,
            supported_features,
        }
    }
}

impl_discovery!(Vacuum, "vacuum");
impl_state_topic!(Vacuum);
impl_command_topic!(Vacuum);
