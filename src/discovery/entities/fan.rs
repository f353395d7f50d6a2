use crate::discovery::EntityBase;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fan {
    #[serde(flatten)]
    pub base: EntityBase,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimistic: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_off: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_on: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_command_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_state_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset_modes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qos: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retain: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_range_max: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_range_min: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_value_template: Option<String>,
}

impl Fan {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            base: EntityBase::new(unique_id),
            ..Default::default()
        }
    }
}

impl_discovery!(Fan, "fan", requires = [command_topic]);
impl_state_topic!(Fan);
impl_command_topic!(Fan);
