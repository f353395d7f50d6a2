use crate::discovery::EntityBase;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    #[serde(flatten)]
    pub base: EntityBase,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimistic: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_off: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_on: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qos: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retain: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_off: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_on: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_template: Option<String>,
}

impl Switch {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            base: EntityBase::new(unique_id),
            ..Default::default()
        }
    }
}

impl_discovery!(Switch, "switch", requires = [command_topic]);
impl_state_topic!(Switch);
impl_command_topic!(Switch);
