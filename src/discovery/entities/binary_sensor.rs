use crate::discovery::EntityBase;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinarySensor {
    #[serde(flatten)]
    pub base: EntityBase,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_after: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_update: Option<bool>,

    /// Seconds after which an `ON` state falls back to `OFF`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_delay: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_off: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_on: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qos: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_template: Option<String>,
}

impl BinarySensor {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            base: EntityBase::new(unique_id),
            ..Default::default()
        }
    }
}

impl_discovery!(BinarySensor, "binary_sensor", requires = [state_topic]);
impl_state_topic!(BinarySensor);
