use crate::discovery::EntityBase;
use serde::{Deserialize, Serialize};

/// A read-only measurement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    #[serde(flatten)]
    pub base: EntityBase,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    /// Seconds after which the value expires if not updated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_after: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_update: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qos: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_display_precision: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_template: Option<String>,
}

impl Sensor {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            base: EntityBase::new(unique_id),
            ..Default::default()
        }
    }
}

impl_discovery!(Sensor, "sensor", requires = [state_topic]);
impl_state_topic!(Sensor);
