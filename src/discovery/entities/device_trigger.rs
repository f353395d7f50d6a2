use crate::discovery::EntityBase;
use serde::{Deserialize, Serialize};

/// A device automation trigger (e.g. a remote's button press)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceTrigger {
    #[serde(flatten)]
    pub base: EntityBase,

    /// Always `trigger` for this kind
    pub automation_type: String,

    /// Payload that fires the trigger; any payload fires when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qos: Option<u8>,

    pub topic: String,

    /// Trigger type, e.g. `button_short_press`
    #[serde(rename = "type")]
    pub trigger_type: String,

    /// Trigger subtype, e.g. `button_1`
    pub subtype: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_template: Option<String>,
}

impl DeviceTrigger {
    pub const AUTOMATION_TYPE: &'static str = "trigger";

    pub fn new(
        unique_id: impl Into<String>,
        topic: impl Into<String>,
        trigger_type: impl Into<String>,
        subtype: impl Into<String>,
    ) -> Self {
        Self {
            base: EntityBase::new(unique_id),
            automation_type: Self::AUTOMATION_TYPE.to_string(),
            payload: None,
            qos: None,
            topic: topic.into(),
            trigger_type: trigger_type.into(),
            subtype: subtype.into(),
            value_template: None,
        }
    }
}

impl_discovery!(DeviceTrigger, "device_trigger");
