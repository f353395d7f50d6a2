use crate::discovery::{CommandTopicGetter, EntityBase};
use serde::{Deserialize, Serialize};

/// A drop-down of fixed options
///
/// The command topic is authored by the caller and never derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    #[serde(flatten)]
    pub base: EntityBase,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_template: Option<String>,

    pub command_topic: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimistic: Option<bool>,

    pub options: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qos: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retain: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_template: Option<String>,
}

impl Select {
    pub fn new(
        unique_id: impl Into<String>,
        command_topic: impl Into<String>,
        options: Vec<String>,
    ) -> Self {
        Self {
            base: EntityBase::new(unique_id),
            command_template: None,
            command_topic: command_topic.into(),
            encoding: None,
            optimistic: None,
            options,
            qos: None,
            retain: None,
            state_topic: None,
            value_template: None,
        }
    }
}

impl_discovery!(Select, "select");
impl_state_topic!(Select);

impl CommandTopicGetter for Select {
    fn command_topic(&self) -> Option<&str> {
        Some(&self.command_topic)
    }
}
