use crate::discovery::EntityBase;
use serde::{Deserialize, Serialize};

/// A camera whose still images are published as raw bytes on `topic`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    #[serde(flatten)]
    pub base: EntityBase,

    /// Topic the image payloads are published to
    pub topic: String,

    /// Set to `b64` when images are base64 encoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_encoding: Option<String>,
}

impl Camera {
    pub fn new(unique_id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            base: EntityBase::new(unique_id),
            topic: topic.into(),
            image_encoding: None,
        }
    }
}

impl_discovery!(Camera, "camera");
