//! Wire messages exchanged with the native host.
//!
//! # Design
//! Both directions are JSON objects with camelCase keys. The host defines its
//! own copies of these shapes; the mock host in this workspace does too, so
//! the integration tests catch any drift between the two.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BridgeError;
use crate::status::CommandStatus;

/// A request for the host to run `method_name` on the plugin `class_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginCommand {
    pub callback_id: String,
    pub class_name: String,
    pub method_name: String,
    pub arguments: Value,
}

impl PluginCommand {
    pub fn to_json(&self) -> Result<String, BridgeError> {
        serde_json::to_string(self).map_err(BridgeError::Encode)
    }
}

/// One completion for a pending callback.
///
/// `status` stays a raw integer: a code the bridge does not know is still a
/// failure and must reach the failure handler rather than fail to decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackResponse {
    pub callback_id: String,
    pub status: i32,
    #[serde(default)]
    pub message: Value,
    #[serde(default)]
    pub keep_callback: bool,
}

impl CallbackResponse {
    pub fn new(callback_id: &str, status: CommandStatus, message: Value) -> Self {
        Self {
            callback_id: callback_id.to_string(),
            status: status.code(),
            message,
            keep_callback: false,
        }
    }

    pub fn keep_callback(mut self, keep: bool) -> Self {
        self.keep_callback = keep;
        self
    }

    pub fn from_json(text: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(text).map_err(BridgeError::Decode)
    }
}
