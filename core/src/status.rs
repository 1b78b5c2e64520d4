//! Completion status codes shared with the native host.
//!
//! The numeric values are part of the wire contract: the host sends them as
//! bare integers, so the discriminants below must never be reordered.

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::error::BridgeError;

/// Outcome category reported by a native plugin for one callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum CommandStatus {
    NoResult = 0,
    Ok = 1,
    ClassNotFoundException = 2,
    IllegalAccessException = 3,
    InstantiationException = 4,
    MalformedUrlException = 5,
    IoException = 6,
    InvalidAction = 7,
    JsonException = 8,
    Error = 9,
}

impl CommandStatus {
    /// Integer code as sent over the wire.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Only `Ok` routes to a success handler; every other code is a failure.
    pub fn is_ok(self) -> bool {
        self == CommandStatus::Ok
    }
}

impl TryFrom<i32> for CommandStatus {
    type Error = BridgeError;

    fn try_from(code: i32) -> Result<Self, BridgeError> {
        Ok(match code {
            0 => CommandStatus::NoResult,
            1 => CommandStatus::Ok,
            2 => CommandStatus::ClassNotFoundException,
            3 => CommandStatus::IllegalAccessException,
            4 => CommandStatus::InstantiationException,
            5 => CommandStatus::MalformedUrlException,
            6 => CommandStatus::IoException,
            7 => CommandStatus::InvalidAction,
            8 => CommandStatus::JsonException,
            9 => CommandStatus::Error,
            code => {
                return Err(BridgeError::UnknownCode {
                    kind: "command status",
                    code,
                })
            }
        })
    }
}
