//! Error types for the bridge.
//!
//! # Design
//! Protocol-level failures (a plugin reporting a non-OK status) are not
//! errors here: they are routed to the caller's failure handler. `BridgeError`
//! only covers what can go wrong locally, such as text that does not decode
//! or an argument value that cannot be encoded.

use thiserror::Error;

/// Errors returned by `Bridge` and the enumeration conversions.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The invocation arguments could not be serialized to JSON.
    #[error("failed to encode plugin command: {0}")]
    Encode(#[source] serde_json::Error),

    /// An inbound completion was not a valid callback response.
    #[error("failed to decode callback response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The integer does not name a known native constant.
    #[error("unknown {kind} code {code}")]
    UnknownCode { kind: &'static str, code: i32 },
}
