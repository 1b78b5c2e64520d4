//! Web-side core of a hybrid app bridge.
//!
//! # Overview
//! UI code calls native plugins by class and method name. The bridge encodes
//! each call as a JSON `PluginCommand`, hands it to a host-provided
//! `Transport`, and later routes the host's completions back to the success
//! or failure handler registered for that call (host-does-IO pattern).
//!
//! # Design
//! - `Bridge` owns its callback registry; nothing is global.
//! - Identifiers are `{class}_{method}_{counter}` with a randomly seeded
//!   counter, so ids from a previous page load are unlikely to be reused.
//! - Status, HTTP method and content type codes mirror the host's enums and
//!   travel as integers.
//! - `tree` is an unrelated helper that pretty-prints nested values for logs.

pub mod bridge;
pub mod callback;
pub mod config;
pub mod error;
pub mod http;
pub mod message;
pub mod status;
pub mod tree;

pub use bridge::{Bridge, Delivery, Transport};
pub use callback::{CallbackRegistry, Callbacks};
pub use config::BridgeConfig;
pub use error::BridgeError;
pub use http::{ContentType, CustomRequest, HttpMethod};
pub use message::{CallbackResponse, PluginCommand};
pub use status::CommandStatus;
pub use tree::{render, TreePrinter};
