//! HTTP constants understood by the native REST plugin.
//!
//! # Design
//! The web side never performs HTTP itself: it describes a request as plain
//! data and hands it to the host through `Bridge::invoke`. `HttpMethod` and
//! `ContentType` mirror the host's enumerations and travel as integers, so a
//! `CustomRequest` serializes to exactly the argument object the native
//! `sendCustomRequest` method reads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::error::BridgeError;

/// Native class name of the REST plugin.
pub const REST_PLUGIN_CLASS: &str = "sf::SFRestPlugin";

/// Method on the REST plugin that accepts a `CustomRequest`.
pub const CUSTOM_REQUEST_METHOD: &str = "sendCustomRequest";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum HttpMethod {
    #[default]
    Get = 0,
    Head = 1,
    Delete = 2,
    Post = 3,
    Put = 4,
    Patch = 5,
}

impl TryFrom<i32> for HttpMethod {
    type Error = BridgeError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => HttpMethod::Get,
            1 => HttpMethod::Head,
            2 => HttpMethod::Delete,
            3 => HttpMethod::Post,
            4 => HttpMethod::Put,
            5 => HttpMethod::Patch,
            code => {
                return Err(BridgeError::UnknownCode {
                    kind: "http method",
                    code,
                })
            }
        })
    }
}

/// How request parameters are encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ContentType {
    /// Parameters go into the URL query, e.g. `?firstname=John&lastname=Smith`.
    UrlEncoded = 0,
    /// Parameters go into the body as JSON.
    #[default]
    Json = 1,
    /// `multipart/form-data`. The host does not implement it.
    MultiPart = 2,
}

impl TryFrom<i32> for ContentType {
    type Error = BridgeError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => ContentType::UrlEncoded,
            1 => ContentType::Json,
            2 => ContentType::MultiPart,
            code => {
                return Err(BridgeError::UnknownCode {
                    kind: "content type",
                    code,
                })
            }
        })
    }
}

/// Arguments for the REST plugin's `sendCustomRequest` method.
///
/// Missing `method` and `contentType` fall back to GET and JSON, the same
/// defaults the host applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRequest {
    pub path: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl CustomRequest {
    pub fn new(path: &str, method: HttpMethod) -> Self {
        Self {
            path: path.to_string(),
            method,
            content_type: ContentType::default(),
            params: Map::new(),
        }
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }
}
