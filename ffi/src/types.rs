//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each enum mirrors a core enum with explicit discriminants so a C host can
//! use the same numeric codes the web side does. The transport and handler
//! callbacks are plain C function pointers plus an opaque context pointer the
//! host owns; this module wraps them into the core's `Transport` and
//! `Callbacks` types so `lib.rs` stays focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use hybrid_core::{Bridge, Callbacks, CommandStatus, ContentType, Delivery, HttpMethod, Transport};

/// Host function receiving each outbound JSON command.
pub type TransportFn = extern "C" fn(context: *mut c_void, message: *const c_char);

/// Handler receiving the JSON payload of a completion.
pub type HandlerFn = extern "C" fn(user_data: *mut c_void, payload: *const c_char);

/// Opaque handle to a `Bridge`. C callers receive a pointer to this and pass
/// it back into every FFI function.
pub struct FfiBridge {
    pub(crate) inner: Bridge<FfiTransport>,
}

/// `Transport` that forwards to a host function pointer.
pub struct FfiTransport {
    post: TransportFn,
    context: *mut c_void,
}

impl FfiTransport {
    pub(crate) fn new(post: TransportFn, context: *mut c_void) -> Self {
        Self { post, context }
    }
}

impl Transport for FfiTransport {
    fn post_message(&mut self, message: &str) {
        // Encoded JSON escapes NUL, so this only fails on a broken encoder.
        if let Ok(message) = CString::new(message) {
            (self.post)(self.context, message.as_ptr());
        }
    }
}

/// Wrap optional C handlers into core `Callbacks`. The payload string passed
/// to a handler is only valid for the duration of the call.
pub(crate) fn ffi_callbacks(
    on_success: Option<HandlerFn>,
    on_failure: Option<HandlerFn>,
    user_data: *mut c_void,
) -> Callbacks {
    let mut callbacks = Callbacks::new();
    if let Some(handler) = on_success {
        callbacks = callbacks.on_success(move |payload| call_handler(handler, user_data, &payload));
    }
    if let Some(handler) = on_failure {
        callbacks = callbacks.on_failure(move |payload| call_handler(handler, user_data, &payload));
    }
    callbacks
}

fn call_handler(handler: HandlerFn, user_data: *mut c_void, payload: &serde_json::Value) {
    if let Ok(payload) = CString::new(payload.to_string()) {
        handler(user_data, payload.as_ptr());
    }
}

// ---------------------------------------------------------------------------
// Native constants
// ---------------------------------------------------------------------------

/// Completion status codes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiCommandStatus {
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

impl From<CommandStatus> for FfiCommandStatus {
    fn from(s: CommandStatus) -> Self {
        match s {
            CommandStatus::NoResult => FfiCommandStatus::NoResult,
            CommandStatus::Ok => FfiCommandStatus::Ok,
            CommandStatus::ClassNotFoundException => FfiCommandStatus::ClassNotFoundException,
            CommandStatus::IllegalAccessException => FfiCommandStatus::IllegalAccessException,
            CommandStatus::InstantiationException => FfiCommandStatus::InstantiationException,
            CommandStatus::MalformedUrlException => FfiCommandStatus::MalformedUrlException,
            CommandStatus::IoException => FfiCommandStatus::IoException,
            CommandStatus::InvalidAction => FfiCommandStatus::InvalidAction,
            CommandStatus::JsonException => FfiCommandStatus::JsonException,
            CommandStatus::Error => FfiCommandStatus::Error,
        }
    }
}

/// HTTP method codes understood by the REST plugin.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Head = 1,
    Delete = 2,
    Post = 3,
    Put = 4,
    Patch = 5,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Head => FfiHttpMethod::Head,
            HttpMethod::Delete => FfiHttpMethod::Delete,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Patch => FfiHttpMethod::Patch,
        }
    }
}

/// Parameter encoding codes understood by the REST plugin.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiContentType {
    UrlEncoded = 0,
    Json = 1,
    MultiPart = 2,
}

impl From<ContentType> for FfiContentType {
    fn from(c: ContentType) -> Self {
        match c {
            ContentType::UrlEncoded => FfiContentType::UrlEncoded,
            ContentType::Json => FfiContentType::Json,
            ContentType::MultiPart => FfiContentType::MultiPart,
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of `hybrid_bridge_deliver` / `hybrid_bridge_receive`.
///
/// Non-negative values mirror the core `Delivery`; negative values report a
/// problem with the call itself.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDelivery {
    Unmatched = 0,
    Succeeded = 1,
    Failed = 2,
    InvalidInput = -1,
    Panic = -2,
}

impl From<Delivery> for FfiDelivery {
    fn from(d: Delivery) -> Self {
        match d {
            Delivery::Unmatched => FfiDelivery::Unmatched,
            Delivery::Succeeded => FfiDelivery::Succeeded,
            Delivery::Failed => FfiDelivery::Failed,
        }
    }
}
