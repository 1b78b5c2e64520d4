//! C-ABI wrapper around `hybrid-core`.
//!
//! # Overview
//! Lets a native host drive the bridge through `extern "C"` functions: the
//! host supplies a transport function pointer when creating the bridge,
//! receives every outbound command as a JSON C string, and calls
//! `hybrid_bridge_deliver` or `hybrid_bridge_receive` when a plugin finishes.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary. Closures that touch the bridge are wrapped
//!   in `AssertUnwindSafe` since it owns boxed handlers.
//! - JSON crosses the boundary as C strings; the core's types stay internal.
//! - The caller owns every returned `char*` and releases it with
//!   `hybrid_free_string`. Strings passed *to* callbacks are borrowed and only
//!   valid during the call.
//! - Functions are not thread-safe; a bridge must stay on one thread or be
//!   guarded by the host.
//! - Handlers and the transport may call back into `hybrid_bridge_invoke`,
//!   `hybrid_bridge_deliver`, `hybrid_bridge_receive` and
//!   `hybrid_bridge_pending` on the same bridge; entry points only take
//!   shared references to it. They must not call `hybrid_bridge_free` on it.

pub mod types;

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use hybrid_core::{Bridge, BridgeConfig};
use log::debug;
use serde_json::Value;

use types::*;

/// Borrow a C string as UTF-8. `None` for null or invalid UTF-8.
fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

fn into_c_string(s: String) -> *mut c_char {
    CString::new(s)
        .map(CString::into_raw)
        .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Bridge lifecycle
// ---------------------------------------------------------------------------

/// Create a bridge that posts outbound commands through `transport`.
///
/// `context` is passed back unchanged on every `transport` call.
/// The caller must free the returned pointer with `hybrid_bridge_free`.
#[unsafe(no_mangle)]
pub extern "C" fn hybrid_bridge_new(transport: TransportFn, context: *mut c_void) -> *mut FfiBridge {
    catch_unwind(|| {
        let inner = Bridge::new(FfiTransport::new(transport, context));
        Box::into_raw(Box::new(FfiBridge { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a bridge whose callback counter starts at `seed` instead of a
/// random value. Intended for reproducible host tests.
#[unsafe(no_mangle)]
pub extern "C" fn hybrid_bridge_new_with_seed(
    transport: TransportFn,
    context: *mut c_void,
    seed: u64,
) -> *mut FfiBridge {
    catch_unwind(|| {
        let config = BridgeConfig::default().with_initial_counter(seed);
        let inner = Bridge::with_config(FfiTransport::new(transport, context), config);
        Box::into_raw(Box::new(FfiBridge { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a bridge created by `hybrid_bridge_new*`. Safe to call with null.
///
/// Pending callbacks are dropped without being called.
#[unsafe(no_mangle)]
pub extern "C" fn hybrid_bridge_free(bridge: *mut FfiBridge) {
    if !bridge.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(bridge) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Invocation and delivery
// ---------------------------------------------------------------------------

/// Invoke `method_name` on the native plugin `class_name`.
///
/// `args_json` must be a JSON document; null is treated as `{}`. Either
/// handler may be null. Returns the callback identifier, or null if `bridge`,
/// `class_name` or `method_name` is null, a string is not UTF-8, or
/// `args_json` is not valid JSON.
/// The caller must free the returned string with `hybrid_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn hybrid_bridge_invoke(
    bridge: *mut FfiBridge,
    on_success: Option<HandlerFn>,
    on_failure: Option<HandlerFn>,
    user_data: *mut c_void,
    class_name: *const c_char,
    method_name: *const c_char,
    args_json: *const c_char,
) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if bridge.is_null() {
            return std::ptr::null_mut();
        }
        let bridge = unsafe { &*bridge };
        let (Some(class_name), Some(method_name)) = (c_str(class_name), c_str(method_name)) else {
            return std::ptr::null_mut();
        };
        let args = if args_json.is_null() {
            Value::Object(Default::default())
        } else {
            let Some(text) = c_str(args_json) else {
                return std::ptr::null_mut();
            };
            match serde_json::from_str::<Value>(text) {
                Ok(v) => v,
                Err(e) => {
                    debug!("rejecting arguments for {class_name}.{method_name}: {e}");
                    return std::ptr::null_mut();
                }
            }
        };

        let callbacks = ffi_callbacks(on_success, on_failure, user_data);
        match bridge.inner.invoke(callbacks, class_name, method_name, &args) {
            Ok(id) => into_c_string(id),
            Err(_) => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Deliver one completion for `callback_id`.
///
/// `status` is the raw status code; `1` is OK and everything else a failure.
/// A null `payload_json` is delivered as JSON `null`.
#[unsafe(no_mangle)]
pub extern "C" fn hybrid_bridge_deliver(
    bridge: *mut FfiBridge,
    callback_id: *const c_char,
    status: i32,
    payload_json: *const c_char,
    keep_callback: bool,
) -> FfiDelivery {
    catch_unwind(AssertUnwindSafe(|| {
        if bridge.is_null() {
            return FfiDelivery::InvalidInput;
        }
        let bridge = unsafe { &*bridge };
        let Some(callback_id) = c_str(callback_id) else {
            return FfiDelivery::InvalidInput;
        };
        let payload = if payload_json.is_null() {
            Value::Null
        } else {
            match c_str(payload_json).map(serde_json::from_str::<Value>) {
                Some(Ok(v)) => v,
                _ => return FfiDelivery::InvalidInput,
            }
        };
        bridge.inner.deliver(callback_id, status, payload, keep_callback).into()
    }))
    .unwrap_or(FfiDelivery::Panic)
}

/// Deliver a completion given in its JSON form:
/// `{"callbackId": "...", "status": 1, "message": ..., "keepCallback": false}`.
#[unsafe(no_mangle)]
pub extern "C" fn hybrid_bridge_receive(bridge: *mut FfiBridge, message: *const c_char) -> FfiDelivery {
    catch_unwind(AssertUnwindSafe(|| {
        if bridge.is_null() {
            return FfiDelivery::InvalidInput;
        }
        let bridge = unsafe { &*bridge };
        let Some(message) = c_str(message) else {
            return FfiDelivery::InvalidInput;
        };
        match bridge.inner.receive(message) {
            Ok(delivery) => delivery.into(),
            Err(e) => {
                debug!("{e}");
                FfiDelivery::InvalidInput
            }
        }
    }))
    .unwrap_or(FfiDelivery::Panic)
}

/// Number of invocations still waiting for a completion. `0` for null.
#[unsafe(no_mangle)]
pub extern "C" fn hybrid_bridge_pending(bridge: *const FfiBridge) -> u32 {
    catch_unwind(AssertUnwindSafe(|| {
        if bridge.is_null() {
            return 0;
        }
        let bridge = unsafe { &*bridge };
        u32::try_from(bridge.inner.pending()).unwrap_or(u32::MAX)
    }))
    .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tree rendering
// ---------------------------------------------------------------------------

/// Render a JSON document as an indented debug tree.
///
/// Returns null if `json` is null or not valid JSON.
/// The caller must free the returned string with `hybrid_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn hybrid_render_tree(json: *const c_char) -> *mut c_char {
    catch_unwind(|| {
        let Some(text) = c_str(json) else {
            return std::ptr::null_mut();
        };
        match serde_json::from_str::<Value>(text) {
            Ok(value) => into_c_string(hybrid_core::render(&value)),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn hybrid_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Collects outbound messages; passed as the transport context.
    extern "C" fn collect_message(context: *mut c_void, message: *const c_char) {
        let sent = unsafe { &mut *(context as *mut Vec<String>) };
        let text = unsafe { CStr::from_ptr(message) }.to_str().unwrap();
        sent.push(text.to_string());
    }

    #[derive(Default)]
    struct Calls {
        ok: Vec<String>,
        failed: Vec<String>,
    }

    extern "C" fn record_ok(user_data: *mut c_void, payload: *const c_char) {
        let calls = unsafe { &mut *(user_data as *mut Calls) };
        calls.ok.push(unsafe { CStr::from_ptr(payload) }.to_str().unwrap().to_string());
    }

    extern "C" fn record_failed(user_data: *mut c_void, payload: *const c_char) {
        let calls = unsafe { &mut *(user_data as *mut Calls) };
        calls.failed.push(unsafe { CStr::from_ptr(payload) }.to_str().unwrap().to_string());
    }

    /// A bridge plus the host-side state its callbacks write into. The state
    /// is heap-allocated and only ever reached through the raw pointers handed
    /// to the bridge.
    struct Host {
        bridge: *mut FfiBridge,
        sent: *mut Vec<String>,
        calls: *mut Calls,
    }

    impl Host {
        fn new() -> Self {
            let sent = Box::into_raw(Box::new(Vec::new()));
            let calls = Box::into_raw(Box::new(Calls::default()));
            let bridge = hybrid_bridge_new_with_seed(collect_message, sent as *mut c_void, 10);
            assert!(!bridge.is_null());
            Self { bridge, sent, calls }
        }

        fn sent(&self) -> &Vec<String> {
            unsafe { &*self.sent }
        }

        fn calls(&self) -> &Calls {
            unsafe { &*self.calls }
        }

        fn invoke(&self, class: &str, method: &str, args: &str) -> CString {
            let class = CString::new(class).unwrap();
            let method = CString::new(method).unwrap();
            let args = CString::new(args).unwrap();
            let id = hybrid_bridge_invoke(
                self.bridge,
                Some(record_ok),
                Some(record_failed),
                self.calls as *mut c_void,
                class.as_ptr(),
                method.as_ptr(),
                args.as_ptr(),
            );
            assert!(!id.is_null());
            let owned = unsafe { CStr::from_ptr(id) }.to_owned();
            hybrid_free_string(id);
            owned
        }
    }

    impl Drop for Host {
        fn drop(&mut self) {
            hybrid_bridge_free(self.bridge);
            drop(unsafe { Box::from_raw(self.sent) });
            drop(unsafe { Box::from_raw(self.calls) });
        }
    }

    #[test]
    fn bridge_new_and_free() {
        let host = Host::new();
        assert_eq!(hybrid_bridge_pending(host.bridge), 0);
    }

    #[test]
    fn bridge_free_null_is_safe() {
        hybrid_bridge_free(std::ptr::null_mut());
    }

    #[test]
    fn invoke_posts_command_through_transport() {
        let host = Host::new();

        let id = host.invoke("sf::SFAuthPlugin", "getCredentials", "{}");
        assert_eq!(id.to_str().unwrap(), "sf::SFAuthPlugin_getCredentials_10");
        assert_eq!(host.sent().len(), 1);
        let message: Value = serde_json::from_str(&host.sent()[0]).unwrap();
        assert_eq!(message["callbackId"], "sf::SFAuthPlugin_getCredentials_10");
        assert_eq!(message["className"], "sf::SFAuthPlugin");
        assert_eq!(message["methodName"], "getCredentials");
        assert_eq!(hybrid_bridge_pending(host.bridge), 1);
    }

    #[test]
    fn invoke_null_args_sends_empty_object() {
        let host = Host::new();
        let class = CString::new("sf::SFAuthPlugin").unwrap();
        let method = CString::new("logout").unwrap();
        let id = hybrid_bridge_invoke(
            host.bridge,
            None,
            None,
            std::ptr::null_mut(),
            class.as_ptr(),
            method.as_ptr(),
            std::ptr::null(),
        );
        assert!(!id.is_null());
        hybrid_free_string(id);

        let message: Value = serde_json::from_str(&host.sent()[0]).unwrap();
        assert_eq!(message["arguments"], serde_json::json!({}));
    }

    #[test]
    fn invoke_invalid_args_returns_null_and_registers_nothing() {
        let host = Host::new();
        let class = CString::new("c").unwrap();
        let method = CString::new("m").unwrap();
        let args = CString::new("{not json").unwrap();
        let id = hybrid_bridge_invoke(
            host.bridge,
            None,
            None,
            std::ptr::null_mut(),
            class.as_ptr(),
            method.as_ptr(),
            args.as_ptr(),
        );
        assert!(id.is_null());
        assert!(host.sent().is_empty());
        assert_eq!(hybrid_bridge_pending(host.bridge), 0);
    }

    #[test]
    fn invoke_null_bridge_returns_null() {
        let class = CString::new("c").unwrap();
        let method = CString::new("m").unwrap();
        let id = hybrid_bridge_invoke(
            std::ptr::null_mut(),
            None,
            None,
            std::ptr::null_mut(),
            class.as_ptr(),
            method.as_ptr(),
            std::ptr::null(),
        );
        assert!(id.is_null());
    }

    #[test]
    fn deliver_routes_ok_and_failure() {
        let host = Host::new();
        let ok_id = host.invoke("c", "m", "{}");
        let fail_id = host.invoke("c", "m", "{}");
        let payload = CString::new(r#"{"records":[]}"#).unwrap();

        let d = hybrid_bridge_deliver(host.bridge, ok_id.as_ptr(), 1, payload.as_ptr(), false);
        assert_eq!(d, FfiDelivery::Succeeded);
        let d = hybrid_bridge_deliver(host.bridge, fail_id.as_ptr(), 9, std::ptr::null(), false);
        assert_eq!(d, FfiDelivery::Failed);

        assert_eq!(host.calls().ok, vec![r#"{"records":[]}"#.to_string()]);
        assert_eq!(host.calls().failed, vec!["null".to_string()]);
        assert_eq!(hybrid_bridge_pending(host.bridge), 0);

        let d = hybrid_bridge_deliver(host.bridge, ok_id.as_ptr(), 1, std::ptr::null(), false);
        assert_eq!(d, FfiDelivery::Unmatched);
        assert_eq!(host.calls().ok.len(), 1);
    }

    #[test]
    fn deliver_keep_callback_allows_repeats() {
        let host = Host::new();
        let id = host.invoke("c", "m", "{}");
        let payload = CString::new("1").unwrap();

        for _ in 0..2 {
            let d = hybrid_bridge_deliver(host.bridge, id.as_ptr(), 1, payload.as_ptr(), true);
            assert_eq!(d, FfiDelivery::Succeeded);
        }
        assert_eq!(host.calls().ok.len(), 2);
        assert_eq!(hybrid_bridge_pending(host.bridge), 1);
    }

    /// Handler state for a success handler that starts a second call.
    struct Chain {
        bridge: *mut FfiBridge,
        follow_up: Option<String>,
    }

    extern "C" fn start_follow_up(user_data: *mut c_void, _payload: *const c_char) {
        let chain = unsafe { &mut *(user_data as *mut Chain) };
        let class = CString::new("sf::SFRestPlugin").unwrap();
        let method = CString::new("sendRequestForVersions").unwrap();
        let id = hybrid_bridge_invoke(
            chain.bridge,
            None,
            None,
            std::ptr::null_mut(),
            class.as_ptr(),
            method.as_ptr(),
            std::ptr::null(),
        );
        if !id.is_null() {
            chain.follow_up = Some(unsafe { CStr::from_ptr(id) }.to_str().unwrap().to_string());
            hybrid_free_string(id);
        }
    }

    #[test]
    fn handler_can_invoke_on_the_same_bridge() {
        let host = Host::new();
        let chain = Box::into_raw(Box::new(Chain {
            bridge: host.bridge,
            follow_up: None,
        }));
        let class = CString::new("sf::SFAuthPlugin").unwrap();
        let method = CString::new("login").unwrap();
        let id = hybrid_bridge_invoke(
            host.bridge,
            Some(start_follow_up),
            None,
            chain as *mut c_void,
            class.as_ptr(),
            method.as_ptr(),
            std::ptr::null(),
        );
        assert!(!id.is_null());

        let d = hybrid_bridge_deliver(host.bridge, id, 1, std::ptr::null(), false);
        hybrid_free_string(id);
        assert_eq!(d, FfiDelivery::Succeeded);

        let chain = unsafe { Box::from_raw(chain) };
        assert_eq!(
            chain.follow_up.as_deref(),
            Some("sf::SFRestPlugin_sendRequestForVersions_11")
        );
        assert_eq!(host.sent().len(), 2);
        assert_eq!(hybrid_bridge_pending(host.bridge), 1);
    }

    #[test]
    fn deliver_invalid_payload_is_rejected() {
        let host = Host::new();
        let id = host.invoke("c", "m", "{}");
        let payload = CString::new("{oops").unwrap();

        let d = hybrid_bridge_deliver(host.bridge, id.as_ptr(), 1, payload.as_ptr(), false);
        assert_eq!(d, FfiDelivery::InvalidInput);
        assert!(host.calls().ok.is_empty());
        assert_eq!(hybrid_bridge_pending(host.bridge), 1);
    }

    #[test]
    fn deliver_null_arguments_are_rejected() {
        let d = hybrid_bridge_deliver(std::ptr::null_mut(), std::ptr::null(), 1, std::ptr::null(), false);
        assert_eq!(d, FfiDelivery::InvalidInput);
    }

    #[test]
    fn receive_json_completion() {
        let host = Host::new();
        let id = host.invoke("c", "m", "{}");
        let id = id.to_str().unwrap();

        let message = CString::new(format!(
            r#"{{"callbackId":"{id}","status":2,"message":"Plugin Execution Error"}}"#
        ))
        .unwrap();
        assert_eq!(hybrid_bridge_receive(host.bridge, message.as_ptr()), FfiDelivery::Failed);
        assert_eq!(host.calls().failed, vec![r#""Plugin Execution Error""#.to_string()]);

        let garbage = CString::new("nope").unwrap();
        assert_eq!(hybrid_bridge_receive(host.bridge, garbage.as_ptr()), FfiDelivery::InvalidInput);
    }

    #[test]
    fn render_tree_formats_json() {
        let json = CString::new(r#"{"a":1,"b":[2,3]}"#).unwrap();
        let out = hybrid_render_tree(json.as_ptr());
        assert!(!out.is_null());
        let text = unsafe { CStr::from_ptr(out) }.to_str().unwrap();
        assert_eq!(text, "{\n      a: 1,\n      b: [\n            2,\n            3,\n      ],\n}");
        hybrid_free_string(out);
    }

    #[test]
    fn render_tree_rejects_null_and_invalid() {
        assert!(hybrid_render_tree(std::ptr::null()).is_null());
        let bad = CString::new("[1,").unwrap();
        assert!(hybrid_render_tree(bad.as_ptr()).is_null());
    }

    #[test]
    fn pending_null_is_zero() {
        assert_eq!(hybrid_bridge_pending(std::ptr::null()), 0);
    }

    #[test]
    fn free_string_null_is_safe() {
        hybrid_free_string(std::ptr::null_mut());
    }
}
