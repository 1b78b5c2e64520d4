//! Routes plugin invocations to the host and completions back to callers.
//!
//! # Design
//! `Bridge` owns its callback registry; there is no process-wide state. The
//! bridge never waits on the host: `invoke` registers the handlers, hands the
//! encoded command to the `Transport` and returns. Whenever the host has a
//! result it calls `deliver` (or `receive` with the JSON form), possibly much
//! later and in any order relative to other pending calls.
//!
//! Every operation takes `&self`, so a handler holding the bridge (an `Rc`,
//! or the raw handle on the C side) may start a follow-up call or deliver
//! another completion while it runs. The entry being delivered is taken out
//! of the registry for the duration of its handler and put back afterwards
//! when the completion keeps it alive. Commands posted while the transport is
//! already busy are queued and sent, in order, by the outermost post.
//!
//! A response that never arrives leaves its entry registered for the life of
//! the bridge; there is no timeout or cancellation.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::callback::{CallbackIds, CallbackRegistry, Callbacks};
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::message::{CallbackResponse, PluginCommand};
use crate::status::CommandStatus;

/// Host-provided sink for outbound commands.
pub trait Transport {
    fn post_message(&mut self, message: &str);
}

impl<F: FnMut(&str)> Transport for F {
    fn post_message(&mut self, message: &str) {
        self(message)
    }
}

/// What a completion did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Status was OK; the success handler (if any) ran.
    Succeeded,
    /// Status was anything else; the failure handler (if any) ran.
    Failed,
    /// No pending callback has this identifier.
    Unmatched,
}

/// Web-side end of the hybrid bridge.
pub struct Bridge<T> {
    transport: RefCell<T>,
    outbox: RefCell<VecDeque<String>>,
    ids: Cell<CallbackIds>,
    callbacks: RefCell<CallbackRegistry>,
}

impl<T: Transport> Bridge<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, BridgeConfig::default())
    }

    pub fn with_config(transport: T, config: BridgeConfig) -> Self {
        Self {
            transport: RefCell::new(transport),
            outbox: RefCell::default(),
            ids: Cell::new(CallbackIds::new(&config)),
            callbacks: RefCell::default(),
        }
    }

    /// Ask the host to run `method_name` on plugin `class_name`.
    ///
    /// Returns the identifier the host will echo back with each completion.
    /// `args` is encoded before anything is registered, so an encoding error
    /// leaves no pending entry behind.
    pub fn invoke<A: Serialize + ?Sized>(
        &self,
        callbacks: Callbacks,
        class_name: &str,
        method_name: &str,
        args: &A,
    ) -> Result<String, BridgeError> {
        let arguments = serde_json::to_value(args).map_err(BridgeError::Encode)?;
        let mut ids = self.ids.get();
        let command = PluginCommand {
            callback_id: ids.next_id(class_name, method_name),
            class_name: class_name.to_string(),
            method_name: method_name.to_string(),
            arguments,
        };
        let message = command.to_json()?;
        self.ids.set(ids);

        self.callbacks
            .borrow_mut()
            .insert(command.callback_id.clone(), callbacks);
        self.outbox.borrow_mut().push_back(message);
        self.flush();
        Ok(command.callback_id)
    }

    /// Post queued commands. A nested call made from inside `post_message`
    /// leaves its command queued for the outer loop.
    fn flush(&self) {
        let Ok(mut transport) = self.transport.try_borrow_mut() else {
            return;
        };
        loop {
            let Some(message) = self.outbox.borrow_mut().pop_front() else {
                break;
            };
            debug!("posting {message}");
            transport.post_message(&message);
        }
    }

    /// Route one completion to the handlers registered under `callback_id`.
    ///
    /// Status `1` (OK) goes to the success handler and every other code to the
    /// failure handler. The entry is dropped afterwards unless `keep_callback`
    /// is set, in which case later completions for the same id are routed too.
    pub fn deliver(
        &self,
        callback_id: &str,
        status: i32,
        payload: Value,
        keep_callback: bool,
    ) -> Delivery {
        let succeeded = CommandStatus::try_from(status).is_ok_and(CommandStatus::is_ok);

        let removed = self.callbacks.borrow_mut().remove(callback_id);
        let Some(mut callbacks) = removed else {
            debug!("no pending callback for {callback_id}");
            return Delivery::Unmatched;
        };

        debug!("delivering status {status} to {callback_id} (keep: {keep_callback})");
        let handler = if succeeded {
            callbacks.success.as_mut()
        } else {
            callbacks.failure.as_mut()
        };
        if let Some(handler) = handler {
            handler(payload);
        }

        if keep_callback {
            self.callbacks
                .borrow_mut()
                .insert(callback_id.to_string(), callbacks);
        }

        if succeeded {
            Delivery::Succeeded
        } else {
            Delivery::Failed
        }
    }

    /// Decode a JSON `CallbackResponse` and deliver it.
    pub fn receive(&self, text: &str) -> Result<Delivery, BridgeError> {
        let response = CallbackResponse::from_json(text)?;
        Ok(self.deliver(
            &response.callback_id,
            response.status,
            response.message,
            response.keep_callback,
        ))
    }

    /// Number of invocations still awaiting a completion.
    ///
    /// An entry whose handler is running right now is not counted.
    pub fn pending(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub fn is_pending(&self, callback_id: &str) -> bool {
        self.callbacks.borrow().contains(callback_id)
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.transport.get_mut()
    }
}
