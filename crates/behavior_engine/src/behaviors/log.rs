//! `log`: emit a message, either immediately or when an event fires
//!
//! With no `event` configured the message is emitted as soon as the
//! properties settle. With an `event`, the behavior keeps exactly one
//! listener bound to the current event name; re-pointing `event` removes the
//! old binding by its stored handle before installing the new one.
//!
//! Updates are diff-gated on `event`: changing only `message` neither
//! re-emits nor touches the binding, so redundant property writes stay
//! side-effect free. Emission happens at attach time, when `event` is
//! cleared back to empty, and on each matching event fire.

use crate::behavior::registry::{BehaviorDescriptor, BehaviorFlags};
use crate::behavior::system::BehaviorContext;
use crate::behavior::{Behavior, ListenerHandle};
use crate::schema::{PropertyBag, PropertyValue, Schema};

/// Default message, matching the stock declaration
const DEFAULT_MESSAGE: &str = "Hello, World!!!";

/// Schema: `event` (string, optional) and `message` (string)
pub fn schema() -> Schema {
    Schema::new()
        .property("event", PropertyValue::Str(String::new()))
        .property("message", PropertyValue::Str(DEFAULT_MESSAGE.to_string()))
}

/// Descriptor for registration; `log` supports multiple instances per entity
pub fn descriptor() -> BehaviorDescriptor {
    BehaviorDescriptor::new("log", schema(), || Box::new(LogBehavior::new()))
        .with_flags(BehaviorFlags::MULTIPLE)
}

/// The `log` behavior instance
pub struct LogBehavior {
    subscription: Option<ListenerHandle>,
}

impl LogBehavior {
    /// Create an unbound instance
    pub fn new() -> Self {
        Self { subscription: None }
    }

    fn emit(data: &PropertyBag) {
        let message = data.str_of("message").unwrap_or(DEFAULT_MESSAGE);
        log::info!(target: "behavior::log", "{message}");
    }
}

impl Default for LogBehavior {
    fn default() -> Self {
        Self::new()
    }
}

impl Behavior for LogBehavior {
    fn init(&mut self, _ctx: &mut BehaviorContext<'_>) {
        log::trace!(target: "behavior::log", "init");
    }

    fn update(&mut self, ctx: &mut BehaviorContext<'_>, previous: &PropertyBag) {
        let rebind = previous.is_empty() || ctx.data().changed_from(previous, "event");
        if !rebind {
            return;
        }

        // Tear down the binding keyed on the old event name first. The
        // stored handle is the same one registration returned, so removal
        // is precise even after many re-points.
        if let Some(handle) = self.subscription.take() {
            ctx.unsubscribe(handle);
        }

        let event = ctx.data().str_of("event").unwrap_or_default().to_string();
        if event.is_empty() {
            // No event configured: emit right away.
            Self::emit(ctx.data());
        } else {
            self.subscription = Some(ctx.subscribe(&event));
        }
    }

    fn on_event(&mut self, ctx: &mut BehaviorContext<'_>, _event: &str) {
        Self::emit(ctx.data());
    }

    fn remove(&mut self, ctx: &mut BehaviorContext<'_>) {
        // Safe when `event` was never set: there is simply nothing stored.
        if let Some(handle) = self.subscription.take() {
            ctx.unsubscribe(handle);
        }
    }
}
