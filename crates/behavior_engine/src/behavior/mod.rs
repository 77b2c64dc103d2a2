//! Behavior lifecycle contract and host-side driver
//!
//! A behavior is a small unit of declarative logic attached to a scene
//! entity. The host owns the lifecycle: it constructs the instance, coerces
//! its properties against the declared schema, and invokes the hooks in a
//! fixed order. Behaviors never call their own hooks.

pub mod events;
pub mod lifecycle;
pub mod registry;
pub mod system;

slotmap::new_key_type! {
    /// Stable handle to one behavior attachment
    pub struct AttachmentKey;

    /// Stable handle to one event subscription
    ///
    /// This is the Rust rendition of holding on to the exact handler
    /// reference used at registration time: a behavior stores the handle it
    /// got from `subscribe` and removal by that handle is always precise.
    pub struct ListenerHandle;
}

pub use events::SubscriptionTable;
pub use lifecycle::{Behavior, LifecycleState};
pub use registry::{BehaviorDescriptor, BehaviorFlags, BehaviorRegistry};
pub use system::{BehaviorContext, BehaviorError, BehaviorSystem};
