//! The behavior lifecycle: hook trait and per-attachment state machine

use crate::behavior::system::BehaviorContext;
use crate::schema::PropertyBag;

/// Lifecycle hooks a behavior implements
///
/// All hooks are host-invoked, run on one logical thread, and never overlap
/// for the same instance. `init` runs exactly once before any other hook;
/// `remove` runs at most once and is terminal.
pub trait Behavior {
    /// Allocate resources whose lifetime matches the whole attachment
    ///
    /// Properties are already coerced and defaulted, but may still change
    /// before the first `update`.
    fn init(&mut self, ctx: &mut BehaviorContext<'_>);

    /// React to a property change
    ///
    /// `previous` is empty on the very first call after `init`, which means
    /// "initial setup, nothing to tear down". Implementations diff against
    /// `previous`, tear down effects keyed on old values, and install effects
    /// keyed on new values. Must be a safe no-op when nothing watched
    /// changed.
    fn update(&mut self, ctx: &mut BehaviorContext<'_>, previous: &PropertyBag);

    /// Per-frame update, only scheduled for behaviors flagged `TICK`
    ///
    /// Runs on the frame critical path; must do bounded work and tolerate a
    /// zero `delta_ms`.
    fn tick(&mut self, ctx: &mut BehaviorContext<'_>, time_ms: f64, delta_ms: f64) {
        let _ = (ctx, time_ms, delta_ms);
    }

    /// Delivery of a subscribed scene event
    fn on_event(&mut self, ctx: &mut BehaviorContext<'_>, event: &str) {
        let _ = (ctx, event);
    }

    /// Remove every side effect installed by `init` and `update`
    ///
    /// Must be safe even when optional properties were never set.
    fn remove(&mut self, ctx: &mut BehaviorContext<'_>) {
        let _ = ctx;
    }
}

/// State of one behavior attachment
///
/// `Uninitialized → Attached → Detached`; no transition skips `Attached` and
/// `Detached` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Created but `init` has not run yet
    #[default]
    Uninitialized,
    /// `init` ran; updates, ticks, and events may be delivered
    Attached,
    /// `remove` ran; terminal
    Detached,
}

impl LifecycleState {
    /// Transition after `init` has run
    pub fn attach(&mut self) {
        debug_assert_eq!(*self, Self::Uninitialized);
        *self = Self::Attached;
    }

    /// Transition after `remove` has run
    pub fn detach(&mut self) {
        debug_assert_eq!(*self, Self::Attached);
        *self = Self::Detached;
    }

    /// Whether update/tick/event hooks may be delivered
    pub fn is_attached(self) -> bool {
        self == Self::Attached
    }

    /// Whether this attachment reached its terminal state
    pub fn is_detached(self) -> bool {
        self == Self::Detached
    }
}
