//! `follow`: move toward a target entity each frame
//!
//! Per tick the behavior computes the vector to its target and displaces by
//! `speed * delta_ms / 1000` along it. Inside the proximity hold radius it
//! does not move at all, which prevents jitter and overshoot around the
//! target. A target that does not (yet) resolve is a no-op for that frame:
//! declarative scenes may attach the follower before the target exists.

use crate::behavior::registry::{BehaviorDescriptor, BehaviorFlags};
use crate::behavior::system::BehaviorContext;
use crate::behavior::Behavior;
use crate::foundation::math::Vec3;
use crate::schema::{PropertyBag, PropertyValue, Schema};

/// No movement once the target is this close, in scene units
pub const PROXIMITY_HOLD: f32 = 1.0;

/// Schema: `target` (selector) and `speed` (units per second)
pub fn schema() -> Schema {
    Schema::new()
        .property("target", PropertyValue::Selector(String::new()))
        .property("speed", PropertyValue::Number(0.0))
}

/// Descriptor for registration; `follow` runs every frame
pub fn descriptor() -> BehaviorDescriptor {
    BehaviorDescriptor::new("follow", schema(), || Box::new(FollowBehavior::new()))
        .with_flags(BehaviorFlags::TICK)
}

/// The `follow` behavior instance
pub struct FollowBehavior {
    /// Scratch direction vector, reused across frames
    direction: Vec3,
}

impl FollowBehavior {
    /// Create an instance with a zeroed scratch vector
    pub fn new() -> Self {
        Self {
            direction: Vec3::zeros(),
        }
    }
}

impl Default for FollowBehavior {
    fn default() -> Self {
        Self::new()
    }
}

impl Behavior for FollowBehavior {
    fn init(&mut self, _ctx: &mut BehaviorContext<'_>) {}

    fn update(&mut self, _ctx: &mut BehaviorContext<'_>, _previous: &PropertyBag) {
        // No installed side effects; target and speed are read each tick.
    }

    fn tick(&mut self, ctx: &mut BehaviorContext<'_>, _time_ms: f64, delta_ms: f64) {
        if delta_ms <= 0.0 {
            return;
        }

        let target_id = ctx.data().selector_of("target").unwrap_or_default();
        if target_id.is_empty() {
            return;
        }
        let Some(target) = ctx.resolve(target_id) else {
            log::debug!(target: "behavior::follow", "target '{target_id}' not resolved");
            return;
        };
        let Some(target_position) = ctx.position_of(target) else {
            return;
        };

        let current = ctx.position();
        self.direction = target_position - current;

        let distance = self.direction.norm();
        if distance <= PROXIMITY_HOLD {
            // Close enough; holding avoids oscillating around the target
            // and keeps the math clear of a zero divisor.
            return;
        }

        let speed = ctx.data().number_of("speed").unwrap_or(0.0);
        let factor = speed / distance * (delta_ms / 1000.0) as f32;
        ctx.set_position(current + self.direction * factor);
    }
}
