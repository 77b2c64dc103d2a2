//! `change-color-on-hover`: apply a color while the pointer hovers
//!
//! On hover-enter the configured color is written to the entity's color
//! attribute; on hover-exit the color captured at creation is restored. Both
//! listeners are removed again on detach.

use crate::behavior::registry::BehaviorDescriptor;
use crate::behavior::system::BehaviorContext;
use crate::behavior::{Behavior, ListenerHandle};
use crate::foundation::math::Color;
use crate::scene::COLOR_ATTRIBUTE;
use crate::schema::{PropertyBag, PropertyValue, Schema};

/// Event fired when the pointer starts hovering the entity
pub const HOVER_ENTER: &str = "mouseenter";

/// Event fired when the pointer stops hovering the entity
pub const HOVER_LEAVE: &str = "mouseleave";

/// Schema: the hover color, red by default
pub fn schema() -> Schema {
    Schema::new().property("color", PropertyValue::Color(Color::rgb(1.0, 0.0, 0.0)))
}

/// Descriptor for registration
pub fn descriptor() -> BehaviorDescriptor {
    BehaviorDescriptor::new("change-color-on-hover", schema(), || {
        Box::new(HoverColorBehavior::new())
    })
}

/// The `change-color-on-hover` behavior instance
pub struct HoverColorBehavior {
    /// Color to restore on hover-exit, captured at creation
    default_color: Option<Color>,
    enter: Option<ListenerHandle>,
    leave: Option<ListenerHandle>,
}

impl HoverColorBehavior {
    /// Create an unbound instance
    pub fn new() -> Self {
        Self {
            default_color: None,
            enter: None,
            leave: None,
        }
    }

    fn current_color(ctx: &BehaviorContext<'_>) -> Option<Color> {
        ctx.attribute(COLOR_ATTRIBUTE)
            .and_then(|value| value.as_color())
    }
}

impl Default for HoverColorBehavior {
    fn default() -> Self {
        Self::new()
    }
}

impl Behavior for HoverColorBehavior {
    fn init(&mut self, ctx: &mut BehaviorContext<'_>) {
        self.default_color = Self::current_color(ctx);
        self.enter = Some(ctx.subscribe(HOVER_ENTER));
        self.leave = Some(ctx.subscribe(HOVER_LEAVE));
    }

    fn update(&mut self, _ctx: &mut BehaviorContext<'_>, _previous: &PropertyBag) {
        // The hover color is read at event time; a change needs no
        // teardown or reinstall.
    }

    fn on_event(&mut self, ctx: &mut BehaviorContext<'_>, event: &str) {
        match event {
            HOVER_ENTER => {
                if self.default_color.is_none() {
                    // The mesh may have arrived after init; capture the
                    // restore color before overwriting it.
                    self.default_color = Self::current_color(ctx);
                }
                if let Some(color) = ctx.data().color_of("color") {
                    ctx.set_attribute(COLOR_ATTRIBUTE, PropertyValue::Color(color));
                }
            }
            HOVER_LEAVE => {
                if let Some(color) = self.default_color {
                    ctx.set_attribute(COLOR_ATTRIBUTE, PropertyValue::Color(color));
                }
            }
            _ => {}
        }
    }

    fn remove(&mut self, ctx: &mut BehaviorContext<'_>) {
        for handle in [self.enter.take(), self.leave.take()].into_iter().flatten() {
            ctx.unsubscribe(handle);
        }
    }
}
