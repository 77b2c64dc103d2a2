//! `box`: keep a colored box mesh attached under the `"mesh"` slot
//!
//! Geometry and material are two independently gated effect groups: a
//! dimension change rebuilds the geometry (once per update, however many
//! dimensions changed), a color change replaces only the material color.
//! Geometry is reconstructed rather than mutated in place.

use bitflags::bitflags;

use crate::behavior::registry::BehaviorDescriptor;
use crate::behavior::system::BehaviorContext;
use crate::behavior::Behavior;
use crate::foundation::math::Color;
use crate::render::{Geometry, Material, Object3d};
use crate::scene::MESH_SLOT;
use crate::schema::{PropertyBag, PropertyValue, Schema};

bitflags! {
    /// Which effect groups an update touched
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct BoxDirty: u8 {
        /// A dimension changed; rebuild the geometry
        const GEOMETRY = 1;
        /// The color changed; replace the material color
        const MATERIAL = 1 << 1;
    }
}

/// Compute the effect groups that differ between two snapshots
pub(crate) fn dirty_between(data: &PropertyBag, previous: &PropertyBag) -> BoxDirty {
    let mut dirty = BoxDirty::empty();
    if ["width", "height", "depth"]
        .iter()
        .any(|name| data.changed_from(previous, name))
    {
        dirty |= BoxDirty::GEOMETRY;
    }
    if data.changed_from(previous, "color") {
        dirty |= BoxDirty::MATERIAL;
    }
    dirty
}

/// Schema: unit cube dimensions and the stock `#AAA` color
pub fn schema() -> Schema {
    Schema::new()
        .property("width", PropertyValue::Number(1.0))
        .property("height", PropertyValue::Number(1.0))
        .property("depth", PropertyValue::Number(1.0))
        .property("color", PropertyValue::Color(Color::from_u8(0xAA, 0xAA, 0xAA)))
}

/// Descriptor for registration
pub fn descriptor() -> BehaviorDescriptor {
    BehaviorDescriptor::new("box", schema(), || Box::new(BoxMeshBehavior))
}

/// The `box` behavior instance
///
/// Stateless: the mesh it manages lives on the entity's object slot.
pub struct BoxMeshBehavior;

fn geometry_from(data: &PropertyBag) -> Geometry {
    Geometry::cuboid(
        data.number_of("width").unwrap_or(1.0),
        data.number_of("height").unwrap_or(1.0),
        data.number_of("depth").unwrap_or(1.0),
    )
}

fn color_from(data: &PropertyBag) -> Color {
    data.color_of("color")
        .unwrap_or_else(|| Color::from_u8(0xAA, 0xAA, 0xAA))
}

impl Behavior for BoxMeshBehavior {
    fn init(&mut self, ctx: &mut BehaviorContext<'_>) {
        let object = Object3d::new(
            geometry_from(ctx.data()),
            Material::with_color(color_from(ctx.data())),
        );
        ctx.set_object(MESH_SLOT, object);
    }

    fn update(&mut self, ctx: &mut BehaviorContext<'_>, previous: &PropertyBag) {
        // Empty snapshot means we are still initializing; `init` already
        // built the mesh from the same data.
        if previous.is_empty() {
            return;
        }

        let dirty = dirty_between(ctx.data(), previous);
        if dirty.is_empty() {
            return;
        }

        let geometry = dirty
            .contains(BoxDirty::GEOMETRY)
            .then(|| geometry_from(ctx.data()));
        let color = dirty
            .contains(BoxDirty::MATERIAL)
            .then(|| color_from(ctx.data()));

        let Some(object) = ctx.object_mut(MESH_SLOT) else {
            log::warn!(target: "behavior::box", "mesh slot is empty during update");
            return;
        };
        if let Some(geometry) = geometry {
            object.geometry = geometry;
        }
        if let Some(color) = color {
            object.material.color = color;
        }
    }

    fn remove(&mut self, ctx: &mut BehaviorContext<'_>) {
        ctx.remove_object(MESH_SLOT);
    }
}
