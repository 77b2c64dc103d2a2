//! Renderable primitive handles
//!
//! Value-type stand-ins for the host renderer's scene-graph primitives.
//! Behaviors build these and hand them to the scene under a named object
//! slot; they are rebuilt, not mutated piecemeal, when their source
//! properties change.

use crate::foundation::math::Color;

/// Geometry attached to an object
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Axis-aligned box
    Box {
        /// Extent along X
        width: f32,
        /// Extent along Y
        height: f32,
        /// Extent along Z
        depth: f32,
    },
}

impl Geometry {
    /// Create a box geometry
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Self::Box {
            width,
            height,
            depth,
        }
    }

    /// Create a unit cube
    pub fn unit_cube() -> Self {
        Self::cuboid(1.0, 1.0, 1.0)
    }
}

/// Surface material for an object
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Base color
    pub color: Color,
}

impl Material {
    /// Create a material with the given base color
    pub fn with_color(color: Color) -> Self {
        Self { color }
    }
}

/// A renderable object: geometry paired with a material
///
/// The engine equivalent of a mesh node the host would draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Object3d {
    /// Shape of the object
    pub geometry: Geometry,

    /// Surface appearance
    pub material: Material,
}

impl Object3d {
    /// Create an object from geometry and material
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self { geometry, material }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_cube() {
        assert_eq!(
            Geometry::unit_cube(),
            Geometry::Box {
                width: 1.0,
                height: 1.0,
                depth: 1.0
            }
        );
    }

    #[test]
    fn test_object_construction() {
        let object = Object3d::new(
            Geometry::cuboid(2.0, 1.0, 0.5),
            Material::with_color(Color::rgb(1.0, 0.0, 0.0)),
        );
        assert_eq!(object.material.color, Color::rgb(1.0, 0.0, 0.0));
    }
}
