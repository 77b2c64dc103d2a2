//! Built-in behaviors
//!
//! The stock set: `log`, `box`, `follow`, and `change-color-on-hover`. Each
//! file holds one behavior with its schema and descriptor.

pub mod box_mesh;
pub mod follow;
pub mod hover_color;
pub mod log;

pub use box_mesh::BoxMeshBehavior;
pub use follow::FollowBehavior;
pub use hover_color::HoverColorBehavior;
pub use log::LogBehavior;

use crate::behavior::BehaviorRegistry;

/// Register every built-in behavior type
pub fn register_builtins(registry: &mut BehaviorRegistry) {
    registry.register(log::descriptor());
    registry.register(box_mesh::descriptor());
    registry.register(follow::descriptor());
    registry.register(hover_color::descriptor());
}

/// A registry preloaded with the built-in behaviors
pub fn builtin_registry() -> BehaviorRegistry {
    let mut registry = BehaviorRegistry::new();
    register_builtins(&mut registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_registered() {
        let registry = builtin_registry();
        for name in ["log", "box", "follow", "change-color-on-hover"] {
            assert!(registry.contains(name), "missing builtin '{name}'");
        }
        assert_eq!(registry.len(), 4);
    }
}
