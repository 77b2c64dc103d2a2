//! # Behavior Engine
//!
//! A declarative behavior component engine: small units of logic attach to
//! scene entities, declare a typed and defaulted property schema, and react
//! to property changes, frame ticks, and entity events through a
//! host-driven lifecycle.
//!
//! ## Features
//!
//! - **Lifecycle contract**: `init` / `update(previous)` / `tick` /
//!   `on_event` / `remove`, driven by the host, never self-invoked
//! - **Schema-driven properties**: typed defaults, string coercion, and
//!   diff-based change detection against the previous snapshot
//! - **Headless scene capability**: entities, object slots, attributes, and
//!   event subscriptions with no renderer required
//! - **Built-in behaviors**: `log`, `box`, `follow`, `change-color-on-hover`
//! - **Declarative scenes**: RON/TOML scene files instantiated in one call
//!
//! ## Quick Start
//!
//! ```
//! use behavior_engine::prelude::*;
//! use behavior_engine::behaviors::builtin_registry;
//!
//! let mut scene = Scene::new();
//! let mut system = BehaviorSystem::new(builtin_registry());
//!
//! let target = scene.create_entity_with_id("target")?;
//! scene.set_position(target, Vec3::new(0.0, 0.0, 5.0));
//!
//! let chaser = scene.create_entity();
//! let props = Schema::parse_declaration("target: #target; speed: 2")?;
//! system.attach(&mut scene, chaser, "follow", &props)?;
//!
//! system.tick(&mut scene, 16.0, 16.0);
//! assert!(scene.position(chaser).unwrap().z > 0.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod behavior;
pub mod behaviors;
pub mod config;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod schema;

pub use behavior::{Behavior, BehaviorContext, BehaviorError, BehaviorRegistry, BehaviorSystem};
pub use scene::{EntityKey, Scene};
pub use schema::{PropertyBag, PropertyValue, Schema};

/// Common imports for engine users
pub mod prelude {
    pub use crate::behavior::{
        AttachmentKey, Behavior, BehaviorContext, BehaviorDescriptor, BehaviorError,
        BehaviorFlags, BehaviorRegistry, BehaviorSystem, ListenerHandle,
    };
    pub use crate::config::{SceneConfigError, SceneDeclaration};
    pub use crate::foundation::{
        math::{Color, Vec3},
        time::FrameTimer,
    };
    pub use crate::render::{Geometry, Material, Object3d};
    pub use crate::scene::{
        EntityKey, Scene, SceneError, COLOR_ATTRIBUTE, MESH_SLOT, POSITION_ATTRIBUTE,
    };
    pub use crate::schema::{
        PropertyBag, PropertyType, PropertyValue, RawProperties, Schema, SchemaError,
    };
}
