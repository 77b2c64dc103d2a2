//! In-memory scene graph capability
//!
//! The host side of the behavior contract: entities with positions, named
//! attributes, and named object slots. Behaviors never touch the scene
//! directly; they go through the context handed to their lifecycle hooks, so
//! the whole engine runs headless against this capability.
//!
//! Writing an attribute re-validates the entity: a `"color"` write recolors
//! the material of the `"mesh"` slot, and a `"position"` write is parsed
//! into the entity's position vector, mirroring how a declarative host
//! re-applies derived state after an attribute change. Position is never
//! duplicated in the attribute map; the vector is the single source of
//! truth and attribute reads derive from it.

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::foundation::math::Vec3;
use crate::render::Object3d;
use crate::schema::PropertyValue;

slotmap::new_key_type! {
    /// Stable handle to a scene entity
    pub struct EntityKey;
}

/// The object slot a box mesh occupies, by convention
pub const MESH_SLOT: &str = "mesh";

/// Attribute name carrying an entity's display color
pub const COLOR_ATTRIBUTE: &str = "color";

/// Attribute name mirroring an entity's position, written as `"x y z"`
pub const POSITION_ATTRIBUTE: &str = "position";

/// Errors from scene graph mutation
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// An entity with this id already exists
    #[error("duplicate entity id '{0}'")]
    DuplicateId(String),
}

/// One entity's record: identity, placement, attributes, and object slots
#[derive(Debug, Default)]
struct EntityRecord {
    id: Option<String>,
    position: Vec3,
    attributes: HashMap<String, PropertyValue>,
    objects: HashMap<String, Object3d>,
}

/// The scene graph: a flat set of entities addressed by [`EntityKey`]
#[derive(Default)]
pub struct Scene {
    entities: SlotMap<EntityKey, EntityRecord>,
    ids: HashMap<String, EntityKey>,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an anonymous entity at the origin
    pub fn create_entity(&mut self) -> EntityKey {
        self.entities.insert(EntityRecord::default())
    }

    /// Create an entity addressable by id (the selector namespace)
    pub fn create_entity_with_id(&mut self, id: &str) -> Result<EntityKey, SceneError> {
        if self.ids.contains_key(id) {
            return Err(SceneError::DuplicateId(id.to_string()));
        }
        let key = self.entities.insert(EntityRecord {
            id: Some(id.to_string()),
            ..EntityRecord::default()
        });
        self.ids.insert(id.to_string(), key);
        Ok(key)
    }

    /// Remove an entity and everything it owns
    pub fn remove_entity(&mut self, key: EntityKey) {
        if let Some(record) = self.entities.remove(key) {
            if let Some(id) = record.id {
                self.ids.remove(&id);
            }
        }
    }

    /// Whether the key names a live entity
    pub fn contains(&self, key: EntityKey) -> bool {
        self.entities.contains_key(key)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Resolve an entity id to its key
    pub fn resolve(&self, id: &str) -> Option<EntityKey> {
        self.ids.get(id).copied()
    }

    /// Get an entity's position
    pub fn position(&self, key: EntityKey) -> Option<Vec3> {
        self.entities.get(key).map(|record| record.position)
    }

    /// Set an entity's position
    pub fn set_position(&mut self, key: EntityKey, position: Vec3) {
        if let Some(record) = self.entities.get_mut(key) {
            record.position = position;
        } else {
            log::debug!("set_position on stale entity key, ignored");
        }
    }

    /// Attach a renderable object under a named slot, replacing any previous
    pub fn set_object(&mut self, key: EntityKey, slot: &str, object: Object3d) {
        if let Some(record) = self.entities.get_mut(key) {
            record.objects.insert(slot.to_string(), object);
        } else {
            log::debug!("set_object('{slot}') on stale entity key, ignored");
        }
    }

    /// Inspect the object in a named slot
    pub fn object(&self, key: EntityKey, slot: &str) -> Option<&Object3d> {
        self.entities.get(key).and_then(|record| record.objects.get(slot))
    }

    /// Mutate the object in a named slot
    pub fn object_mut(&mut self, key: EntityKey, slot: &str) -> Option<&mut Object3d> {
        self.entities
            .get_mut(key)
            .and_then(|record| record.objects.get_mut(slot))
    }

    /// Detach and return the object in a named slot
    ///
    /// Clearing a slot that is already empty is a safe no-op.
    pub fn remove_object(&mut self, key: EntityKey, slot: &str) -> Option<Object3d> {
        self.entities
            .get_mut(key)
            .and_then(|record| record.objects.remove(slot))
    }

    /// Read a named attribute
    ///
    /// Falls back to derived state when the attribute was never written
    /// explicitly: `"color"` reads through to the mesh slot's material, and
    /// `"position"` always reads from the entity's position vector.
    pub fn attribute(&self, key: EntityKey, name: &str) -> Option<PropertyValue> {
        let record = self.entities.get(key)?;
        if name == POSITION_ATTRIBUTE {
            let p = record.position;
            return Some(PropertyValue::Str(format!("{} {} {}", p.x, p.y, p.z)));
        }
        if let Some(value) = record.attributes.get(name) {
            return Some(value.clone());
        }
        if name == COLOR_ATTRIBUTE {
            return record
                .objects
                .get(MESH_SLOT)
                .map(|object| PropertyValue::Color(object.material.color));
        }
        None
    }

    /// Write a named attribute and re-validate the entity
    ///
    /// A `"position"` write is parsed as `"x y z"` and mirrored into the
    /// position vector instead of being stored; a malformed position value
    /// is ignored.
    pub fn set_attribute(&mut self, key: EntityKey, name: &str, value: PropertyValue) {
        let Some(record) = self.entities.get_mut(key) else {
            log::debug!("set_attribute('{name}') on stale entity key, ignored");
            return;
        };
        if name == POSITION_ATTRIBUTE {
            match parse_position(&value) {
                Some(position) => record.position = position,
                None => log::debug!("set_attribute('position') with unparseable value, ignored"),
            }
            return;
        }
        if name == COLOR_ATTRIBUTE {
            if let PropertyValue::Color(color) = value {
                if let Some(object) = record.objects.get_mut(MESH_SLOT) {
                    object.material.color = color;
                }
            }
        }
        record.attributes.insert(name.to_string(), value);
    }
}

/// Parse a `"x y z"` position attribute value
fn parse_position(value: &PropertyValue) -> Option<Vec3> {
    let PropertyValue::Str(s) = value else {
        return None;
    };
    let mut parts = s.split_whitespace().map(str::parse::<f32>);
    let x = parts.next()?.ok()?;
    let y = parts.next()?.ok()?;
    let z = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Vec3::new(x, y, z))
}
