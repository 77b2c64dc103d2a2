//! Declarative scene configuration
//!
//! A scene declaration lists entities with an optional id, an optional
//! starting position, and the behaviors attached to them with raw property
//! values. Declarations load from RON or TOML and instantiate against a
//! live [`Scene`] and [`BehaviorSystem`].

use serde::{Deserialize, Serialize};

use crate::behavior::{AttachmentKey, BehaviorError, BehaviorSystem};
use crate::foundation::math::Vec3;
use crate::scene::{Scene, SceneError};
use crate::schema::RawProperties;

/// Scene configuration errors
#[derive(thiserror::Error, Debug)]
pub enum SceneConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(String),

    /// Unsupported format
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Scene graph rejected a declaration
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Behavior attachment failed
    #[error(transparent)]
    Behavior(#[from] BehaviorError),
}

/// One behavior attachment in a declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorDeclaration {
    /// Registered behavior name
    pub name: String,

    /// Raw property values, coerced against the behavior's schema at attach
    #[serde(default)]
    pub properties: RawProperties,
}

/// One entity in a declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDeclaration {
    /// Id other entities may select this one by
    #[serde(default)]
    pub id: Option<String>,

    /// Starting position, origin when omitted
    #[serde(default)]
    pub position: Option<(f32, f32, f32)>,

    /// Behaviors to attach, in order
    #[serde(default)]
    pub behaviors: Vec<BehaviorDeclaration>,
}

/// A complete declarative scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDeclaration {
    /// Entities to create
    #[serde(default)]
    pub entities: Vec<EntityDeclaration>,
}

impl SceneDeclaration {
    /// Parse a declaration from RON source
    pub fn from_ron_str(source: &str) -> Result<Self, SceneConfigError> {
        ron::from_str(source).map_err(|e| SceneConfigError::Parse(e.to_string()))
    }

    /// Parse a declaration from TOML source
    pub fn from_toml_str(source: &str) -> Result<Self, SceneConfigError> {
        toml::from_str(source).map_err(|e| SceneConfigError::Parse(e.to_string()))
    }

    /// Load a declaration from a `.ron` or `.toml` file
    pub fn load_from_file(path: &str) -> Result<Self, SceneConfigError> {
        if !path.ends_with(".ron") && !path.ends_with(".toml") {
            return Err(SceneConfigError::UnsupportedFormat(path.to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        if path.ends_with(".ron") {
            Self::from_ron_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        }
    }

    /// Build the declared entities and attachments
    ///
    /// Entities are created first, attachments second, so selectors resolve
    /// regardless of declaration order. Returns the attachment keys in
    /// declaration order.
    pub fn instantiate(
        &self,
        scene: &mut Scene,
        system: &mut BehaviorSystem,
    ) -> Result<Vec<AttachmentKey>, SceneConfigError> {
        let mut entities = Vec::with_capacity(self.entities.len());
        for declaration in &self.entities {
            let key = match &declaration.id {
                Some(id) => scene.create_entity_with_id(id)?,
                None => scene.create_entity(),
            };
            if let Some((x, y, z)) = declaration.position {
                scene.set_position(key, Vec3::new(x, y, z));
            }
            entities.push(key);
        }

        let mut attachments = Vec::new();
        for (entity, declaration) in entities.iter().zip(&self.entities) {
            for behavior in &declaration.behaviors {
                let key =
                    system.attach(scene, *entity, &behavior.name, &behavior.properties)?;
                attachments.push(key);
            }
        }
        log::info!(
            "instantiated {} entities with {} behavior attachment(s)",
            entities.len(),
            attachments.len()
        );
        Ok(attachments)
    }
}
