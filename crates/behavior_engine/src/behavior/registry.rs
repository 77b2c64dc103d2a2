//! Behavior type registration
//!
//! A descriptor couples a behavior's name to its property schema, its
//! capability flags, and a factory for fresh instances. The host consults
//! the registry at attach time to coerce properties and construct the
//! instance.

use std::collections::HashMap;

use bitflags::bitflags;

use crate::behavior::lifecycle::Behavior;
use crate::schema::Schema;

bitflags! {
    /// Capabilities a behavior type declares up front
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BehaviorFlags: u8 {
        /// Instance wants per-frame `tick` calls
        const TICK = 1;
        /// Several instances may coexist on one entity
        const MULTIPLE = 1 << 1;
    }
}

/// Factory producing a fresh behavior instance
pub type BehaviorFactory = Box<dyn Fn() -> Box<dyn Behavior>>;

/// Registration record for one behavior type
pub struct BehaviorDescriptor {
    name: &'static str,
    schema: Schema,
    flags: BehaviorFlags,
    factory: BehaviorFactory,
}

impl BehaviorDescriptor {
    /// Create a descriptor with no capability flags
    pub fn new(
        name: &'static str,
        schema: Schema,
        factory: impl Fn() -> Box<dyn Behavior> + 'static,
    ) -> Self {
        Self {
            name,
            schema,
            flags: BehaviorFlags::empty(),
            factory: Box::new(factory),
        }
    }

    /// Declare capability flags
    pub fn with_flags(mut self, flags: BehaviorFlags) -> Self {
        self.flags = flags;
        self
    }

    /// The behavior's registered name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared property schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The declared capability flags
    pub fn flags(&self) -> BehaviorFlags {
        self.flags
    }

    /// Construct a fresh, uninitialized instance
    pub fn instantiate(&self) -> Box<dyn Behavior> {
        (self.factory)()
    }
}

impl std::fmt::Debug for BehaviorDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorDescriptor")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// Registry of all behavior types known to the host
#[derive(Default)]
pub struct BehaviorRegistry {
    descriptors: HashMap<&'static str, BehaviorDescriptor>,
}

impl BehaviorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a behavior type, replacing any previous registration
    pub fn register(&mut self, descriptor: BehaviorDescriptor) {
        let name = descriptor.name();
        if self.descriptors.insert(name, descriptor).is_some() {
            log::warn!("behavior '{name}' registered twice, replacing");
        }
    }

    /// Look up a behavior type by name
    pub fn get(&self, name: &str) -> Option<&BehaviorDescriptor> {
        self.descriptors.get(name)
    }

    /// Whether a behavior type is registered
    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Number of registered behavior types
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::system::BehaviorContext;
    use crate::schema::PropertyBag;

    struct Inert;

    impl Behavior for Inert {
        fn init(&mut self, _ctx: &mut BehaviorContext<'_>) {}
        fn update(&mut self, _ctx: &mut BehaviorContext<'_>, _previous: &PropertyBag) {}
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = BehaviorRegistry::new();
        registry.register(
            BehaviorDescriptor::new("inert", Schema::new(), || Box::new(Inert))
                .with_flags(BehaviorFlags::TICK),
        );

        let descriptor = registry.get("inert").unwrap();
        assert_eq!(descriptor.name(), "inert");
        assert!(descriptor.flags().contains(BehaviorFlags::TICK));
        assert!(!descriptor.flags().contains(BehaviorFlags::MULTIPLE));
        assert!(!registry.contains("missing"));
    }

    #[test]
    fn test_reregistration_replaces() {
        let mut registry = BehaviorRegistry::new();
        registry.register(BehaviorDescriptor::new("inert", Schema::new(), || {
            Box::new(Inert)
        }));
        registry.register(
            BehaviorDescriptor::new("inert", Schema::new(), || Box::new(Inert))
                .with_flags(BehaviorFlags::MULTIPLE),
        );

        assert_eq!(registry.len(), 1);
        let descriptor = registry.get("inert").unwrap();
        assert!(descriptor.flags().contains(BehaviorFlags::MULTIPLE));
    }
}
