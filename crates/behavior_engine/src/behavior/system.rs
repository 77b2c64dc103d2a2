//! Host-side driver for behavior attachments
//!
//! [`BehaviorSystem`] owns every attachment and is the only thing that
//! invokes lifecycle hooks. It coerces properties through the registered
//! schema, enforces the lifecycle state machine, routes emitted events to
//! subscribed attachments, and sweeps residual subscriptions on detach.
//!
//! The scene is passed into each operation rather than owned, so the driver
//! and the scene capability stay independently testable.

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::behavior::events::SubscriptionTable;
use crate::behavior::lifecycle::{Behavior, LifecycleState};
use crate::behavior::registry::{BehaviorFlags, BehaviorRegistry};
use crate::behavior::{AttachmentKey, ListenerHandle};
use crate::foundation::math::Vec3;
use crate::render::Object3d;
use crate::scene::{EntityKey, Scene};
use crate::schema::{PropertyBag, PropertyValue, RawProperties, SchemaError};

/// Errors from host-facing behavior operations
#[derive(thiserror::Error, Debug)]
pub enum BehaviorError {
    /// No behavior type registered under this name
    #[error("unknown behavior '{0}'")]
    UnknownBehavior(String),

    /// A non-`MULTIPLE` behavior is already attached to the entity
    #[error("behavior '{0}' is already attached to this entity")]
    AlreadyAttached(String),

    /// The entity key does not name a live entity
    #[error("entity does not exist")]
    UnknownEntity,

    /// The attachment key is stale or the attachment was detached
    #[error("attachment is stale or detached")]
    StaleAttachment,

    /// Property coercion against the behavior's schema failed
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// One live attachment of a behavior to an entity
struct Attachment {
    entity: EntityKey,
    name: String,
    flags: BehaviorFlags,
    state: LifecycleState,
    data: PropertyBag,
    /// Taken out while a hook runs so the hook can borrow the system's
    /// subscription table without aliasing the instance.
    behavior: Option<Box<dyn Behavior>>,
}

/// Capability handed to every lifecycle hook
///
/// The only way a behavior touches the outside world: object slots,
/// attributes, position, selectors, and event subscriptions, all scoped to
/// the attachment's own entity.
pub struct BehaviorContext<'a> {
    entity: EntityKey,
    attachment: AttachmentKey,
    data: &'a PropertyBag,
    scene: &'a mut Scene,
    subscriptions: &'a mut SubscriptionTable,
}

impl BehaviorContext<'_> {
    /// The entity this behavior is attached to
    pub fn entity(&self) -> EntityKey {
        self.entity
    }

    /// The coerced property data for this attachment
    pub fn data(&self) -> &PropertyBag {
        self.data
    }

    /// Register a listener for `event` on the attachment's entity
    ///
    /// The returned handle is the stable identity to keep for later removal.
    pub fn subscribe(&mut self, event: &str) -> ListenerHandle {
        self.subscriptions
            .subscribe(self.entity, event, self.attachment)
    }

    /// Remove a listener previously returned by [`Self::subscribe`]
    ///
    /// Safe no-op for handles that were never added or are already gone.
    pub fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        self.subscriptions.unsubscribe(handle)
    }

    /// Attach a renderable object under a named slot
    pub fn set_object(&mut self, slot: &str, object: Object3d) {
        self.scene.set_object(self.entity, slot, object);
    }

    /// Inspect the object in a named slot
    pub fn object(&self, slot: &str) -> Option<&Object3d> {
        self.scene.object(self.entity, slot)
    }

    /// Mutate the object in a named slot
    pub fn object_mut(&mut self, slot: &str) -> Option<&mut Object3d> {
        self.scene.object_mut(self.entity, slot)
    }

    /// Detach the object in a named slot; no-op when the slot is empty
    pub fn remove_object(&mut self, slot: &str) -> Option<Object3d> {
        self.scene.remove_object(self.entity, slot)
    }

    /// Read a named attribute of the attachment's entity
    pub fn attribute(&self, name: &str) -> Option<PropertyValue> {
        self.scene.attribute(self.entity, name)
    }

    /// Write a named attribute, triggering the entity's re-validation
    pub fn set_attribute(&mut self, name: &str, value: PropertyValue) {
        self.scene.set_attribute(self.entity, name, value);
    }

    /// The entity's current position
    pub fn position(&self) -> Vec3 {
        self.scene.position(self.entity).unwrap_or_else(Vec3::zeros)
    }

    /// Move the entity
    pub fn set_position(&mut self, position: Vec3) {
        self.scene.set_position(self.entity, position);
    }

    /// Resolve a selector id to an entity key
    pub fn resolve(&self, id: &str) -> Option<EntityKey> {
        self.scene.resolve(id)
    }

    /// Position of another entity, if it exists
    pub fn position_of(&self, key: EntityKey) -> Option<Vec3> {
        self.scene.position(key)
    }
}

/// Owner and driver of all behavior attachments
pub struct BehaviorSystem {
    registry: BehaviorRegistry,
    attachments: SlotMap<AttachmentKey, Attachment>,
    by_entity: HashMap<EntityKey, Vec<AttachmentKey>>,
    subscriptions: SubscriptionTable,
}

impl BehaviorSystem {
    /// Create a driver over a registry of behavior types
    pub fn new(registry: BehaviorRegistry) -> Self {
        Self {
            registry,
            attachments: SlotMap::with_key(),
            by_entity: HashMap::new(),
            subscriptions: SubscriptionTable::new(),
        }
    }

    /// Attach a behavior to an entity
    ///
    /// Coerces `raw` against the behavior's schema, constructs the instance,
    /// runs `init`, then the first `update` with an empty previous snapshot.
    pub fn attach(
        &mut self,
        scene: &mut Scene,
        entity: EntityKey,
        name: &str,
        raw: &RawProperties,
    ) -> Result<AttachmentKey, BehaviorError> {
        if !scene.contains(entity) {
            return Err(BehaviorError::UnknownEntity);
        }
        let descriptor = self
            .registry
            .get(name)
            .ok_or_else(|| BehaviorError::UnknownBehavior(name.to_string()))?;

        if !descriptor.flags().contains(BehaviorFlags::MULTIPLE)
            && self.attachments_on(entity).iter().any(|key| {
                self.attachments
                    .get(*key)
                    .is_some_and(|a| a.name == name && a.state.is_attached())
            })
        {
            return Err(BehaviorError::AlreadyAttached(name.to_string()));
        }

        let data = descriptor.schema().coerce(raw)?;
        let flags = descriptor.flags();
        let behavior = descriptor.instantiate();

        let key = self.attachments.insert(Attachment {
            entity,
            name: name.to_string(),
            flags,
            state: LifecycleState::default(),
            data,
            behavior: Some(behavior),
        });
        self.by_entity.entry(entity).or_default().push(key);

        log::debug!("attaching behavior '{name}'");
        self.dispatch(scene, key, |behavior, ctx| behavior.init(ctx));
        if let Some(slot) = self.attachments.get_mut(key) {
            slot.state.attach();
        }
        let initial = PropertyBag::empty();
        self.dispatch(scene, key, |behavior, ctx| behavior.update(ctx, &initial));
        Ok(key)
    }

    /// Apply a property change to an attachment
    ///
    /// Properties absent from `raw` keep their current value. The previous
    /// data is snapshotted and passed to the behavior's `update`; the change
    /// is fully applied when this returns.
    pub fn set_properties(
        &mut self,
        scene: &mut Scene,
        key: AttachmentKey,
        raw: &RawProperties,
    ) -> Result<(), BehaviorError> {
        let (name, current) = {
            let slot = self
                .attachments
                .get(key)
                .filter(|a| a.state.is_attached())
                .ok_or(BehaviorError::StaleAttachment)?;
            (slot.name.clone(), slot.data.clone())
        };
        let descriptor = self
            .registry
            .get(&name)
            .ok_or_else(|| BehaviorError::UnknownBehavior(name.clone()))?;
        let new_data = descriptor.schema().coerce_over(Some(&current), raw)?;

        let previous = {
            let slot = self
                .attachments
                .get_mut(key)
                .ok_or(BehaviorError::StaleAttachment)?;
            std::mem::replace(&mut slot.data, new_data)
        };
        self.dispatch(scene, key, |behavior, ctx| behavior.update(ctx, &previous));
        Ok(())
    }

    /// Run one frame: deliver `tick` to every attached `TICK` behavior
    pub fn tick(&mut self, scene: &mut Scene, time_ms: f64, delta_ms: f64) {
        let keys: Vec<AttachmentKey> = self
            .attachments
            .iter()
            .filter(|(_, a)| a.flags.contains(BehaviorFlags::TICK) && a.state.is_attached())
            .map(|(key, _)| key)
            .collect();
        for key in keys {
            self.dispatch(scene, key, |behavior, ctx| {
                behavior.tick(ctx, time_ms, delta_ms);
            });
        }
    }

    /// Emit a named event on an entity
    ///
    /// Delivered synchronously, in subscription order, to the attachments
    /// listening for it. Handles unsubscribed mid-delivery are skipped.
    pub fn emit(&mut self, scene: &mut Scene, entity: EntityKey, event: &str) {
        let handles = self.subscriptions.handlers_for(entity, event);
        log::trace!("emit '{event}' to {} listener(s)", handles.len());
        for handle in handles {
            let Some(owner) = self.subscriptions.owner_of(handle) else {
                continue;
            };
            self.dispatch(scene, owner, |behavior, ctx| {
                behavior.on_event(ctx, event);
            });
        }
    }

    /// Detach an attachment, running `remove` and sweeping its listeners
    ///
    /// Terminal: the key is invalid afterwards.
    pub fn detach(&mut self, scene: &mut Scene, key: AttachmentKey) -> Result<(), BehaviorError> {
        {
            let slot = self
                .attachments
                .get(key)
                .filter(|a| a.state.is_attached())
                .ok_or(BehaviorError::StaleAttachment)?;
            log::debug!("detaching behavior '{}'", slot.name);
        }
        self.dispatch(scene, key, |behavior, ctx| behavior.remove(ctx));

        // Safety net: whatever `remove` left behind is cleaned up here.
        let swept = self.subscriptions.remove_owned_by(key);
        if swept > 0 {
            log::debug!("swept {swept} residual listener(s) on detach");
        }

        if let Some(slot) = self.attachments.get_mut(key) {
            slot.state.detach();
        }
        if let Some(attachment) = self.attachments.remove(key) {
            if let Some(keys) = self.by_entity.get_mut(&attachment.entity) {
                keys.retain(|k| *k != key);
                if keys.is_empty() {
                    self.by_entity.remove(&attachment.entity);
                }
            }
        }
        Ok(())
    }

    /// Whether a key names a live attachment
    pub fn is_attached(&self, key: AttachmentKey) -> bool {
        self.attachments
            .get(key)
            .is_some_and(|a| a.state.is_attached())
    }

    /// Keys of every attachment on an entity
    pub fn attachments_on(&self, entity: EntityKey) -> Vec<AttachmentKey> {
        self.by_entity.get(&entity).cloned().unwrap_or_default()
    }

    /// The coerced property data of an attachment
    pub fn data_of(&self, key: AttachmentKey) -> Option<&PropertyBag> {
        self.attachments.get(key).map(|a| &a.data)
    }

    /// Total listeners currently registered on an entity
    pub fn listener_count(&self, entity: EntityKey) -> usize {
        self.subscriptions.count_for_entity(entity)
    }

    /// Number of live attachments
    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    /// Run one hook with the instance and data temporarily taken out of the
    /// slot, so the context can borrow the scene and subscription table.
    fn dispatch<R>(
        &mut self,
        scene: &mut Scene,
        key: AttachmentKey,
        hook: impl FnOnce(&mut dyn Behavior, &mut BehaviorContext<'_>) -> R,
    ) -> Option<R> {
        let (entity, data, mut behavior) = {
            let slot = self.attachments.get_mut(key)?;
            let behavior = slot.behavior.take()?;
            (slot.entity, std::mem::take(&mut slot.data), behavior)
        };

        let mut ctx = BehaviorContext {
            entity,
            attachment: key,
            data: &data,
            scene,
            subscriptions: &mut self.subscriptions,
        };
        let out = hook(behavior.as_mut(), &mut ctx);

        if let Some(slot) = self.attachments.get_mut(key) {
            slot.behavior = Some(behavior);
            slot.data = data;
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::registry::BehaviorDescriptor;
    use crate::schema::Schema;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every hook invocation for assertions.
    struct Probe {
        calls: Rc<RefCell<Vec<String>>>,
        subscription: Option<ListenerHandle>,
    }

    impl Behavior for Probe {
        fn init(&mut self, _ctx: &mut BehaviorContext<'_>) {
            self.calls.borrow_mut().push("init".to_string());
        }

        fn update(&mut self, ctx: &mut BehaviorContext<'_>, previous: &PropertyBag) {
            let kind = if previous.is_empty() { "first" } else { "change" };
            self.calls.borrow_mut().push(format!("update:{kind}"));

            let event = ctx.data().str_of("event").unwrap_or_default().to_string();
            if previous.is_empty() || ctx.data().changed_from(previous, "event") {
                if let Some(handle) = self.subscription.take() {
                    ctx.unsubscribe(handle);
                }
                if !event.is_empty() {
                    self.subscription = Some(ctx.subscribe(&event));
                }
            }
        }

        fn tick(&mut self, _ctx: &mut BehaviorContext<'_>, _time_ms: f64, delta_ms: f64) {
            self.calls.borrow_mut().push(format!("tick:{delta_ms}"));
        }

        fn on_event(&mut self, _ctx: &mut BehaviorContext<'_>, event: &str) {
            self.calls.borrow_mut().push(format!("event:{event}"));
        }

        fn remove(&mut self, ctx: &mut BehaviorContext<'_>) {
            self.calls.borrow_mut().push("remove".to_string());
            if let Some(handle) = self.subscription.take() {
                ctx.unsubscribe(handle);
            }
        }
    }

    fn probe_registry(calls: &Rc<RefCell<Vec<String>>>, flags: BehaviorFlags) -> BehaviorRegistry {
        let calls = Rc::clone(calls);
        let mut registry = BehaviorRegistry::new();
        registry.register(
            BehaviorDescriptor::new(
                "probe",
                Schema::new().property("event", PropertyValue::Str(String::new())),
                move || {
                    Box::new(Probe {
                        calls: Rc::clone(&calls),
                        subscription: None,
                    })
                },
            )
            .with_flags(flags),
        );
        registry
    }

    fn raw(entries: &[(&str, &str)]) -> RawProperties {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_attach_runs_init_then_first_update() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut system = BehaviorSystem::new(probe_registry(&calls, BehaviorFlags::empty()));
        let mut scene = Scene::new();
        let entity = scene.create_entity();

        let key = system.attach(&mut scene, entity, "probe", &raw(&[])).unwrap();

        assert!(system.is_attached(key));
        assert_eq!(*calls.borrow(), vec!["init", "update:first"]);
    }

    #[test]
    fn test_attach_rejects_unknown_names_and_entities() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut system = BehaviorSystem::new(probe_registry(&calls, BehaviorFlags::empty()));
        let mut scene = Scene::new();
        let entity = scene.create_entity();

        assert!(matches!(
            system.attach(&mut scene, entity, "nope", &raw(&[])),
            Err(BehaviorError::UnknownBehavior(_))
        ));

        scene.remove_entity(entity);
        assert!(matches!(
            system.attach(&mut scene, entity, "probe", &raw(&[])),
            Err(BehaviorError::UnknownEntity)
        ));
    }

    #[test]
    fn test_single_instance_gating() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut system = BehaviorSystem::new(probe_registry(&calls, BehaviorFlags::empty()));
        let mut scene = Scene::new();
        let entity = scene.create_entity();

        system.attach(&mut scene, entity, "probe", &raw(&[])).unwrap();
        assert!(matches!(
            system.attach(&mut scene, entity, "probe", &raw(&[])),
            Err(BehaviorError::AlreadyAttached(_))
        ));
    }

    #[test]
    fn test_multiple_flag_allows_coexisting_instances() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut system = BehaviorSystem::new(probe_registry(&calls, BehaviorFlags::MULTIPLE));
        let mut scene = Scene::new();
        let entity = scene.create_entity();

        system.attach(&mut scene, entity, "probe", &raw(&[])).unwrap();
        system.attach(&mut scene, entity, "probe", &raw(&[])).unwrap();
        assert_eq!(system.attachment_count(), 2);
    }

    #[test]
    fn test_set_properties_passes_previous_snapshot() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut system = BehaviorSystem::new(probe_registry(&calls, BehaviorFlags::empty()));
        let mut scene = Scene::new();
        let entity = scene.create_entity();

        let key = system.attach(&mut scene, entity, "probe", &raw(&[])).unwrap();
        system
            .set_properties(&mut scene, key, &raw(&[("event", "ping")]))
            .unwrap();

        assert_eq!(
            *calls.borrow(),
            vec!["init", "update:first", "update:change"]
        );
        assert_eq!(
            system.data_of(key).unwrap().str_of("event"),
            Some("ping")
        );
    }

    #[test]
    fn test_tick_only_reaches_tick_flagged_behaviors() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut system = BehaviorSystem::new(probe_registry(&calls, BehaviorFlags::empty()));
        let mut scene = Scene::new();
        let entity = scene.create_entity();
        system.attach(&mut scene, entity, "probe", &raw(&[])).unwrap();

        system.tick(&mut scene, 16.0, 16.0);
        assert!(!calls.borrow().iter().any(|c| c.starts_with("tick")));

        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut system = BehaviorSystem::new(probe_registry(&calls, BehaviorFlags::TICK));
        let mut scene = Scene::new();
        let entity = scene.create_entity();
        system.attach(&mut scene, entity, "probe", &raw(&[])).unwrap();

        system.tick(&mut scene, 16.0, 16.0);
        assert!(calls.borrow().iter().any(|c| c == "tick:16"));
    }

    #[test]
    fn test_emit_reaches_subscribed_attachment() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut system = BehaviorSystem::new(probe_registry(&calls, BehaviorFlags::empty()));
        let mut scene = Scene::new();
        let entity = scene.create_entity();

        system
            .attach(&mut scene, entity, "probe", &raw(&[("event", "ping")]))
            .unwrap();
        system.emit(&mut scene, entity, "ping");
        system.emit(&mut scene, entity, "other");

        let recorded = calls.borrow();
        assert_eq!(recorded.iter().filter(|c| *c == "event:ping").count(), 1);
        assert!(!recorded.iter().any(|c| *c == "event:other"));
    }

    #[test]
    fn test_rebinding_event_n_times_then_detach_leaves_no_listeners() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut system = BehaviorSystem::new(probe_registry(&calls, BehaviorFlags::empty()));
        let mut scene = Scene::new();
        let entity = scene.create_entity();

        let key = system
            .attach(&mut scene, entity, "probe", &raw(&[("event", "e0")]))
            .unwrap();
        for i in 1..=5 {
            system
                .set_properties(&mut scene, key, &raw(&[("event", &format!("e{i}"))]))
                .unwrap();
        }
        // Rebinding replaces, never accumulates.
        assert_eq!(system.listener_count(entity), 1);

        system.detach(&mut scene, key).unwrap();
        assert_eq!(system.listener_count(entity), 0);
    }

    #[test]
    fn test_detach_is_terminal() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut system = BehaviorSystem::new(probe_registry(&calls, BehaviorFlags::empty()));
        let mut scene = Scene::new();
        let entity = scene.create_entity();

        let key = system.attach(&mut scene, entity, "probe", &raw(&[])).unwrap();
        system.detach(&mut scene, key).unwrap();

        assert!(!system.is_attached(key));
        assert!(matches!(
            system.detach(&mut scene, key),
            Err(BehaviorError::StaleAttachment)
        ));
        assert!(matches!(
            system.set_properties(&mut scene, key, &raw(&[])),
            Err(BehaviorError::StaleAttachment)
        ));
        assert_eq!(calls.borrow().last().map(String::as_str), Some("remove"));
    }

    #[test]
    fn test_detach_frees_the_name_for_reattachment() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut system = BehaviorSystem::new(probe_registry(&calls, BehaviorFlags::empty()));
        let mut scene = Scene::new();
        let entity = scene.create_entity();

        let key = system.attach(&mut scene, entity, "probe", &raw(&[])).unwrap();
        system.detach(&mut scene, key).unwrap();
        assert!(system.attach(&mut scene, entity, "probe", &raw(&[])).is_ok());
    }
}
