//! Live scene graph backed by a hecs world and a component arena

use super::components::{
    Attachments, ComponentKind, EntityUuid, LiveComponent, RuntimeComponent,
};
use crate::sync::{EntityDraft, SceneRuntime};
use hecs::Entity;
use indexmap::IndexMap;
use slotmap::SlotMap;
use std::collections::HashSet;
use tracing::{debug, trace, warn};

slotmap::new_key_type! {
    /// Handle to a component stored in the world's component arena
    pub struct ComponentHandle;
}

/// Wrapper around hecs::World that implements [`SceneRuntime`]
///
/// Entities are hecs entities carrying an [`EntityUuid`] and their
/// [`Attachments`]. Component state lives in a separate arena so that one
/// component can be attached to many entities.
pub struct World {
    inner: hecs::World,
    components: SlotMap<ComponentHandle, LiveComponent>,
    entities_by_uuid: IndexMap<String, Entity>,
    disposable_kinds: HashSet<ComponentKind>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create an empty world where shapes are disposable
    pub fn new() -> Self {
        Self::with_disposable_kinds([ComponentKind::GltfShape, ComponentKind::NftShape])
    }

    /// Create an empty world with a custom set of disposable kinds
    pub fn with_disposable_kinds(kinds: impl IntoIterator<Item = ComponentKind>) -> Self {
        Self {
            inner: hecs::World::new(),
            components: SlotMap::with_key(),
            entities_by_uuid: IndexMap::new(),
            disposable_kinds: kinds.into_iter().collect(),
        }
    }

    /// Look up an entity by its durable identity
    pub fn entity(&self, uuid: &str) -> Option<Entity> {
        self.entities_by_uuid.get(uuid).copied()
    }

    /// Identities of all live entities, in creation order
    pub fn entity_uuids(&self) -> impl Iterator<Item = &str> {
        self.entities_by_uuid.keys().map(String::as_str)
    }

    pub fn entity_count(&self) -> usize {
        self.entities_by_uuid.len()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Get a live component by handle
    pub fn component(&self, handle: ComponentHandle) -> Option<&LiveComponent> {
        self.components.get(handle)
    }

    /// Handle of the component of `kind` attached to an entity
    pub fn attached(&self, entity: Entity, kind: ComponentKind) -> Option<ComponentHandle> {
        self.inner
            .get::<&Attachments>(entity)
            .ok()
            .and_then(|attachments| attachments.0.get(&kind).copied())
    }

    /// The component of `kind` attached to an entity, if it is still live
    pub fn attached_component(&self, entity: Entity, kind: ComponentKind) -> Option<&RuntimeComponent> {
        self.attached(entity, kind)
            .and_then(|handle| self.components.get(handle))
            .map(|live| &live.component)
    }

    /// Get a reference to an ECS component on an entity
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Collect every dirty component and clear its flag
    pub fn take_dirty(&mut self) -> Vec<ComponentHandle> {
        let mut dirty = Vec::new();
        for (handle, live) in self.components.iter_mut() {
            if live.dirty {
                live.dirty = false;
                dirty.push(handle);
            }
        }
        trace!(count = dirty.len(), "Collected dirty components");
        dirty
    }

    /// Get access to the inner hecs::World for advanced operations
    pub fn inner(&self) -> &hecs::World {
        &self.inner
    }

    /// Remove every entity and component
    pub fn clear(&mut self) {
        self.inner.clear();
        self.components.clear();
        self.entities_by_uuid.clear();
        debug!("Cleared world");
    }

    fn detach_everywhere(&mut self, handle: ComponentHandle) {
        for (_, attachments) in self.inner.query_mut::<&mut Attachments>() {
            attachments.0.retain(|_, held| *held != handle);
        }
    }
}

impl SceneRuntime for World {
    type Entity = Entity;

    fn construct_component(&mut self, component: RuntimeComponent) -> ComponentHandle {
        let kind = component.kind();
        let handle = self.components.insert(LiveComponent::new(component));
        debug!(handle = ?handle, kind = %kind, "Constructed component");
        handle
    }

    fn component_mut(&mut self, handle: ComponentHandle) -> Option<&mut LiveComponent> {
        self.components.get_mut(handle)
    }

    fn find_entity(&self, uuid: &str) -> Option<Entity> {
        self.entity(uuid)
    }

    fn add_entity(&mut self, draft: EntityDraft) -> Entity {
        if let Some(existing) = self.entities_by_uuid.get(&draft.uuid).copied() {
            warn!(uuid = %draft.uuid, "Entity already in graph, keeping existing");
            return existing;
        }

        let mut builder = hecs::EntityBuilder::new();
        builder.add(EntityUuid(draft.uuid.clone()));
        builder.add(Attachments::default());
        if let Some(gizmos) = draft.gizmos {
            builder.add(gizmos);
        }
        if let Some(listener) = draft.listener {
            builder.add(listener);
        }

        let entity = self.inner.spawn(builder.build());
        debug!(uuid = %draft.uuid, entity = ?entity, "Added entity to graph");
        self.entities_by_uuid.insert(draft.uuid, entity);
        entity
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        let uuid = match self.inner.get::<&EntityUuid>(entity) {
            Ok(uuid) => uuid.0.clone(),
            Err(_) => return false,
        };
        if self.inner.despawn(entity).is_err() {
            return false;
        }
        self.entities_by_uuid.shift_remove(&uuid);
        debug!(uuid = %uuid, entity = ?entity, "Removed entity from graph");
        true
    }

    fn attach(&mut self, entity: Entity, handle: ComponentHandle) -> bool {
        let Some(kind) = self.components.get(handle).map(LiveComponent::kind) else {
            return false;
        };
        match self.inner.query_one_mut::<&mut Attachments>(entity) {
            Ok(attachments) => {
                if attachments.0.insert(kind, handle) != Some(handle) {
                    trace!(entity = ?entity, handle = ?handle, kind = %kind, "Attached component");
                }
                true
            }
            Err(_) => false,
        }
    }

    fn detach(&mut self, entity: Entity, handle: ComponentHandle) -> bool {
        match self.inner.query_one_mut::<&mut Attachments>(entity) {
            Ok(attachments) => {
                let before = attachments.0.len();
                attachments.0.retain(|_, held| *held != handle);
                before != attachments.0.len()
            }
            Err(_) => false,
        }
    }

    fn attached_components(&self, entity: Entity) -> Vec<ComponentHandle> {
        self.inner
            .get::<&Attachments>(entity)
            .map(|attachments| attachments.handles().collect())
            .unwrap_or_default()
    }

    fn live_entities(&self) -> Vec<(String, Entity)> {
        self.entities_by_uuid
            .iter()
            .map(|(uuid, entity)| (uuid.clone(), *entity))
            .collect()
    }

    fn entities_holding(&self, handle: ComponentHandle) -> Vec<(String, Entity)> {
        self.inner
            .query::<(&EntityUuid, &Attachments)>()
            .iter()
            .filter(|(_, (_, attachments))| attachments.holds(handle))
            .map(|(entity, (uuid, _))| (uuid.0.clone(), entity))
            .collect()
    }

    fn is_disposable(&self, kind: ComponentKind) -> bool {
        self.disposable_kinds.contains(&kind)
    }

    fn dispose_component(&mut self, handle: ComponentHandle) {
        if let Some(live) = self.components.remove(handle) {
            self.detach_everywhere(handle);
            debug!(handle = ?handle, kind = %live.kind(), "Disposed component");
        }
    }

    fn release_component(&mut self, handle: ComponentHandle) {
        if let Some(live) = self.components.remove(handle) {
            trace!(handle = ?handle, kind = %live.kind(), "Released component");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::{GizmoEvent, Gizmos, GltfShape, Transform};
    use glam::Vec3;

    fn shape(src: &str) -> RuntimeComponent {
        RuntimeComponent::GltfShape(GltfShape::new(src))
    }

    #[test]
    fn test_add_entity_decorates_draft() {
        let mut world = World::new();
        let entity = world.add_entity(
            EntityDraft::new("e1")
                .with_gizmos(Gizmos::default())
                .with_listener(GizmoEvent::new("gizmoEvent-editor")),
        );

        assert!(world.contains(entity));
        assert_eq!(world.entity("e1"), Some(entity));
        assert_eq!(world.get::<EntityUuid>(entity).unwrap().0, "e1");
        assert!(!world.get::<Gizmos>(entity).unwrap().scale);
        assert_eq!(world.get::<GizmoEvent>(entity).unwrap().uuid, "gizmoEvent-editor");
    }

    #[test]
    fn test_add_entity_twice_keeps_identity() {
        let mut world = World::new();
        let first = world.add_entity(EntityDraft::new("e1"));
        let second = world.add_entity(EntityDraft::new("e1"));
        assert_eq!(first, second);
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn test_attach_replaces_same_kind() {
        let mut world = World::new();
        let entity = world.add_entity(EntityDraft::new("e1"));
        let a = world.construct_component(shape("a.glb"));
        let b = world.construct_component(shape("b.glb"));

        assert!(world.attach(entity, a));
        assert!(world.attach(entity, b));
        assert_eq!(world.attached(entity, ComponentKind::GltfShape), Some(b));
        assert_eq!(world.attached_components(entity), vec![b]);
    }

    #[test]
    fn test_shared_component_across_entities() {
        let mut world = World::new();
        let e1 = world.add_entity(EntityDraft::new("e1"));
        let e2 = world.add_entity(EntityDraft::new("e2"));
        let shared = world.construct_component(shape("a.glb"));
        world.attach(e1, shared);
        world.attach(e2, shared);

        let holders: Vec<String> = world
            .entities_holding(shared)
            .into_iter()
            .map(|(uuid, _)| uuid)
            .collect();
        assert_eq!(holders.len(), 2);
        assert!(holders.contains(&"e1".to_string()));
        assert!(holders.contains(&"e2".to_string()));
    }

    #[test]
    fn test_dispose_detaches_from_holders() {
        let mut world = World::new();
        let entity = world.add_entity(EntityDraft::new("e1"));
        let shared = world.construct_component(shape("a.glb"));
        world.attach(entity, shared);

        world.dispose_component(shared);
        assert!(world.component(shared).is_none());
        assert!(world.attached_components(entity).is_empty());
    }

    #[test]
    fn test_remove_entity_forgets_uuid() {
        let mut world = World::new();
        let entity = world.add_entity(EntityDraft::new("e1"));
        assert!(world.remove_entity(entity));
        assert!(!world.contains(entity));
        assert!(world.entity("e1").is_none());
        assert!(!world.remove_entity(entity));
    }

    #[test]
    fn test_take_dirty_clears_flags() {
        let mut world = World::new();
        let handle = world.construct_component(RuntimeComponent::Transform(
            Transform::from_position(Vec3::Y),
        ));
        world.component_mut(handle).unwrap().dirty = true;

        assert_eq!(world.take_dirty(), vec![handle]);
        assert!(world.take_dirty().is_empty());
    }

    #[test]
    fn test_disposable_kinds() {
        let world = World::new();
        assert!(world.is_disposable(ComponentKind::GltfShape));
        assert!(world.is_disposable(ComponentKind::NftShape));
        assert!(!world.is_disposable(ComponentKind::Transform));

        let custom = World::with_disposable_kinds(Vec::new());
        assert!(!custom.is_disposable(ComponentKind::GltfShape));
    }
}
