//! Contract between the reconciler and the live scene runtime

use crate::core::entity::{ComponentHandle, ComponentKind, GizmoEvent, Gizmos, LiveComponent, RuntimeComponent};
use std::fmt;

/// An entity that has been constructed but not yet added to the graph
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDraft {
    /// Durable identity taken from the scene description
    pub uuid: String,
    pub gizmos: Option<Gizmos>,
    pub listener: Option<GizmoEvent>,
}

impl EntityDraft {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            gizmos: None,
            listener: None,
        }
    }

    pub fn with_gizmos(mut self, gizmos: Gizmos) -> Self {
        self.gizmos = Some(gizmos);
        self
    }

    pub fn with_listener(mut self, listener: GizmoEvent) -> Self {
        self.listener = Some(listener);
        self
    }
}

/// Operations the reconciler needs from a live scene graph
///
/// Components live in a runtime-owned arena and are referred to by
/// [`ComponentHandle`]. An entity holds at most one component per kind;
/// attaching a second component of the same kind replaces the first.
pub trait SceneRuntime {
    /// Runtime-specific entity reference
    type Entity: Copy + Eq + fmt::Debug;

    /// Store a freshly constructed component and return its handle
    fn construct_component(&mut self, component: RuntimeComponent) -> ComponentHandle;

    /// Mutable access to a live component
    fn component_mut(&mut self, handle: ComponentHandle) -> Option<&mut LiveComponent>;

    /// Find a live entity by its durable identity
    fn find_entity(&self, uuid: &str) -> Option<Self::Entity>;

    /// Add a constructed entity to the graph
    fn add_entity(&mut self, draft: EntityDraft) -> Self::Entity;

    /// Remove an entity and everything attached to it from the graph
    fn remove_entity(&mut self, entity: Self::Entity) -> bool;

    /// Attach a component, replacing any attached component of the same kind
    fn attach(&mut self, entity: Self::Entity, handle: ComponentHandle) -> bool;

    /// Detach a component from one entity
    fn detach(&mut self, entity: Self::Entity, handle: ComponentHandle) -> bool;

    /// Handles of every component attached to an entity
    fn attached_components(&self, entity: Self::Entity) -> Vec<ComponentHandle>;

    /// Every live entity with its durable identity
    fn live_entities(&self) -> Vec<(String, Self::Entity)>;

    /// Every live entity currently holding the given component
    fn entities_holding(&self, handle: ComponentHandle) -> Vec<(String, Self::Entity)>;

    /// Whether the runtime's type registry disposes components of this kind
    fn is_disposable(&self, kind: ComponentKind) -> bool;

    /// Dispose of a component the runtime tracks as disposable
    fn dispose_component(&mut self, handle: ComponentHandle);

    /// Drop a component that needs no disposal
    fn release_component(&mut self, handle: ComponentHandle);
}
