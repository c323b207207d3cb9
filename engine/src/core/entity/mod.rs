//! Entity-Component System (ECS) functionality
//!
//! This module provides the live scene graph the reconciler drives:
//! entities with durable identities and the components attached to them.

pub mod components;
pub mod world;

// Re-export commonly used types
pub use components::{
    Attachments, ComponentKind, EntityUuid, GizmoEvent, Gizmos, GltfShape, LiveComponent,
    NftShape, RuntimeComponent, Transform,
};
pub use world::{ComponentHandle, World};

// Re-export hecs types that users will need
pub use hecs::Entity;
