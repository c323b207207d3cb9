//! Component registry mapping type tags to runtime constructors and updaters

use crate::core::entity::{ComponentKind, GltfShape, NftShape, RuntimeComponent, Transform};
use crate::io::scene::{ComponentData, TransformData};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Builds a runtime component from a decoded payload
pub type ComponentConstructorFn = Arc<dyn Fn(&ComponentData) -> Option<RuntimeComponent> + Send + Sync>;

/// Copies the latest payload into a live component
pub type ComponentUpdaterFn = Arc<dyn Fn(&mut RuntimeComponent, &ComponentData) + Send + Sync>;

/// Constructor and optional updater registered for one component kind
///
/// Kinds with an updater carry continuously updatable state and are
/// refreshed on every reconciliation, not just when first constructed.
#[derive(Clone)]
pub struct ComponentHandler {
    pub kind: ComponentKind,
    pub construct: ComponentConstructorFn,
    pub update: Option<ComponentUpdaterFn>,
}

/// Registry of the component types this build can materialize
///
/// Tags without a handler are skipped by every consumer.
#[derive(Default, Clone)]
pub struct ComponentRegistry {
    handlers: HashMap<ComponentKind, ComponentHandler>,
}

impl ComponentRegistry {
    /// Create a new empty component registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a component kind, replacing any previous one
    pub fn register(
        &mut self,
        kind: ComponentKind,
        construct: ComponentConstructorFn,
        update: Option<ComponentUpdaterFn>,
    ) {
        self.handlers.insert(
            kind,
            ComponentHandler {
                kind,
                construct,
                update,
            },
        );
        debug!(component_type = %kind, "Registered component handler");
    }

    /// Remove the handler for a kind so that its tag is treated as unknown
    pub fn unregister(&mut self, kind: ComponentKind) -> bool {
        self.handlers.remove(&kind).is_some()
    }

    pub fn handler(&self, kind: ComponentKind) -> Option<&ComponentHandler> {
        self.handlers.get(&kind)
    }

    /// Resolve a wire tag to its handler
    pub fn resolve(&self, type_tag: &str) -> Option<&ComponentHandler> {
        ComponentKind::from_tag(type_tag).and_then(|kind| self.handlers.get(&kind))
    }

    /// Check if a type tag has a handler
    pub fn is_registered(&self, type_tag: &str) -> bool {
        self.resolve(type_tag).is_some()
    }

    /// Get all registered kinds in tag order
    pub fn registered_kinds(&self) -> Vec<ComponentKind> {
        let mut kinds: Vec<ComponentKind> = self.handlers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Create a registry with the shapes and transform registered
    pub fn with_default_components() -> Self {
        let mut registry = Self::new();

        registry.register(
            ComponentKind::GltfShape,
            Arc::new(|data: &ComponentData| match data {
                ComponentData::GltfShape(data) => {
                    let mut shape = GltfShape::new(data.src.clone());
                    shape.is_pickable = true;
                    Some(RuntimeComponent::GltfShape(shape))
                }
                _ => None,
            }),
            None,
        );

        registry.register(
            ComponentKind::Transform,
            Arc::new(|data: &ComponentData| match data {
                ComponentData::Transform(data) => {
                    transform_from_data(data, Transform::default()).map(RuntimeComponent::Transform)
                }
                _ => None,
            }),
            Some(Arc::new(|component: &mut RuntimeComponent, data: &ComponentData| {
                if let (RuntimeComponent::Transform(transform), ComponentData::Transform(data)) =
                    (component, data)
                {
                    if let Some(updated) = transform_from_data(data, *transform) {
                        *transform = updated;
                    }
                }
            })),
        );

        registry.register(
            ComponentKind::NftShape,
            Arc::new(|data: &ComponentData| match data {
                ComponentData::NftShape(data) => {
                    let mut shape = NftShape::new(data.url.clone());
                    shape.is_pickable = true;
                    Some(RuntimeComponent::NftShape(shape))
                }
                _ => None,
            }),
            None,
        );

        debug!(
            component_count = registry.len(),
            "Created registry with default components"
        );

        registry
    }
}

/// Apply a transform payload on top of `current`; scale is only copied when present
///
/// Returns `None` when a value does not fit the runtime's `f32` math.
fn transform_from_data(data: &TransformData, current: Transform) -> Option<Transform> {
    let mut transform =
        Transform::from_position_rotation(data.position.to_vec3()?, data.rotation.to_quat()?);
    transform.scale = match data.scale {
        Some(scale) => scale.to_vec3()?,
        None => current.scale,
    };
    Some(transform)
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("registered_kinds", &self.registered_kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::scene::{GltfShapeData, QuaternionData, Vector3Data};
    use glam::{Quat, Vec3};

    fn transform_data(x: f64, scale: Option<f64>) -> ComponentData {
        ComponentData::Transform(TransformData {
            position: Vector3Data { x, y: 0.0, z: 0.0 },
            rotation: QuaternionData {
                x: 0.0,
                y: 0.0,
                z: 0.0,
                w: 1.0,
            },
            scale: scale.map(|s| Vector3Data { x: s, y: s, z: s }),
        })
    }

    #[test]
    fn test_component_registry_basic() {
        let mut registry = ComponentRegistry::new();
        assert!(registry.is_empty());

        registry.register(
            ComponentKind::NftShape,
            Arc::new(|_: &ComponentData| -> Option<RuntimeComponent> { None }),
            None,
        );
        assert_eq!(registry.len(), 1);
        assert!(registry.is_registered("NFTShape"));
        assert!(!registry.is_registered("GLTFShape"));
    }

    #[test]
    fn test_component_registry_default() {
        let registry = ComponentRegistry::with_default_components();
        assert_eq!(registry.registered_kinds(), ComponentKind::ALL.to_vec());
        assert!(registry.is_registered("GLTFShape"));
        assert!(registry.is_registered("Transform"));
        assert!(registry.is_registered("NFTShape"));
        assert!(!registry.is_registered("AudioSource"));
    }

    #[test]
    fn test_only_transform_has_updater() {
        let registry = ComponentRegistry::with_default_components();
        for kind in ComponentKind::ALL {
            let handler = registry.handler(kind).unwrap();
            assert_eq!(handler.update.is_some(), kind == ComponentKind::Transform);
        }
    }

    #[test]
    fn test_gltf_constructor_marks_pickable() {
        let registry = ComponentRegistry::with_default_components();
        let handler = registry.resolve("GLTFShape").unwrap();
        let data = ComponentData::GltfShape(GltfShapeData {
            src: "models/tree.glb".to_string(),
            mappings: Default::default(),
        });

        let component = (handler.construct)(&data).unwrap();
        let shape = component.as_gltf_shape().unwrap();
        assert_eq!(shape.src, "models/tree.glb");
        assert!(shape.is_pickable);
    }

    #[test]
    fn test_constructor_rejects_mismatched_payload() {
        let registry = ComponentRegistry::with_default_components();
        let handler = registry.handler(ComponentKind::GltfShape).unwrap();
        assert!((handler.construct)(&transform_data(1.0, None)).is_none());
    }

    #[test]
    fn test_transform_updater_keeps_scale_when_absent() {
        let registry = ComponentRegistry::with_default_components();
        let handler = registry.handler(ComponentKind::Transform).unwrap();
        let update = handler.update.as_ref().unwrap();

        let mut component = (handler.construct)(&transform_data(1.0, Some(2.0))).unwrap();
        update(&mut component, &transform_data(5.0, None));

        let transform = component.as_transform().unwrap();
        assert_eq!(transform.position, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(transform.rotation, Quat::IDENTITY);
        assert_eq!(transform.scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_transform_out_of_range_is_not_applied() {
        let registry = ComponentRegistry::with_default_components();
        let handler = registry.handler(ComponentKind::Transform).unwrap();
        assert!((handler.construct)(&transform_data(1e39, None)).is_none());

        let update = handler.update.as_ref().unwrap();
        let mut component = (handler.construct)(&transform_data(1.0, None)).unwrap();
        update(&mut component, &transform_data(1e39, None));
        let transform = component.as_transform().unwrap();
        assert_eq!(transform.position, Vec3::X);
    }

    #[test]
    fn test_unregister_makes_tag_unknown() {
        let mut registry = ComponentRegistry::with_default_components();
        assert!(registry.unregister(ComponentKind::NftShape));
        assert!(!registry.is_registered("NFTShape"));
        assert!(!registry.unregister(ComponentKind::NftShape));
    }
}
