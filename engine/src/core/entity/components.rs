//! Runtime components for the live scene graph

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::world::ComponentHandle;

/// Component types the builder knows how to materialize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Shared glTF model, keyed by its source path
    #[serde(rename = "GLTFShape")]
    GltfShape,
    /// Per-entity position/rotation/scale
    Transform,
    /// Shared NFT frame, keyed by its asset url
    #[serde(rename = "NFTShape")]
    NftShape,
}

impl ComponentKind {
    /// Every known kind, in tag order
    pub const ALL: [ComponentKind; 3] = [
        ComponentKind::GltfShape,
        ComponentKind::Transform,
        ComponentKind::NftShape,
    ];

    /// Wire tag used by scene descriptions and generated scripts
    pub fn tag(self) -> &'static str {
        match self {
            ComponentKind::GltfShape => "GLTFShape",
            ComponentKind::Transform => "Transform",
            ComponentKind::NftShape => "NFTShape",
        }
    }

    /// Resolve a wire tag, returning `None` for tags this build does not know
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Whether instances are shared between entities by content rather than by id
    pub fn is_shareable(self) -> bool {
        matches!(self, ComponentKind::GltfShape | ComponentKind::NftShape)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Transform component representing position, rotation, and scale in local space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    /// Position in local space
    pub position: Vec3,
    /// Rotation in local space as a quaternion
    pub rotation: Quat,
    /// Scale in local space
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform with the given position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with the given position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Set the scale of the transform
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

/// A glTF model shared by every entity that references the same source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GltfShape {
    pub src: String,
    pub is_pickable: bool,
}

impl GltfShape {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            is_pickable: false,
        }
    }
}

/// A framed NFT asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftShape {
    pub url: String,
    pub is_pickable: bool,
}

impl NftShape {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_pickable: false,
        }
    }
}

/// Any component the runtime can hold in its component arena
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeComponent {
    GltfShape(GltfShape),
    Transform(Transform),
    NftShape(NftShape),
}

impl RuntimeComponent {
    pub fn kind(&self) -> ComponentKind {
        match self {
            RuntimeComponent::GltfShape(_) => ComponentKind::GltfShape,
            RuntimeComponent::Transform(_) => ComponentKind::Transform,
            RuntimeComponent::NftShape(_) => ComponentKind::NftShape,
        }
    }

    pub fn as_transform(&self) -> Option<&Transform> {
        match self {
            RuntimeComponent::Transform(transform) => Some(transform),
            _ => None,
        }
    }

    pub fn as_gltf_shape(&self) -> Option<&GltfShape> {
        match self {
            RuntimeComponent::GltfShape(shape) => Some(shape),
            _ => None,
        }
    }
}

/// Arena slot for a live component
///
/// `dirty` tells the runtime the component must be re-rendered. `nonce` is
/// re-randomized on every update so change detection fires even when the
/// payload values did not change.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveComponent {
    pub component: RuntimeComponent,
    pub dirty: bool,
    pub nonce: f64,
}

impl LiveComponent {
    pub fn new(component: RuntimeComponent) -> Self {
        Self {
            component,
            dirty: false,
            nonce: 0.0,
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.component.kind()
    }
}

/// Durable identity of an entity, taken from the scene description
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityUuid(pub String);

/// Editor manipulation handles enabled on an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gizmos {
    pub position: bool,
    pub rotation: bool,
    pub scale: bool,
}

impl Default for Gizmos {
    fn default() -> Self {
        Self {
            position: true,
            rotation: true,
            scale: false,
        }
    }
}

/// Listener for gizmo interaction events
///
/// Carries only its event uuid; it takes no action when events arrive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GizmoEvent {
    pub uuid: String,
}

impl GizmoEvent {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self { uuid: uuid.into() }
    }
}

/// Components attached to an entity, at most one per kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachments(pub BTreeMap<ComponentKind, ComponentHandle>);

impl Attachments {
    pub fn handles(&self) -> impl Iterator<Item = ComponentHandle> + '_ {
        self.0.values().copied()
    }

    pub fn holds(&self, handle: ComponentHandle) -> bool {
        self.0.values().any(|held| *held == handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_default() {
        let transform = Transform::default();
        assert_eq!(transform.position, Vec3::ZERO);
        assert_eq!(transform.rotation, Quat::IDENTITY);
        assert_eq!(transform.scale, Vec3::ONE);
    }

    #[test]
    fn test_transform_builders() {
        let transform = Transform::from_position_rotation(Vec3::X, Quat::from_rotation_y(1.0))
            .with_scale(Vec3::splat(2.0));
        assert_eq!(transform.position, Vec3::X);
        assert_eq!(transform.scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_component_kind_tags() {
        for kind in ComponentKind::ALL {
            assert_eq!(ComponentKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(ComponentKind::from_tag("AudioSource"), None);
        assert_eq!(ComponentKind::GltfShape.to_string(), "GLTFShape");
    }

    #[test]
    fn test_shareable_kinds() {
        assert!(ComponentKind::GltfShape.is_shareable());
        assert!(ComponentKind::NftShape.is_shareable());
        assert!(!ComponentKind::Transform.is_shareable());
    }

    #[test]
    fn test_editor_gizmos_disable_scale() {
        let gizmos = Gizmos::default();
        assert!(gizmos.position);
        assert!(gizmos.rotation);
        assert!(!gizmos.scale);
    }

    #[test]
    fn test_runtime_component_kind() {
        let shape = RuntimeComponent::GltfShape(GltfShape::new("a.glb"));
        assert_eq!(shape.kind(), ComponentKind::GltfShape);
        assert_eq!(shape.as_gltf_shape().map(|s| s.src.as_str()), Some("a.glb"));
        assert!(shape.as_transform().is_none());
    }
}
