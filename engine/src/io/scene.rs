//! Scene descriptions sent by the editor

use crate::core::entity::ComponentKind;
use crate::sync::SyncError;
use glam::{Quat, Vec3};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Complete desired state of a scene at one point in time
///
/// Maps keep the order the editor sent them in, so iteration and generated
/// output are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    #[serde(default)]
    pub components: IndexMap<String, ComponentDescription>,
    #[serde(default)]
    pub entities: IndexMap<String, EntityDescription>,
}

/// A component as described by the editor
///
/// `data` stays raw until a consumer decodes it for a recognized type, so an
/// unknown type never fails parsing and a malformed payload fails where it
/// is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescription {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// An entity and the ids of the components it references
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityDescription {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub components: Vec<String>,
}

/// Vector payload, kept at the precision the editor sent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3Data {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3Data {
    /// Narrow to runtime math, or `None` if a field overflows `f32`
    pub fn to_vec3(&self) -> Option<Vec3> {
        Some(Vec3::new(narrow(self.x)?, narrow(self.y)?, narrow(self.z)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuaternionData {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl QuaternionData {
    /// Narrow to runtime math, or `None` if a field overflows `f32`
    pub fn to_quat(&self) -> Option<Quat> {
        Some(Quat::from_xyzw(
            narrow(self.x)?,
            narrow(self.y)?,
            narrow(self.z)?,
            narrow(self.w)?,
        ))
    }
}

fn narrow(value: f64) -> Option<f32> {
    let narrowed = value as f32;
    narrowed.is_finite().then_some(narrowed)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GltfShapeData {
    pub src: String,
    /// Asset file name to content hash mappings
    #[serde(default)]
    pub mappings: IndexMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformData {
    pub position: Vector3Data,
    pub rotation: QuaternionData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vector3Data>,
}

impl TransformData {
    /// Whether every field can be represented by the runtime's `f32` math
    pub fn fits_runtime(&self) -> bool {
        self.position.to_vec3().is_some()
            && self.rotation.to_quat().is_some()
            && self.scale.map_or(true, |scale| scale.to_vec3().is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftShapeData {
    pub url: String,
}

/// Typed component payload, selected by the component's type tag
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentData {
    GltfShape(GltfShapeData),
    Transform(TransformData),
    NftShape(NftShapeData),
}

impl ComponentData {
    /// Decode a raw payload as the given kind
    pub fn decode(kind: ComponentKind, value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            ComponentKind::GltfShape => ComponentData::GltfShape(GltfShapeData::deserialize(value)?),
            ComponentKind::Transform => ComponentData::Transform(TransformData::deserialize(value)?),
            ComponentKind::NftShape => ComponentData::NftShape(NftShapeData::deserialize(value)?),
        })
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentData::GltfShape(_) => ComponentKind::GltfShape,
            ComponentData::Transform(_) => ComponentKind::Transform,
            ComponentData::NftShape(_) => ComponentKind::NftShape,
        }
    }

    /// Content key that identifies interchangeable instances of shareable kinds
    pub fn share_key(&self) -> Option<&str> {
        match self {
            ComponentData::GltfShape(data) => Some(&data.src),
            ComponentData::NftShape(data) => Some(&data.url),
            ComponentData::Transform(_) => None,
        }
    }
}

impl ComponentDescription {
    pub fn new(id: impl Into<String>, kind: ComponentKind, data: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            type_tag: kind.tag().to_string(),
            data,
        }
    }

    /// The recognized kind of this component, if any
    pub fn kind(&self) -> Option<ComponentKind> {
        ComponentKind::from_tag(&self.type_tag)
    }

    /// Decode the payload as `kind`, reporting failures against this component
    pub fn decode_as(&self, kind: ComponentKind) -> Result<ComponentData, SyncError> {
        ComponentData::decode(kind, &self.data).map_err(|source| self.malformed(kind, source))
    }

    /// Decode the payload for a live runtime
    ///
    /// Like [`decode_as`](Self::decode_as), but numbers that overflow the
    /// runtime's `f32` math are also malformed.
    pub fn decode_for_runtime(&self, kind: ComponentKind) -> Result<ComponentData, SyncError> {
        let data = self.decode_as(kind)?;
        if let ComponentData::Transform(transform) = &data {
            if !transform.fits_runtime() {
                let source =
                    <serde_json::Error as serde::de::Error>::custom("transform value out of f32 range");
                return Err(self.malformed(kind, source));
            }
        }
        Ok(data)
    }

    fn malformed(&self, kind: ComponentKind, source: serde_json::Error) -> SyncError {
        SyncError::MalformedPayload {
            component_id: self.id.clone(),
            kind,
            source,
        }
    }
}

impl SceneSnapshot {
    /// Create a new empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.entities.is_empty()
    }

    /// Add a component description keyed by its id
    pub fn insert_component(&mut self, component: ComponentDescription) -> &mut Self {
        self.components.insert(component.id.clone(), component);
        self
    }

    /// Add an entity referencing the given component ids
    pub fn insert_entity<I, S>(&mut self, id: impl Into<String>, components: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = id.into();
        let entity = EntityDescription {
            id: id.clone(),
            components: components.into_iter().map(Into::into).collect(),
        };
        self.entities.insert(id, entity);
        self
    }

    /// Ensure every description's `id` matches the key it is stored under
    pub fn normalize_ids(&mut self) {
        for (key, component) in self.components.iter_mut() {
            if component.id != *key {
                component.id.clone_from(key);
            }
        }
        for (key, entity) in self.entities.iter_mut() {
            if entity.id != *key {
                entity.id.clone_from(key);
            }
        }
    }

    /// Parse a snapshot from JSON text
    pub fn from_json(json: &str) -> Result<Self, SyncError> {
        let mut snapshot: Self = serde_json::from_str(json)?;
        snapshot.normalize_ids();
        Ok(snapshot)
    }

    /// Save this snapshot to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SyncError> {
        let path = path.as_ref();
        info!(path = ?path, "Saving snapshot to file");

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a snapshot from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SyncError> {
        let path = path.as_ref();
        info!(path = ?path, "Loading snapshot from file");

        let json = fs::read_to_string(path)?;
        let snapshot = Self::from_json(&json)?;

        info!(
            path = ?path,
            components = snapshot.components.len(),
            entities = snapshot.entities.len(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }
}
