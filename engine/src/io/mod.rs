//! Input/Output: scene descriptions, inbound editor actions and hot reload

pub mod component_registry;
pub mod external;
pub mod hot_reload;
pub mod live_index;
pub mod scene;

pub use component_registry::{ComponentHandler, ComponentRegistry};
pub use external::{ActionSender, EditorInbox, ExternalAction, PumpSummary, UPDATE_EDITOR};
pub use hot_reload::{load_action_file, SceneWatcher, WatcherConfig};
pub use live_index::{LiveEntry, LiveIndex};
pub use scene::{
    ComponentData, ComponentDescription, EntityDescription, GltfShapeData, NftShapeData,
    QuaternionData, SceneSnapshot, TransformData, Vector3Data,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::ComponentKind;
    use crate::sync::SyncError;
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_snapshot_preserves_key_order() {
        let json = r#"{
            "components": {
                "z": {"id": "z", "type": "Transform", "data": {}},
                "a": {"id": "a", "type": "Transform", "data": {}},
                "m": {"id": "m", "type": "Transform", "data": {}}
            },
            "entities": {}
        }"#;

        let snapshot = SceneSnapshot::from_json(json).unwrap();
        let keys: Vec<&str> = snapshot.components.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_unknown_type_parses() {
        let json = r#"{
            "components": {
                "s1": {"id": "s1", "type": "AudioSource", "data": {"clip": "song.mp3"}}
            }
        }"#;

        let snapshot = SceneSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.components["s1"].kind(), None);
        assert!(snapshot.entities.is_empty());
    }

    #[test]
    fn test_decode_transform() {
        let description = ComponentDescription::new(
            "t1",
            ComponentKind::Transform,
            json!({
                "position": {"x": 1, "y": 2, "z": 3},
                "rotation": {"x": 0, "y": 0, "z": 0, "w": 1}
            }),
        );

        let ComponentData::Transform(data) = description.decode_as(ComponentKind::Transform).unwrap()
        else {
            panic!("expected a transform");
        };
        assert_eq!(data.position, Vector3Data { x: 1.0, y: 2.0, z: 3.0 });
        assert!(data.scale.is_none());
    }

    #[test]
    fn test_decode_malformed_transform() {
        let description = ComponentDescription::new(
            "t1",
            ComponentKind::Transform,
            json!({"position": {"x": 1, "y": 2}, "rotation": {"x": 0, "y": 0, "z": 0, "w": 1}}),
        );

        let err = description.decode_as(ComponentKind::Transform).unwrap_err();
        assert!(matches!(
            err,
            SyncError::MalformedPayload { ref component_id, kind: ComponentKind::Transform, .. }
                if component_id == "t1"
        ));
    }

    #[test]
    fn test_gltf_mappings_default_empty() {
        let description =
            ComponentDescription::new("g1", ComponentKind::GltfShape, json!({"src": "a.glb"}));
        let data = description.decode_as(ComponentKind::GltfShape).unwrap();
        assert_eq!(data.share_key(), Some("a.glb"));
        let ComponentData::GltfShape(gltf) = data else {
            panic!("expected a gltf shape");
        };
        assert!(gltf.mappings.is_empty());
    }

    #[test]
    fn test_snapshot_file_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        let mut snapshot = SceneSnapshot::new();
        snapshot
            .insert_component(ComponentDescription::new(
                "g1",
                ComponentKind::GltfShape,
                json!({"src": "a.glb"}),
            ))
            .insert_entity("e1", ["g1"]);

        snapshot.save_to_file(&path).unwrap();
        let loaded = SceneSnapshot::load_from_file(&path).unwrap();
        assert_eq!(loaded, snapshot);

        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            SceneSnapshot::load_from_file(&path),
            Err(SyncError::Json(_))
        ));
    }
}
