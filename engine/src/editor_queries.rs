//! Read-only queries the editor runs against a scene snapshot

use crate::core::entity::ComponentKind;
use crate::io::{ComponentData, SceneSnapshot};
use crate::sync::SyncError;
use indexmap::IndexMap;

/// Merge the asset mappings of every GLTF component
///
/// Components later in the snapshot win when two map the same file.
pub fn scene_mappings(snapshot: &SceneSnapshot) -> Result<IndexMap<String, String>, SyncError> {
    let mut mappings = IndexMap::new();
    for description in snapshot.components.values() {
        if description.kind() != Some(ComponentKind::GltfShape) {
            continue;
        }
        if let ComponentData::GltfShape(data) = description.decode_as(ComponentKind::GltfShape)? {
            mappings.extend(data.mappings);
        }
    }
    Ok(mappings)
}

/// Editor tools available for the current selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnabledTools {
    pub move_entity: bool,
    pub rotate: bool,
    pub duplicate: bool,
    pub reset: bool,
    pub delete: bool,
}

/// Tools enabled for `selected`; NFT frames cannot be duplicated
pub fn enabled_tools(snapshot: &SceneSnapshot, selected: Option<&str>) -> EnabledTools {
    let Some(entity) = selected.and_then(|id| snapshot.entities.get(id)) else {
        return EnabledTools::default();
    };

    let holds_nft = entity.components.iter().any(|component_id| {
        snapshot
            .components
            .get(component_id)
            .is_some_and(|description| description.kind() == Some(ComponentKind::NftShape))
    });

    EnabledTools {
        move_entity: true,
        rotate: true,
        duplicate: !holds_nft,
        reset: true,
        delete: true,
    }
}
