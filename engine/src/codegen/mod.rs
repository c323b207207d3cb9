//! Compiles scene snapshots into standalone scene scripts
//!
//! The generated script assumes the target runtime provides `Entity`,
//! `Transform`, `Vector3`, `Quaternion`, the shape constructors,
//! `OnDragEnded`, `log` and an `engine` object with `addEntity`.
//!
//! Generation runs two passes. The first builds one lookup table per
//! shareable component kind, constructing each distinct content key once.
//! The second emits every entity and attaches components either from those
//! tables or, for per-entity kinds, through inline constructors.

pub mod statements;

use crate::config::CodegenConfig;
use crate::core::entity::ComponentKind;
use crate::io::scene::{ComponentData, SceneSnapshot};
use crate::sync::SyncError;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Generate a script with the default configuration
pub fn generate(snapshot: &SceneSnapshot) -> Result<String, SyncError> {
    generate_with(snapshot, &CodegenConfig::default())
}

/// Generate a script that rebuilds `snapshot` from scratch
///
/// Output depends only on the snapshot's contents and key order.
pub fn generate_with(snapshot: &SceneSnapshot, config: &CodegenConfig) -> Result<String, SyncError> {
    let tables = SharedTables::collect(snapshot)?;

    let mut out = String::new();
    tables.write(&mut out, config);
    write_entities(&mut out, snapshot, &tables, config)?;

    debug!(
        entities = snapshot.entities.len(),
        shared = tables.len(),
        bytes = out.len(),
        "Generated scene script"
    );
    Ok(out)
}

/// Deduplicated shared instances, keyed by content
#[derive(Debug, Default)]
pub struct SharedTables {
    keys: IndexMap<ComponentKind, IndexSet<String>>,
    by_component: HashMap<String, String>,
}

impl SharedTables {
    /// Scan every shareable component in the snapshot
    pub fn collect(snapshot: &SceneSnapshot) -> Result<Self, SyncError> {
        let mut tables = Self::default();
        for kind in ComponentKind::ALL.into_iter().filter(|kind| kind.is_shareable()) {
            tables.keys.insert(kind, IndexSet::new());
        }

        for (id, description) in &snapshot.components {
            let Some(kind) = description.kind().filter(|kind| kind.is_shareable()) else {
                continue;
            };
            let data = description.decode_as(kind)?;
            if let Some(key) = data.share_key() {
                if let Some(keys) = tables.keys.get_mut(&kind) {
                    if keys.insert(key.to_string()) {
                        trace!(kind = %kind, key = key, "New shared resource");
                    }
                }
                tables.by_component.insert(id.clone(), key.to_string());
            }
        }
        Ok(tables)
    }

    /// Distinct content keys for a kind, in first-encounter order
    pub fn keys(&self, kind: ComponentKind) -> impl Iterator<Item = &str> {
        self.keys
            .get(&kind)
            .into_iter()
            .flat_map(|keys| keys.iter().map(String::as_str))
    }

    /// Content key of a shareable component
    pub fn key_for(&self, component_id: &str) -> Option<&str> {
        self.by_component.get(component_id).map(String::as_str)
    }

    /// Total number of shared constructions
    pub fn len(&self) -> usize {
        self.keys.values().map(IndexSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self, out: &mut String, config: &CodegenConfig) {
        for (kind, keys) in &self.keys {
            let Some(table) = statements::table_name(*kind) else {
                continue;
            };
            out.push_str(&statements::table_open(table));
            for key in keys {
                out.push_str(&statements::table_entry(*kind, key));
            }
            out.push_str(&statements::table_close());
            if config.mark_pickable {
                out.push_str(&statements::mark_pickable(table));
            }
        }
    }
}

fn write_entities(
    out: &mut String,
    snapshot: &SceneSnapshot,
    tables: &SharedTables,
    config: &CodegenConfig,
) -> Result<(), SyncError> {
    out.push_str(&statements::entity_preamble(&config.drag_event_uuid));

    for (id, entity) in &snapshot.entities {
        out.push_str(&statements::entity_open(id));

        for component_id in &entity.components {
            let Some(description) = snapshot.components.get(component_id) else {
                debug!(entity_id = %id, component_id = %component_id, "Skipping dangling component reference");
                continue;
            };
            let Some(kind) = description.kind() else {
                continue;
            };

            if let Some(table) = statements::table_name(kind) {
                if let Some(key) = tables.key_for(component_id) {
                    out.push_str(&statements::shared_reference(table, key));
                }
                continue;
            }

            if let ComponentData::Transform(data) = description.decode_as(kind)? {
                out.push_str(&statements::transform_constructor(&data));
            }
        }

        out.push_str(&statements::add_entity());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::scene::ComponentDescription;
    use serde_json::json;

    #[test]
    fn test_empty_snapshot_still_declares_tables() {
        let script = generate(&SceneSnapshot::new()).unwrap();
        assert!(script.contains("var gltfLookup = {\n};\n"));
        assert!(script.contains("var nftLookup = {\n};\n"));
        assert!(script.contains("var entities = [];\n"));
        assert!(!script.contains("engine.addEntity"));
    }

    #[test]
    fn test_tables_come_before_entities() {
        let mut snapshot = SceneSnapshot::new();
        snapshot
            .insert_component(ComponentDescription::new(
                "g1",
                ComponentKind::GltfShape,
                json!({"src": "a.glb"}),
            ))
            .insert_entity("e1", ["g1"]);

        let script = generate(&snapshot).unwrap();
        let table = script.find("new GLTFShape(\"a.glb\")").unwrap();
        let reference = script.find("currentEntity.set(gltfLookup[\"a.glb\"]);").unwrap();
        assert!(table < reference);
    }

    #[test]
    fn test_pickable_loop_can_be_disabled() {
        let config = CodegenConfig {
            mark_pickable: false,
            ..CodegenConfig::default()
        };
        let script = generate_with(&SceneSnapshot::new(), &config).unwrap();
        assert!(!script.contains("isPickable"));
    }

    #[test]
    fn test_shared_tables_map_components_to_keys() {
        let mut snapshot = SceneSnapshot::new();
        snapshot
            .insert_component(ComponentDescription::new(
                "g1",
                ComponentKind::GltfShape,
                json!({"src": "a.glb"}),
            ))
            .insert_component(ComponentDescription::new(
                "n1",
                ComponentKind::NftShape,
                json!({"url": "ethereum://0xabc/1"}),
            ));

        let tables = SharedTables::collect(&snapshot).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables.key_for("g1"), Some("a.glb"));
        assert_eq!(tables.key_for("n1"), Some("ethereum://0xabc/1"));
        assert_eq!(tables.keys(ComponentKind::NftShape).collect::<Vec<_>>(), vec!["ethereum://0xabc/1"]);
    }
}
