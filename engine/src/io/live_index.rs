//! Index from scene component ids to live runtime components

use crate::core::entity::{ComponentHandle, ComponentKind};
use crate::io::scene::SceneSnapshot;
use indexmap::IndexMap;
use tracing::debug;

/// A live component recorded in the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveEntry {
    pub handle: ComponentHandle,
    pub kind: ComponentKind,
}

/// Maps component ids from scene descriptions to live runtime components
///
/// Every id in the index refers to a component that exists in the runtime.
/// The index is owned by a single reconciler and survives across updates.
#[derive(Debug, Default)]
pub struct LiveIndex {
    mapping: IndexMap<String, LiveEntry>,
}

impl LiveIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self {
            mapping: IndexMap::new(),
        }
    }

    /// Record the live component for a component id
    pub fn register(&mut self, component_id: impl Into<String>, entry: LiveEntry) {
        let component_id = component_id.into();
        debug!(component_id = %component_id, handle = ?entry.handle, kind = %entry.kind, "Indexed live component");
        self.mapping.insert(component_id, entry);
    }

    /// Look up the live component for a component id
    pub fn get(&self, component_id: &str) -> Option<LiveEntry> {
        self.mapping.get(component_id).copied()
    }

    pub fn contains(&self, component_id: &str) -> bool {
        self.mapping.contains_key(component_id)
    }

    /// Forget a component id, returning what it mapped to
    pub fn remove(&mut self, component_id: &str) -> Option<LiveEntry> {
        self.mapping.shift_remove(component_id)
    }

    /// Get the number of indexed components
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Get all indexed component ids
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.mapping.keys().map(String::as_str)
    }

    /// Get an iterator over all (component_id, entry) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, LiveEntry)> + '_ {
        self.mapping.iter().map(|(id, entry)| (id.as_str(), *entry))
    }

    /// Entries whose ids are missing from a snapshot's component map
    pub fn stale_entries(&self, snapshot: &SceneSnapshot) -> Vec<(String, LiveEntry)> {
        self.mapping
            .iter()
            .filter(|(id, _)| !snapshot.components.contains_key(*id))
            .map(|(id, entry)| (id.clone(), *entry))
            .collect()
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.mapping.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::scene::ComponentDescription;
    use slotmap::SlotMap;

    fn handles(count: usize) -> Vec<ComponentHandle> {
        let mut arena: SlotMap<ComponentHandle, ()> = SlotMap::with_key();
        (0..count).map(|_| arena.insert(())).collect()
    }

    fn entry(handle: ComponentHandle) -> LiveEntry {
        LiveEntry {
            handle,
            kind: ComponentKind::Transform,
        }
    }

    #[test]
    fn test_live_index_basic() {
        let mut index = LiveIndex::new();
        assert!(index.is_empty());

        let handle = handles(1)[0];
        index.register("c1", entry(handle));

        assert_eq!(index.len(), 1);
        assert!(index.contains("c1"));
        assert_eq!(index.get("c1").map(|e| e.handle), Some(handle));
        assert_eq!(index.get("c2"), None);
    }

    #[test]
    fn test_live_index_overwrite() {
        let mut index = LiveIndex::new();
        let h = handles(2);

        index.register("c1", entry(h[0]));
        index.register("c1", entry(h[1]));

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("c1").map(|e| e.handle), Some(h[1]));
    }

    #[test]
    fn test_live_index_remove_keeps_order() {
        let mut index = LiveIndex::new();
        let h = handles(3);
        index.register("a", entry(h[0]));
        index.register("b", entry(h[1]));
        index.register("c", entry(h[2]));

        assert_eq!(index.remove("b").map(|e| e.handle), Some(h[1]));
        assert_eq!(index.remove("b"), None);
        assert_eq!(index.ids().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn test_stale_entries() {
        let mut index = LiveIndex::new();
        let h = handles(2);
        index.register("kept", entry(h[0]));
        index.register("dropped", entry(h[1]));

        let mut snapshot = SceneSnapshot::new();
        snapshot.insert_component(ComponentDescription::new(
            "kept",
            ComponentKind::Transform,
            serde_json::Value::Null,
        ));

        let stale = index.stale_entries(&snapshot);
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].0, "dropped");
        assert_eq!(stale[0].1.handle, h[1]);
    }

    #[test]
    fn test_live_index_clear() {
        let mut index = LiveIndex::new();
        for (i, handle) in handles(2).into_iter().enumerate() {
            index.register(format!("c{i}"), entry(handle));
        }
        index.clear();
        assert!(index.is_empty());
    }
}
