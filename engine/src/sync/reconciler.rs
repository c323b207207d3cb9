//! Incremental reconciliation of scene snapshots against a live runtime

use super::error::{SyncError, SyncIssue};
use super::runtime::{EntityDraft, SceneRuntime};
use crate::config::SyncConfig;
use crate::core::entity::{ComponentHandle, GizmoEvent};
use crate::io::component_registry::ComponentRegistry;
use crate::io::live_index::{LiveEntry, LiveIndex};
use crate::io::scene::SceneSnapshot;
use tracing::{debug, info, warn};

/// What a single `apply` changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    pub components_created: usize,
    pub components_updated: usize,
    pub components_pruned: usize,
    pub entities_created: usize,
    pub entities_pruned: usize,
    pub detachments: usize,
    /// Skipped conditions, in the order they were met
    pub issues: Vec<SyncIssue>,
}

/// Applies scene snapshots to a live runtime with minimal changes
///
/// Owns the [`LiveIndex`] for its runtime. Entity identity is preserved
/// across snapshots: an entity id seen twice maps to the same runtime entity.
pub struct Reconciler {
    registry: ComponentRegistry,
    index: LiveIndex,
    config: SyncConfig,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Reconciler {
    pub fn new(registry: ComponentRegistry, config: SyncConfig) -> Self {
        Self {
            registry,
            index: LiveIndex::new(),
            config,
        }
    }

    /// Reconciler for the default component types and configuration
    pub fn with_defaults() -> Self {
        Self::new(
            ComponentRegistry::with_default_components(),
            SyncConfig::default(),
        )
    }

    pub fn live_index(&self) -> &LiveIndex {
        &self.index
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Make the runtime match `snapshot`
    ///
    /// Runs four phases in order: component materialization, entity
    /// materialization, stale component pruning, stale entity pruning.
    /// A malformed payload aborts the pass; mutations made before the fault
    /// stay in place and the caller should resend a full snapshot.
    pub fn apply<R: SceneRuntime>(
        &mut self,
        runtime: &mut R,
        snapshot: &SceneSnapshot,
    ) -> Result<ApplyReport, SyncError> {
        debug!(
            components = snapshot.components.len(),
            entities = snapshot.entities.len(),
            "Applying snapshot"
        );

        if self.config.validate_before_apply {
            self.validate(snapshot)?;
        }

        let mut report = ApplyReport::default();
        self.materialize_components(runtime, snapshot, &mut report)?;
        self.materialize_entities(runtime, snapshot, &mut report);
        self.prune_components(runtime, snapshot, &mut report);
        self.prune_entities(runtime, snapshot, &mut report);

        info!(
            created = report.components_created,
            updated = report.components_updated,
            pruned = report.components_pruned,
            entities_created = report.entities_created,
            entities_pruned = report.entities_pruned,
            issues = report.issues.len(),
            "Snapshot applied"
        );
        Ok(report)
    }

    /// Decode every recognized payload without touching the runtime
    pub fn validate(&self, snapshot: &SceneSnapshot) -> Result<(), SyncError> {
        for description in snapshot.components.values() {
            if let Some(handler) = self.registry.resolve(&description.type_tag) {
                description.decode_for_runtime(handler.kind)?;
            }
        }
        Ok(())
    }

    /// Dispose or release every indexed component and empty the index
    pub fn reset<R: SceneRuntime>(&mut self, runtime: &mut R) {
        let entries: Vec<(String, LiveEntry)> = self
            .index
            .iter()
            .map(|(id, entry)| (id.to_string(), entry))
            .collect();
        let mut report = ApplyReport::default();
        for (id, entry) in entries {
            self.discard(runtime, &id, entry, &mut report);
        }
        info!(pruned = report.components_pruned, "Reconciler reset");
    }

    fn materialize_components<R: SceneRuntime>(
        &mut self,
        runtime: &mut R,
        snapshot: &SceneSnapshot,
        report: &mut ApplyReport,
    ) -> Result<(), SyncError> {
        for (id, description) in &snapshot.components {
            let Some(handler) = self.registry.resolve(&description.type_tag).cloned() else {
                debug!(component_id = %id, component_type = %description.type_tag, "Skipping unknown component type");
                report.issues.push(SyncIssue::UnknownType {
                    component_id: id.clone(),
                    type_tag: description.type_tag.clone(),
                });
                continue;
            };

            // The same id now describes a different kind: start over
            if let Some(previous) = self.index.get(id).filter(|entry| entry.kind != handler.kind) {
                debug!(component_id = %id, from = %previous.kind, to = %handler.kind, "Component changed kind");
                self.discard(runtime, id, previous, report);
            }

            let existing = self.index.get(id);
            if existing.is_some() && handler.update.is_none() {
                continue;
            }

            let data = description.decode_for_runtime(handler.kind)?;

            let handle = match existing {
                Some(entry) => entry.handle,
                None => {
                    let Some(component) = (handler.construct)(&data) else {
                        warn!(component_id = %id, component_type = %handler.kind, "Constructor produced no component");
                        continue;
                    };
                    let handle = runtime.construct_component(component);
                    self.index.register(
                        id.clone(),
                        LiveEntry {
                            handle,
                            kind: handler.kind,
                        },
                    );
                    report.components_created += 1;
                    handle
                }
            };

            if let Some(update) = &handler.update {
                if let Some(live) = runtime.component_mut(handle) {
                    update(&mut live.component, &data);
                    live.nonce = rand::random();
                    live.dirty = true;
                    report.components_updated += 1;
                }
            }
        }
        Ok(())
    }

    fn materialize_entities<R: SceneRuntime>(
        &mut self,
        runtime: &mut R,
        snapshot: &SceneSnapshot,
        report: &mut ApplyReport,
    ) {
        for (id, description) in &snapshot.entities {
            let entity = match runtime.find_entity(id) {
                Some(entity) => entity,
                None => {
                    let draft = EntityDraft::new(id.clone())
                        .with_gizmos(self.config.gizmos)
                        .with_listener(GizmoEvent::new(self.config.gizmo_event_uuid.clone()));
                    report.entities_created += 1;
                    runtime.add_entity(draft)
                }
            };

            let mut referenced: Vec<ComponentHandle> = Vec::with_capacity(description.components.len());
            for component_id in &description.components {
                match self.index.get(component_id) {
                    Some(entry) => {
                        if runtime.attach(entity, entry.handle) {
                            referenced.push(entry.handle);
                        }
                    }
                    None => {
                        debug!(entity_id = %id, component_id = %component_id, "Unresolved component reference");
                        report.issues.push(SyncIssue::UnresolvedReference {
                            entity_id: id.clone(),
                            component_id: component_id.clone(),
                        });
                    }
                }
            }

            if self.config.detach_unreferenced {
                for handle in runtime.attached_components(entity) {
                    if !referenced.contains(&handle) && runtime.detach(entity, handle) {
                        debug!(entity_id = %id, handle = ?handle, "Detached component no longer referenced");
                        report.detachments += 1;
                    }
                }
            }
        }
    }

    fn prune_components<R: SceneRuntime>(
        &mut self,
        runtime: &mut R,
        snapshot: &SceneSnapshot,
        report: &mut ApplyReport,
    ) {
        for (id, entry) in self.index.stale_entries(snapshot) {
            self.discard(runtime, &id, entry, report);
        }
    }

    fn prune_entities<R: SceneRuntime>(
        &mut self,
        runtime: &mut R,
        snapshot: &SceneSnapshot,
        report: &mut ApplyReport,
    ) {
        for (uuid, entity) in runtime.live_entities() {
            if !snapshot.entities.contains_key(&uuid) && runtime.remove_entity(entity) {
                debug!(entity_id = %uuid, "Pruned stale entity");
                report.entities_pruned += 1;
            }
        }
    }

    // Drop a component from the runtime and the index
    fn discard<R: SceneRuntime>(
        &mut self,
        runtime: &mut R,
        id: &str,
        entry: LiveEntry,
        report: &mut ApplyReport,
    ) {
        if self.config.detach_orphans {
            for (entity_id, entity) in runtime.entities_holding(entry.handle) {
                if runtime.detach(entity, entry.handle) {
                    report.detachments += 1;
                    report.issues.push(SyncIssue::DetachedOrphan {
                        component_id: id.to_string(),
                        entity_id,
                    });
                }
            }
        }

        if runtime.is_disposable(entry.kind) {
            runtime.dispose_component(entry.handle);
        } else {
            runtime.release_component(entry.handle);
        }

        self.index.remove(id);
        report.components_pruned += 1;
        debug!(component_id = %id, kind = %entry.kind, "Pruned stale component");
    }
}
