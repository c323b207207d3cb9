//! Errors and non-fatal issues raised while synchronizing scenes

use crate::config::ConfigError;
use crate::core::entity::ComponentKind;
use std::io;

/// Fatal faults that abort a reconciliation pass or a script generation
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A recognized component type carried structurally invalid data
    #[error("malformed {kind} payload for component '{component_id}': {source}")]
    MalformedPayload {
        component_id: String,
        kind: ComponentKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("file watcher error: {0}")]
    Watcher(#[from] notify::Error),
}

/// Conditions that are skipped rather than failing the pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncIssue {
    /// The component's type tag has no registered constructor
    UnknownType {
        component_id: String,
        type_tag: String,
    },
    /// An entity referenced a component that is not live
    UnresolvedReference {
        entity_id: String,
        component_id: String,
    },
    /// A removed component was still attached to an entity and got detached
    DetachedOrphan {
        component_id: String,
        entity_id: String,
    },
}
