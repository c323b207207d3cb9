//! Configuration types for the builder engine

use crate::core::entity::Gizmos;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Errors raised while resolving or loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {kind} name: {name}")]
    InvalidName { kind: &'static str, name: String },

    #[error("{0} directory not found: {1:?}")]
    MissingDirectory(&'static str, PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for asset paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Root directory for all assets
    pub asset_root: PathBuf,
    /// Directory name for scene snapshots (relative to asset_root)
    pub scenes_dir: String,
    /// Directory name for generated scripts (relative to asset_root)
    pub scripts_dir: String,
}

impl AssetConfig {
    /// Create a new AssetConfig with custom paths
    pub fn new(asset_root: PathBuf, scenes_dir: String, scripts_dir: String) -> Self {
        debug!(
            asset_root = ?asset_root,
            scenes_dir = scenes_dir,
            scripts_dir = scripts_dir,
            "Creating new AssetConfig"
        );
        Self {
            asset_root,
            scenes_dir,
            scripts_dir,
        }
    }

    /// Get the full path to a scene snapshot file
    pub fn scene_path(&self, name: &str) -> Result<PathBuf, ConfigError> {
        validate_name("scene", name)?;
        let path = self
            .asset_root
            .join(&self.scenes_dir)
            .join(format!("{name}.json"));
        debug!(name = name, path = ?path, "Generated scene path");
        Ok(path)
    }

    /// Get the full path to a generated script file
    pub fn script_path(&self, name: &str) -> Result<PathBuf, ConfigError> {
        validate_name("script", name)?;
        let path = self
            .asset_root
            .join(&self.scripts_dir)
            .join(format!("{name}.js"));
        debug!(name = name, path = ?path, "Generated script path");
        Ok(path)
    }

    /// Check if the asset directories exist
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.asset_root.exists() {
            return Err(ConfigError::MissingDirectory(
                "asset root",
                self.asset_root.clone(),
            ));
        }

        let scenes_path = self.asset_root.join(&self.scenes_dir);
        if !scenes_path.exists() {
            return Err(ConfigError::MissingDirectory("scenes", scenes_path));
        }

        let scripts_path = self.asset_root.join(&self.scripts_dir);
        if !scripts_path.exists() {
            return Err(ConfigError::MissingDirectory("scripts", scripts_path));
        }

        Ok(())
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            scenes_dir: "scenes".to_string(),
            scripts_dir: "scripts".to_string(),
        }
    }
}

// Reject names that could escape the asset directories
fn validate_name(kind: &'static str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(ConfigError::InvalidName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Reconciler behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Gizmo handles added to every entity the reconciler creates
    pub gizmos: Gizmos,
    /// Uuid of the gizmo-event listener added to created entities
    pub gizmo_event_uuid: String,
    /// Detach removed components from every entity still holding them
    pub detach_orphans: bool,
    /// Detach components an entity no longer references
    pub detach_unreferenced: bool,
    /// Decode every payload before mutating the runtime
    pub validate_before_apply: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            gizmos: Gizmos::default(),
            gizmo_event_uuid: "gizmoEvent-editor".to_string(),
            detach_orphans: true,
            detach_unreferenced: true,
            validate_before_apply: false,
        }
    }
}

/// Script generation behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// Uuid of the drag-ended placeholder event attached to every entity
    pub drag_event_uuid: String,
    /// Emit the loop that marks shared resources pickable
    pub mark_pickable: bool,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            drag_event_uuid: "dragEndedEvent-editor".to_string(),
            mark_pickable: true,
        }
    }
}

/// Top-level configuration file for the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub assets: AssetConfig,
    pub sync: SyncConfig,
    pub codegen: CodegenConfig,
}

impl BuilderConfig {
    /// Load configuration from a JSON file; missing fields take their defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        debug!(path = ?path, "Loaded builder config");
        Ok(config)
    }
}
