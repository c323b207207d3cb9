//! Scene synchronization engine for the builder
//!
//! Takes scene descriptions authored in the editor and either reconciles them
//! against a live scene graph or compiles them into a standalone scene script.

pub mod codegen;
pub mod config;
pub mod core;
pub mod editor_queries;
pub mod io;
pub mod sync;

// Re-export commonly used types
pub mod prelude {
    // Entity system types
    pub use crate::core::entity::{
        ComponentHandle, ComponentKind, Entity, GltfShape, NftShape, RuntimeComponent, Transform,
        World,
    };

    // Math types
    pub use glam::{Quat, Vec3};

    // IO types
    pub use crate::io::{
        ComponentDescription, ComponentRegistry, EditorInbox, ExternalAction, SceneSnapshot,
        SceneWatcher, WatcherConfig,
    };

    // Sync types
    pub use crate::sync::{ApplyReport, Reconciler, SceneRuntime, SyncError, SyncIssue};

    // Codegen
    pub use crate::codegen::{generate, generate_with};

    // Config types
    pub use crate::config::{AssetConfig, BuilderConfig, CodegenConfig, SyncConfig};
}

/// Initialize logging for the engine
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,notify=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
