//! Scene synchronization: applying editor snapshots to a live runtime

mod error;
mod reconciler;
mod runtime;

pub use error::{SyncError, SyncIssue};
pub use reconciler::{ApplyReport, Reconciler};
pub use runtime::{EntityDraft, SceneRuntime};
