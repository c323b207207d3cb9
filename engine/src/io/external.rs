//! Inbound editor actions and the single-consumer inbox that applies them

use crate::io::scene::SceneSnapshot;
use crate::sync::{ApplyReport, Reconciler, SceneRuntime, SyncError};
use serde::Deserialize;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Action type carrying a full scene snapshot
pub const UPDATE_EDITOR: &str = "Update editor";

/// A message delivered by the editor
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalAction {
    /// Replace the desired scene state
    UpdateEditor(SceneSnapshot),
    /// Any action type this build does not handle
    Unknown(String),
}

#[derive(Deserialize)]
struct RawAction {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Deserialize)]
struct UpdateEditorPayload {
    scene: SceneSnapshot,
}

impl ExternalAction {
    /// Decode an action from its `{ type, payload }` JSON form
    pub fn from_value(value: serde_json::Value) -> Result<Self, SyncError> {
        let raw: RawAction = serde_json::from_value(value)?;
        match raw.kind.as_str() {
            UPDATE_EDITOR => {
                let payload: UpdateEditorPayload = serde_json::from_value(raw.payload)?;
                let mut scene = payload.scene;
                scene.normalize_ids();
                Ok(ExternalAction::UpdateEditor(scene))
            }
            _ => Ok(ExternalAction::Unknown(raw.kind)),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SyncError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Encode back to the `{ type, payload }` JSON form
    pub fn to_value(&self) -> Result<serde_json::Value, SyncError> {
        Ok(match self {
            ExternalAction::UpdateEditor(scene) => serde_json::json!({
                "type": UPDATE_EDITOR,
                "payload": { "scene": serde_json::to_value(scene)? },
            }),
            ExternalAction::Unknown(kind) => serde_json::json!({ "type": kind }),
        })
    }
}

/// Sending half of the inbox; cloneable and usable from any thread
pub type ActionSender = Sender<ExternalAction>;

/// Totals for one drain of the inbox
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PumpSummary {
    pub snapshots_applied: usize,
    pub actions_ignored: usize,
    /// Report of the last snapshot applied
    pub last_report: Option<ApplyReport>,
}

/// Subscription to inbound editor actions
///
/// Any number of senders may deliver actions; only the owner of the inbox
/// receives them, and it applies them one at a time on its own thread.
pub struct EditorInbox {
    sender: ActionSender,
    receiver: Receiver<ExternalAction>,
    reconciler: Reconciler,
}

impl EditorInbox {
    /// Subscribe once at startup, handing the inbox its reconciler
    pub fn subscribe(reconciler: Reconciler) -> Self {
        let (sender, receiver) = mpsc::channel();
        info!("Subscribed to external editor actions");
        Self {
            sender,
            receiver,
            reconciler,
        }
    }

    /// A sender for producers on other threads
    pub fn sender(&self) -> ActionSender {
        self.sender.clone()
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Apply every pending action in arrival order
    ///
    /// Stops at the first failing snapshot; actions behind it stay queued.
    pub fn pump<R: SceneRuntime>(&mut self, runtime: &mut R) -> Result<PumpSummary, SyncError> {
        let mut summary = PumpSummary::default();
        while let Ok(action) = self.receiver.try_recv() {
            self.handle(runtime, action, &mut summary)?;
        }
        Ok(summary)
    }

    /// Wait up to `timeout` for the next action, then drain the rest
    pub fn wait_and_pump<R: SceneRuntime>(
        &mut self,
        runtime: &mut R,
        timeout: Duration,
    ) -> Result<PumpSummary, SyncError> {
        let mut summary = PumpSummary::default();
        match self.receiver.recv_timeout(timeout) {
            Ok(action) => self.handle(runtime, action, &mut summary)?,
            Err(RecvTimeoutError::Timeout) => return Ok(summary),
            // The inbox holds a sender itself, so the channel stays open
            Err(RecvTimeoutError::Disconnected) => return Ok(summary),
        }

        let rest = self.pump(runtime)?;
        summary.snapshots_applied += rest.snapshots_applied;
        summary.actions_ignored += rest.actions_ignored;
        if rest.last_report.is_some() {
            summary.last_report = rest.last_report;
        }
        Ok(summary)
    }

    fn handle<R: SceneRuntime>(
        &mut self,
        runtime: &mut R,
        action: ExternalAction,
        summary: &mut PumpSummary,
    ) -> Result<(), SyncError> {
        match action {
            ExternalAction::UpdateEditor(snapshot) => {
                let report = self.reconciler.apply(runtime, &snapshot).map_err(|e| {
                    warn!(error = %e, "Snapshot rejected, waiting for a full resend");
                    e
                })?;
                summary.snapshots_applied += 1;
                summary.last_report = Some(report);
            }
            ExternalAction::Unknown(kind) => {
                debug!(action = %kind, "Ignoring external action");
                summary.actions_ignored += 1;
            }
        }
        Ok(())
    }
}
