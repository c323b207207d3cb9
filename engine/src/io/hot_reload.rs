//! Hot-reload of snapshot files into editor actions

use crate::io::external::{ActionSender, ExternalAction};
use crate::io::scene::SceneSnapshot;
use crate::sync::SyncError;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Watches a snapshot file and delivers its contents as `UpdateEditor` actions
pub struct SceneWatcher {
    /// File system watcher
    _watcher: RecommendedWatcher,
    /// Path being watched
    scene_path: PathBuf,
    /// Control handle for stopping the watcher
    control_handle: Option<WatcherControlHandle>,
}

/// Control handle for managing the watcher thread
struct WatcherControlHandle {
    stop_sender: Sender<()>,
    thread_handle: thread::JoinHandle<()>,
}

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for the scene watcher
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Debounce duration to avoid multiple reloads for rapid file changes
    pub debounce_duration: Duration,
    /// Deliver the file's current contents as soon as the watcher starts
    pub send_initial: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_duration: Duration::from_millis(300),
            send_initial: true,
        }
    }
}

/// Read a snapshot file and wrap it as an editor update
pub fn load_action_file<P: AsRef<Path>>(path: P) -> Result<ExternalAction, SyncError> {
    let snapshot = SceneSnapshot::load_from_file(path)?;
    Ok(ExternalAction::UpdateEditor(snapshot))
}

impl SceneWatcher {
    /// Create a new scene watcher that sends reloaded snapshots to `actions`
    pub fn new<P: AsRef<Path>>(
        scene_path: P,
        config: WatcherConfig,
        actions: ActionSender,
    ) -> Result<Self, SyncError> {
        let scene_path = scene_path.as_ref().to_path_buf();
        info!(path = ?scene_path, "Creating scene watcher");

        if config.send_initial {
            match load_action_file(&scene_path) {
                Ok(action) => {
                    if actions.send(action).is_err() {
                        warn!("Inbox closed before the initial snapshot was sent");
                    }
                }
                Err(e) => warn!(error = %e, "Initial snapshot unavailable"),
            }
        }

        // Create channels for file events and control
        let (event_tx, event_rx) = mpsc::channel::<Event>();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        // Create the file system watcher
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Err(e) = event_tx.send(event) {
                        error!(error = %e, "Failed to send file event");
                    }
                }
                Err(e) => error!(error = %e, "File watcher error"),
            },
            Config::default(),
        )?;

        // Watch the scene file's parent directory so that atomic replaces are seen
        let watch_path = match scene_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        watcher.watch(&watch_path, RecursiveMode::NonRecursive)?;
        debug!(watch_path = ?watch_path, "Started watching for file changes");

        // Spawn background thread for handling events
        let scene_path_clone = scene_path.clone();
        let thread_handle = thread::spawn(move || {
            Self::event_loop(scene_path_clone, config, actions, event_rx, stop_rx);
        });

        Ok(Self {
            _watcher: watcher,
            scene_path,
            control_handle: Some(WatcherControlHandle {
                stop_sender: stop_tx,
                thread_handle,
            }),
        })
    }

    /// Event loop for handling file system events
    ///
    /// A burst of changes is delivered once, after `debounce_duration` has
    /// passed without another change, so the last write always wins. If the
    /// snapshot file is gone when the burst settles, the loop stops.
    fn event_loop(
        scene_path: PathBuf,
        config: WatcherConfig,
        actions: ActionSender,
        event_rx: Receiver<Event>,
        stop_rx: Receiver<()>,
    ) {
        let mut pending: Option<Instant> = None;

        loop {
            if stop_rx.try_recv().is_ok() {
                debug!("Scene watcher received stop signal");
                break;
            }

            let timeout = pending
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(POLL_INTERVAL)
                .min(POLL_INTERVAL);

            match event_rx.recv_timeout(timeout) {
                Ok(event) => {
                    let relevant =
                        event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove();
                    let ours = event
                        .paths
                        .iter()
                        .any(|path| path.file_name() == scene_path.file_name());
                    if relevant && ours {
                        if pending.is_some() {
                            debug!("Debouncing rapid file changes");
                        }
                        pending = Some(Instant::now() + config.debounce_duration);
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    debug!("Event channel disconnected, stopping watcher");
                    break;
                }
            }

            let Some(deadline) = pending else {
                continue;
            };
            if Instant::now() < deadline {
                continue;
            }
            pending = None;

            if !scene_path.exists() {
                info!(path = ?scene_path, "Snapshot file removed, stopping watcher");
                break;
            }

            match load_action_file(&scene_path) {
                Ok(action) => {
                    if actions.send(action).is_err() {
                        debug!("Inbox closed, stopping watcher");
                        break;
                    }
                    info!(path = ?scene_path, "Snapshot reloaded");
                }
                // The editor may still be writing the file
                Err(e) => warn!(error = %e, "Failed to reload snapshot"),
            }
        }

        info!("Scene watcher event loop stopped");
    }

    /// Stop the watcher and join its thread
    pub fn stop(mut self) -> Result<(), SyncError> {
        if let Some(control) = self.control_handle.take() {
            info!(path = ?self.scene_path, "Stopping scene watcher");

            if let Err(e) = control.stop_sender.send(()) {
                warn!(error = %e, "Failed to send stop signal to watcher thread");
            }

            if control.thread_handle.join().is_err() {
                error!("Scene watcher thread panicked");
            }

            info!("Scene watcher stopped successfully");
        }

        Ok(())
    }

    /// Get the path being watched
    pub fn scene_path(&self) -> &Path {
        &self.scene_path
    }

    /// Whether the watcher thread is still delivering snapshots
    pub fn is_running(&self) -> bool {
        self.control_handle
            .as_ref()
            .is_some_and(|control| !control.thread_handle.is_finished())
    }
}

impl Drop for SceneWatcher {
    fn drop(&mut self) {
        if let Some(control) = self.control_handle.take() {
            warn!("SceneWatcher dropped without calling stop() - forcing stop");
            let _ = control.stop_sender.send(());
        }
    }
}
