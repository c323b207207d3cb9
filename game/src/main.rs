//! Builder host: keeps a live scene in sync with the editor and exports scripts

use builder_engine::config::BuilderConfig;
use builder_engine::prelude::*;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "builder-host")]
#[command(about = "Reconciles editor scene snapshots and exports scene scripts")]
#[command(version)]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch a snapshot file and reconcile the live scene on every change
    ///
    /// Runs until the snapshot file is removed.
    Watch {
        /// Snapshot file, or a scene name under the configured scenes directory
        scene: String,
        /// Debounce for file changes, in milliseconds
        #[arg(long, default_value = "300")]
        debounce_ms: u64,
        /// Exit after the first snapshot has been applied
        #[arg(long)]
        once: bool,
    },
    /// Apply a snapshot once and print what changed
    Apply {
        scene: String,
    },
    /// Generate a standalone scene script
    Export {
        scene: String,
        /// Output file; defaults to the configured scripts directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    builder_engine::init_logging();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!(error = %e, "builder-host failed");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => BuilderConfig::load_from_file(path)?,
        None => BuilderConfig::default(),
    };

    match args.command {
        Command::Watch {
            scene,
            debounce_ms,
            once,
        } => watch(&config, &scene, Duration::from_millis(debounce_ms), once),
        Command::Apply { scene } => apply(&config, &scene),
        Command::Export { scene, output } => export(&config, &scene, output),
    }
}

// A scene argument is either an existing file or a name in the scenes directory
fn resolve_scene(config: &BuilderConfig, scene: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = Path::new(scene);
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    Ok(config.assets.scene_path(scene)?)
}

fn reconciler(config: &BuilderConfig) -> Reconciler {
    Reconciler::new(ComponentRegistry::with_default_components(), config.sync.clone())
}

fn watch(
    config: &BuilderConfig,
    scene: &str,
    debounce: Duration,
    once: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve_scene(config, scene)?;
    let mut world = World::new();
    let mut inbox = EditorInbox::subscribe(reconciler(config));

    let watcher = SceneWatcher::new(
        &path,
        WatcherConfig {
            debounce_duration: debounce,
            send_initial: true,
        },
        inbox.sender(),
    )?;
    info!(path = ?path, "Watching snapshot");

    // The watcher stops on its own once the snapshot file is removed
    while watcher.is_running() {
        match inbox.wait_and_pump(&mut world, Duration::from_millis(100)) {
            Ok(summary) if summary.snapshots_applied > 0 => {
                let dirty = world.take_dirty();
                info!(
                    entities = world.entity_count(),
                    components = world.component_count(),
                    dirty = dirty.len(),
                    "Live scene updated"
                );
                if once {
                    break;
                }
            }
            Ok(_) => {}
            // The editor will resend a full snapshot; keep serving
            Err(e) => warn!(error = %e, "Snapshot could not be applied"),
        }
    }

    // Apply anything delivered just before the watcher stopped
    if let Err(e) = inbox.pump(&mut world) {
        warn!(error = %e, "Snapshot could not be applied");
    }

    watcher.stop()?;
    info!(entities = world.entity_count(), "Stopped watching snapshot");
    Ok(())
}

fn apply(config: &BuilderConfig, scene: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve_scene(config, scene)?;
    let snapshot = SceneSnapshot::load_from_file(&path)?;

    let mut world = World::new();
    let report = reconciler(config).apply(&mut world, &snapshot)?;

    println!("Applied {}", path.display());
    println!("  components created: {}", report.components_created);
    println!("  entities created:   {}", report.entities_created);
    println!("  live entities:      {}", world.entity_count());
    for issue in &report.issues {
        println!("  skipped: {issue:?}");
    }
    Ok(())
}

fn export(
    config: &BuilderConfig,
    scene: &str,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve_scene(config, scene)?;
    let snapshot = SceneSnapshot::load_from_file(&path)?;
    let script = generate_with(&snapshot, &config.codegen)?;

    let output = match output {
        Some(output) => output,
        None => {
            let name = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .ok_or("snapshot path has no file name")?;
            config.assets.script_path(name)?
        }
    };

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&output, script)?;
    info!(output = ?output, "Exported scene script");
    Ok(())
}
