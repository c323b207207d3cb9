//! Quick snapshot validation utility

use builder_engine::prelude::*;
use builder_engine::sync::SyncIssue;
use std::{env, path::Path};

fn main() {
    let args: Vec<String> = env::args().collect();
    let snapshot_path = if args.len() > 1 {
        &args[1]
    } else {
        "assets/scenes/scene.json"
    };

    let path = Path::new(snapshot_path);
    println!("Validating snapshot: {}", path.display());

    let snapshot = match SceneSnapshot::load_from_file(path) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("✗ Failed to load snapshot: {e}");
            std::process::exit(1);
        }
    };
    println!("✓ Snapshot loaded successfully!");
    println!("  Components: {}", snapshot.components.len());
    println!("  Entities: {}", snapshot.entities.len());

    let mut world = World::new();
    let mut reconciler = Reconciler::with_defaults();
    match reconciler.apply(&mut world, &snapshot) {
        Ok(report) => {
            println!("✓ Snapshot applied successfully!");
            println!("  Live components: {}", world.component_count());
            println!("  Live entities: {}", world.entity_count());

            for issue in &report.issues {
                match issue {
                    SyncIssue::UnknownType {
                        component_id,
                        type_tag,
                    } => println!("  ! {component_id}: unknown component type {type_tag}"),
                    SyncIssue::UnresolvedReference {
                        entity_id,
                        component_id,
                    } => println!("  ! {entity_id}: references missing component {component_id}"),
                    SyncIssue::DetachedOrphan {
                        component_id,
                        entity_id,
                    } => println!("  ! {entity_id}: detached removed component {component_id}"),
                }
            }
        }
        Err(e) => {
            eprintln!("✗ Failed to apply snapshot: {e}");
            std::process::exit(1);
        }
    }

    match generate(&snapshot) {
        Ok(script) => println!("✓ Script generated ({} bytes)", script.len()),
        Err(e) => {
            eprintln!("✗ Failed to generate script: {e}");
            std::process::exit(1);
        }
    }
}
