//! Export, import, reset and seed commands for CLI.

use std::path::PathBuf;

use clap::Subcommand;
use memolil_core::{seed_collection, Clock, Config, Database, SystemClock};
use serde_json::json;

#[derive(Subcommand)]
pub enum DataAction {
    /// Write the current collection as JSON
    Export {
        /// Output file (default: stdout)
        path: Option<PathBuf>,
    },
    /// Replace the current collection with an exported JSON file
    Import {
        /// Input file
        path: PathBuf,
    },
    /// Delete every item, answer and point in the current collection
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Load sample items into an empty collection
    Seed,
}

pub fn run(action: DataAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let namespace = config.namespace();
    let mut db = Database::open()?;

    match action {
        DataAction::Export { path } => {
            let json = db.export_json(&namespace)?;
            match path {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        DataAction::Import { path } => {
            let json = std::fs::read_to_string(&path)?;
            let collection = db.import_json(&namespace, &json)?;
            let out = json!({
                "namespace": namespace,
                "items": collection.items.len(),
                "answer_logs": collection.answer_logs.len(),
                "total_points": collection.total_points,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        DataAction::Reset { yes } => {
            if !yes {
                return Err(format!("refusing to reset {namespace} without --yes").into());
            }
            db.reset(&namespace)?;
            println!("reset {namespace}");
        }
        DataAction::Seed => {
            let existing = db.item_count(&namespace)?;
            if existing > 0 {
                return Err(format!(
                    "{namespace} already has {existing} items; run `memolil data reset --yes` first"
                )
                .into());
            }
            let mut collection = seed_collection(SystemClock.now_millis());
            collection.namespace = namespace;
            db.replace_collection(&collection)?;
            println!("seeded {} items", collection.items.len());
        }
    }
    Ok(())
}
