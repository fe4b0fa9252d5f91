//! Progress statistics command for CLI.

use memolil_core::{Clock, Config, Database, ProgressStats, SystemClock};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let collection = db.load_collection(&config.namespace())?;
    let stats = ProgressStats::compute(&collection, SystemClock.now_millis());
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
