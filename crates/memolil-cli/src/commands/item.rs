//! Knowledge item commands for CLI.

use clap::Subcommand;
use memolil_core::{Clock, Config, Database, ItemDraft, ItemSort, KnowledgeItem, SystemClock};
use serde_json::json;

use super::{build_variants, split_tags};

#[derive(Subcommand)]
pub enum ItemAction {
    /// Capture a new knowledge item and generate its questions
    Add {
        /// Item title
        title: String,
        /// Note body
        content: String,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Difficulty from 1 to 5
        #[arg(long, default_value = "3")]
        difficulty: u8,
        /// Where the note came from (default: typed)
        #[arg(long)]
        source: Option<String>,
        /// Skip the remote generator
        #[arg(long)]
        local: bool,
    },
    /// List items
    List {
        /// Case-insensitive filter on title, content and tags
        #[arg(long, default_value = "")]
        query: String,
        /// Sort order: newest, difficulty or retention
        #[arg(long, default_value = "newest")]
        sort: ItemSort,
    },
    /// Show an item with its answer history
    Show {
        /// Item ID
        id: String,
    },
    /// Delete an item and its answer history
    Delete {
        /// Item ID
        id: String,
    },
    /// Replace an item's question variants
    Generate {
        /// Item ID
        id: String,
        /// Skip the remote generator
        #[arg(long)]
        local: bool,
    },
}

pub fn run(action: ItemAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let namespace = config.namespace();
    let mut db = Database::open()?;

    match action {
        ItemAction::Add {
            title,
            content,
            tags,
            difficulty,
            source,
            local,
        } => {
            let draft = ItemDraft {
                title,
                content,
                tags: split_tags(tags),
                difficulty,
                source,
            };
            let mut item = KnowledgeItem::new(draft, SystemClock.now_millis())?;
            item.question_variants = build_variants(&item, &config, local);
            db.save_item(&namespace, &item)?;
            println!("{}", serde_json::to_string_pretty(&item)?);
        }
        ItemAction::List { query, sort } => {
            let collection = db.load_collection(&namespace)?;
            let items = collection.list(&query, sort);
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        ItemAction::Show { id } => {
            let collection = db.load_collection(&namespace)?;
            let item = collection
                .item(&id)
                .ok_or_else(|| memolil_core::CoreError::item_not_found(&id))?;
            let answers: Vec<_> = collection.logs_for(&id).collect();
            let out = json!({ "item": item, "answers": answers });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        ItemAction::Delete { id } => {
            db.delete_item(&namespace, &id)?;
            println!("Item deleted: {id}");
        }
        ItemAction::Generate { id, local } => {
            let mut item = db.item(&namespace, &id)?;
            item.question_variants = build_variants(&item, &config, local);
            db.save_item(&namespace, &item)?;
            println!("{}", serde_json::to_string_pretty(&item.question_variants)?);
        }
    }
    Ok(())
}
