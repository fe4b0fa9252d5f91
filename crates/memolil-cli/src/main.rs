use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "memolil", version, about = "Memolil knowledge retention CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Knowledge item management
    Item {
        #[command(subcommand)]
        action: commands::item::ItemAction,
    },
    /// Practice sessions and answers
    Quiz {
        #[command(subcommand)]
        action: commands::quiz::QuizAction,
    },
    /// Progress statistics
    Stats,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Export, import, reset and seed stored data
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MEMOLIL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Item { action } => commands::item::run(action),
        Commands::Quiz { action } => commands::quiz::run(action),
        Commands::Stats => commands::stats::run(),
        Commands::Config { action } => commands::config::run(action),
        Commands::Data { action } => commands::data::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
