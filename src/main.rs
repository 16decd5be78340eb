//! Questmaster CLI - author quests against the versioned quest store

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "questmaster")]
#[command(version)]
#[command(about = "Quest authoring store - versioned quests, map markers and autosave")]
#[command(long_about = r#"
Questmaster keeps quests in a local SQLite file. Every save appends a
version snapshot, so the full editing history of a quest is retained.

Example usage:
  questmaster init
  questmaster create --title "Dragon's Lair" --difficulty hard --reward 500 --description "..."
  questmaster mark --id 1 --x 120 --y 80 --marker city
  questmaster history --id 1
  questmaster edit
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to questmaster.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default questmaster.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Create a new quest
    Create {
        #[arg(short, long)]
        title: String,

        /// Easy, Medium, Hard or Epic
        #[arg(long, default_value = "easy")]
        difficulty: String,

        #[arg(short, long, default_value = "10")]
        reward: i64,

        #[arg(long, default_value = "")]
        description: String,

        /// ISO-8601 timestamp (defaults to now)
        #[arg(long)]
        deadline: Option<String>,
    },

    /// Change fields of an existing quest
    Update {
        /// Quest identifier
        #[arg(short, long)]
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(long)]
        difficulty: Option<String>,

        #[arg(short, long)]
        reward: Option<i64>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        deadline: Option<String>,
    },

    /// Place a marker on a quest's map
    Mark {
        /// Quest identifier
        #[arg(short, long)]
        id: i64,

        #[arg(short)]
        x: f64,

        #[arg(short)]
        y: f64,

        /// city, dungeon or tavern
        #[arg(short, long)]
        marker: String,
    },

    /// Show a quest with its history and markers
    Show {
        /// Quest identifier
        #[arg(short, long)]
        id: i64,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List all quests
    List,

    /// Show the version history of a quest
    History {
        /// Quest identifier
        #[arg(short, long)]
        id: i64,
    },

    /// Show statistics about the quest store
    Stats,

    /// Interactive editing session with autosave
    Edit {
        /// Continue editing an existing quest
        #[arg(short, long)]
        id: Option<i64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let ctx = commands::Context::load(cli.config.as_deref(), cli.database.as_deref())?;

    match cli.command {
        Commands::Init { force } => commands::run_init(&ctx, force),
        Commands::Create { title, difficulty, reward, description, deadline } => {
            commands::run_create(&ctx, title, &difficulty, reward, description, deadline)
        }
        Commands::Update { id, title, difficulty, reward, description, deadline } => {
            let patch = commands::FieldPatch { title, difficulty, reward, description, deadline };
            commands::run_update(&ctx, id, patch)
        }
        Commands::Mark { id, x, y, marker } => commands::run_mark(&ctx, id, x, y, &marker),
        Commands::Show { id, format } => commands::run_show(&ctx, id, &format),
        Commands::List => commands::run_list(&ctx),
        Commands::History { id } => commands::run_history(&ctx, id),
        Commands::Stats => commands::run_stats(&ctx),
        Commands::Edit { id } => commands::run_edit(&ctx, id),
    }
}
