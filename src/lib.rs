//! # Questmaster - versioned quest persistence
//!
//! The persistence core of a quest-authoring tool.
//!
//! Questmaster provides:
//! - Quest records with an append-only version history
//! - Map marker locations linked to saved quests
//! - SQLite-backed storage with schema created on demand
//! - An autosave controller that turns field edits into saves and emits a
//!   single "quest created" award per quest

pub mod quest;
pub mod validation;
pub mod storage;
pub mod award;
pub mod autosave;
pub mod output;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use quest::{Difficulty, MarkerType, Quest, QuestFields, QuestLocation, QuestVersion};
pub use validation::ValidationError;
pub use storage::QuestStore;
pub use award::{AwardEvent, AwardReason, AwardSink};
pub use autosave::{AutosaveController, Session};

/// Result type alias for Questmaster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Questmaster operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("A quest titled '{title}' already exists")]
    UniquenessViolation { title: String },

    #[error("Quest {quest_id} does not exist")]
    ForeignKeyViolation { quest_id: i64 },

    #[error("Quest not found: {0}")]
    QuestNotFound(i64),

    #[error("Storage error: {0}")]
    Schema(#[from] rusqlite::Error),

    #[error("Invalid quest: {0}")]
    Validation(#[from] ValidationError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
