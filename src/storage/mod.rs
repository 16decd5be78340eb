//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - quests(id, title UNIQUE, difficulty, reward, description, deadline, created_at)
//! - quest_versions(id, quest_id, title, difficulty, reward, description, created_at)
//! - quest_locations(id, quest_id, x, y, type, created_at)

pub mod schema;
pub mod sqlite;

pub use sqlite::{QuestStore, DbStats};
