//! Database schema definitions

/// Enforce `REFERENCES` clauses on this connection
pub const ENABLE_FOREIGN_KEYS: &str = "PRAGMA foreign_keys = ON";

/// SQL to create the quests table
pub const CREATE_QUESTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS quests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT UNIQUE NOT NULL,
    difficulty TEXT CHECK(difficulty IN ('Easy', 'Medium', 'Hard', 'Epic')),
    reward INTEGER,
    description TEXT,
    deadline TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create the quest_versions table
/// Append-only: one row per save
pub const CREATE_QUEST_VERSIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS quest_versions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    quest_id INTEGER NOT NULL,
    title TEXT,
    difficulty TEXT,
    reward INTEGER,
    description TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (quest_id) REFERENCES quests(id)
)
"#;

/// SQL to create the quest_locations table
pub const CREATE_QUEST_LOCATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS quest_locations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    quest_id INTEGER NOT NULL,
    x REAL,
    y REAL,
    type TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (quest_id) REFERENCES quests(id)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_versions_quest ON quest_versions(quest_id)",
    "CREATE INDEX IF NOT EXISTS idx_locations_quest ON quest_locations(quest_id)",
];

/// Names of the tables owned by the store
pub const TABLES: &[&str] = &["quests", "quest_versions", "quest_locations"];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_QUESTS_TABLE,
        CREATE_QUEST_VERSIONS_TABLE,
        CREATE_QUEST_LOCATIONS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
