//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, params, OptionalExtension};
use crate::{Result, Error};
use crate::quest::{Difficulty, MarkerType, Quest, QuestFields, QuestLocation, QuestVersion};
use super::schema;

const QUEST_COLUMNS: &str = "id, title, difficulty, reward, description, deadline, created_at";
const VERSION_COLUMNS: &str = "id, quest_id, title, difficulty, reward, description, created_at";
const LOCATION_COLUMNS: &str = "id, quest_id, x, y, type, created_at";

/// SQLite-backed storage for quests, their versions and map locations
pub struct QuestStore {
    conn: Connection,
}

impl QuestStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(schema::ENABLE_FOREIGN_KEYS)?;
        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Create the quest tables if they are missing.
    ///
    /// Idempotent: every statement is `IF NOT EXISTS`, so this runs on open
    /// and again before every write.
    pub fn ensure_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Names of the user tables currently present, sorted
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
        )?;

        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(names)
    }

    // ========== Quest Operations ==========

    /// Insert or update a quest and append a version snapshot.
    ///
    /// With `id == None` a new row is inserted and its identifier returned.
    /// Otherwise the row with that identifier is updated (its `created_at`
    /// is left alone) and the same identifier is returned. The quest write
    /// and the version append share one transaction.
    pub fn save_quest(&self, id: Option<i64>, fields: &QuestFields) -> Result<i64> {
        self.ensure_schema()?;
        let tx = self.conn.unchecked_transaction()?;

        let quest_id = match id {
            None => {
                tx.execute(
                    r#"
                    INSERT INTO quests (title, difficulty, reward, description, deadline)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                    params![
                        fields.title,
                        fields.difficulty.as_str(),
                        fields.reward,
                        fields.description,
                        fields.deadline,
                    ],
                )
                .map_err(|e| classify_write_error(e, &fields.title))?;
                tx.last_insert_rowid()
            }
            Some(id) => {
                let changed = tx
                    .execute(
                        r#"
                        UPDATE quests
                        SET title = ?1, difficulty = ?2, reward = ?3, description = ?4, deadline = ?5
                        WHERE id = ?6
                        "#,
                        params![
                            fields.title,
                            fields.difficulty.as_str(),
                            fields.reward,
                            fields.description,
                            fields.deadline,
                            id,
                        ],
                    )
                    .map_err(|e| classify_write_error(e, &fields.title))?;
                if changed == 0 {
                    return Err(Error::QuestNotFound(id));
                }
                id
            }
        };

        tx.execute(
            r#"
            INSERT INTO quest_versions (quest_id, title, difficulty, reward, description)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                quest_id,
                fields.title,
                fields.difficulty.as_str(),
                fields.reward,
                fields.description,
            ],
        )?;
        tx.commit()?;

        tracing::debug!(quest_id, title = %fields.title, created = id.is_none(), "Saved quest");
        Ok(quest_id)
    }

    /// Check whether a quest row exists
    pub fn quest_exists(&self, id: i64) -> Result<bool> {
        let found: Option<i64> = self.conn
            .query_row("SELECT 1 FROM quests WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    /// Get a quest by identifier
    pub fn get_quest(&self, id: i64) -> Result<Option<Quest>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM quests WHERE id = ?1", QUEST_COLUMNS),
                [id],
                |row| self.row_to_quest(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a quest by its (unique) title
    pub fn find_quest_by_title(&self, title: &str) -> Result<Option<Quest>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM quests WHERE title = ?1", QUEST_COLUMNS),
                [title],
                |row| self.row_to_quest(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// All quests, oldest first
    pub fn list_quests(&self) -> Result<Vec<Quest>> {
        let mut stmt = self.conn.prepare(
            &format!("SELECT {} FROM quests ORDER BY id", QUEST_COLUMNS)
        )?;

        let quests = stmt
            .query_map([], |row| self.row_to_quest(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(quests)
    }

    /// Count all quests
    pub fn count_quests(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM quests", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Helper to convert a row to a Quest
    fn row_to_quest(&self, row: &rusqlite::Row) -> rusqlite::Result<Quest> {
        Ok(Quest {
            id: row.get(0)?,
            title: row.get(1)?,
            difficulty: parse_difficulty(row, 2)?,
            reward: row.get(3)?,
            description: row.get(4)?,
            deadline: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    // ========== Version Operations ==========

    /// Version history of a quest, oldest first
    pub fn quest_versions(&self, quest_id: i64) -> Result<Vec<QuestVersion>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM quest_versions WHERE quest_id = ?1 ORDER BY created_at, id",
            VERSION_COLUMNS
        ))?;

        let versions = stmt
            .query_map([quest_id], |row| self.row_to_version(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(versions)
    }

    /// The authoritative snapshot: the most recent version of a quest
    pub fn latest_version(&self, quest_id: i64) -> Result<Option<QuestVersion>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM quest_versions WHERE quest_id = ?1 ORDER BY created_at DESC, id DESC LIMIT 1",
                    VERSION_COLUMNS
                ),
                [quest_id],
                |row| self.row_to_version(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Count all version rows
    pub fn count_versions(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM quest_versions", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn row_to_version(&self, row: &rusqlite::Row) -> rusqlite::Result<QuestVersion> {
        Ok(QuestVersion {
            id: row.get(0)?,
            quest_id: row.get(1)?,
            title: row.get(2)?,
            difficulty: parse_difficulty(row, 3)?,
            reward: row.get(4)?,
            description: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    // ========== Location Operations ==========

    /// Append a map marker to a saved quest.
    ///
    /// The quest is looked up first so a missing parent is reported as
    /// [`Error::ForeignKeyViolation`] rather than a raw constraint failure.
    pub fn add_location(&self, quest_id: i64, x: f64, y: f64, marker: MarkerType) -> Result<()> {
        crate::validation::validate_coordinates(x, y)?;
        self.ensure_schema()?;
        if !self.quest_exists(quest_id)? {
            return Err(Error::ForeignKeyViolation { quest_id });
        }

        self.conn.execute(
            "INSERT INTO quest_locations (quest_id, x, y, type) VALUES (?1, ?2, ?3, ?4)",
            params![quest_id, x, y, marker.as_str()],
        )?;

        tracing::debug!(quest_id, x, y, marker = %marker, "Saved location");
        Ok(())
    }

    /// Locations of a quest in placement order
    pub fn quest_locations(&self, quest_id: i64) -> Result<Vec<QuestLocation>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM quest_locations WHERE quest_id = ?1 ORDER BY id",
            LOCATION_COLUMNS
        ))?;

        let locations = stmt
            .query_map([quest_id], |row| self.row_to_location(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(locations)
    }

    /// Count all location rows
    pub fn count_locations(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM quest_locations", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn row_to_location(&self, row: &rusqlite::Row) -> rusqlite::Result<QuestLocation> {
        let marker_str: String = row.get(4)?;
        let marker: MarkerType = marker_str.parse().map_err(|e: Error| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(QuestLocation {
            id: row.get(0)?,
            quest_id: row.get(1)?,
            x: row.get(2)?,
            y: row.get(3)?,
            marker,
            created_at: row.get(5)?,
        })
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            quests: self.count_quests()?,
            versions: self.count_versions()?,
            locations: self.count_locations()?,
        })
    }
}

fn parse_difficulty(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Difficulty> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e: Error| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Map a failed quest write onto the error taxonomy.
/// Only the title carries a UNIQUE constraint.
fn classify_write_error(err: rusqlite::Error, title: &str) -> Error {
    match err {
        rusqlite::Error::SqliteFailure(ref e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Error::UniquenessViolation { title: title.to_string() }
        }
        other => Error::Schema(other),
    }
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DbStats {
    pub quests: usize,
    pub versions: usize,
    pub locations: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Quests: {}", self.quests)?;
        writeln!(f, "  Versions: {}", self.versions)?;
        writeln!(f, "  Locations: {}", self.locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lair(difficulty: Difficulty, reward: i64) -> QuestFields {
        QuestFields::new("Dragon's Lair", difficulty, reward, "...", "2025-01-01T00:00:00")
    }

    #[test]
    fn test_insert_then_update() {
        let store = QuestStore::open_in_memory().unwrap();

        let id = store.save_quest(None, &lair(Difficulty::Hard, 500)).unwrap();
        assert_eq!(id, 1);
        assert_eq!(store.count_quests().unwrap(), 1);
        assert_eq!(store.quest_versions(id).unwrap().len(), 1);

        let created_at = store.get_quest(id).unwrap().unwrap().created_at;

        let same = store.save_quest(Some(id), &lair(Difficulty::Epic, 900)).unwrap();
        assert_eq!(same, id);

        let quest = store.get_quest(id).unwrap().unwrap();
        assert_eq!(quest.fields(), lair(Difficulty::Epic, 900));
        assert_eq!(quest.created_at, created_at);
        assert_eq!(store.count_quests().unwrap(), 1);

        let rewards: Vec<i64> = store.quest_versions(id).unwrap().iter().map(|v| v.reward).collect();
        assert_eq!(rewards, vec![500, 900]);

        let latest = store.latest_version(id).unwrap().unwrap();
        assert_eq!(latest.reward, 900);
        assert_eq!(latest.difficulty, Difficulty::Epic);
    }

    #[test]
    fn test_duplicate_title_rejected() {
        let store = QuestStore::open_in_memory().unwrap();
        store.save_quest(None, &lair(Difficulty::Hard, 500)).unwrap();

        let err = store.save_quest(None, &lair(Difficulty::Easy, 20)).unwrap_err();
        assert!(matches!(err, Error::UniquenessViolation { ref title } if title == "Dragon's Lair"));

        let stats = store.stats().unwrap();
        assert_eq!(stats.quests, 1);
        assert_eq!(stats.versions, 1);
    }

    #[test]
    fn test_rename_onto_existing_title_rolls_back() {
        let store = QuestStore::open_in_memory().unwrap();
        store.save_quest(None, &lair(Difficulty::Hard, 500)).unwrap();
        let other = QuestFields::new("Goblin Camp", Difficulty::Easy, 50, "", "2025-02-01T12:00:00");
        let other_id = store.save_quest(None, &other).unwrap();

        let renamed = QuestFields { title: "Dragon's Lair".into(), ..other.clone() };
        let err = store.save_quest(Some(other_id), &renamed).unwrap_err();
        assert!(matches!(err, Error::UniquenessViolation { .. }));

        assert_eq!(store.get_quest(other_id).unwrap().unwrap().title, "Goblin Camp");
        assert_eq!(store.quest_versions(other_id).unwrap().len(), 1);
    }

    #[test]
    fn test_update_unknown_quest() {
        let store = QuestStore::open_in_memory().unwrap();

        let err = store.save_quest(Some(42), &lair(Difficulty::Hard, 500)).unwrap_err();
        assert!(matches!(err, Error::QuestNotFound(42)));
        assert_eq!(store.count_versions().unwrap(), 0);
    }

    #[test]
    fn test_location_requires_quest() {
        let store = QuestStore::open_in_memory().unwrap();

        let err = store.add_location(1, 10.0, 20.0, MarkerType::City).unwrap_err();
        assert!(matches!(err, Error::ForeignKeyViolation { quest_id: 1 }));
        assert_eq!(store.count_locations().unwrap(), 0);

        let id = store.save_quest(None, &lair(Difficulty::Hard, 500)).unwrap();
        store.add_location(id, 10.0, 20.0, MarkerType::City).unwrap();
        store.add_location(id, 400.5, 300.25, MarkerType::Tavern).unwrap();

        let locations = store.quest_locations(id).unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].marker, MarkerType::City);
        assert_eq!((locations[0].x, locations[0].y), (10.0, 20.0));
        assert_eq!(locations[1].marker, MarkerType::Tavern);
    }

    #[test]
    fn test_location_rejects_non_finite_point() {
        let store = QuestStore::open_in_memory().unwrap();
        let id = store.save_quest(None, &lair(Difficulty::Hard, 500)).unwrap();

        let err = store.add_location(id, f64::NAN, 20.0, MarkerType::City).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(crate::ValidationError::InvalidCoordinate { .. })
        ));
        assert!(store.add_location(id, 5.0, f64::INFINITY, MarkerType::Dungeon).is_err());
        assert_eq!(store.count_locations().unwrap(), 0);

        // Earlier rejects leave the marker list readable
        store.add_location(id, 1.0, 2.0, MarkerType::Tavern).unwrap();
        let locations = store.quest_locations(id).unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!((locations[0].x, locations[0].y), (1.0, 2.0));
    }

    #[test]
    fn test_ensure_schema_idempotent() {
        let store = QuestStore::open_in_memory().unwrap();
        let before = store.table_names().unwrap();

        for _ in 0..5 {
            store.ensure_schema().unwrap();
        }

        assert_eq!(store.table_names().unwrap(), before);
        for table in schema::TABLES {
            assert!(before.iter().any(|t| t == table), "missing table {}", table);
        }
    }

    #[test]
    fn test_find_by_title_and_list() {
        let store = QuestStore::open_in_memory().unwrap();
        store.save_quest(None, &lair(Difficulty::Hard, 500)).unwrap();
        store.save_quest(None, &QuestFields::new("Goblin Camp", Difficulty::Easy, 50, "", "2025-02-01T12:00:00")).unwrap();

        let found = store.find_quest_by_title("Goblin Camp").unwrap().unwrap();
        assert_eq!(found.id, 2);
        assert!(store.find_quest_by_title("Nope").unwrap().is_none());

        let titles: Vec<String> = store.list_quests().unwrap().into_iter().map(|q| q.title).collect();
        assert_eq!(titles, vec!["Dragon's Lair", "Goblin Camp"]);
    }
}
