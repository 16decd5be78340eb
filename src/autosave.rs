//! Autosave controller
//!
//! Bridges live editing to [`QuestStore::save_quest`]. The editing session
//! is an explicit [`Session`] value: callers hand in the current one and
//! keep the one returned. That makes the Draft → Persisted transition the
//! only place a "quest created" award can be emitted.

use crate::award::{AwardEvent, AwardReason, AwardSink};
use crate::quest::{MarkerType, QuestFields};
use crate::storage::QuestStore;
use crate::validation::DEFAULT_MIN_DESCRIPTION_WORDS;
use crate::Result;

/// Persistence state of the quest being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Session {
    /// Never saved, no identifier yet
    #[default]
    Draft,
    /// Saved at least once; every further save updates this row
    Persisted { quest_id: i64 },
}

impl Session {
    /// Continue editing a quest that is already stored
    pub fn resume(quest_id: i64) -> Self {
        Session::Persisted { quest_id }
    }

    pub fn quest_id(&self) -> Option<i64> {
        match self {
            Session::Draft => None,
            Session::Persisted { quest_id } => Some(*quest_id),
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Session::Persisted { .. })
    }
}

pub struct AutosaveController<'a> {
    store: &'a QuestStore,
    sink: &'a dyn AwardSink,
    min_description_words: usize,
}

impl<'a> AutosaveController<'a> {
    pub fn new(store: &'a QuestStore, sink: &'a dyn AwardSink) -> Self {
        Self {
            store,
            sink,
            min_description_words: DEFAULT_MIN_DESCRIPTION_WORDS,
        }
    }

    /// Word minimum applied to the description on explicit saves
    pub fn with_min_description_words(mut self, words: usize) -> Self {
        self.min_description_words = words;
        self
    }

    /// A field changed in the editor.
    ///
    /// Saves immediately and returns the new session. Failures never reach
    /// the user: they are logged and the session comes back unchanged.
    /// Drafts that could not be stored anyway (empty title, reward out of
    /// range, bad deadline) are skipped without touching the store.
    pub fn notify_field_changed(&self, session: Session, fields: &QuestFields) -> Session {
        if let Err(e) = fields.validate_for_store() {
            tracing::debug!(error = %e, "Skipping autosave of incomplete draft");
            return session;
        }

        match self.save(session, fields) {
            Ok(next) => {
                tracing::debug!(quest_id = ?next.quest_id(), "Autosaved");
                next
            }
            Err(e) => {
                tracing::warn!(error = %e, title = %fields.title, "Autosave failed");
                session
            }
        }
    }

    /// The user asked to save ("create quest").
    ///
    /// Runs the full field validation first; a [`crate::Error::Validation`]
    /// means the store was not touched. Store errors are returned as-is so
    /// the caller can show them.
    pub fn notify_explicit_save(&self, session: Session, fields: &QuestFields) -> Result<Session> {
        fields.validate(self.min_description_words)?;
        self.save(session, fields)
    }

    /// A marker was dropped on the map.
    ///
    /// Only saved quests have locations; for a draft nothing is recorded and
    /// `false` is returned.
    pub fn place_marker(&self, session: Session, x: f64, y: f64, marker: MarkerType) -> Result<bool> {
        match session.quest_id() {
            Some(quest_id) => {
                self.store.add_location(quest_id, x, y, marker)?;
                Ok(true)
            }
            None => {
                tracing::debug!(x, y, marker = %marker, "Marker not recorded: quest not saved yet");
                Ok(false)
            }
        }
    }

    fn save(&self, session: Session, fields: &QuestFields) -> Result<Session> {
        let quest_id = self.store.save_quest(session.quest_id(), fields)?;

        if session == Session::Draft {
            tracing::info!(quest_id, title = %fields.title, "Quest created");
            self.sink.award(AwardEvent::new(AwardReason::CreateQuest));
        }

        Ok(Session::Persisted { quest_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::award::AwardLog;
    use crate::quest::Difficulty;
    use crate::Error;

    fn fields(title: &str, reward: i64) -> QuestFields {
        QuestFields::new(title, Difficulty::Medium, reward, "word ".repeat(60), "2025-01-01T00:00:00")
    }

    #[test]
    fn test_first_autosave_creates_once() {
        let store = QuestStore::open_in_memory().unwrap();
        let log = AwardLog::new();
        let controller = AutosaveController::new(&store, &log);

        // Two keystrokes in quick succession
        let session = controller.notify_field_changed(Session::Draft, &fields("D", 100));
        let session = controller.notify_field_changed(session, &fields("Dr", 100));

        assert_eq!(session, Session::Persisted { quest_id: 1 });
        assert_eq!(log.count(AwardReason::CreateQuest), 1);
        assert_eq!(store.count_quests().unwrap(), 1);
        assert_eq!(store.quest_versions(1).unwrap().len(), 2);
        assert_eq!(store.get_quest(1).unwrap().unwrap().title, "Dr");
    }

    #[test]
    fn test_explicit_save_after_autosave_is_update() {
        let store = QuestStore::open_in_memory().unwrap();
        let log = AwardLog::new();
        let controller = AutosaveController::new(&store, &log);

        let session = controller.notify_field_changed(Session::Draft, &fields("Dragon's Lair", 500));
        let session = controller.notify_explicit_save(session, &fields("Dragon's Lair", 900)).unwrap();

        assert_eq!(session.quest_id(), Some(1));
        assert_eq!(log.events(), vec![AwardEvent::new(AwardReason::CreateQuest)]);
        assert_eq!(store.get_quest(1).unwrap().unwrap().reward, 900);
    }

    #[test]
    fn test_explicit_save_on_draft_creates() {
        let store = QuestStore::open_in_memory().unwrap();
        let log = AwardLog::new();
        let controller = AutosaveController::new(&store, &log);

        let session = controller.notify_explicit_save(Session::Draft, &fields("Goblin Camp", 50)).unwrap();
        assert!(session.is_persisted());
        assert_eq!(log.count(AwardReason::CreateQuest), 1);
    }

    #[test]
    fn test_autosave_failure_is_silent() {
        let store = QuestStore::open_in_memory().unwrap();
        store.save_quest(None, &fields("Taken", 100)).unwrap();

        let log = AwardLog::new();
        let controller = AutosaveController::new(&store, &log);

        let session = controller.notify_field_changed(Session::Draft, &fields("Taken", 100));
        assert_eq!(session, Session::Draft);
        assert!(log.events().is_empty());
        assert_eq!(store.count_versions().unwrap(), 1);

        // Typing on resolves the collision
        let session = controller.notify_field_changed(session, &fields("Taken 2", 100));
        assert_eq!(session.quest_id(), Some(2));
        assert_eq!(log.count(AwardReason::CreateQuest), 1);
    }

    #[test]
    fn test_incomplete_draft_not_saved() {
        let store = QuestStore::open_in_memory().unwrap();
        let log = AwardLog::new();
        let controller = AutosaveController::new(&store, &log);

        let session = controller.notify_field_changed(Session::Draft, &QuestFields::draft_default());
        assert_eq!(session, Session::Draft);

        let session = controller.notify_field_changed(session, &fields("Too Cheap", 5));
        assert_eq!(session, Session::Draft);
        assert_eq!(store.count_quests().unwrap(), 0);
    }

    #[test]
    fn test_explicit_save_surfaces_errors() {
        let store = QuestStore::open_in_memory().unwrap();
        let log = AwardLog::new();
        let controller = AutosaveController::new(&store, &log);

        let short = QuestFields::new("Short", Difficulty::Easy, 10, "too few words", "2025-01-01T00:00:00");
        let err = controller.notify_explicit_save(Session::Draft, &short).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.count_quests().unwrap(), 0);

        let lenient = AutosaveController::new(&store, &log).with_min_description_words(0);
        lenient.notify_explicit_save(Session::Draft, &short).unwrap();

        let err = controller.notify_explicit_save(Session::Draft, &fields("Short", 10)).unwrap_err();
        assert!(matches!(err, Error::UniquenessViolation { .. }));
        assert_eq!(log.count(AwardReason::CreateQuest), 1);
    }

    #[test]
    fn test_markers_need_saved_quest() {
        let store = QuestStore::open_in_memory().unwrap();
        let controller = AutosaveController::new(&store, &crate::award::NoopSink);

        assert!(!controller.place_marker(Session::Draft, 10.0, 20.0, MarkerType::City).unwrap());
        assert_eq!(store.count_locations().unwrap(), 0);

        let session = controller.notify_field_changed(Session::Draft, &fields("Mapped", 100));
        assert!(controller.place_marker(session, 10.0, 20.0, MarkerType::City).unwrap());
        assert_eq!(store.quest_locations(1).unwrap().len(), 1);

        let err = controller.place_marker(Session::resume(99), 1.0, 1.0, MarkerType::Dungeon).unwrap_err();
        assert!(matches!(err, Error::ForeignKeyViolation { quest_id: 99 }));
    }
}
