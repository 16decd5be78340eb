//! Award events - the vocabulary shared with the gamification tracker
//!
//! The core only ever emits events; scoring, levels and persistence of the
//! player's progress belong to whoever implements [`AwardSink`].

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Why experience was awarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AwardReason {
    /// A draft was saved for the first time
    CreateQuest,
    /// A quest was rendered to a document
    ExportDoc,
    /// The map canvas was saved as an image
    SaveMap,
    /// A hundred quests rendered in under five seconds
    BossFight,
}

impl AwardReason {
    /// Tag string recorded in the achievement log
    pub fn as_tag(&self) -> &'static str {
        match self {
            AwardReason::CreateQuest => "CREATE_QUEST",
            AwardReason::ExportDoc => "EXPORT_DOC",
            AwardReason::SaveMap => "SAVE_MAP",
            AwardReason::BossFight => "BOSS_FIGHT",
        }
    }

    /// Experience granted for this reason
    pub fn default_amount(&self) -> i64 {
        match self {
            AwardReason::CreateQuest => 3,
            AwardReason::ExportDoc => 2,
            AwardReason::SaveMap => 5,
            AwardReason::BossFight => 20,
        }
    }
}

impl std::fmt::Display for AwardReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

/// A discrete `(amount, reason)` award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardEvent {
    pub amount: i64,
    pub reason: AwardReason,
}

impl AwardEvent {
    pub fn new(reason: AwardReason) -> Self {
        Self { amount: reason.default_amount(), reason }
    }
}

/// Receiver of award events.
///
/// Implementations must not fail the caller: a broken tracker never blocks
/// a save.
pub trait AwardSink {
    fn award(&self, event: AwardEvent);
}

/// Sink that drops every event
pub struct NoopSink;

impl AwardSink for NoopSink {
    fn award(&self, _event: AwardEvent) {}
}

/// Sink that keeps every event in memory, in arrival order
#[derive(Debug, Default)]
pub struct AwardLog {
    events: RefCell<Vec<AwardEvent>>,
}

impl AwardLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AwardEvent> {
        self.events.borrow().clone()
    }

    pub fn count(&self, reason: AwardReason) -> usize {
        self.events.borrow().iter().filter(|e| e.reason == reason).count()
    }

    pub fn total(&self) -> i64 {
        self.events.borrow().iter().map(|e| e.amount).sum()
    }
}

impl AwardSink for AwardLog {
    fn award(&self, event: AwardEvent) {
        self.events.borrow_mut().push(event);
    }
}
