use tabled::{settings::Style, Table, Tabled};

use crate::quest::{Quest, QuestLocation, QuestVersion};
use crate::storage::DbStats;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Two-column key/value table
#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            field: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

#[derive(Tabled)]
struct QuestRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Difficulty")]
    difficulty: String,
    #[tabled(rename = "Reward")]
    reward: i64,
    #[tabled(rename = "Deadline")]
    deadline: String,
}

#[derive(Tabled)]
struct VersionRow {
    #[tabled(rename = "#")]
    number: usize,
    #[tabled(rename = "Saved at")]
    created_at: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Difficulty")]
    difficulty: String,
    #[tabled(rename = "Reward")]
    reward: i64,
}

#[derive(Tabled)]
struct LocationRow {
    #[tabled(rename = "Marker")]
    marker: String,
    #[tabled(rename = "X")]
    x: String,
    #[tabled(rename = "Y")]
    y: String,
    #[tabled(rename = "Placed at")]
    created_at: String,
}

pub fn quest_table(quests: &[Quest]) -> String {
    let rows: Vec<QuestRow> = quests
        .iter()
        .map(|q| QuestRow {
            id: q.id,
            title: q.title.clone(),
            difficulty: q.difficulty.to_string(),
            reward: q.reward,
            deadline: q.deadline.clone(),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Versions numbered from 1, oldest first
pub fn version_table(versions: &[QuestVersion]) -> String {
    let rows: Vec<VersionRow> = versions
        .iter()
        .enumerate()
        .map(|(i, v)| VersionRow {
            number: i + 1,
            created_at: v.created_at.clone(),
            title: v.title.clone(),
            difficulty: v.difficulty.to_string(),
            reward: v.reward,
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn location_table(locations: &[QuestLocation]) -> String {
    let rows: Vec<LocationRow> = locations
        .iter()
        .map(|l| LocationRow {
            marker: l.marker.to_string(),
            x: format!("{:.1}", l.x),
            y: format!("{:.1}", l.y),
            created_at: l.created_at.clone(),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn stats_table(stats: &DbStats) -> String {
    let mut builder = TableBuilder::new();
    builder.add_row("Quests", &stats.quests.to_string());
    builder.add_row("Versions", &stats.versions.to_string());
    builder.add_row("Locations", &stats.locations.to_string());
    builder.build()
}
