use anyhow::Context as _;
use owo_colors::OwoColorize;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use questmaster::award::{AwardEvent, AwardSink};
use questmaster::config::{self, QuestmasterConfig};
use questmaster::ui::{self, Icons};
use questmaster::{AutosaveController, Error, MarkerType, QuestFields, QuestStore, Session};

/// Resolved configuration shared by every subcommand
pub struct Context {
    pub config: QuestmasterConfig,
    pub config_path: PathBuf,
    pub database: PathBuf,
}

impl Context {
    pub fn load(config_path: Option<&Path>, database: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = config_path.map(Path::to_path_buf).unwrap_or_else(config::default_config_path);
        let config = config::load_config(Some(&config_path))
            .with_context(|| format!("failed to read {}", config_path.display()))?
            .unwrap_or_default();
        let database = config::resolve_database_path(database, Some(&config));
        Ok(Self { config, config_path, database })
    }

    pub fn open_store(&self) -> anyhow::Result<QuestStore> {
        config::ensure_db_dir(&self.database)?;
        tracing::debug!("Opening quest store at {}", self.database.display());
        Ok(QuestStore::open(&self.database)?)
    }

    fn controller<'a>(&self, store: &'a QuestStore, sink: &'a dyn AwardSink) -> AutosaveController<'a> {
        AutosaveController::new(store, sink).with_min_description_words(self.config.min_description_words())
    }
}

/// Prints awards as they happen
pub struct ConsoleSink;

impl AwardSink for ConsoleSink {
    fn award(&self, event: AwardEvent) {
        tracing::debug!(amount = event.amount, reason = %event.reason, "Award");
        if !questmaster::output::is_quiet() {
            println!("{} {}", Icons::STAR, award_message(&event).style(ui::theme().reward.clone()));
        }
    }
}

fn award_message(event: &AwardEvent) -> String {
    format!("+{} XP ({})", event.amount, event.reason)
}

/// Field values supplied on the command line or typed in an edit session
#[derive(Debug, Default, PartialEq)]
pub struct FieldPatch {
    pub title: Option<String>,
    pub difficulty: Option<String>,
    pub reward: Option<i64>,
    pub description: Option<String>,
    pub deadline: Option<String>,
}

impl FieldPatch {
    pub fn apply(self, fields: &mut QuestFields) -> questmaster::Result<()> {
        if let Some(difficulty) = self.difficulty {
            fields.difficulty = difficulty.parse()?;
        }
        if let Some(title) = self.title {
            fields.title = title;
        }
        if let Some(reward) = self.reward {
            fields.reward = reward;
        }
        if let Some(description) = self.description {
            fields.description = description;
        }
        if let Some(deadline) = self.deadline {
            fields.deadline = deadline;
        }
        Ok(())
    }
}

pub fn run_init(ctx: &Context, force: bool) -> anyhow::Result<()> {
    let config = QuestmasterConfig {
        database: Some(config::default_database_path().display().to_string()),
        min_description_words: Some(ctx.config.min_description_words()),
    };
    config::write_config(&ctx.config_path, &config, force)?;
    ui::success(&format!("Wrote {}", ctx.config_path.display()));
    Ok(())
}

pub fn run_create(
    ctx: &Context,
    title: String,
    difficulty: &str,
    reward: i64,
    description: String,
    deadline: Option<String>,
) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let mut fields = QuestFields::draft_default();
    FieldPatch {
        title: Some(title),
        difficulty: Some(difficulty.to_string()),
        reward: Some(reward),
        description: Some(description),
        deadline,
    }
    .apply(&mut fields)?;

    let session = ctx
        .controller(&store, &ConsoleSink)
        .notify_explicit_save(Session::Draft, &fields)
        .context("could not create quest")?;

    if let Some(id) = session.quest_id() {
        ui::success(&format!("Quest created: #{} {}", id, fields.title));
    }
    Ok(())
}

pub fn run_update(ctx: &Context, id: i64, patch: FieldPatch) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let quest = store.get_quest(id)?.ok_or(Error::QuestNotFound(id))?;

    let mut fields = quest.fields();
    patch.apply(&mut fields)?;

    ctx.controller(&store, &ConsoleSink)
        .notify_explicit_save(Session::resume(id), &fields)
        .context("could not save quest")?;

    let versions = store.quest_versions(id)?.len();
    ui::success(&format!("Quest #{} saved (version {})", id, versions));
    Ok(())
}

pub fn run_mark(ctx: &Context, id: i64, x: f64, y: f64, marker: &str) -> anyhow::Result<()> {
    let marker: MarkerType = marker.parse()?;
    let store = ctx.open_store()?;
    store.add_location(id, x, y, marker)?;
    println!(
        "{} {} marker at ({:.1}, {:.1}) for quest #{}",
        Icons::MAP,
        marker.as_str().style(ui::theme().marker(marker)),
        x,
        y,
        id
    );
    Ok(())
}

pub fn run_show(ctx: &Context, id: i64, format: &str) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let quest = store.get_quest(id)?.ok_or(Error::QuestNotFound(id))?;
    let versions = store.quest_versions(id)?;
    let locations = store.quest_locations(id)?;

    if format == "json" {
        let data = serde_json::json!({
            "quest": quest.template_context(),
            "created_at": quest.created_at,
            "versions": versions,
            "locations": locations,
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    ui::header(&quest.title);
    println!(
        "{} quest, {} gold",
        quest.difficulty.as_str().style(ui::theme().difficulty(quest.difficulty)),
        quest.reward
    );
    let mut table = ui::TableBuilder::new();
    table.add_row("ID", &quest.id.to_string());
    table.add_row("Difficulty", quest.difficulty.as_str());
    table.add_row("Reward", &quest.reward.to_string());
    table.add_row("Deadline", &quest.deadline);
    table.add_row("Created", &quest.created_at);
    println!("{}", table.build());

    if !quest.description.is_empty() {
        println!("{}", quest.description);
    }

    ui::section("History");
    println!("{}", ui::version_table(&versions));

    ui::section("Map");
    if locations.is_empty() {
        println!("{}", ui::dim("No markers placed."));
    } else {
        println!("{}", ui::location_table(&locations));
    }
    Ok(())
}

pub fn run_list(ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let quests = store.list_quests()?;

    if quests.is_empty() {
        ui::info("Quests", "none yet");
    } else {
        println!("{}", ui::quest_table(&quests));
    }
    Ok(())
}

pub fn run_history(ctx: &Context, id: i64) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    if !store.quest_exists(id)? {
        return Err(Error::QuestNotFound(id).into());
    }

    let versions = store.quest_versions(id)?;
    ui::header(&format!("Quest #{}: {} versions", id, versions.len()));
    println!("{}", ui::version_table(&versions));
    Ok(())
}

pub fn run_stats(ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let stats = store.stats()?;

    println!("{} Questmaster Statistics ({})", Icons::STATS, ctx.database.display());
    println!("{}", ui::stats_table(&stats));
    Ok(())
}

/// One line typed into an edit session
#[derive(Debug, PartialEq)]
pub enum EditCommand {
    Set(FieldPatch),
    Save,
    Mark { x: f64, y: f64, marker: MarkerType },
    Show,
    Help,
    Quit,
    Empty,
}

pub fn parse_edit_line(line: &str) -> Result<EditCommand, String> {
    let trimmed = line.trim();
    match trimmed {
        "" => return Ok(EditCommand::Empty),
        "save" => return Ok(EditCommand::Save),
        "show" => return Ok(EditCommand::Show),
        "help" | "?" => return Ok(EditCommand::Help),
        "quit" | "exit" => return Ok(EditCommand::Quit),
        _ => {}
    }

    if let Some(args) = trimmed.strip_prefix("mark ") {
        let parts: Vec<&str> = args.split_whitespace().collect();
        let [x, y, marker] = parts.as_slice() else {
            return Err("usage: mark <x> <y> <city|dungeon|tavern>".to_string());
        };
        let x: f64 = x.parse().map_err(|_| format!("invalid x coordinate: {}", x))?;
        let y: f64 = y.parse().map_err(|_| format!("invalid y coordinate: {}", y))?;
        let marker: MarkerType = marker.parse().map_err(|e: Error| e.to_string())?;
        return Ok(EditCommand::Mark { x, y, marker });
    }

    let Some((key, value)) = line.split_once('=') else {
        return Err(format!("unrecognized input: {} (type 'help')", trimmed));
    };

    let value = value.to_string();
    let mut patch = FieldPatch::default();
    match key.trim().to_lowercase().as_str() {
        "title" => patch.title = Some(value.trim().to_string()),
        "difficulty" => patch.difficulty = Some(value.trim().to_string()),
        "reward" => {
            let reward = value.trim().parse().map_err(|_| format!("reward must be a whole number: {}", value.trim()))?;
            patch.reward = Some(reward);
        }
        "description" => patch.description = Some(value),
        "deadline" => patch.deadline = Some(value.trim().to_string()),
        other => return Err(format!("unknown field: {}", other)),
    }
    Ok(EditCommand::Set(patch))
}

fn print_edit_help() {
    ui::summary_row("field=value", "change title, difficulty, reward, description or deadline (autosaves)");
    ui::summary_row("save", "validate and save explicitly");
    ui::summary_row("mark X Y TYPE", "place a city, dungeon or tavern marker");
    ui::summary_row("show", "print the current fields");
    ui::summary_row("quit", "leave the session");
}

fn print_fields(session: Session, fields: &QuestFields, min_words: usize) {
    let state = match session.quest_id() {
        Some(id) => format!("saved as #{}", id),
        None => "draft (not saved)".to_string(),
    };
    ui::summary_row("State:", &state);
    ui::summary_row("Title:", &fields.title);
    ui::summary_row("Difficulty:", fields.difficulty.as_str());
    ui::summary_row("Reward:", &fields.reward.to_string());
    ui::summary_row("Deadline:", &fields.deadline);
    ui::summary_row(
        "Description:",
        &format!("{} / {} words, {} chars", fields.word_count(), min_words, fields.char_count()),
    );
}

pub fn run_edit(ctx: &Context, id: Option<i64>) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let controller = ctx.controller(&store, &ConsoleSink);
    let min_words = ctx.config.min_description_words();

    let (mut session, mut fields) = match id {
        Some(id) => {
            let quest = store.get_quest(id)?.ok_or(Error::QuestNotFound(id))?;
            (Session::resume(id), quest.fields())
        }
        None => (Session::Draft, QuestFields::draft_default()),
    };

    ui::header("Quest editor");
    print_edit_help();
    println!();

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        match parse_edit_line(&line) {
            Ok(EditCommand::Set(patch)) => {
                if let Err(e) = patch.apply(&mut fields) {
                    ui::warn(&e.to_string());
                    continue;
                }
                let before = session;
                session = controller.notify_field_changed(session, &fields);
                match session.quest_id() {
                    Some(id) if before.is_persisted() => println!("{}", ui::dim(&format!("autosaved #{}", id))),
                    Some(id) => ui::success(&format!("Quest created: #{}", id)),
                    None => println!("{}", ui::dim("draft not saved")),
                }
            }
            Ok(EditCommand::Save) => match controller.notify_explicit_save(session, &fields) {
                Ok(next) => {
                    session = next;
                    if let Some(id) = session.quest_id() {
                        ui::success(&format!("Quest #{} saved", id));
                    }
                }
                Err(e) => ui::error(&format!("Could not save quest: {}", e)),
            },
            Ok(EditCommand::Mark { x, y, marker }) => match controller.place_marker(session, x, y, marker) {
                Ok(true) => println!(
                    "{} {} at ({:.1}, {:.1})",
                    Icons::MAP,
                    marker.as_str().style(ui::theme().marker(marker)),
                    x,
                    y
                ),
                Ok(false) => ui::warn("Save the quest before placing markers"),
                Err(e) => ui::error(&e.to_string()),
            },
            Ok(EditCommand::Show) => print_fields(session, &fields, min_words),
            Ok(EditCommand::Help) => print_edit_help(),
            Ok(EditCommand::Quit) => break,
            Ok(EditCommand::Empty) => {}
            Err(msg) => ui::warn(&msg),
        }
    }

    Ok(())
}
