use owo_colors::Style;
use std::sync::OnceLock;

use crate::quest::{Difficulty, MarkerType};

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
    /// Experience awards
    pub reward: Style,
    colored: bool,
}

impl Theme {
    /// Plain output when stdout is piped
    pub fn detect() -> Self {
        if console::Term::stdout().is_term() {
            Self::parchment()
        } else {
            Self::plain()
        }
    }

    pub fn parchment() -> Self {
        Self {
            header: Style::new().yellow().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warn: Style::new().yellow(),
            info: Style::new().blue(),
            dim: Style::new().white().dimmed(),
            reward: Style::new().bright_yellow().bold(),
            colored: true,
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            warn: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            reward: Style::new(),
            colored: false,
        }
    }

    /// Harder quests burn hotter
    pub fn difficulty(&self, difficulty: Difficulty) -> Style {
        if !self.colored {
            return Style::new();
        }
        match difficulty {
            Difficulty::Easy => Style::new().green(),
            Difficulty::Medium => Style::new().yellow(),
            Difficulty::Hard => Style::new().red().bold(),
            Difficulty::Epic => Style::new().magenta().bold(),
        }
    }

    /// Same colors as the map editor's marker buttons
    pub fn marker(&self, marker: MarkerType) -> Style {
        if !self.colored {
            return Style::new();
        }
        match marker {
            MarkerType::City => Style::new().green(),
            MarkerType::Dungeon => Style::new().red(),
            MarkerType::Tavern => Style::new().yellow(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
