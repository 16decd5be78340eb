use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::validation::DEFAULT_MIN_DESCRIPTION_WORDS;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QuestmasterConfig {
    pub database: Option<String>,
    pub min_description_words: Option<usize>,
}

impl QuestmasterConfig {
    pub fn min_description_words(&self) -> usize {
        self.min_description_words.unwrap_or(DEFAULT_MIN_DESCRIPTION_WORDS)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("questmaster.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("quests.db")
}

/// Explicit path wins, then the config file, then `quests.db`
pub fn resolve_database_path(explicit: Option<&Path>, config: Option<&QuestmasterConfig>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    config
        .and_then(|c| c.database.as_deref())
        .map(PathBuf::from)
        .unwrap_or_else(default_database_path)
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<QuestmasterConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: QuestmasterConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &QuestmasterConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_database_path() {
        let config = QuestmasterConfig {
            database: Some("data/q.db".into()),
            min_description_words: None,
        };

        assert_eq!(
            resolve_database_path(Some(Path::new("x.db")), Some(&config)),
            PathBuf::from("x.db")
        );
        assert_eq!(resolve_database_path(None, Some(&config)), PathBuf::from("data/q.db"));
        assert_eq!(resolve_database_path(None, None), PathBuf::from("quests.db"));
        assert_eq!(config.min_description_words(), 50);
    }

    #[test]
    fn test_parse_partial_config() {
        let config: QuestmasterConfig = toml::from_str("min_description_words = 10\n").unwrap();
        assert!(config.database.is_none());
        assert_eq!(config.min_description_words(), 10);
    }
}
