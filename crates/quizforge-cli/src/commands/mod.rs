pub mod check;
pub mod delete;
pub mod generate;
pub mod init;
pub mod list;
pub mod list_models;
pub mod results;
pub mod show;
pub mod submit;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use uuid::Uuid;

use quizforge_core::store::FileStore;
use quizforge_providers::config::load_config_from;
use quizforge_providers::QuizforgeConfig;

/// Options shared by every subcommand.
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

impl Context {
    pub fn config(&self) -> Result<QuizforgeConfig> {
        load_config_from(self.config_path.as_deref())
    }

    /// Store rooted at `--data-dir`, or the configured data directory.
    pub fn store(&self) -> Result<FileStore> {
        let root = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => self.config()?.data_dir,
        };
        Ok(FileStore::new(root))
    }
}

/// Fall back to the login name, then `anonymous`.
pub fn user_or_default(user: Option<String>) -> String {
    user.or_else(|| std::env::var("USER").ok())
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| "anonymous".to_string())
}

pub fn parse_quiz_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).with_context(|| format!("invalid quiz id '{raw}'"))
}
