//! Persistence for quizzes and results.
//!
//! The normalizer and scoring engine never touch storage; callers hand
//! their validated records to a [`QuizStore`]. [`FileStore`] keeps one JSON
//! document per record under a data directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::QuizError;
use crate::model::{Quiz, QuizResult};

/// Storage collaborator for quizzes and results.
pub trait QuizStore: Send + Sync {
    fn save_quiz(&self, quiz: &Quiz) -> Result<Uuid, QuizError>;

    fn quiz(&self, id: Uuid) -> Result<Quiz, QuizError>;

    /// Quizzes created by `owner`, newest first.
    fn quizzes_by_owner(&self, owner: &str) -> Result<Vec<Quiz>, QuizError>;

    /// Delete a quiz. Only its owner may delete it; anyone else gets
    /// `NotFound`.
    fn delete_quiz(&self, id: Uuid, owner: &str) -> Result<(), QuizError>;

    fn save_result(&self, result: &QuizResult) -> Result<Uuid, QuizError>;

    /// A result, visible only to the candidate who owns it.
    fn result(&self, id: Uuid, candidate: &str) -> Result<QuizResult, QuizError>;

    /// Results belonging to `candidate`, newest first.
    fn results_by_candidate(&self, candidate: &str) -> Result<Vec<QuizResult>, QuizError>;
}

/// JSON-file store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn quiz_dir(&self) -> PathBuf {
        self.root.join("quizzes")
    }

    fn result_dir(&self) -> PathBuf {
        self.root.join("results")
    }
}

fn write_json<T: Serialize>(dir: &Path, id: Uuid, value: &T) -> Result<(), QuizError> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))
        .map_err(QuizError::Storage)?;
    let path = dir.join(format!("{id}.json"));
    let json = serde_json::to_string_pretty(value)
        .context("failed to serialize record")
        .map_err(QuizError::Storage)?;
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write {}", path.display()))
        .map_err(QuizError::Storage)
}

fn read_json<T: DeserializeOwned>(
    dir: &Path,
    id: Uuid,
    kind: &'static str,
) -> Result<T, QuizError> {
    let path = dir.join(format!("{id}.json"));
    if !path.exists() {
        return Err(QuizError::not_found(kind, id));
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))
        .map_err(QuizError::Storage)?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))
        .map_err(QuizError::Storage)
}

fn read_all<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, QuizError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))
        .map_err(QuizError::Storage)?;

    let mut records = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| QuizError::Storage(e.into()))?.path();
        if !path.extension().is_some_and(|ext| ext == "json") {
            continue;
        }
        let parsed = std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|content| serde_json::from_str::<T>(&content).map_err(Into::into));
        match parsed {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("skipping {}: {}", path.display(), e),
        }
    }
    Ok(records)
}

impl QuizStore for FileStore {
    fn save_quiz(&self, quiz: &Quiz) -> Result<Uuid, QuizError> {
        write_json(&self.quiz_dir(), quiz.id, quiz)?;
        tracing::debug!("stored quiz {} ({} questions)", quiz.id, quiz.questions.len());
        Ok(quiz.id)
    }

    fn quiz(&self, id: Uuid) -> Result<Quiz, QuizError> {
        read_json(&self.quiz_dir(), id, "quiz")
    }

    fn quizzes_by_owner(&self, owner: &str) -> Result<Vec<Quiz>, QuizError> {
        let mut quizzes: Vec<Quiz> = read_all(&self.quiz_dir())?;
        quizzes.retain(|q| q.created_by == owner);
        quizzes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(quizzes)
    }

    fn delete_quiz(&self, id: Uuid, owner: &str) -> Result<(), QuizError> {
        let quiz = self.quiz(id)?;
        if quiz.created_by != owner {
            return Err(QuizError::not_found("quiz", id));
        }
        let path = self.quiz_dir().join(format!("{id}.json"));
        std::fs::remove_file(&path)
            .with_context(|| format!("failed to delete {}", path.display()))
            .map_err(QuizError::Storage)
    }

    fn save_result(&self, result: &QuizResult) -> Result<Uuid, QuizError> {
        write_json(&self.result_dir(), result.id, result)?;
        Ok(result.id)
    }

    fn result(&self, id: Uuid, candidate: &str) -> Result<QuizResult, QuizError> {
        let result: QuizResult = read_json(&self.result_dir(), id, "result")?;
        if result.candidate != candidate {
            return Err(QuizError::not_found("result", id));
        }
        Ok(result)
    }

    fn results_by_candidate(&self, candidate: &str) -> Result<Vec<QuizResult>, QuizError> {
        let mut results: Vec<QuizResult> = read_all(&self.result_dir())?;
        results.retain(|r| r.candidate == candidate);
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(results)
    }
}
