//! JSON document repository.
//!
//! Keeps cards and streak in one flat key/value document:
//! `{ "cards": { "<item id>": { ...card fields } }, "streak": { ... } | null }`.

use std::fs;
use std::path::{Path, PathBuf};

use dars_core::repository::{CardRepository, StreakRepository};
use dars_core::types::{CardSet, StreakState};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StoreError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    cards: CardSet,
    #[serde(default)]
    streak: Option<StreakState>,
}

/// Repository backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    /// Repository at `path`. The file is created on first save.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Document> {
        if !self.path.exists() {
            return Ok(Document::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Document::default());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    /// Writes a sibling temporary file, then renames it over the target.
    fn write(&self, document: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| StoreError::InvalidData(format!("not a file path: {:?}", self.path)))?;
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        let contents = serde_json::to_string_pretty(document)?;
        fs::write(&tmp_path, contents)?;
        fs::rename(&tmp_path, &self.path)?;
        debug!(path = %self.path.display(), "wrote json document");
        Ok(())
    }
}

impl CardRepository for JsonFileRepository {
    type Error = StoreError;

    fn load_cards(&self) -> Result<CardSet> {
        Ok(self.read()?.cards)
    }

    fn save_cards(&self, cards: &CardSet) -> Result<()> {
        let mut document = self.read()?;
        document.cards = cards.clone();
        self.write(&document)
    }
}

impl StreakRepository for JsonFileRepository {
    type Error = StoreError;

    fn load_streak(&self) -> Result<Option<StreakState>> {
        Ok(self.read()?.streak)
    }

    fn save_streak(&self, streak: &StreakState) -> Result<()> {
        let mut document = self.read()?;
        document.streak = Some(streak.clone());
        self.write(&document)
    }
}
