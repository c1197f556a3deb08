use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Category of a stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Mood,
    Journal,
}

impl RecordKind {
    /// Backing table name.
    pub fn table(&self) -> &'static str {
        match self {
            RecordKind::Mood => "moods",
            RecordKind::Journal => "journal_entries",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Mood => f.write_str("mood"),
            RecordKind::Journal => f.write_str("journal"),
        }
    }
}

/// A row type read back from the store.
pub trait StoredRecord: DeserializeOwned + Send {
    const KIND: RecordKind;

    fn id(&self) -> Uuid;
}

/// Fields for a row about to be inserted. The user id is attached by the
/// store client, never by the caller.
pub trait NewRecord: Serialize + Send + Sync {
    type Stored: StoredRecord;

    /// Required-field check run before anything is sent.
    fn validate(&self) -> Result<(), ValidationError>;
}

// ── Moods ────────────────────────────────────────────────────────────

/// One point on the fixed mood scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoodLevel {
    pub level: u8,
    pub emoji: &'static str,
    pub label: &'static str,
}

pub const MOOD_SCALE: [MoodLevel; 5] = [
    MoodLevel { level: 1, emoji: "😢", label: "Rough" },
    MoodLevel { level: 2, emoji: "😔", label: "Low" },
    MoodLevel { level: 3, emoji: "😐", label: "Okay" },
    MoodLevel { level: 4, emoji: "🙂", label: "Good" },
    MoodLevel { level: 5, emoji: "😊", label: "Great" },
];

pub fn mood_level(level: u8) -> Option<&'static MoodLevel> {
    MOOD_SCALE.iter().find(|m| m.level == level)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood_level: u8,
    pub mood_emoji: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MoodEntry {
    pub fn label(&self) -> Option<&'static str> {
        mood_level(self.mood_level).map(|m| m.label)
    }
}

impl StoredRecord for MoodEntry {
    const KIND: RecordKind = RecordKind::Mood;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMood {
    pub mood_level: u8,
    pub mood_emoji: String,
    pub notes: Option<String>,
}

impl NewMood {
    /// Mood at `level` with the scale's emoji. Blank notes are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MoodLevelOutOfRange`] for a level off the scale.
    pub fn new(level: u8, notes: Option<String>) -> Result<Self, ValidationError> {
        let mood = mood_level(level).ok_or(ValidationError::MoodLevelOutOfRange {
            level,
            min: MOOD_SCALE[0].level,
            max: MOOD_SCALE[MOOD_SCALE.len() - 1].level,
        })?;
        Ok(Self {
            mood_level: mood.level,
            mood_emoji: mood.emoji.to_string(),
            notes: notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

impl NewRecord for NewMood {
    type Stored = MoodEntry;

    fn validate(&self) -> Result<(), ValidationError> {
        match mood_level(self.mood_level) {
            Some(_) if !self.mood_emoji.is_empty() => Ok(()),
            Some(_) => Err(ValidationError::EmptyField { field: "mood_emoji" }),
            None => Err(ValidationError::MoodLevelOutOfRange {
                level: self.mood_level,
                min: MOOD_SCALE[0].level,
                max: MOOD_SCALE[MOOD_SCALE.len() - 1].level,
            }),
        }
    }
}

// ── Journal ──────────────────────────────────────────────────────────

/// Suggested openers for a new entry.
pub const JOURNAL_PROMPTS: [&str; 4] = [
    "What are you grateful for today?",
    "How did you handle a challenge recently?",
    "What's something that made you smile?",
    "What are you looking forward to?",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl StoredRecord for JournalEntry {
    const KIND: RecordKind = RecordKind::Journal;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewJournalEntry {
    pub title: String,
    pub content: String,
}

impl NewJournalEntry {
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyField`] if title or content is blank.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Result<Self, ValidationError> {
        let entry = Self {
            title: title.into(),
            content: content.into(),
        };
        entry.validate()?;
        Ok(entry)
    }
}

impl NewRecord for NewJournalEntry {
    type Stored = JournalEntry;

    fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "title" });
        }
        if self.content.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "content" });
        }
        Ok(())
    }
}
