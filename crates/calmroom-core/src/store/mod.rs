//! Mood and journal records held by the hosted row store.

mod client;
mod records;

pub use client::{ListQuery, RestRecordStore, SortOrder};
pub use records::{
    mood_level, JournalEntry, MoodEntry, MoodLevel, NewJournalEntry, NewMood, NewRecord,
    RecordKind, StoredRecord, JOURNAL_PROMPTS, MOOD_SCALE,
};
