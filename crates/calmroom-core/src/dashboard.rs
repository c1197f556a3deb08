//! Home screen summary: greeting, latest mood and journal count.

use chrono::{DateTime, Local, Timelike};
use serde::Serialize;

use crate::auth::UserContext;
use crate::error::StoreError;
use crate::store::{MoodEntry, RecordKind, RestRecordStore};

/// Name used when the user has no display name.
pub const FALLBACK_NAME: &str = "Friend";

/// Greeting for a local hour of day (0..=23).
pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub greeting: String,
    pub first_name: String,
    pub latest_mood: Option<MoodEntry>,
    pub journal_count: u64,
}

impl DashboardSummary {
    /// `"Good morning, Sam!"`
    pub fn headline(&self) -> String {
        format!("{}, {}!", self.greeting, self.first_name)
    }

    /// Fetch the summary for `ctx` as of local time `now`.
    pub async fn load(
        store: &RestRecordStore,
        ctx: &UserContext,
        now: DateTime<Local>,
    ) -> Result<Self, StoreError> {
        let latest_mood = store.latest_mood(ctx).await?;
        let journal_count = store.count(ctx, RecordKind::Journal).await?;
        Ok(Self {
            greeting: greeting(now.hour()).to_string(),
            first_name: ctx
                .identity
                .first_name()
                .unwrap_or(FALLBACK_NAME)
                .to_string(),
            latest_mood,
            journal_count,
        })
    }
}
