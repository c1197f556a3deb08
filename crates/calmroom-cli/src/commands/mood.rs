use calmroom_core::store::MOOD_SCALE;
use calmroom_core::{Config, CoreError, MoodEntry, NewMood, RestRecordStore, UserContext};
use chrono::{DateTime, Local};
use clap::Subcommand;

use super::{print_json, signed_in, CmdResult};

#[derive(Subcommand)]
pub enum MoodAction {
    /// Show the mood scale
    Levels,
    /// Record how you feel right now
    Log {
        /// Mood level, 1 (rough) to 5 (great)
        level: u8,
        /// Optional note
        #[arg(long)]
        note: Option<String>,
    },
    /// Show recent moods, newest first
    Recent {
        /// How many entries to show (defaults to mood.recent_limit)
        #[arg(long)]
        limit: Option<usize>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: MoodAction) -> CmdResult {
    match action {
        MoodAction::Levels => {
            for mood in &MOOD_SCALE {
                println!("  {} {} {}", mood.level, mood.emoji, mood.label);
            }
            Ok(())
        }
        MoodAction::Log { level, note } => {
            let mood = NewMood::new(level, note)?;
            let config = Config::load()?;
            let ctx = signed_in(&config).await?;
            let store = RestRecordStore::new(config.backend.clone());

            let recent = log_and_refresh(&store, &ctx, &mood, config.mood.recent_limit).await?;
            println!("Mood logged! Keep tracking how you feel");
            print!("{}", render_moods(&recent, Local::now()));
            Ok(())
        }
        MoodAction::Recent { limit, json } => {
            let config = Config::load()?;
            let ctx = signed_in(&config).await?;
            let store = RestRecordStore::new(config.backend.clone());
            let limit = limit.unwrap_or(config.mood.recent_limit);
            let recent = store.recent_moods(&ctx, limit).await?;
            if json {
                return print_json(&recent);
            }
            print!("{}", render_moods(&recent, Local::now()));
            Ok(())
        }
    }
}

/// Save `mood`, then re-read the recent listing.
///
/// A failed save is reported as is; the listing is only fetched on success.
async fn log_and_refresh(
    store: &RestRecordStore,
    ctx: &UserContext,
    mood: &NewMood,
    limit: usize,
) -> Result<Vec<MoodEntry>, CoreError> {
    store
        .log_mood(ctx, mood)
        .await
        .map_err(|e| CoreError::Custom(format!("Failed to save mood: {e}")))?;
    Ok(store.recent_moods(ctx, limit).await?)
}

fn render_moods(entries: &[MoodEntry], now: DateTime<Local>) -> String {
    if entries.is_empty() {
        return "No moods logged yet.\n".to_string();
    }
    let tz = now.timezone();
    let mut out = String::from("\n");
    for entry in entries {
        let when = entry.created_at.with_timezone(&tz);
        out.push_str(&format!(
            "  {}  {} {}\n",
            when.format("%b %-d %H:%M"),
            entry.mood_emoji,
            entry.label().unwrap_or("")
        ));
        if let Some(notes) = &entry.notes {
            out.push_str(&format!("      {notes}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use calmroom_core::{BackendConfig, UserIdentity};
    use mockito::Matcher;

    const USER_ID: &str = "3f2b8f4e-52a4-4f7a-9d8e-0c6f1f0a1b2c";

    fn ctx() -> UserContext {
        UserContext::new(
            UserIdentity {
                id: USER_ID.parse().unwrap(),
                email: None,
                display_name: None,
            },
            "tok",
        )
    }

    fn mood_row(level: u8, emoji: &str, notes: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "id": "7d9c7c52-4f5e-4b7b-8a53-3b1d0f3c9e11",
            "user_id": USER_ID,
            "mood_level": level,
            "mood_emoji": emoji,
            "notes": notes,
            "created_at": "2026-10-15T07:00:00Z"
        })
    }

    #[tokio::test]
    async fn logging_refreshes_recent_listing() {
        let mut server = mockito::Server::new_async().await;
        let insert = server
            .mock("POST", "/rest/v1/moods")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(serde_json::json!([mood_row(4, "🙂", Some("walk"))]).to_string())
            .create_async()
            .await;
        let list = server
            .mock("GET", "/rest/v1/moods")
            .match_query(Matcher::UrlEncoded("limit".into(), "7".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!([mood_row(4, "🙂", Some("walk")), mood_row(2, "😔", None)])
                    .to_string(),
            )
            .create_async()
            .await;

        let store = RestRecordStore::new(BackendConfig::new(server.url(), "anon"));
        let mood = NewMood::new(4, Some("walk".into())).unwrap();
        let recent = log_and_refresh(&store, &ctx(), &mood, 7).await.unwrap();

        assert_eq!(recent.len(), 2);
        let text = render_moods(&recent, Local::now());
        assert!(text.contains("🙂 Good"));
        assert!(text.contains("      walk"));
        assert!(text.contains("😔 Low"));
        insert.assert_async().await;
        list.assert_async().await;
    }

    #[tokio::test]
    async fn failed_save_skips_refresh() {
        let mut server = mockito::Server::new_async().await;
        let _insert = server
            .mock("POST", "/rest/v1/moods")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;
        let list = server
            .mock("GET", "/rest/v1/moods")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let store = RestRecordStore::new(BackendConfig::new(server.url(), "anon"));
        let mood = NewMood::new(3, None).unwrap();
        let err = log_and_refresh(&store, &ctx(), &mood, 7).await.unwrap_err();

        assert!(err.to_string().starts_with("Failed to save mood:"));
        list.assert_async().await;
    }

    #[test]
    fn empty_listing_has_hint() {
        assert_eq!(render_moods(&[], Local::now()), "No moods logged yet.\n");
    }
}
