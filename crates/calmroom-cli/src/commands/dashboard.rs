use calmroom_core::{Config, DashboardSummary, RestRecordStore};

use super::{print_json, signed_in, CmdResult};

pub async fn run(json: bool) -> CmdResult {
    let config = Config::load()?;
    let ctx = signed_in(&config).await?;
    let store = RestRecordStore::new(config.backend.clone());
    let summary = DashboardSummary::load(&store, &ctx, chrono::Local::now()).await?;

    if json {
        return print_json(&summary);
    }

    println!("{}", summary.headline());
    println!();
    match &summary.latest_mood {
        Some(mood) => println!(
            "  Latest mood:     {} {}",
            mood.mood_emoji,
            mood.label().unwrap_or("")
        ),
        None => println!("  Latest mood:     none yet"),
    }
    println!("  Journal entries: {}", summary.journal_count);
    Ok(())
}
