use std::io::Read;

use calmroom_core::store::JOURNAL_PROMPTS;
use calmroom_core::{Config, JournalEntry, NewJournalEntry, RestRecordStore};
use clap::Subcommand;

use super::{print_json, signed_in, CmdResult};

#[derive(Subcommand)]
pub enum JournalAction {
    /// Show writing prompts
    Prompts,
    /// Write a new entry
    Write {
        /// Entry title
        title: String,
        /// Entry text (read from stdin if omitted)
        content: Option<String>,
    },
    /// List entries, newest first
    List {
        /// Maximum number of entries (defaults to journal.list_limit, or all)
        #[arg(long)]
        limit: Option<usize>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: JournalAction) -> CmdResult {
    match action {
        JournalAction::Prompts => {
            for prompt in JOURNAL_PROMPTS {
                println!("  - {prompt}");
            }
            Ok(())
        }
        JournalAction::Write { title, content } => {
            let content = match content {
                Some(content) => content,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let entry = NewJournalEntry::new(title, content)?;

            let config = Config::load()?;
            let ctx = signed_in(&config).await?;
            let store = RestRecordStore::new(config.backend.clone());
            let saved = store.save_journal_entry(&ctx, &entry).await?;
            println!("Entry saved! ({})", saved.id);
            Ok(())
        }
        JournalAction::List { limit, json } => {
            let config = Config::load()?;
            let ctx = signed_in(&config).await?;
            let store = RestRecordStore::new(config.backend.clone());
            let entries = store
                .journal_entries(&ctx, limit.or(config.journal.list_limit))
                .await?;
            if json {
                return print_json(&entries);
            }
            print_entries(&entries);
            Ok(())
        }
    }
}

fn print_entries(entries: &[JournalEntry]) {
    if entries.is_empty() {
        println!("No journal entries yet.");
        return;
    }
    for entry in entries {
        let when = entry.created_at.with_timezone(&chrono::Local);
        println!("{}  {}", when.format("%b %-d, %Y"), entry.title);
        for line in entry.content.lines() {
            println!("    {line}");
        }
        println!();
    }
}
