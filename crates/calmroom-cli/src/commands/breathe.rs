//! Breathing exercise commands.

use std::time::Duration;

use calmroom_core::timer::{guidance, TickDriver};
use calmroom_core::{BreathingTimer, Config, Event};
use clap::Subcommand;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum BreatheAction {
    /// List available breathing exercises
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show details for one exercise
    Show {
        /// Exercise id (e.g. "4-7-8", "box", "energizing")
        id: String,
    },
    /// Run an exercise until Ctrl-C
    Start {
        /// Exercise id
        id: String,
        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,
        /// Tick interval in milliseconds (defaults to breathing.tick_ms)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Print every event and snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: BreatheAction) -> CmdResult {
    let config = Config::load_or_default();
    match action {
        BreatheAction::List { json } => list(&config, json),
        BreatheAction::Show { id } => show(&config, &id),
        BreatheAction::Start {
            id,
            ticks,
            interval_ms,
            json,
        } => start(&config, &id, ticks, interval_ms, json).await,
    }
}

fn list(config: &Config, json: bool) -> CmdResult {
    let profiles = config.profiles();
    if json {
        return print_json(&profiles);
    }

    println!("Breathing exercises:");
    println!();
    for profile in profiles {
        let d = profile.durations;
        println!("  {} - {}", profile.id, profile.name);
        if !profile.description.is_empty() {
            println!("    {}", profile.description);
        }
        println!(
            "    inhale {} / hold {} / exhale {} / hold {}",
            d.inhale, d.hold, d.exhale, d.hold_after
        );
        println!();
    }
    Ok(())
}

fn show(config: &Config, id: &str) -> CmdResult {
    let profile = config.profile(id)?;
    let cycle = profile.cycle()?;

    println!("{} ({})", profile.name, profile.id);
    if !profile.description.is_empty() {
        println!("{}", profile.description);
    }
    println!();
    for step in cycle.steps() {
        println!("  {:<7} {} ticks", step.phase.label(), step.ticks);
    }
    println!("  cycle   {} ticks", cycle.total_ticks());
    if let Some(text) = guidance(&profile.id) {
        println!();
        print!("{text}");
    }
    Ok(())
}

async fn start(
    config: &Config,
    id: &str,
    ticks: Option<u64>,
    interval_ms: Option<u64>,
    json: bool,
) -> CmdResult {
    let profile = config.profile(id)?;
    let interval = interval_ms
        .map(|ms| Duration::from_millis(ms.max(1)))
        .unwrap_or_else(|| config.tick_interval());

    let mut timer = BreathingTimer::new();
    let started = timer.start(profile)?;
    if json {
        println!("{}", serde_json::to_string(&started)?);
    } else if let Some(session) = timer.session() {
        println!("{} - press Ctrl-C to stop", session.profile().name);
        println!("{:<7} {}", session.current_phase().label(), session.elapsed_in_phase());
    }

    let cancel = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let stopped = TickDriver::new(interval)
        .with_max_ticks(ticks)
        .run(
            &mut timer,
            |timer, event| {
                if json {
                    if let Some(event) = event {
                        print_event(event);
                    }
                    if let Some(snapshot) = timer.snapshot() {
                        print_event(&snapshot);
                    }
                } else if let Some(session) = timer.session() {
                    println!(
                        "{:<7} {}",
                        session.current_phase().label(),
                        session.elapsed_in_phase()
                    );
                }
            },
            cancel,
        )
        .await;

    if let Some(stopped) = stopped {
        if json {
            print_event(&stopped);
        } else if let Event::BreathingStopped { ticks, cycles, .. } = stopped {
            println!("Stopped after {ticks} ticks ({cycles} full cycles)");
        }
    }
    Ok(())
}

fn print_event(event: &Event) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::warn!(error = %e, "cannot serialize event"),
    }
}
