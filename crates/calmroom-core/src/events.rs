use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every breathing timer state change produces an Event.
/// The CLI prints them as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    BreathingStarted {
        profile_id: String,
        phase: Phase,
        phase_ticks: u32,
        at: DateTime<Utc>,
    },
    /// `cycles` counts full cycles completed so far, including one that
    /// this transition just closed.
    PhaseChanged {
        from: Phase,
        to: Phase,
        phase_ticks: u32,
        cycles: u64,
        at: DateTime<Utc>,
    },
    BreathingStopped {
        profile_id: String,
        ticks: u64,
        cycles: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        profile_id: String,
        profile_name: String,
        phase: Phase,
        phase_label: String,
        elapsed_in_phase: u32,
        phase_ticks: u32,
        running: bool,
        ticks: u64,
        cycles: u64,
        at: DateTime<Utc>,
    },
}
