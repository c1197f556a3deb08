use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One named segment of a breathing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Inhale,
    Hold,
    Exhale,
    HoldAfter,
}

impl Phase {
    /// Canonical cycle order.
    pub const ALL: [Phase; 4] = [Phase::Inhale, Phase::Hold, Phase::Exhale, Phase::HoldAfter];

    /// Wire/config name of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Inhale => "inhale",
            Phase::Hold => "hold",
            Phase::Exhale => "exhale",
            Phase::HoldAfter => "holdAfter",
        }
    }

    /// Text shown to the person breathing. Both holds read "Hold".
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Inhale => "Inhale",
            Phase::Hold | Phase::HoldAfter => "Hold",
            Phase::Exhale => "Exhale",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tick counts per phase. Zero means the phase is skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseDurations {
    #[serde(default)]
    pub inhale: u32,
    #[serde(default)]
    pub hold: u32,
    #[serde(default)]
    pub exhale: u32,
    #[serde(default)]
    pub hold_after: u32,
}

impl PhaseDurations {
    pub fn new(inhale: u32, hold: u32, exhale: u32, hold_after: u32) -> Self {
        Self {
            inhale,
            hold,
            exhale,
            hold_after,
        }
    }

    pub fn get(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Inhale => self.inhale,
            Phase::Hold => self.hold,
            Phase::Exhale => self.exhale,
            Phase::HoldAfter => self.hold_after,
        }
    }

    /// Ticks in one full cycle.
    pub fn cycle_len(&self) -> u64 {
        Phase::ALL.iter().map(|p| u64::from(self.get(*p))).sum()
    }
}

/// Operator-supplied breathing exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathingProfile {
    /// Slug used to select the profile (e.g. "box").
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub durations: PhaseDurations,
}

impl BreathingProfile {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        durations: PhaseDurations,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            durations,
        }
    }

    /// Build the ordered transition table for this profile.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyProfile`] when every phase is zero ticks long.
    pub fn cycle(&self) -> Result<Cycle, ConfigError> {
        Cycle::from_durations(&self.durations).ok_or_else(|| ConfigError::EmptyProfile {
            profile: self.id.clone(),
        })
    }
}

/// One entry of a transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleStep {
    pub phase: Phase,
    pub ticks: u32,
}

/// Ordered, non-empty list of the phases a profile actually visits.
///
/// Built once when a session starts; the engine never consults the raw
/// durations again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    steps: Vec<CycleStep>,
}

impl Cycle {
    /// `None` if no phase has a positive duration.
    pub fn from_durations(durations: &PhaseDurations) -> Option<Self> {
        let steps: Vec<CycleStep> = Phase::ALL
            .iter()
            .filter_map(|&phase| {
                let ticks = durations.get(phase);
                (ticks > 0).then_some(CycleStep { phase, ticks })
            })
            .collect();
        if steps.is_empty() {
            None
        } else {
            Some(Self { steps })
        }
    }

    pub fn steps(&self) -> &[CycleStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the step after `index`, wrapping to the start.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.steps.len()
    }

    pub fn step(&self, index: usize) -> Option<&CycleStep> {
        self.steps.get(index)
    }

    pub fn contains(&self, phase: Phase) -> bool {
        self.steps.iter().any(|s| s.phase == phase)
    }

    pub fn total_ticks(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.ticks)).sum()
    }
}

/// Returns all built-in breathing profiles.
pub fn builtin_profiles() -> Vec<BreathingProfile> {
    vec![relaxing_478(), box_breathing(), energizing()]
}

/// Find a built-in profile by id.
pub fn find_builtin(id: &str) -> Option<BreathingProfile> {
    builtin_profiles().into_iter().find(|p| p.id == id)
}

fn relaxing_478() -> BreathingProfile {
    BreathingProfile::new(
        "4-7-8",
        "4-7-8 Relaxing",
        "Calming breath for sleep & anxiety",
        PhaseDurations::new(4, 7, 8, 0),
    )
}

fn box_breathing() -> BreathingProfile {
    BreathingProfile::new(
        "box",
        "Box Breathing",
        "Focus & stress relief",
        PhaseDurations::new(4, 4, 4, 4),
    )
}

fn energizing() -> BreathingProfile {
    BreathingProfile::new(
        "energizing",
        "Energizing",
        "Quick energy boost",
        PhaseDurations::new(4, 0, 2, 0),
    )
}

/// Longer guidance text for a built-in profile, shown by `breathe show`.
pub fn guidance(id: &str) -> Option<&'static str> {
    match id {
        "4-7-8" => Some(indoc::indoc! {"
            Breathe in quietly through the nose for four counts, hold the
            breath for seven, then exhale fully through the mouth for eight.
            The long exhale slows the heart rate; four rounds before sleep
            is a good starting point.
        "}),
        "box" => Some(indoc::indoc! {"
            Inhale, hold, exhale and hold again, four counts each, tracing
            the sides of a square. The even rhythm steadies attention and
            is easy to repeat anywhere.
        "}),
        "energizing" => Some(indoc::indoc! {"
            A full four-count inhale followed by a short two-count exhale,
            with no pauses. Stop if you feel light-headed.
        "}),
        _ => None,
    }
}
