mod engine;
mod profile;
mod runner;

pub use engine::{BreathingTimer, TimerSession};
pub use profile::{
    builtin_profiles, find_builtin, guidance, BreathingProfile, Cycle, CycleStep, Phase,
    PhaseDurations,
};
pub use runner::{TickDriver, DEFAULT_TICK};
