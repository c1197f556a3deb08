//! Breathing timer engine.
//!
//! The engine is a tick-driven state machine. It does not keep time itself;
//! the caller invokes `tick()` once per interval (see [`super::runner`]).
//!
//! ## State Transitions
//!
//! ```text
//! (no session) -start-> inhale -> hold -> exhale -> holdAfter -> inhale ...
//!                         \__________________ stop __________________/
//! ```
//!
//! Phases with a zero duration are never entered.

use chrono::Utc;
use serde::Serialize;

use super::profile::{BreathingProfile, Cycle, Phase};
use crate::error::ConfigError;
use crate::events::Event;

/// One active run of a breathing profile.
#[derive(Debug, Clone, Serialize)]
pub struct TimerSession {
    profile: BreathingProfile,
    cycle: Cycle,
    /// Index into `cycle` of the current phase.
    step_index: usize,
    /// 1-indexed; always within `1..=current phase ticks`.
    elapsed_in_phase: u32,
    running: bool,
    ticks: u64,
    cycles: u64,
}

impl TimerSession {
    /// Start a session at the first phase of the profile's cycle.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyProfile`] if every phase is zero ticks.
    pub fn new(profile: BreathingProfile) -> Result<Self, ConfigError> {
        let cycle = profile.cycle()?;
        Ok(Self {
            profile,
            cycle,
            step_index: 0,
            elapsed_in_phase: 1,
            running: true,
            ticks: 0,
            cycles: 0,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn profile(&self) -> &BreathingProfile {
        &self.profile
    }

    pub fn cycle(&self) -> &Cycle {
        &self.cycle
    }

    pub fn current_phase(&self) -> Phase {
        self.cycle.steps()[self.step_index].phase
    }

    /// Configured length of the current phase in ticks.
    pub fn phase_ticks(&self) -> u32 {
        self.cycle.steps()[self.step_index].ticks
    }

    pub fn elapsed_in_phase(&self) -> u32 {
        self.elapsed_in_phase
    }

    /// `(current_phase, elapsed_in_phase)`.
    pub fn position(&self) -> (Phase, u32) {
        (self.current_phase(), self.elapsed_in_phase)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ticks applied since the session started.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Full cycles completed since the session started.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Apply one tick. Returns `Some(Event::PhaseChanged)` on a transition.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.ticks += 1;

        if self.elapsed_in_phase < self.phase_ticks() {
            self.elapsed_in_phase += 1;
            return None;
        }

        let from = self.current_phase();
        let next = self.cycle.next_index(self.step_index);
        if next == 0 {
            self.cycles += 1;
        }
        self.step_index = next;
        self.elapsed_in_phase = 1;

        tracing::trace!(%from, to = %self.current_phase(), "breathing phase changed");
        Some(Event::PhaseChanged {
            from,
            to: self.current_phase(),
            phase_ticks: self.phase_ticks(),
            cycles: self.cycles,
            at: Utc::now(),
        })
    }

    fn snapshot(&self) -> Event {
        let phase = self.current_phase();
        Event::StateSnapshot {
            profile_id: self.profile.id.clone(),
            profile_name: self.profile.name.clone(),
            phase,
            phase_label: phase.label().to_string(),
            elapsed_in_phase: self.elapsed_in_phase,
            phase_ticks: self.phase_ticks(),
            running: self.running,
            ticks: self.ticks,
            cycles: self.cycles,
            at: Utc::now(),
        }
    }
}

/// Owner of at most one [`TimerSession`].
///
/// Only the holder of the `BreathingTimer` can mutate its session.
#[derive(Debug, Default)]
pub struct BreathingTimer {
    session: Option<TimerSession>,
}

impl BreathingTimer {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> Option<&TimerSession> {
        self.session.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(TimerSession::is_running)
    }

    /// Build a full state snapshot event, if a session is active.
    pub fn snapshot(&self) -> Option<Event> {
        self.session.as_ref().map(TimerSession::snapshot)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a new session, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Rejects a profile whose phases are all zero ticks; the current
    /// session, if any, is kept.
    pub fn start(&mut self, profile: BreathingProfile) -> Result<Event, ConfigError> {
        let session = TimerSession::new(profile)?;
        if let Some(previous) = self.session.as_ref() {
            tracing::debug!(profile = %previous.profile.id, "replacing breathing session");
        }
        let event = Event::BreathingStarted {
            profile_id: session.profile.id.clone(),
            phase: session.current_phase(),
            phase_ticks: session.phase_ticks(),
            at: Utc::now(),
        };
        tracing::info!(profile = %session.profile.id, "breathing session started");
        self.session = Some(session);
        Ok(event)
    }

    /// End and discard the current session.
    pub fn stop(&mut self) -> Option<Event> {
        let mut session = self.session.take()?;
        session.running = false;
        tracing::info!(
            profile = %session.profile.id,
            ticks = session.ticks,
            cycles = session.cycles,
            "breathing session stopped"
        );
        Some(Event::BreathingStopped {
            profile_id: session.profile.id,
            ticks: session.ticks,
            cycles: session.cycles,
            at: Utc::now(),
        })
    }

    /// Call once per interval. No-op without a running session.
    pub fn tick(&mut self) -> Option<Event> {
        self.session.as_mut()?.tick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::profile::{find_builtin, PhaseDurations};

    fn profile(inhale: u32, hold: u32, exhale: u32, hold_after: u32) -> BreathingProfile {
        BreathingProfile::new(
            "test",
            "Test",
            "",
            PhaseDurations::new(inhale, hold, exhale, hold_after),
        )
    }

    fn position(timer: &BreathingTimer) -> (Phase, u32) {
        timer.session().unwrap().position()
    }

    fn tick_n(timer: &mut BreathingTimer, n: usize) {
        for _ in 0..n {
            timer.tick();
        }
    }

    #[test]
    fn relaxing_478_walks_the_documented_sequence() {
        let mut timer = BreathingTimer::new();
        timer.start(find_builtin("4-7-8").unwrap()).unwrap();
        assert_eq!(position(&timer), (Phase::Inhale, 1));

        tick_n(&mut timer, 4);
        assert_eq!(position(&timer), (Phase::Hold, 1));

        tick_n(&mut timer, 7);
        assert_eq!(position(&timer), (Phase::Exhale, 1));

        tick_n(&mut timer, 8);
        assert_eq!(position(&timer), (Phase::Inhale, 1));
        assert_eq!(timer.session().unwrap().cycles(), 1);
        assert_eq!(timer.session().unwrap().ticks(), 19);
    }

    #[test]
    fn zero_hold_is_never_entered() {
        let mut timer = BreathingTimer::new();
        timer.start(profile(4, 0, 2, 0)).unwrap();
        for _ in 0..60 {
            timer.tick();
            assert_ne!(position(&timer).0, Phase::Hold);
        }
        // 60 ticks is exactly ten 6-tick cycles.
        assert_eq!(position(&timer), (Phase::Inhale, 1));
        assert_eq!(timer.session().unwrap().cycles(), 10);
    }

    #[test]
    fn box_breathing_enters_hold_after() {
        let mut timer = BreathingTimer::new();
        timer.start(find_builtin("box").unwrap()).unwrap();
        tick_n(&mut timer, 12);
        assert_eq!(position(&timer), (Phase::HoldAfter, 1));
        tick_n(&mut timer, 4);
        assert_eq!(position(&timer), (Phase::Inhale, 1));
    }

    #[test]
    fn elapsed_counts_up_within_phase() {
        let mut timer = BreathingTimer::new();
        timer.start(profile(3, 0, 1, 0)).unwrap();
        assert!(timer.tick().is_none());
        assert_eq!(position(&timer), (Phase::Inhale, 2));
        assert!(timer.tick().is_none());
        assert_eq!(position(&timer), (Phase::Inhale, 3));
        let event = timer.tick().unwrap();
        assert!(matches!(
            event,
            Event::PhaseChanged { from: Phase::Inhale, to: Phase::Exhale, phase_ticks: 1, cycles: 0, .. }
        ));
    }

    #[test]
    fn single_phase_profile_restarts_itself() {
        let mut timer = BreathingTimer::new();
        timer.start(profile(0, 2, 0, 0)).unwrap();
        assert_eq!(position(&timer), (Phase::Hold, 1));
        timer.tick();
        let event = timer.tick().unwrap();
        assert!(matches!(
            event,
            Event::PhaseChanged { from: Phase::Hold, to: Phase::Hold, cycles: 1, .. }
        ));
        assert_eq!(position(&timer), (Phase::Hold, 1));
    }

    #[test]
    fn stop_then_start_resets_to_inhale() {
        let mut timer = BreathingTimer::new();
        let p = find_builtin("4-7-8").unwrap();
        timer.start(p.clone()).unwrap();
        tick_n(&mut timer, 9);
        assert_eq!(position(&timer), (Phase::Hold, 6));

        let stopped = timer.stop().unwrap();
        assert!(matches!(stopped, Event::BreathingStopped { ticks: 9, .. }));
        assert!(timer.session().is_none());
        assert!(!timer.is_running());

        timer.start(p).unwrap();
        assert_eq!(position(&timer), (Phase::Inhale, 1));
    }

    #[test]
    fn start_replaces_running_session() {
        let mut timer = BreathingTimer::new();
        timer.start(find_builtin("box").unwrap()).unwrap();
        tick_n(&mut timer, 5);
        timer.start(find_builtin("energizing").unwrap()).unwrap();
        assert_eq!(timer.session().unwrap().profile().id, "energizing");
        assert_eq!(position(&timer), (Phase::Inhale, 1));
        assert_eq!(timer.session().unwrap().ticks(), 0);
    }

    #[test]
    fn tick_without_session_is_noop() {
        let mut timer = BreathingTimer::new();
        assert!(timer.tick().is_none());
        assert!(timer.stop().is_none());
        assert!(timer.snapshot().is_none());
    }

    #[test]
    fn invalid_profile_keeps_prior_session() {
        let mut timer = BreathingTimer::new();
        timer.start(find_builtin("box").unwrap()).unwrap();
        tick_n(&mut timer, 2);
        let err = timer.start(profile(0, 0, 0, 0)).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyProfile { .. }));
        assert_eq!(timer.session().unwrap().profile().id, "box");
        assert_eq!(position(&timer), (Phase::Inhale, 3));
    }

    #[test]
    fn snapshot_reports_current_position() {
        let mut timer = BreathingTimer::new();
        timer.start(find_builtin("box").unwrap()).unwrap();
        tick_n(&mut timer, 13);
        match timer.snapshot().unwrap() {
            Event::StateSnapshot {
                phase,
                phase_label,
                elapsed_in_phase,
                phase_ticks,
                running,
                ticks,
                ..
            } => {
                assert_eq!(phase, Phase::HoldAfter);
                assert_eq!(phase_label, "Hold");
                assert_eq!(elapsed_in_phase, 2);
                assert_eq!(phase_ticks, 4);
                assert!(running);
                assert_eq!(ticks, 13);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }
}
