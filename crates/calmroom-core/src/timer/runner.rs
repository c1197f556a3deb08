//! Real-time driver for [`BreathingTimer`].

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use super::engine::BreathingTimer;
use crate::events::Event;

/// Default tick interval.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Ticks a timer on a fixed interval until a tick budget runs out or the
/// cancel future resolves. The driver is the single source of ticks for
/// the timer it runs.
#[derive(Debug, Clone)]
pub struct TickDriver {
    interval: Duration,
    max_ticks: Option<u64>,
}

impl Default for TickDriver {
    fn default() -> Self {
        Self::new(DEFAULT_TICK)
    }
}

impl TickDriver {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_ticks: None,
        }
    }

    /// Stop after `max_ticks` ticks instead of running until cancelled.
    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Drive `timer` until done, then stop it.
    ///
    /// `on_tick` sees the timer after every tick along with the transition
    /// event that tick produced, if any. Returns the stop event, or `None`
    /// if the timer had no session.
    pub async fn run<F, C>(&self, timer: &mut BreathingTimer, mut on_tick: F, cancel: C) -> Option<Event>
    where
        F: FnMut(&BreathingTimer, Option<&Event>),
        C: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        tokio::pin!(cancel);
        let mut applied = 0u64;
        while timer.is_running() {
            if self.max_ticks.is_some_and(|max| applied >= max) {
                break;
            }
            tokio::select! {
                biased;
                () = &mut cancel => {
                    tracing::debug!(ticks = applied, "tick driver cancelled");
                    break;
                }
                _ = interval.tick() => {
                    let event = timer.tick();
                    applied += 1;
                    on_tick(timer, event.as_ref());
                }
            }
        }
        timer.stop()
    }
}
