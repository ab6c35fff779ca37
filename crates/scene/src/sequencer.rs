//! The "singularity" sweep.
//!
//! A run visits every panel once, farthest-down first, adding each to the
//! exploding set at a fixed interval, then holds and clears the whole set in
//! one step. Each stage is a discrete timer event; at most one timer is
//! pending per run, so cancelling is a single queue removal.

use std::time::Duration;

use foundation::math::stable_total_cmp_f64;
use foundation::time::TimeMs;
use runtime::timer::{TimerId, TimerQueue};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::entity::PanelKey;
use crate::selection::PanelSet;
use crate::world::World;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Spacing between consecutive activations.
    pub interval_ms: u64,
    /// Delay between the last activation and the global reset.
    pub hold_ms: u64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            interval_ms: 150,
            hold_ms: 4500,
        }
    }
}

impl SequenceConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}

/// Timer payload. `run` ties the event to the run that scheduled it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SequenceTimer {
    Step { run: u64 },
    Reset { run: u64 },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Activation {
    pub panel: PanelKey,
    pub at: TimeMs,
}

#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    config: SequenceConfig,
    run: u64,
    active: bool,
    order: Vec<PanelKey>,
    cursor: usize,
    exploding: PanelSet,
    activations: Vec<Activation>,
    pending: Option<TimerId>,
    reset_at: Option<TimeMs>,
}

/// Sweep order: world `y` descending, ties in insertion order.
pub fn sweep_order(world: &World) -> Vec<PanelKey> {
    let mut panels: Vec<(PanelKey, f64)> =
        world.iter().map(|(k, p)| (k, p.position.y)).collect();
    panels.sort_by(|(ka, ya), (kb, yb)| stable_total_cmp_f64(*yb, *ya).then_with(|| ka.cmp(kb)));
    panels.into_iter().map(|(k, _)| k).collect()
}

impl Sequencer {
    pub fn new(config: SequenceConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn exploding(&self) -> &PanelSet {
        &self.exploding
    }

    /// Activations of the current (or most recent) run, in order.
    pub fn activations(&self) -> &[Activation] {
        &self.activations
    }

    /// When the most recent run reset, if it has.
    pub fn reset_at(&self) -> Option<TimeMs> {
        self.reset_at
    }

    /// Starts a run. Returns `false` (and changes nothing) while one is active.
    pub fn trigger<T: From<SequenceTimer>>(
        &mut self,
        world: &World,
        now: TimeMs,
        timers: &mut TimerQueue<T>,
    ) -> bool {
        if self.active {
            debug!("sequence already active, trigger ignored");
            return false;
        }
        self.run += 1;
        self.active = true;
        self.order = sweep_order(world);
        self.cursor = 0;
        self.exploding.clear();
        self.activations.clear();
        self.reset_at = None;
        info!(run = self.run, panels = self.order.len(), "sequence started");

        if self.order.is_empty() {
            let run = self.run;
            self.pending = Some(timers.schedule_after(
                now,
                self.config.hold(),
                SequenceTimer::Reset { run }.into(),
            ));
        } else {
            self.advance(now, timers);
        }
        true
    }

    /// Applies a fired timer. `due` is the timer's scheduled deadline, so
    /// spacing stays exact however late the host ticks.
    ///
    /// Returns `false` for timers from a previous or cancelled run.
    pub fn handle<T: From<SequenceTimer>>(
        &mut self,
        timer: SequenceTimer,
        due: TimeMs,
        timers: &mut TimerQueue<T>,
    ) -> bool {
        let run = match timer {
            SequenceTimer::Step { run } | SequenceTimer::Reset { run } => run,
        };
        if !self.active || run != self.run {
            return false;
        }
        self.pending = None;
        match timer {
            SequenceTimer::Step { .. } => self.advance(due, timers),
            SequenceTimer::Reset { .. } => {
                self.active = false;
                self.exploding.clear();
                self.order.clear();
                self.reset_at = Some(due);
                info!(run, at = due.as_millis(), "sequence reset");
            }
        }
        true
    }

    fn advance<T: From<SequenceTimer>>(&mut self, at: TimeMs, timers: &mut TimerQueue<T>) {
        let Some(&panel) = self.order.get(self.cursor) else {
            return;
        };
        self.cursor += 1;
        self.exploding.insert(panel);
        self.activations.push(Activation { panel, at });
        debug!(run = self.run, panel = panel.index(), at = at.as_millis(), "activated");

        let run = self.run;
        let next = if self.cursor < self.order.len() {
            timers.schedule_after(at, self.config.interval(), SequenceTimer::Step { run }.into())
        } else {
            timers.schedule_after(at, self.config.hold(), SequenceTimer::Reset { run }.into())
        };
        self.pending = Some(next);
    }

    /// Aborts the run and removes its pending timer. Used on teardown.
    pub fn cancel<T>(&mut self, timers: &mut TimerQueue<T>) -> bool {
        if let Some(id) = self.pending.take() {
            timers.cancel(id);
        }
        let was_active = self.active;
        self.active = false;
        self.exploding.clear();
        self.order.clear();
        if was_active {
            debug!(run = self.run, "sequence cancelled");
        }
        was_active
    }
}
