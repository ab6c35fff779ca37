//! Radial navigation menu: polar layout and cyclic selection.

use foundation::math::Vec2;
use foundation::time::TimeMs;
use runtime::timer::{TimerId, TimerQueue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub label: String,
    pub color: String,
    /// Navigation target: a panel id or one of the reserved tokens.
    pub target: String,
}

impl MenuEntry {
    pub fn new(label: &str, color: &str, target: &str) -> Self {
        Self {
            label: label.to_string(),
            color: color.to_string(),
            target: target.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub open_radius: f64,
    pub dwell_ms: u64,
    pub entries: Vec<MenuEntry>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            open_radius: 75.0,
            dwell_ms: 400,
            entries: vec![
                MenuEntry::new("HOME", "#98DDDE", "top"),
                MenuEntry::new("RESUMÉ", "#E9AAE6", "intro-text"),
                MenuEntry::new("PROJECTS", "#ffe600", "skills-node"),
                MenuEntry::new("GALLERY", "#E9897E", "gallery-1"),
                MenuEntry::new("BLOG", "#A0DAA9", "blog-node"),
                MenuEntry::new("VORTEX", "#6667AB", "EXPLODE_CMD"),
            ],
        }
    }
}

/// Angle of entry `index` out of `count`, starting straight up and going
/// clockwise in screen space.
pub fn orbit_angle_deg(index: usize, count: usize) -> f64 {
    if count == 0 {
        return -90.0;
    }
    index as f64 * (360.0 / count as f64) - 90.0
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct OrbSlot {
    pub index: usize,
    pub angle_deg: f64,
    pub radius: f64,
    pub position: Vec2,
}

pub fn layout_orbit(count: usize, open: bool, open_radius: f64, center: Vec2) -> Vec<OrbSlot> {
    let radius = if open { open_radius } else { 0.0 };
    (0..count)
        .map(|index| {
            let angle_deg = orbit_angle_deg(index, count);
            OrbSlot {
                index,
                angle_deg,
                radius,
                position: center + Vec2::from_polar_deg(angle_deg, radius),
            }
        })
        .collect()
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MenuKey {
    Left,
    Right,
    Up,
    Down,
    Enter,
}

/// Dwell timer payload. Stale generations are ignored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DwellTimer {
    pub generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct OrbitalMenu {
    config: MenuConfig,
    open: bool,
    active: Option<usize>,
    persisted: bool,
    generation: u64,
    pending: Option<TimerId>,
}

impl OrbitalMenu {
    pub fn new(config: MenuConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Secondary highlight after the pointer dwelt on an entry.
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.config.entries
    }

    pub fn entry(&self, index: usize) -> Option<&MenuEntry> {
        self.config.entries.get(index)
    }

    pub fn layout(&self, center: Vec2) -> Vec<OrbSlot> {
        layout_orbit(
            self.config.entries.len(),
            self.open,
            self.config.open_radius,
            center,
        )
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closes the menu, clearing selection and any pending dwell.
    pub fn close<T>(&mut self, timers: &mut TimerQueue<T>) {
        self.open = false;
        self.clear_selection(timers);
    }

    pub fn toggle<T>(&mut self, timers: &mut TimerQueue<T>) -> bool {
        if self.open {
            self.close(timers);
        } else {
            self.open();
        }
        self.open
    }

    /// Moves the selection by one. With nothing selected, selects entry 0.
    pub fn step(&mut self, direction: i32) -> Option<usize> {
        let n = self.config.entries.len();
        if !self.open || n == 0 {
            return None;
        }
        let next = match self.active {
            None => 0,
            Some(i) => (i as i64 + i64::from(direction.signum())).rem_euclid(n as i64) as usize,
        };
        self.active = Some(next);
        trace!(index = next, "menu selection");
        self.active
    }

    pub fn wheel(&mut self, delta_y: f64) -> Option<usize> {
        self.step(if delta_y > 0.0 { 1 } else { -1 })
    }

    /// Arrow keys cycle; Enter returns the selected entry's target.
    pub fn key(&mut self, key: MenuKey) -> Option<String> {
        match key {
            MenuKey::Right | MenuKey::Down => {
                self.step(1);
                None
            }
            MenuKey::Left | MenuKey::Up => {
                self.step(-1);
                None
            }
            MenuKey::Enter => {
                if !self.open {
                    return None;
                }
                let index = self.active?;
                self.entry(index).map(|e| e.target.clone())
            }
        }
    }

    /// Selects `index` and restarts the dwell timer.
    pub fn pointer_enter<T: From<DwellTimer>>(
        &mut self,
        index: usize,
        now: TimeMs,
        timers: &mut TimerQueue<T>,
    ) -> bool {
        if !self.open || index >= self.config.entries.len() {
            return false;
        }
        if let Some(id) = self.pending.take() {
            timers.cancel(id);
        }
        self.active = Some(index);
        self.generation += 1;
        let dwell = DwellTimer {
            generation: self.generation,
        };
        self.pending = Some(timers.schedule_after(
            now,
            Duration::from_millis(self.config.dwell_ms),
            dwell.into(),
        ));
        true
    }

    pub fn pointer_leave<T>(&mut self, timers: &mut TimerQueue<T>) {
        self.clear_selection(timers);
    }

    /// Returns `true` if the timer was current and the persisted state is now on.
    pub fn on_dwell(&mut self, timer: DwellTimer) -> bool {
        if self.pending.is_none() || timer.generation != self.generation {
            return false;
        }
        self.pending = None;
        self.persisted = true;
        true
    }

    fn clear_selection<T>(&mut self, timers: &mut TimerQueue<T>) {
        if let Some(id) = self.pending.take() {
            timers.cancel(id);
        }
        self.active = None;
        self.persisted = false;
    }
}
