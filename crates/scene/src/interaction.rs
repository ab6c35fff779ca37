//! Per-panel interaction state and the focus-mode invariant.
//!
//! Pointer phases (hovered, pressed) are local to each panel. Focus mode is
//! global: at most one panel is expanded, and while it is, no other panel can
//! be hovered or pressed. `Exploding` is not stored here; it comes from the
//! sequencer's set and overrides everything when the state is resolved.

use std::collections::BTreeMap;
use std::fmt;

use foundation::ids::PanelId;
use foundation::math::Vec2;
use foundation::time::TimeMs;
use runtime::event_bus::{EventBus, Notification};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::components::PanelSize;
use crate::entity::PanelKey;
use crate::selection::PanelSet;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionState {
    Idle,
    Hovered,
    Pressed,
    Expanded,
    Exploding,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum PointerPhase {
    Hovered,
    Pressed,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub min_panel_width: f64,
    pub min_panel_height: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            min_panel_width: 150.0,
            min_panel_height: 150.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlockReason {
    Expanded,
    SequenceActive,
    ModalActive,
    /// Administration mode turns activation into an edit request.
    AdminMode,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::Expanded => write!(f, "a panel is expanded"),
            BlockReason::SequenceActive => write!(f, "a sequence is active"),
            BlockReason::ModalActive => write!(f, "a modal collaborator is active"),
            BlockReason::AdminMode => write!(f, "administration mode is on"),
        }
    }
}

/// A rejected transition. Hosts are free to ignore these; nothing changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionError {
    Blocked(BlockReason),
    /// Close the current panel before expanding another.
    AlreadyExpanded(PanelKey),
    NotHovered(PanelKey),
    NotPressed(PanelKey),
    UnknownPanel(PanelId),
}

impl fmt::Display for InteractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionError::Blocked(reason) => write!(f, "interaction blocked: {reason}"),
            InteractionError::AlreadyExpanded(key) => {
                write!(f, "panel #{} is already expanded", key.index())
            }
            InteractionError::NotHovered(key) => {
                write!(f, "panel #{} is not hovered", key.index())
            }
            InteractionError::NotPressed(key) => {
                write!(f, "panel #{} is not pressed", key.index())
            }
            InteractionError::UnknownPanel(id) => write!(f, "no panel with id {id}"),
        }
    }
}

impl std::error::Error for InteractionError {}

/// Global flags owned outside the resolver.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Gate {
    pub sequence_active: bool,
    pub modal_active: bool,
    /// Pointer-up asks for an edit instead of expanding.
    pub admin_mode: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointerUpOutcome {
    Expanded,
    EditRequested,
}

#[derive(Debug, Clone, Default)]
pub struct Interaction {
    pointer: BTreeMap<PanelKey, PointerPhase>,
    expanded: Option<PanelKey>,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expanded(&self) -> Option<PanelKey> {
        self.expanded
    }

    /// Resolves the visible state of `key`.
    ///
    /// Precedence: exploding, expanded, pressed, hovered, idle.
    pub fn state(&self, key: PanelKey, exploding: &PanelSet) -> InteractionState {
        if exploding.contains(key) {
            return InteractionState::Exploding;
        }
        if self.expanded == Some(key) {
            return InteractionState::Expanded;
        }
        match self.pointer.get(&key) {
            Some(PointerPhase::Pressed) => InteractionState::Pressed,
            Some(PointerPhase::Hovered) => InteractionState::Hovered,
            None => InteractionState::Idle,
        }
    }

    fn check_gate(&self, gate: Gate) -> Result<(), InteractionError> {
        if self.expanded.is_some() {
            return Err(InteractionError::Blocked(BlockReason::Expanded));
        }
        if gate.sequence_active {
            return Err(InteractionError::Blocked(BlockReason::SequenceActive));
        }
        if gate.modal_active {
            return Err(InteractionError::Blocked(BlockReason::ModalActive));
        }
        Ok(())
    }

    /// `Idle -> Hovered`. Emits a hover cue on entry.
    pub fn pointer_enter(
        &mut self,
        key: PanelKey,
        id: &PanelId,
        gate: Gate,
        now: TimeMs,
        bus: &mut EventBus,
    ) -> Result<(), InteractionError> {
        self.check_gate(gate)?;
        if self.pointer.contains_key(&key) {
            return Ok(());
        }
        self.pointer.insert(key, PointerPhase::Hovered);
        trace!(panel = %id, "hover");
        bus.emit(now, Notification::Hover(id.clone()));
        Ok(())
    }

    /// Returns a hovered or pressed panel to idle.
    pub fn pointer_leave(&mut self, key: PanelKey) -> bool {
        self.pointer.remove(&key).is_some()
    }

    /// `Hovered -> Pressed`.
    pub fn pointer_down(&mut self, key: PanelKey, gate: Gate) -> Result<(), InteractionError> {
        self.check_gate(gate)?;
        match self.pointer.get_mut(&key) {
            Some(phase) => {
                *phase = PointerPhase::Pressed;
                Ok(())
            }
            None => Err(InteractionError::NotHovered(key)),
        }
    }

    /// `Pressed -> Expanded`, or an edit request in administration mode
    /// (the panel goes back to hovered).
    pub fn pointer_up(
        &mut self,
        key: PanelKey,
        id: &PanelId,
        gate: Gate,
        now: TimeMs,
        bus: &mut EventBus,
    ) -> Result<PointerUpOutcome, InteractionError> {
        self.check_gate(gate)?;
        if self.pointer.get(&key) != Some(&PointerPhase::Pressed) {
            return Err(InteractionError::NotPressed(key));
        }
        if gate.admin_mode {
            self.pointer.insert(key, PointerPhase::Hovered);
            debug!(panel = %id, "edit requested");
            bus.emit(now, Notification::EditRequested(id.clone()));
            return Ok(PointerUpOutcome::EditRequested);
        }
        self.enter_focus(key, now, bus);
        Ok(PointerUpOutcome::Expanded)
    }

    /// Expands `key` directly. Rejected while any panel is expanded, and
    /// under the same sequence, modal and administration gates as pointer-up.
    pub fn expand(
        &mut self,
        key: PanelKey,
        gate: Gate,
        now: TimeMs,
        bus: &mut EventBus,
    ) -> Result<(), InteractionError> {
        if let Some(current) = self.expanded {
            return Err(InteractionError::AlreadyExpanded(current));
        }
        if gate.sequence_active {
            return Err(InteractionError::Blocked(BlockReason::SequenceActive));
        }
        if gate.modal_active {
            return Err(InteractionError::Blocked(BlockReason::ModalActive));
        }
        if gate.admin_mode {
            return Err(InteractionError::Blocked(BlockReason::AdminMode));
        }
        self.enter_focus(key, now, bus);
        Ok(())
    }

    fn enter_focus(&mut self, key: PanelKey, now: TimeMs, bus: &mut EventBus) {
        self.pointer.clear();
        self.expanded = Some(key);
        debug!(panel = key.index(), "expanded");
        bus.emit(now, Notification::Expand);
    }

    /// `Expanded -> Idle`. Emits a close cue if something was expanded.
    pub fn close(&mut self, now: TimeMs, bus: &mut EventBus) -> Option<PanelKey> {
        let key = self.expanded.take()?;
        debug!(panel = key.index(), "closed");
        bus.emit(now, Notification::Close);
        Some(key)
    }

    /// Leaves focus mode without a notification.
    pub fn dismiss(&mut self) -> Option<PanelKey> {
        self.expanded.take()
    }

    pub fn reset_pointers(&mut self) {
        self.pointer.clear();
    }

    /// Drops all state held for a removed panel.
    pub fn forget(&mut self, key: PanelKey) {
        self.pointer.remove(&key);
        if self.expanded == Some(key) {
            self.expanded = None;
        }
    }
}

/// Drag on a panel's resize affordance.
///
/// Pointer deltas are divided by the panel's projected scale so the edge
/// tracks the cursor; both axes are floored.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResizeGesture {
    pub panel: PanelKey,
    start_size: PanelSize,
    start_pointer: Vec2,
    scale: f64,
}

impl ResizeGesture {
    pub fn begin(panel: PanelKey, start_size: PanelSize, pointer: Vec2, scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        Self {
            panel,
            start_size,
            start_pointer: pointer,
            scale,
        }
    }

    pub fn size_at(&self, pointer: Vec2, cfg: &InteractionConfig) -> PanelSize {
        let delta = pointer - self.start_pointer;
        PanelSize::new(
            self.start_size.width + delta.x / self.scale,
            self.start_size.height + delta.y / self.scale,
        )
        .floored(cfg.min_panel_width, cfg.min_panel_height)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BlockReason, Gate, Interaction, InteractionConfig, InteractionError, InteractionState,
        PointerUpOutcome, ResizeGesture,
    };
    use crate::components::PanelSize;
    use crate::entity::PanelKey;
    use crate::selection::PanelSet;
    use foundation::ids::PanelId;
    use foundation::math::Vec2;
    use foundation::time::TimeMs;
    use pretty_assertions::assert_eq;
    use runtime::event_bus::{EventBus, Notification};

    const A: PanelKey = PanelKey(0);
    const B: PanelKey = PanelKey(1);

    fn id(s: &str) -> PanelId {
        PanelId::from(s)
    }

    fn kinds(bus: &EventBus) -> Vec<&'static str> {
        bus.events().iter().map(|e| e.notification.kind()).collect()
    }

    #[test]
    fn hover_press_release_expands() {
        let mut ix = Interaction::new();
        let mut bus = EventBus::new();
        let none = PanelSet::new();
        let gate = Gate::default();

        ix.pointer_enter(A, &id("a"), gate, TimeMs(1), &mut bus).unwrap();
        assert_eq!(ix.state(A, &none), InteractionState::Hovered);
        ix.pointer_down(A, gate).unwrap();
        assert_eq!(ix.state(A, &none), InteractionState::Pressed);
        let outcome = ix.pointer_up(A, &id("a"), gate, TimeMs(2), &mut bus).unwrap();
        assert_eq!(outcome, PointerUpOutcome::Expanded);
        assert_eq!(ix.state(A, &none), InteractionState::Expanded);
        assert_eq!(ix.expanded(), Some(A));

        assert_eq!(ix.close(TimeMs(3), &mut bus), Some(A));
        assert_eq!(ix.state(A, &none), InteractionState::Idle);
        assert_eq!(kinds(&bus), vec!["hover", "expand", "close"]);
    }

    #[test]
    fn admin_mode_requests_edit_and_returns_to_hover() {
        let mut ix = Interaction::new();
        let mut bus = EventBus::new();
        let gate = Gate {
            admin_mode: true,
            ..Gate::default()
        };
        ix.pointer_enter(A, &id("a"), gate, TimeMs(0), &mut bus).unwrap();
        ix.pointer_down(A, gate).unwrap();
        let outcome = ix.pointer_up(A, &id("a"), gate, TimeMs(0), &mut bus).unwrap();
        assert_eq!(outcome, PointerUpOutcome::EditRequested);
        assert_eq!(ix.state(A, &PanelSet::new()), InteractionState::Hovered);
        assert_eq!(ix.expanded(), None);
        assert_eq!(
            bus.events()[1].notification,
            Notification::EditRequested(id("a"))
        );
    }

    #[test]
    fn hover_is_blocked_while_expanded_or_modal_or_sequence() {
        let mut ix = Interaction::new();
        let mut bus = EventBus::new();
        ix.expand(A, Gate::default(), TimeMs(0), &mut bus).unwrap();
        assert_eq!(
            ix.pointer_enter(B, &id("b"), Gate::default(), TimeMs(0), &mut bus),
            Err(InteractionError::Blocked(BlockReason::Expanded))
        );
        ix.dismiss();

        let modal = Gate {
            modal_active: true,
            ..Gate::default()
        };
        assert_eq!(
            ix.pointer_enter(B, &id("b"), modal, TimeMs(0), &mut bus),
            Err(InteractionError::Blocked(BlockReason::ModalActive))
        );
        let seq = Gate {
            sequence_active: true,
            ..Gate::default()
        };
        assert_eq!(
            ix.pointer_enter(B, &id("b"), seq, TimeMs(0), &mut bus),
            Err(InteractionError::Blocked(BlockReason::SequenceActive))
        );
        assert_eq!(ix.state(B, &PanelSet::new()), InteractionState::Idle);
    }

    #[test]
    fn second_expand_is_rejected() {
        let mut ix = Interaction::new();
        let mut bus = EventBus::new();
        ix.expand(A, Gate::default(), TimeMs(0), &mut bus).unwrap();
        assert_eq!(
            ix.expand(B, Gate::default(), TimeMs(0), &mut bus),
            Err(InteractionError::AlreadyExpanded(A))
        );
        assert_eq!(ix.expanded(), Some(A));

        ix.close(TimeMs(1), &mut bus);
        ix.expand(B, Gate::default(), TimeMs(2), &mut bus).unwrap();
        assert_eq!(ix.expanded(), Some(B));
    }

    #[test]
    fn direct_expand_honours_modal_and_admin_gates() {
        let mut ix = Interaction::new();
        let mut bus = EventBus::new();
        let modal = Gate {
            modal_active: true,
            ..Gate::default()
        };
        assert_eq!(
            ix.expand(A, modal, TimeMs(0), &mut bus),
            Err(InteractionError::Blocked(BlockReason::ModalActive))
        );
        let admin = Gate {
            admin_mode: true,
            ..Gate::default()
        };
        assert_eq!(
            ix.expand(A, admin, TimeMs(0), &mut bus),
            Err(InteractionError::Blocked(BlockReason::AdminMode))
        );
        assert_eq!(ix.expanded(), None);
        assert!(bus.events().is_empty());
    }

    #[test]
    fn press_requires_hover_and_release_requires_press() {
        let mut ix = Interaction::new();
        let mut bus = EventBus::new();
        assert_eq!(
            ix.pointer_down(A, Gate::default()),
            Err(InteractionError::NotHovered(A))
        );
        ix.pointer_enter(A, &id("a"), Gate::default(), TimeMs(0), &mut bus)
            .unwrap();
        assert_eq!(
            ix.pointer_up(A, &id("a"), Gate::default(), TimeMs(0), &mut bus),
            Err(InteractionError::NotPressed(A))
        );
    }

    #[test]
    fn leave_returns_to_idle_and_reenter_is_quiet() {
        let mut ix = Interaction::new();
        let mut bus = EventBus::new();
        ix.pointer_enter(A, &id("a"), Gate::default(), TimeMs(0), &mut bus)
            .unwrap();
        ix.pointer_enter(A, &id("a"), Gate::default(), TimeMs(1), &mut bus)
            .unwrap();
        assert_eq!(bus.events().len(), 1);
        assert!(ix.pointer_leave(A));
        assert!(!ix.pointer_leave(A));
        assert_eq!(ix.state(A, &PanelSet::new()), InteractionState::Idle);
    }

    #[test]
    fn exploding_overrides_everything() {
        let mut ix = Interaction::new();
        let mut bus = EventBus::new();
        ix.expand(A, Gate::default(), TimeMs(0), &mut bus).unwrap();
        let mut exploding = PanelSet::new();
        exploding.insert(A);
        assert_eq!(ix.state(A, &exploding), InteractionState::Exploding);
    }

    #[test]
    fn close_without_focus_is_silent() {
        let mut ix = Interaction::new();
        let mut bus = EventBus::new();
        assert_eq!(ix.close(TimeMs(0), &mut bus), None);
        assert!(bus.events().is_empty());
    }

    #[test]
    fn resize_divides_by_scale_and_floors() {
        let cfg = InteractionConfig::default();
        let g = ResizeGesture::begin(A, PanelSize::new(300.0, 200.0), Vec2::new(10.0, 10.0), 0.5);
        assert_eq!(g.size_at(Vec2::new(60.0, 20.0), &cfg), PanelSize::new(400.0, 220.0));
        assert_eq!(
            g.size_at(Vec2::new(-500.0, -500.0), &cfg),
            PanelSize::new(150.0, 150.0)
        );

        let degenerate = ResizeGesture::begin(A, PanelSize::new(300.0, 200.0), Vec2::ZERO, 0.0);
        assert_eq!(
            degenerate.size_at(Vec2::new(10.0, 10.0), &cfg),
            PanelSize::new(310.0, 210.0)
        );
    }
}
