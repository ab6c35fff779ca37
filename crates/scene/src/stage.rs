//! Single owner of the engine's mutable state.
//!
//! `Stage` holds the world, camera, interaction resolver, sequencer, menu,
//! timer queue and notification bus, and exposes only transition
//! operations. Time advances exclusively through [`Stage::tick`]; every
//! notification is stamped with the stage's current time.

use std::cmp::Ordering;

use foundation::ids::PanelId;
use foundation::math::Vec2;
use foundation::time::TimeMs;
use runtime::event_bus::{AudioSink, Event, EventBus, Notification};
use runtime::timer::TimerQueue;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::camera::{Camera, Viewport};
use crate::components::PanelSize;
use crate::config::StageConfig;
use crate::connectivity::{Beam, collect_beams, project_all};
use crate::entity::{Panel, PanelKey};
use crate::interaction::{
    BlockReason, Gate, Interaction, InteractionError, InteractionState, PointerUpOutcome,
    ResizeGesture,
};
use crate::navigation::NavTarget;
use crate::orbital::{DwellTimer, MenuKey, OrbSlot, OrbitalMenu};
use crate::projection::Projector;
use crate::sequencer::{SequenceTimer, Sequencer};
use crate::visibility::{CullContext, cull_panels};
use crate::wireframe::{Wireframe, collect_wireframes};
use crate::world::{World, WorldError};

/// Every timer the stage schedules.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StageTimer {
    Sequence(SequenceTimer),
    Dwell(DwellTimer),
}

impl From<SequenceTimer> for StageTimer {
    fn from(t: SequenceTimer) -> Self {
        StageTimer::Sequence(t)
    }
}

impl From<DwellTimer> for StageTimer {
    fn from(t: DwellTimer) -> Self {
        StageTimer::Dwell(t)
    }
}

/// Paint band. Items in a later band always paint over earlier ones.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaintLayer {
    Base,
    Exploding,
    Focus,
}

/// One panel as the rendering surface should place it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderItem {
    #[serde(skip)]
    pub key: PanelKey,
    pub id: PanelId,
    pub screen_x: f64,
    pub screen_y: f64,
    pub scale: f64,
    pub depth_order: i64,
    pub layer: PaintLayer,
    pub state: InteractionState,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub depth_percent: f64,
    pub rotation_deg: f64,
    pub sequence_active: bool,
    pub focus: Option<PanelId>,
}

/// Render output for one camera state. Items are in paint order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub items: Vec<RenderItem>,
    pub beams: Vec<Beam>,
    pub wireframes: Vec<Wireframe>,
    pub hud: Hud,
}

impl Frame {
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(|i| i.id.as_str())
    }
}

#[derive(Debug)]
pub struct Stage {
    config: StageConfig,
    world: World,
    camera: Camera,
    projector: Projector,
    interaction: Interaction,
    sequencer: Sequencer,
    menu: OrbitalMenu,
    timers: TimerQueue<StageTimer>,
    bus: EventBus,
    now: TimeMs,
    modal_active: bool,
    admin_mode: bool,
    torn_down: bool,
    resize: Option<ResizeGesture>,
}

impl Stage {
    pub fn new(config: StageConfig, world: World, viewport: Viewport) -> Self {
        Self {
            camera: Camera::new(config.camera, viewport),
            projector: Projector::new(config.projection),
            interaction: Interaction::new(),
            sequencer: Sequencer::new(config.sequence),
            menu: OrbitalMenu::new(config.menu.clone()),
            timers: TimerQueue::new(),
            bus: EventBus::new(),
            now: TimeMs::ZERO,
            modal_active: false,
            admin_mode: false,
            torn_down: false,
            resize: None,
            world,
            config,
        }
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn menu(&self) -> &OrbitalMenu {
        &self.menu
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn now(&self) -> TimeMs {
        self.now
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn next_due(&self) -> Option<TimeMs> {
        self.timers.next_due()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn sequence_active(&self) -> bool {
        self.sequencer.is_active()
    }

    pub fn expanded(&self) -> Option<&PanelId> {
        let key = self.interaction.expanded()?;
        self.world.get(key).map(|p| &p.id)
    }

    pub fn state_of(&self, id: &str) -> Option<InteractionState> {
        let key = self.world.key_of(id)?;
        Some(self.interaction.state(key, self.sequencer.exploding()))
    }

    fn gate(&self) -> Gate {
        Gate {
            sequence_active: self.sequencer.is_active(),
            modal_active: self.modal_active,
            admin_mode: self.admin_mode,
        }
    }

    /// Scroll and drag input is ignored in focus mode, during a sequence and
    /// while a modal collaborator is up.
    pub fn camera_locked(&self) -> bool {
        self.torn_down
            || self.interaction.expanded().is_some()
            || self.sequencer.is_active()
            || self.modal_active
    }

    /// The menu is withdrawn in focus mode and behind a modal collaborator.
    pub fn menu_available(&self) -> bool {
        !self.torn_down && self.interaction.expanded().is_none() && !self.modal_active
    }

    fn key(&self, id: &str) -> Result<PanelKey, InteractionError> {
        self.world
            .key_of(id)
            .ok_or_else(|| InteractionError::UnknownPanel(PanelId::from(id)))
    }

    // Clock.

    /// Advances time to `now` and fires every due timer in deadline order.
    ///
    /// Returns the number of timers fired. Time never moves backwards, and a
    /// torn-down stage fires nothing.
    pub fn tick(&mut self, now: TimeMs) -> usize {
        if self.torn_down {
            return 0;
        }
        if now > self.now {
            self.now = now;
        }
        let mut fired = 0;
        while let Some((_, due, timer)) = self.timers.pop_due(self.now) {
            fired += 1;
            match timer {
                StageTimer::Sequence(t) => {
                    self.sequencer.handle(t, due, &mut self.timers);
                }
                StageTimer::Dwell(t) => {
                    self.menu.on_dwell(t);
                }
            }
        }
        fired
    }

    // Camera.

    pub fn scroll_to(&mut self, scroll: f64) -> bool {
        if self.camera_locked() {
            return false;
        }
        self.camera.set_scroll(scroll);
        true
    }

    pub fn scroll_step(&mut self, direction: i32) -> bool {
        let target = self.camera.step_target(direction);
        self.scroll_to(target)
    }

    /// Sets the scene rotation directly, clamped to the configured maximum.
    pub fn set_rotation(&mut self, rotation_deg: f64) -> bool {
        if self.camera_locked() {
            return false;
        }
        self.camera.set_rotation(rotation_deg);
        true
    }

    pub fn resize_viewport(&mut self, viewport: Viewport) {
        self.camera.resize(viewport);
    }

    pub fn begin_drag(&mut self, pointer: Vec2) -> bool {
        if self.camera_locked() {
            return false;
        }
        self.camera.begin_drag(pointer);
        true
    }

    pub fn drag_to(&mut self, pointer: Vec2) -> bool {
        if self.camera_locked() {
            return false;
        }
        self.camera.drag_to(pointer)
    }

    pub fn end_drag(&mut self) {
        self.camera.end_drag();
    }

    // Panels.

    pub fn pointer_enter(&mut self, id: &str) -> Result<(), InteractionError> {
        let key = self.key(id)?;
        let gate = self.gate();
        let panel_id = PanelId::from(id);
        self.interaction
            .pointer_enter(key, &panel_id, gate, self.now, &mut self.bus)
    }

    pub fn pointer_leave(&mut self, id: &str) -> bool {
        match self.world.key_of(id) {
            Some(key) => self.interaction.pointer_leave(key),
            None => false,
        }
    }

    pub fn pointer_down(&mut self, id: &str) -> Result<(), InteractionError> {
        let key = self.key(id)?;
        self.interaction.pointer_down(key, self.gate())
    }

    pub fn pointer_up(&mut self, id: &str) -> Result<PointerUpOutcome, InteractionError> {
        let key = self.key(id)?;
        let gate = self.gate();
        let panel_id = PanelId::from(id);
        let outcome = self
            .interaction
            .pointer_up(key, &panel_id, gate, self.now, &mut self.bus)?;
        if outcome == PointerUpOutcome::Expanded {
            self.enter_focus_side_effects();
        }
        Ok(outcome)
    }

    pub fn expand(&mut self, id: &str) -> Result<(), InteractionError> {
        let key = self.key(id)?;
        let gate = self.gate();
        self.interaction.expand(key, gate, self.now, &mut self.bus)?;
        self.enter_focus_side_effects();
        Ok(())
    }

    fn enter_focus_side_effects(&mut self) {
        self.camera.end_drag();
        self.resize = None;
        self.menu.close(&mut self.timers);
    }

    /// Leaves focus mode. Returns the panel that was expanded.
    pub fn close_expanded(&mut self) -> Option<PanelId> {
        let key = self.interaction.close(self.now, &mut self.bus)?;
        self.world.get(key).map(|p| p.id.clone())
    }

    /// Applies a size from the editing collaborator, floored on both axes.
    pub fn request_resize(
        &mut self,
        id: &str,
        width: f64,
        height: f64,
    ) -> Result<PanelSize, WorldError> {
        let cfg = &self.config.interaction;
        let size =
            PanelSize::new(width, height).floored(cfg.min_panel_width, cfg.min_panel_height);
        self.world.set_size(id, size)?;
        trace!(panel = id, width = size.width, height = size.height, "resized");
        Ok(size)
    }

    /// Starts a resize drag on `id`'s handle at its current projected scale.
    ///
    /// Panels have no handle in focus mode, expanded or not.
    pub fn begin_resize(&mut self, id: &str, pointer: Vec2) -> Result<(), InteractionError> {
        let key = self.key(id)?;
        if self.interaction.expanded().is_some() {
            return Err(InteractionError::Blocked(BlockReason::Expanded));
        }
        if self.sequencer.is_active() {
            return Err(InteractionError::Blocked(BlockReason::SequenceActive));
        }
        let Some(panel) = self.world.get(key) else {
            return Err(InteractionError::UnknownPanel(PanelId::from(id)));
        };
        let scale = self
            .projector
            .project(panel.position, &self.camera.state())
            .scale;
        self.resize = Some(ResizeGesture::begin(key, panel.size, pointer, scale));
        Ok(())
    }

    pub fn resize_to(&mut self, pointer: Vec2) -> Option<PanelSize> {
        let gesture = self.resize?;
        let size = gesture.size_at(pointer, &self.config.interaction);
        let id = self.world.get(gesture.panel)?.id.clone();
        self.world.set_size(id.as_str(), size).ok()?;
        Some(size)
    }

    pub fn end_resize(&mut self) {
        self.resize = None;
    }

    pub fn insert_panel(&mut self, panel: Panel) -> Result<PanelKey, WorldError> {
        self.world.insert(panel)
    }

    /// Removes a panel and any interaction state held for it.
    pub fn remove_panel(&mut self, id: &str) -> Option<Panel> {
        let key = self.world.key_of(id)?;
        self.interaction.forget(key);
        if self.resize.is_some_and(|g| g.panel == key) {
            self.resize = None;
        }
        self.world.remove(id)
    }

    pub fn set_modal_active(&mut self, active: bool) {
        self.modal_active = active;
        if active {
            self.interaction.reset_pointers();
            self.camera.end_drag();
            self.menu.close(&mut self.timers);
        }
    }

    /// Administration mode turns pointer-up into edit requests. Switching it
    /// leaves focus mode without a close cue.
    pub fn set_admin_mode(&mut self, on: bool) {
        if self.admin_mode == on {
            return;
        }
        self.admin_mode = on;
        self.interaction.dismiss();
        self.interaction.reset_pointers();
    }

    // Sequence and navigation.

    /// Starts the singularity sweep. No-op while one is running.
    ///
    /// Any expanded panel is closed first; the menu closes and an expand cue
    /// is emitted for the surge.
    pub fn trigger_singularity(&mut self) -> bool {
        if self.torn_down || self.sequencer.is_active() {
            return false;
        }
        self.menu.close(&mut self.timers);
        self.interaction.close(self.now, &mut self.bus);
        self.interaction.reset_pointers();
        self.camera.end_drag();
        self.resize = None;
        let started = self
            .sequencer
            .trigger(&self.world, self.now, &mut self.timers);
        if started {
            self.bus.emit(self.now, Notification::Expand);
        }
        started
    }

    pub fn navigate_to(&mut self, raw: &str) -> bool {
        let target = NavTarget::parse(&self.config.navigation, raw);
        self.navigate(target)
    }

    /// Returns `true` if the navigation had an effect.
    pub fn navigate(&mut self, target: NavTarget) -> bool {
        if matches!(target, NavTarget::Singularity) {
            return self.trigger_singularity();
        }
        self.menu.close(&mut self.timers);
        match target {
            NavTarget::Top => {
                debug!("navigate to top");
                self.scroll_to(0.0)
            }
            NavTarget::Panel(id) => {
                let Some(y) = self.world.panel(id.as_str()).map(|p| p.position.y) else {
                    debug!(panel = %id, "navigate to unknown panel ignored");
                    return false;
                };
                let scroll = self.camera.focus_scroll_for(y);
                debug!(panel = %id, scroll, "navigate to panel");
                self.scroll_to(scroll)
            }
            NavTarget::Singularity => false,
        }
    }

    // Menu.

    /// Returns whether the menu is open afterwards.
    pub fn toggle_menu(&mut self) -> bool {
        if !self.menu_available() {
            return self.menu.is_open();
        }
        self.menu.toggle(&mut self.timers)
    }

    pub fn menu_wheel(&mut self, delta_y: f64) -> Option<usize> {
        if !self.menu_available() {
            return None;
        }
        self.menu.wheel(delta_y)
    }

    /// Arrow keys cycle the selection; Enter navigates to the selected entry.
    pub fn menu_key(&mut self, key: MenuKey) -> bool {
        if !self.menu_available() {
            return false;
        }
        match self.menu.key(key) {
            Some(target) => self.navigate_to(&target),
            None => false,
        }
    }

    pub fn menu_pointer_enter(&mut self, index: usize) -> bool {
        if !self.menu_available() {
            return false;
        }
        self.menu.pointer_enter(index, self.now, &mut self.timers)
    }

    pub fn menu_pointer_leave(&mut self) {
        self.menu.pointer_leave(&mut self.timers);
    }

    /// Click on an orb.
    pub fn menu_select(&mut self, index: usize) -> bool {
        if !self.menu_available() || !self.menu.is_open() {
            return false;
        }
        let Some(target) = self.menu.entry(index).map(|e| e.target.clone()) else {
            return false;
        };
        self.navigate_to(&target)
    }

    pub fn menu_layout(&self, center: Vec2) -> Vec<OrbSlot> {
        self.menu.layout(center)
    }

    // Notifications.

    /// Notifications not yet drained. The log is bounded; hosts should call
    /// [`Stage::drain_events`] or [`Stage::flush_audio`] every frame, and
    /// [`Stage::dropped_events`] counts what was evicted otherwise.
    pub fn events(&self) -> &[Event] {
        self.bus.events()
    }

    pub fn dropped_events(&self) -> u64 {
        self.bus.dropped()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.bus.drain()
    }

    pub fn flush_audio(&mut self, sink: &mut dyn AudioSink) -> Vec<Event> {
        self.bus.flush_audio(sink)
    }

    /// Cancels every pending timer and freezes the stage. Later ticks are
    /// inert.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.sequencer.cancel(&mut self.timers);
        self.menu.close(&mut self.timers);
        let dropped = self.timers.clear();
        self.interaction.dismiss();
        self.interaction.reset_pointers();
        self.camera.end_drag();
        self.resize = None;
        self.torn_down = true;
        info!(dropped, "stage torn down");
    }

    // Output.

    pub fn frame(&self) -> Frame {
        let camera = self.camera.state();
        let viewport = camera.viewport;
        let projections = project_all(&self.world, &self.projector, &camera);
        let expanded = self.interaction.expanded();
        let sequence_active = self.sequencer.is_active();
        let ctx = CullContext {
            viewport_height: viewport.height,
            expanded,
            sequence_active,
        };

        let kept = cull_panels(
            &self.config.cull,
            &ctx,
            self.world.iter().filter_map(|(key, panel)| {
                projections
                    .get(&key)
                    .map(|projection| (key, projection, panel.size.height))
            }),
        );

        let mut items = Vec::new();
        for key in kept {
            let (Some(panel), Some(projection)) = (self.world.get(key), projections.get(&key))
            else {
                continue;
            };
            let state = self.interaction.state(key, self.sequencer.exploding());
            let (screen_x, screen_y, scale, depth_order, layer) = if expanded == Some(key) {
                let center = viewport.center();
                (center.x, center.y, 1.0, 1000, PaintLayer::Focus)
            } else if state == InteractionState::Exploding {
                (
                    projection.screen_x,
                    projection.screen_y,
                    projection.scale,
                    projection.depth_order,
                    PaintLayer::Exploding,
                )
            } else {
                (
                    projection.screen_x,
                    projection.screen_y,
                    projection.scale,
                    projection.depth_order,
                    PaintLayer::Base,
                )
            };
            items.push(RenderItem {
                key,
                id: panel.id.clone(),
                screen_x,
                screen_y,
                scale,
                depth_order,
                layer,
                state,
                width: panel.size.width,
                height: panel.size.height,
            });
        }
        items.sort_by(paint_order);

        let beams = if sequence_active {
            Vec::new()
        } else {
            collect_beams(&self.config.edges, &self.world, &projections, viewport.height)
        };
        let wireframes =
            collect_wireframes(&self.config.wireframe, &self.world, &self.projector, &camera);

        Frame {
            items,
            beams,
            wireframes,
            hud: Hud {
                depth_percent: self.camera.depth_percent(),
                rotation_deg: self.camera.rotation_deg(),
                sequence_active,
                focus: self.expanded().cloned(),
            },
        }
    }
}

/// `(layer, depth_order, world order)`.
fn paint_order(a: &RenderItem, b: &RenderItem) -> Ordering {
    a.layer
        .cmp(&b.layer)
        .then_with(|| a.depth_order.cmp(&b.depth_order))
        .then_with(|| a.key.cmp(&b.key))
}
