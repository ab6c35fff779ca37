use foundation::ids::PanelId;
use foundation::time::TimeMs;

/// Fire-and-forget notifications for external collaborators.
///
/// The engine never waits on, or reads anything back from, whoever consumes
/// these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Pointer entered a panel.
    Hover(PanelId),
    /// A panel entered focus mode (or a sequence started).
    Expand,
    /// Focus mode ended.
    Close,
    /// Pointer-up on a panel while administration mode is on.
    EditRequested(PanelId),
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Hover(_) => "hover",
            Notification::Expand => "expand",
            Notification::Close => "close",
            Notification::EditRequested(_) => "edit_requested",
        }
    }

    /// Forwards audio cues to `sink`. Non-audio notifications are ignored.
    pub fn deliver_audio(&self, sink: &mut dyn AudioSink) {
        match self {
            Notification::Hover(id) => sink.on_hover(id),
            Notification::Expand => sink.on_expand(),
            Notification::Close => sink.on_close(),
            Notification::EditRequested(_) => {}
        }
    }
}

/// Audio collaborator seam.
///
/// Implementations may be muted or absent; nothing in the engine depends on
/// what they do.
pub trait AudioSink {
    fn on_hover(&mut self, id: &PanelId);
    fn on_expand(&mut self);
    fn on_close(&mut self);
}

/// Sink that drops every cue.
#[derive(Debug, Default, Copy, Clone)]
pub struct MutedAudio;

impl AudioSink for MutedAudio {
    fn on_hover(&mut self, _id: &PanelId) {}
    fn on_expand(&mut self) {}
    fn on_close(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub at: TimeMs,
    pub notification: Notification,
}

/// Notifications retained between drains by [`EventBus::new`].
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Ordered log of notifications, drained by the host each frame.
///
/// The log is bounded: once `capacity` events are pending, each new event
/// evicts the oldest one and bumps [`EventBus::dropped`].
#[derive(Debug)]
pub struct EventBus {
    events: Vec<Event>,
    capacity: usize,
    dropped: u64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::new(),
            capacity,
            dropped: 0,
        }
    }

    pub fn emit(&mut self, at: TimeMs, notification: Notification) {
        if self.capacity == 0 {
            self.dropped += 1;
            return;
        }
        if self.events.len() >= self.capacity {
            let excess = self.events.len() + 1 - self.capacity;
            self.events.drain(..excess);
            self.dropped += excess as u64;
        }
        self.events.push(Event { at, notification });
    }

    /// Events evicted before the host drained them.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Drains the log, forwarding audio cues to `sink` in emission order.
    pub fn flush_audio(&mut self, sink: &mut dyn AudioSink) -> Vec<Event> {
        let drained = self.drain();
        for event in &drained {
            event.notification.deliver_audio(sink);
        }
        drained
    }
}
