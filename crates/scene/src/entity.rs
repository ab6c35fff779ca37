use foundation::ids::PanelId;
use foundation::math::Vec3;

use crate::components::{PanelContent, PanelSize, Theme};

/// Dense slot handle assigned by [`crate::World`] on insert.
///
/// Slots are never reused, so ordering by key is world insertion order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PanelKey(pub u32);

impl PanelKey {
    pub fn index(&self) -> u32 {
        self.0
    }
}

/// A rectangular content panel placed in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub id: PanelId,
    pub title: String,
    pub position: Vec3,
    pub size: PanelSize,
    /// Ordered outgoing connections. Ids may reference panels that do not exist.
    pub connected_to: Vec<PanelId>,
    pub theme: Theme,
    pub content: PanelContent,
}

impl Panel {
    pub fn new(id: impl Into<PanelId>, position: Vec3, size: PanelSize) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            position,
            size,
            connected_to: Vec::new(),
            theme: Theme::default(),
            content: PanelContent::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_content(mut self, content: PanelContent) -> Self {
        self.content = content;
        self
    }

    pub fn connect(mut self, target: impl Into<PanelId>) -> Self {
        self.connected_to.push(target.into());
        self
    }
}
