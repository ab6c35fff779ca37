use serde::{Deserialize, Serialize};

use crate::entity::PanelKey;
use crate::projection::Projection;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullConfig {
    /// Band around the viewport, in multiples of the panel's height.
    pub margin_factor: f64,
}

impl Default for CullConfig {
    fn default() -> Self {
        Self { margin_factor: 2.0 }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Visibility {
    Visible,
    /// Too far above or below the viewport to be worth rendering.
    Culled,
    /// Hidden because another panel is in focus mode.
    Suppressed,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        self == Visibility::Visible
    }
}

/// Global state the culler needs besides the projection itself.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct CullContext {
    pub viewport_height: f64,
    pub expanded: Option<PanelKey>,
    pub sequence_active: bool,
}

/// Strict comparison: a panel exactly on the band edge stays.
pub fn is_outside_band(cfg: &CullConfig, screen_y: f64, height: f64, viewport_height: f64) -> bool {
    let margin = cfg.margin_factor * height;
    screen_y < -margin || screen_y > viewport_height + margin
}

/// Decides whether `key` is rendered.
///
/// Focus mode wins over everything: while a panel is expanded, every other
/// panel is suppressed and the expanded one is always visible. Otherwise an
/// active sequence disables culling.
pub fn classify(
    cfg: &CullConfig,
    ctx: &CullContext,
    key: PanelKey,
    projection: &Projection,
    height: f64,
) -> Visibility {
    match ctx.expanded {
        Some(focused) if focused == key => return Visibility::Visible,
        Some(_) => return Visibility::Suppressed,
        None => {}
    }
    if ctx.sequence_active {
        return Visibility::Visible;
    }
    if is_outside_band(cfg, projection.screen_y, height, ctx.viewport_height) {
        Visibility::Culled
    } else {
        Visibility::Visible
    }
}

/// Keys of the panels that survive culling, in input order.
pub fn cull_panels<'a>(
    cfg: &CullConfig,
    ctx: &CullContext,
    panels: impl IntoIterator<Item = (PanelKey, &'a Projection, f64)>,
) -> Vec<PanelKey> {
    panels
        .into_iter()
        .filter(|(key, projection, height)| {
            classify(cfg, ctx, *key, projection, *height).is_visible()
        })
        .map(|(key, _, _)| key)
        .collect()
}
