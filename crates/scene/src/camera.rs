use foundation::math::{Vec2, clamp_f64};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Rotation is clamped to `[-max_rotation_deg, max_rotation_deg]`.
    pub max_rotation_deg: f64,
    /// Horizontal drag distance that sweeps a full `max_rotation_deg`.
    pub drag_rotation_span_px: f64,
    pub min_document_height: f64,
    /// Document height is at least this many viewport heights.
    pub document_viewport_multiple: f64,
    /// Navigating to a panel leaves it this far down the viewport.
    pub focus_fraction: f64,
    /// Step scrolling moves by this fraction of the viewport height.
    pub step_fraction: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            max_rotation_deg: 10.0,
            drag_rotation_span_px: 300.0,
            min_document_height: 5000.0,
            document_viewport_multiple: 5.0,
            focus_fraction: 1.0 / 3.0,
            step_fraction: 1.0 / 1.5,
        }
    }
}

/// Camera parameters consumed by the projector. A plain value.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraState {
    pub scroll: f64,
    pub rotation_deg: f64,
    pub viewport: Viewport,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct DragAnchor {
    pointer: Vec2,
    scroll: f64,
    rotation_deg: f64,
}

/// Scroll, rotation and viewport with their clamping rules.
///
/// Whether input is accepted at all (focus mode, sequence, modal) is decided
/// by the owner; the camera only keeps its values in range.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    config: CameraConfig,
    state: CameraState,
    drag: Option<DragAnchor>,
}

impl Camera {
    pub fn new(config: CameraConfig, viewport: Viewport) -> Self {
        Self {
            config,
            state: CameraState {
                scroll: 0.0,
                rotation_deg: 0.0,
                viewport,
            },
            drag: None,
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn scroll(&self) -> f64 {
        self.state.scroll
    }

    pub fn rotation_deg(&self) -> f64 {
        self.state.rotation_deg
    }

    pub fn viewport(&self) -> Viewport {
        self.state.viewport
    }

    pub fn document_height(&self) -> f64 {
        self.config
            .min_document_height
            .max(self.state.viewport.height * self.config.document_viewport_multiple)
    }

    pub fn max_scroll(&self) -> f64 {
        (self.document_height() - self.state.viewport.height).max(0.0)
    }

    /// Scroll depth as a percentage of the scrollable range, in `[0, 100]`.
    pub fn depth_percent(&self) -> f64 {
        let max = self.max_scroll();
        if max <= 0.0 {
            return 0.0;
        }
        clamp_f64(self.state.scroll / max * 100.0, 0.0, 100.0)
    }

    pub fn clamp_scroll(&self, scroll: f64) -> f64 {
        clamp_f64(scroll, 0.0, self.max_scroll())
    }

    /// Returns the scroll actually applied.
    pub fn set_scroll(&mut self, scroll: f64) -> f64 {
        self.state.scroll = self.clamp_scroll(scroll);
        self.state.scroll
    }

    pub fn set_rotation(&mut self, rotation_deg: f64) -> f64 {
        let max = self.config.max_rotation_deg.abs();
        self.state.rotation_deg = clamp_f64(rotation_deg, -max, max);
        self.state.rotation_deg
    }

    /// Applies a new viewport; scroll is re-clamped to the new range.
    pub fn resize(&mut self, viewport: Viewport) {
        self.state.viewport = viewport;
        self.state.scroll = self.clamp_scroll(self.state.scroll);
    }

    /// Scroll target one step up (`direction < 0`) or down.
    pub fn step_target(&self, direction: i32) -> f64 {
        let step = self.state.viewport.height * self.config.step_fraction;
        self.clamp_scroll(self.state.scroll + f64::from(direction.signum()) * step)
    }

    /// Scroll that places world `y` at the focus fraction of the viewport.
    pub fn focus_scroll_for(&self, y: f64) -> f64 {
        self.clamp_scroll(y - self.state.viewport.height * self.config.focus_fraction)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn begin_drag(&mut self, pointer: Vec2) {
        self.drag = Some(DragAnchor {
            pointer,
            scroll: self.state.scroll,
            rotation_deg: self.state.rotation_deg,
        });
    }

    /// Vertical drag dollies the camera, horizontal drag rotates it.
    ///
    /// Returns `false` when no drag is in progress.
    pub fn drag_to(&mut self, pointer: Vec2) -> bool {
        let Some(anchor) = self.drag else {
            return false;
        };
        let delta = pointer - anchor.pointer;
        self.set_scroll(anchor.scroll - delta.y);
        let per_px = if self.config.drag_rotation_span_px > 0.0 {
            self.config.max_rotation_deg / self.config.drag_rotation_span_px
        } else {
            0.0
        };
        self.set_rotation(anchor.rotation_deg + delta.x * per_px);
        true
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{Camera, CameraConfig, Viewport};
    use foundation::math::Vec2;

    fn camera() -> Camera {
        Camera::new(CameraConfig::default(), Viewport::new(1000.0, 800.0))
    }

    #[test]
    fn scroll_range_uses_document_floor() {
        let cam = camera();
        assert_eq!(cam.document_height(), 5000.0);
        assert_eq!(cam.max_scroll(), 4200.0);

        let tall = Camera::new(CameraConfig::default(), Viewport::new(1000.0, 1200.0));
        assert_eq!(tall.document_height(), 6000.0);
        assert_eq!(tall.max_scroll(), 4800.0);
    }

    #[test]
    fn set_scroll_clamps() {
        let mut cam = camera();
        assert_eq!(cam.set_scroll(-50.0), 0.0);
        assert_eq!(cam.set_scroll(99_999.0), 4200.0);
        assert_eq!(cam.set_scroll(f64::NAN), 0.0);
    }

    #[test]
    fn depth_percent_tracks_scroll() {
        let mut cam = camera();
        cam.set_scroll(2100.0);
        assert_eq!(cam.depth_percent(), 50.0);
        cam.set_scroll(4200.0);
        assert_eq!(cam.depth_percent(), 100.0);
    }

    #[test]
    fn drag_dollies_and_rotates() {
        let mut cam = camera();
        cam.set_scroll(1000.0);
        cam.begin_drag(Vec2::new(500.0, 400.0));
        assert!(cam.drag_to(Vec2::new(650.0, 300.0)));
        assert_eq!(cam.scroll(), 1100.0);
        assert!((cam.rotation_deg() - 5.0).abs() < 1e-9);

        assert!(cam.drag_to(Vec2::new(5000.0, 300.0)));
        assert_eq!(cam.rotation_deg(), 10.0);

        cam.end_drag();
        assert!(!cam.drag_to(Vec2::new(0.0, 0.0)));
        assert_eq!(cam.rotation_deg(), 10.0);
    }

    #[test]
    fn resize_reclamps_scroll() {
        let mut cam = camera();
        cam.set_scroll(4200.0);
        cam.resize(Viewport::new(1000.0, 2000.0));
        // document 10000, max scroll 8000: unchanged.
        assert_eq!(cam.scroll(), 4200.0);
        cam.resize(Viewport::new(1000.0, 900.0));
        assert_eq!(cam.scroll(), 4100.0);
    }

    #[test]
    fn step_and_focus_targets() {
        let mut cam = camera();
        cam.set_scroll(1000.0);
        let step = 800.0 * (1.0 / 1.5);
        assert_eq!(cam.step_target(1), 1000.0 + step);
        assert_eq!(cam.step_target(-1), 1000.0 - step);
        assert_eq!(cam.focus_scroll_for(1100.0), 1100.0 - 800.0 * (1.0 / 3.0));
        assert_eq!(cam.focus_scroll_for(50.0), 0.0);
    }
}
