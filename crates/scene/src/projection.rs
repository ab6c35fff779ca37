//! Perspective projection of world points onto the viewport.
//!
//! The camera sits at `z = perspective` looking down `-z`; scrolling dollies
//! it along `y`. Points behind the nominal plane (negative `z`) get extra
//! scroll-coupled depth so far layers drift at a different rate than near ones.
//!
//! Both [`project`] and [`project_box`] are total over finite input: depth is
//! clamped short of the camera plane before dividing, so `scale` is always
//! finite and non-negative.

use foundation::math::{Vec2, Vec3, clamp_f64};
use serde::{Deserialize, Serialize};

use crate::camera::CameraState;

/// Smallest usable camera-plane gap; guards configs with `near_epsilon <= 0`.
const MIN_NEAR_GAP: f64 = 1e-6;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Distance from the `z = 0` plane to the camera.
    pub perspective: f64,
    /// Depth is clamped to `perspective - near_epsilon`.
    pub near_epsilon: f64,
    pub scroll_depth_factor: f64,
    /// Depth behind the plane at which scroll parallax reaches full strength.
    pub depth_attenuation: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            perspective: 800.0,
            near_epsilon: 10.0,
            scroll_depth_factor: 0.12,
            depth_attenuation: 1000.0,
        }
    }
}

/// Screen placement of one world point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    pub screen_x: f64,
    pub screen_y: f64,
    pub scale: f64,
    /// `floor(scale * 1000)`. Larger paints on top.
    pub depth_order: i64,
}

impl Projection {
    pub fn screen(&self) -> Vec2 {
        Vec2::new(self.screen_x, self.screen_y)
    }
}

/// Share of scroll parallax a point at depth `z` receives, in `[0, 1]`.
pub fn depth_influence(z: f64, attenuation: f64) -> f64 {
    if attenuation <= 0.0 {
        return 0.0;
    }
    clamp_f64(-z / attenuation, 0.0, 1.0)
}

pub fn project(
    cfg: &ProjectionConfig,
    point: Vec3,
    scroll: f64,
    viewport_width: f64,
    viewport_height: f64,
    rotation_deg: f64,
) -> Projection {
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    let rotated_x = point.x * cos + point.z * sin;
    let rotated_z0 = point.z * cos - point.x * sin;

    let scroll_depth =
        scroll * cfg.scroll_depth_factor * depth_influence(point.z, cfg.depth_attenuation);
    let rotated_z = rotated_z0 + scroll_depth;

    let relative_y = point.y - scroll;

    let gap = cfg.near_epsilon.max(MIN_NEAR_GAP);
    let clamped_z = rotated_z.min(cfg.perspective - gap);
    let scale = (cfg.perspective / (cfg.perspective - clamped_z)).max(0.0);

    Projection {
        screen_x: viewport_width / 2.0 + rotated_x * scale,
        screen_y: viewport_height / 2.0 + relative_y * scale,
        scale,
        depth_order: (scale * 1000.0).floor() as i64,
    }
}

/// Box dimensions along x, y and z.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxExtents {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl BoxExtents {
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }
}

/// Corner index pairs forming the 12 box edges: front loop, back loop, then
/// the four front-to-back connectors.
pub const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Projects the 8 corners of an axis-aligned box.
///
/// Front face (`z - depth/2`) first, then the back face; each face is
/// top-left, top-right, bottom-right, bottom-left.
pub fn project_box(
    cfg: &ProjectionConfig,
    center: Vec3,
    extents: BoxExtents,
    camera: &CameraState,
) -> [Projection; 8] {
    let hw = extents.width / 2.0;
    let hh = extents.height / 2.0;
    let hd = extents.depth / 2.0;
    let face = [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)];

    std::array::from_fn(|i| {
        let (dx, dy) = face[i % 4];
        let dz = if i < 4 { -hd } else { hd };
        let corner = Vec3::new(center.x + dx, center.y + dy, center.z + dz);
        project(
            cfg,
            corner,
            camera.scroll,
            camera.viewport.width,
            camera.viewport.height,
            camera.rotation_deg,
        )
    })
}

/// Projection bound to one configuration.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Projector {
    config: ProjectionConfig,
}

impl Projector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn project(&self, point: Vec3, camera: &CameraState) -> Projection {
        project(
            &self.config,
            point,
            camera.scroll,
            camera.viewport.width,
            camera.viewport.height,
            camera.rotation_deg,
        )
    }

    pub fn project_box(
        &self,
        center: Vec3,
        extents: BoxExtents,
        camera: &CameraState,
    ) -> [Projection; 8] {
        project_box(&self.config, center, extents, camera)
    }
}
