use foundation::ids::PanelId;
use serde::{Deserialize, Serialize};

use crate::camera::CameraState;
use crate::projection::{BOX_EDGES, BoxExtents, Projection, Projector};
use crate::world::World;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireframeConfig {
    /// Added to both panel dimensions for the depth tunnel.
    pub tunnel_padding: f64,
    pub tunnel_depth: f64,
    pub tunnel_stroke: f64,
    pub tunnel_opacity: f64,
    pub shaft_height: f64,
    pub shaft_depth: f64,
    pub shaft_stroke: f64,
    pub shaft_opacity: f64,
    /// A box is dropped when every corner is this far past the same edge.
    pub offscreen_margin: f64,
}

impl Default for WireframeConfig {
    fn default() -> Self {
        Self {
            tunnel_padding: 40.0,
            tunnel_depth: 4000.0,
            tunnel_stroke: 1.0,
            tunnel_opacity: 0.15,
            shaft_height: 6000.0,
            shaft_depth: 20.0,
            shaft_stroke: 0.5,
            shaft_opacity: 0.1,
            offscreen_margin: 1000.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WireframeKind {
    /// Runs along z through the panel.
    Tunnel,
    /// Runs along y through the panel.
    Shaft,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wireframe {
    pub panel: PanelId,
    pub kind: WireframeKind,
    /// Front face then back face, each TL, TR, BR, BL.
    pub corners: [[f64; 2]; 8],
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Wireframe {
    /// The 12 edges as screen-space segments.
    pub fn segments(&self) -> impl Iterator<Item = ([f64; 2], [f64; 2])> + '_ {
        BOX_EDGES
            .iter()
            .map(|&(a, b)| (self.corners[a], self.corners[b]))
    }
}

fn all_offscreen(corners: &[Projection; 8], margin: f64, viewport_height: f64) -> bool {
    corners.iter().all(|p| p.screen_y < -margin)
        || corners.iter().all(|p| p.screen_y > viewport_height + margin)
}

/// Tunnel and shaft boxes for every panel, in world order.
pub fn collect_wireframes(
    cfg: &WireframeConfig,
    world: &World,
    projector: &Projector,
    camera: &CameraState,
) -> Vec<Wireframe> {
    let mut out = Vec::new();
    for (_, panel) in world.iter() {
        let boxes = [
            (
                WireframeKind::Tunnel,
                BoxExtents::new(
                    panel.size.width + cfg.tunnel_padding,
                    panel.size.height + cfg.tunnel_padding,
                    cfg.tunnel_depth,
                ),
                cfg.tunnel_stroke,
                cfg.tunnel_opacity,
            ),
            (
                WireframeKind::Shaft,
                BoxExtents::new(panel.size.width, cfg.shaft_height, cfg.shaft_depth),
                cfg.shaft_stroke,
                cfg.shaft_opacity,
            ),
        ];
        for (kind, extents, stroke_width, opacity) in boxes {
            let corners = projector.project_box(panel.position, extents, camera);
            if all_offscreen(&corners, cfg.offscreen_margin, camera.viewport.height) {
                continue;
            }
            out.push(Wireframe {
                panel: panel.id.clone(),
                kind,
                corners: corners.map(|p| [p.screen_x, p.screen_y]),
                stroke_width,
                opacity,
            });
        }
    }
    out
}
