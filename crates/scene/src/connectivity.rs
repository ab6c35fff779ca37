use std::collections::BTreeMap;

use foundation::ids::PanelId;
use foundation::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::camera::CameraState;
use crate::entity::PanelKey;
use crate::projection::{Projection, Projector};
use crate::world::World;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Edges whose endpoints are both this far past the same viewport edge
    /// are skipped.
    pub offscreen_margin: f64,
    pub min_stroke_width: f64,
    /// Stroke width at an average endpoint scale of 1.
    pub stroke_scale: f64,
    pub casing_extra: f64,
    pub cable_ratio: f64,
    pub packet_ratio: f64,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            offscreen_margin: 500.0,
            min_stroke_width: 4.0,
            stroke_scale: 15.0,
            casing_extra: 4.0,
            cable_ratio: 0.2,
            packet_ratio: 0.3,
        }
    }
}

/// One projected connection, with the widths of its drawn parts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Beam {
    pub from: PanelId,
    pub to: PanelId,
    pub start: [f64; 2],
    pub end: [f64; 2],
    pub stroke_width: f64,
    pub casing_width: f64,
    pub cable_width: f64,
    /// Side of the square joint drawn at each endpoint.
    pub joint_size: f64,
    pub packet_radius: f64,
}

impl Beam {
    pub fn length(&self) -> f64 {
        (Vec2::new(self.end[0], self.end[1]) - Vec2::new(self.start[0], self.start[1])).length()
    }
}

/// Coarse cull: both endpoints far above, or both far below, the viewport.
/// Panel size plays no part.
pub fn both_offscreen(cfg: &EdgeConfig, a: &Projection, b: &Projection, viewport_height: f64) -> bool {
    let above = -cfg.offscreen_margin;
    let below = viewport_height + cfg.offscreen_margin;
    (a.screen_y < above && b.screen_y < above) || (a.screen_y > below && b.screen_y > below)
}

pub fn stroke_width(cfg: &EdgeConfig, a: &Projection, b: &Projection) -> f64 {
    let avg = (a.scale + b.scale) / 2.0;
    cfg.min_stroke_width.max(cfg.stroke_scale * avg)
}

/// Builds the beam between two projected endpoints, or `None` when culled.
pub fn beam_between(
    cfg: &EdgeConfig,
    from: (&PanelId, &Projection),
    to: (&PanelId, &Projection),
    viewport_height: f64,
) -> Option<Beam> {
    let (from_id, a) = from;
    let (to_id, b) = to;
    if both_offscreen(cfg, a, b, viewport_height) {
        return None;
    }
    let stroke = stroke_width(cfg, a, b);
    Some(Beam {
        from: from_id.clone(),
        to: to_id.clone(),
        start: [a.screen_x, a.screen_y],
        end: [b.screen_x, b.screen_y],
        stroke_width: stroke,
        casing_width: stroke + cfg.casing_extra,
        cable_width: stroke * cfg.cable_ratio,
        joint_size: stroke,
        packet_radius: stroke * cfg.packet_ratio,
    })
}

/// Projects every live panel once.
pub fn project_all(
    world: &World,
    projector: &Projector,
    camera: &CameraState,
) -> BTreeMap<PanelKey, Projection> {
    world
        .iter()
        .map(|(key, panel)| (key, projector.project(panel.position, camera)))
        .collect()
}

/// Beams for every resolved connection, in world order then connection order.
/// Dangling ids produce nothing.
pub fn collect_beams(
    cfg: &EdgeConfig,
    world: &World,
    projections: &BTreeMap<PanelKey, Projection>,
    viewport_height: f64,
) -> Vec<Beam> {
    let mut beams = Vec::new();
    for (key, panel) in world.iter() {
        let Some(start) = projections.get(&key) else {
            continue;
        };
        for (target_key, target) in world.connections(key) {
            let Some(end) = projections.get(&target_key) else {
                continue;
            };
            if let Some(beam) =
                beam_between(cfg, (&panel.id, start), (&target.id, end), viewport_height)
            {
                beams.push(beam);
            }
        }
    }
    beams
}

#[cfg(test)]
mod tests {
    use super::{EdgeConfig, beam_between, collect_beams, project_all, stroke_width};
    use crate::camera::{CameraState, Viewport};
    use crate::components::PanelSize;
    use crate::entity::Panel;
    use crate::projection::{Projection, Projector};
    use crate::world::World;
    use foundation::ids::PanelId;
    use foundation::math::Vec3;
    use pretty_assertions::assert_eq;

    fn camera() -> CameraState {
        CameraState {
            scroll: 0.0,
            rotation_deg: 0.0,
            viewport: Viewport::new(1000.0, 800.0),
        }
    }

    fn at(y: f64, scale: f64) -> Projection {
        Projection {
            screen_x: 0.0,
            screen_y: y,
            scale,
            depth_order: (scale * 1000.0) as i64,
        }
    }

    fn panel(id: &str, y: f64) -> Panel {
        Panel::new(id, Vec3::new(0.0, y, 0.0), PanelSize::new(200.0, 200.0))
    }

    #[test]
    fn dangling_connection_draws_nothing() {
        let mut world = World::new();
        world.insert(panel("a", 100.0).connect("ghost")).unwrap();
        let projections = project_all(&world, &Projector::default(), &camera());
        let beams = collect_beams(&EdgeConfig::default(), &world, &projections, 800.0);
        assert!(beams.is_empty());
    }

    #[test]
    fn connected_pair_draws_one_beam() {
        let mut world = World::new();
        world
            .insert(panel("a", 100.0).connect("b").connect("ghost"))
            .unwrap();
        world.insert(panel("b", 500.0)).unwrap();
        let projections = project_all(&world, &Projector::default(), &camera());
        let beams = collect_beams(&EdgeConfig::default(), &world, &projections, 800.0);
        assert_eq!(beams.len(), 1);
        let beam = &beams[0];
        assert_eq!((beam.from.as_str(), beam.to.as_str()), ("a", "b"));
        assert_eq!(beam.start, [500.0, 500.0]);
        assert_eq!(beam.end, [500.0, 900.0]);
        assert_eq!(beam.stroke_width, 15.0);
        assert_eq!(beam.casing_width, 19.0);
        assert_eq!(beam.joint_size, 15.0);
        assert_eq!(beam.length(), 400.0);
    }

    #[test]
    fn skipped_only_when_both_ends_are_past_the_same_edge() {
        let cfg = EdgeConfig::default();
        let a = PanelId::from("a");
        let b = PanelId::from("b");
        let far_up = at(-600.0, 1.0);
        let far_down = at(1400.0, 1.0);
        assert!(beam_between(&cfg, (&a, &far_up), (&b, &at(-501.0, 1.0)), 800.0).is_none());
        assert!(beam_between(&cfg, (&a, &far_down), (&b, &at(1301.0, 1.0)), 800.0).is_none());
        assert!(beam_between(&cfg, (&a, &far_up), (&b, &far_down), 800.0).is_some());
        assert!(beam_between(&cfg, (&a, &far_up), (&b, &at(-500.0, 1.0)), 800.0).is_some());
    }

    #[test]
    fn stroke_is_floored() {
        let cfg = EdgeConfig::default();
        assert_eq!(stroke_width(&cfg, &at(0.0, 0.1), &at(0.0, 0.1)), 4.0);
        assert_eq!(stroke_width(&cfg, &at(0.0, 1.0), &at(0.0, 3.0)), 30.0);
    }
}
