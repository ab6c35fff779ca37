use serde::{Deserialize, Serialize};

use crate::camera::CameraConfig;
use crate::connectivity::EdgeConfig;
use crate::interaction::InteractionConfig;
use crate::navigation::NavigationConfig;
use crate::orbital::MenuConfig;
use crate::projection::ProjectionConfig;
use crate::sequencer::SequenceConfig;
use crate::visibility::CullConfig;
use crate::wireframe::WireframeConfig;

/// Every tunable of a [`crate::Stage`]. Missing sections take their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub projection: ProjectionConfig,
    pub camera: CameraConfig,
    pub cull: CullConfig,
    pub edges: EdgeConfig,
    pub wireframe: WireframeConfig,
    pub sequence: SequenceConfig,
    pub menu: MenuConfig,
    pub interaction: InteractionConfig,
    pub navigation: NavigationConfig,
}

#[cfg(test)]
mod tests {
    use super::StageConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_documents_fill_defaults() {
        let cfg: StageConfig =
            serde_json::from_str(r#"{"sequence":{"interval_ms":50},"cull":{"margin_factor":3}}"#)
                .unwrap();
        assert_eq!(cfg.sequence.interval_ms, 50);
        assert_eq!(cfg.sequence.hold_ms, 4500);
        assert_eq!(cfg.cull.margin_factor, 3.0);
        assert_eq!(cfg.projection, StageConfig::default().projection);
        assert_eq!(cfg.menu.entries.len(), 6);
    }

    #[test]
    fn empty_object_is_default() {
        let cfg: StageConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, StageConfig::default());
    }
}
