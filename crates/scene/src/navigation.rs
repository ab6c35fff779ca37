use foundation::ids::PanelId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub top_token: String,
    /// Navigating to this token starts the singularity sequence.
    pub singularity_token: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            top_token: "top".to_string(),
            singularity_token: "EXPLODE_CMD".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum NavTarget {
    Top,
    Panel(PanelId),
    Singularity,
}

impl NavTarget {
    /// Reserved tokens win over panel ids of the same spelling.
    pub fn parse(cfg: &NavigationConfig, raw: &str) -> Self {
        if raw == cfg.top_token {
            NavTarget::Top
        } else if raw == cfg.singularity_token {
            NavTarget::Singularity
        } else {
            NavTarget::Panel(PanelId::from(raw))
        }
    }
}
