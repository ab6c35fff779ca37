use serde::{Deserialize, Serialize};

/// Panel extent in world units at scale 1.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSize {
    pub width: f64,
    pub height: f64,
}

impl PanelSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both axes finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Raises each axis to at least the given floor.
    ///
    /// Non-finite axes collapse to the floor.
    pub fn floored(self, min_width: f64, min_height: f64) -> Self {
        let floor = |v: f64, min: f64| if v.is_finite() { v.max(min) } else { min };
        Self {
            width: floor(self.width, min_width),
            height: floor(self.height, min_height),
        }
    }
}
