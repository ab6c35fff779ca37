use serde::{Deserialize, Serialize};

/// Visual accent tag. Only the rendering surface interprets it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Cyan,
    Magenta,
    Yellow,
    Rust,
    Olive,
    Slate,
}

impl Theme {
    pub fn hex(self) -> &'static str {
        match self {
            Theme::Cyan => "#00f3ff",
            Theme::Magenta => "#ff00ff",
            Theme::Yellow => "#ffe600",
            Theme::Rust => "#a63737",
            Theme::Olive => "#708238",
            Theme::Slate => "#4a5d6e",
        }
    }
}
