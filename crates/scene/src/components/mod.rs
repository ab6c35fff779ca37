pub mod content;
pub mod size;
pub mod theme;

pub use content::*;
pub use size::*;
pub use theme::*;
