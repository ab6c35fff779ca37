pub mod camera;
pub mod components;
pub mod config;
pub mod connectivity;
pub mod entity;
pub mod interaction;
pub mod navigation;
pub mod orbital;
pub mod projection;
pub mod selection;
pub mod sequencer;
pub mod stage;
pub mod visibility;
pub mod wireframe;
pub mod world;

pub use config::StageConfig;
pub use entity::*;
pub use stage::*;
pub use world::*;
