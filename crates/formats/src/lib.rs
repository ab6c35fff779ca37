pub mod config_file;
pub mod demo;
pub mod world_document;

pub use config_file::*;
pub use demo::*;
pub use world_document::*;
