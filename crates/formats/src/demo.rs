use scene::World;

use crate::world_document::{WorldDocument, WorldDocumentError};

/// The bundled nine-panel demo world.
pub const DEMO_WORLD_JSON: &str = include_str!("../assets/demo.world.json");

pub fn demo_document() -> Result<WorldDocument, WorldDocumentError> {
    WorldDocument::from_json_str(DEMO_WORLD_JSON)
}

pub fn demo_world() -> Result<World, WorldDocumentError> {
    demo_document()?.to_world()
}
