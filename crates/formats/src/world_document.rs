use std::fmt;
use std::fs;
use std::path::Path;

use foundation::ids::PanelId;
use foundation::math::Vec3;
use scene::components::{PanelContent, PanelSize, Theme};
use scene::{Panel, StageConfig, World, WorldError};
use serde::{Deserialize, Serialize};

pub const WORLD_DOCUMENT_VERSION: &str = "1.0";

/// On-disk description of a world: its panels in insertion order plus an
/// optional stage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldDocument {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<StageConfig>,
    #[serde(default)]
    pub panels: Vec<PanelDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PanelDoc {
    pub id: PanelId,
    #[serde(default)]
    pub title: String,
    pub position: Vec3,
    pub size: PanelSize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connected_to: Vec<PanelId>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(flatten)]
    pub content: PanelContent,
}

impl From<&Panel> for PanelDoc {
    fn from(panel: &Panel) -> Self {
        Self {
            id: panel.id.clone(),
            title: panel.title.clone(),
            position: panel.position,
            size: panel.size,
            connected_to: panel.connected_to.clone(),
            theme: panel.theme,
            content: panel.content.clone(),
        }
    }
}

impl PanelDoc {
    fn validate(&self) -> Result<(), WorldDocumentError> {
        if !self.position.is_finite() {
            return Err(WorldDocumentError::InvalidPanel {
                id: self.id.clone(),
                reason: "position must be finite".to_string(),
            });
        }
        if !self.size.is_valid() {
            return Err(WorldDocumentError::InvalidPanel {
                id: self.id.clone(),
                reason: format!(
                    "size {}x{} must be finite and positive",
                    self.size.width, self.size.height
                ),
            });
        }
        Ok(())
    }

    pub fn to_panel(&self) -> Result<Panel, WorldDocumentError> {
        self.validate()?;
        Ok(Panel {
            id: self.id.clone(),
            title: self.title.clone(),
            position: self.position,
            size: self.size,
            connected_to: self.connected_to.clone(),
            theme: self.theme,
            content: self.content.clone(),
        })
    }
}

#[derive(Debug)]
pub enum WorldDocumentError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    UnsupportedVersion { found: String },
    InvalidPanel { id: PanelId, reason: String },
    World(WorldError),
}

impl fmt::Display for WorldDocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldDocumentError::Io(err) => write!(f, "I/O error: {err}"),
            WorldDocumentError::Parse(err) => write!(f, "World document parse error: {err}"),
            WorldDocumentError::UnsupportedVersion { found } => {
                write!(f, "Unsupported world document version: {found}")
            }
            WorldDocumentError::InvalidPanel { id, reason } => {
                write!(f, "Invalid panel {id}: {reason}")
            }
            WorldDocumentError::World(err) => write!(f, "World error: {err}"),
        }
    }
}

impl std::error::Error for WorldDocumentError {}

impl WorldDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: WORLD_DOCUMENT_VERSION.to_string(),
            name: Some(name.into()),
            config: None,
            panels: Vec::new(),
        }
    }

    pub fn from_world(world: &World) -> Self {
        Self {
            version: WORLD_DOCUMENT_VERSION.to_string(),
            name: None,
            config: None,
            panels: world.iter().map(|(_, p)| PanelDoc::from(p)).collect(),
        }
    }

    pub fn from_json_str(payload: &str) -> Result<Self, WorldDocumentError> {
        let doc: WorldDocument = serde_json::from_str(payload).map_err(WorldDocumentError::Parse)?;
        if doc.version != WORLD_DOCUMENT_VERSION {
            return Err(WorldDocumentError::UnsupportedVersion { found: doc.version });
        }
        Ok(doc)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorldDocumentError> {
        let payload = fs::read_to_string(path).map_err(WorldDocumentError::Io)?;
        Self::from_json_str(&payload)
    }

    pub fn to_json_string(&self) -> Result<String, WorldDocumentError> {
        serde_json::to_string_pretty(self).map_err(WorldDocumentError::Parse)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), WorldDocumentError> {
        let payload = self.to_json_string()?;
        fs::write(path, payload).map_err(WorldDocumentError::Io)
    }

    /// Builds the world, validating every panel before insertion.
    pub fn to_world(&self) -> Result<World, WorldDocumentError> {
        let panels = self
            .panels
            .iter()
            .map(PanelDoc::to_panel)
            .collect::<Result<Vec<_>, _>>()?;
        World::from_panels(panels).map_err(WorldDocumentError::World)
    }

    /// The embedded config, or defaults.
    pub fn stage_config(&self) -> StageConfig {
        self.config.clone().unwrap_or_default()
    }

    /// blake3 of the canonical panel encoding. Independent of name and config.
    pub fn content_hash(&self) -> Result<String, WorldDocumentError> {
        let bytes = serde_json::to_vec(&self.panels).map_err(WorldDocumentError::Parse)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{PanelDoc, WORLD_DOCUMENT_VERSION, WorldDocument, WorldDocumentError};
    use foundation::ids::PanelId;
    use foundation::math::Vec3;
    use pretty_assertions::assert_eq;
    use scene::components::{PanelContent, PanelSize, Theme};
    use scene::WorldError;
    use std::fs;
    use std::path::PathBuf;

    fn temp_dir(label: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        let id = format!("parallax_world_document_{label}_{}", std::process::id());
        dir.push(id);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn panel(id: &str, y: f64) -> PanelDoc {
        PanelDoc {
            id: PanelId::from(id),
            title: id.to_uppercase(),
            position: Vec3::new(0.0, y, 0.0),
            size: PanelSize::new(200.0, 100.0),
            connected_to: Vec::new(),
            theme: Theme::default(),
            content: PanelContent::Hero,
        }
    }

    #[test]
    fn parses_minimal_panel_with_defaults() {
        let doc = WorldDocument::from_json_str(
            r#"{
                "version": "1.0",
                "panels": [
                    {"id": "a", "position": {"x": 1, "y": 2, "z": -3},
                     "size": {"width": 10, "height": 20}, "type": "TEXT_BOX",
                     "body": "hello"}
                ]
            }"#,
        )
        .expect("parse");
        let p = &doc.panels[0];
        assert_eq!(p.title, "");
        assert_eq!(p.theme, Theme::Cyan);
        assert!(p.connected_to.is_empty());
        assert_eq!(
            p.content,
            PanelContent::TextBox {
                body: "hello".into()
            }
        );
        assert!(doc.config.is_none());
    }

    #[test]
    fn rejects_unsupported_version() {
        let err = WorldDocument::from_json_str(r#"{"version":"2.0","panels":[]}"#)
            .expect_err("expect version error");
        match err {
            WorldDocumentError::UnsupportedVersion { found } => {
                assert_eq!(found, "2.0");
                assert_ne!(found, WORLD_DOCUMENT_VERSION);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_size_is_reported_per_panel() {
        let mut doc = WorldDocument::new("bad");
        let mut p = panel("flat", 0.0);
        p.size = PanelSize::new(0.0, 100.0);
        doc.panels.push(p);
        match doc.to_world() {
            Err(WorldDocumentError::InvalidPanel { id, .. }) => assert_eq!(id.as_str(), "flat"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn duplicate_ids_surface_the_world_error() {
        let mut doc = WorldDocument::new("dup");
        doc.panels.push(panel("a", 0.0));
        doc.panels.push(panel("a", 10.0));
        match doc.to_world() {
            Err(WorldDocumentError::World(WorldError::DuplicateId(id))) => {
                assert_eq!(id.as_str(), "a")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn save_then_load_keeps_panels_and_config() {
        let root = temp_dir("save");
        let mut doc = WorldDocument::new("saved");
        let mut a = panel("a", 100.0);
        a.connected_to.push(PanelId::from("b"));
        doc.panels.push(a);
        doc.panels.push(panel("b", 200.0));
        let mut cfg = scene::StageConfig::default();
        cfg.sequence.interval_ms = 75;
        doc.config = Some(cfg);

        let path = root.join("world.json");
        doc.save(&path).expect("save");
        let loaded = WorldDocument::load(&path).expect("load");
        assert_eq!(loaded, doc);
        assert_eq!(loaded.stage_config().sequence.interval_ms, 75);

        let world = loaded.to_world().expect("world");
        let ids: Vec<&str> = world.iter().map(|(_, p)| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn content_hash_ignores_name() {
        let mut a = WorldDocument::new("one");
        a.panels.push(panel("a", 0.0));
        let mut b = a.clone();
        b.name = Some("two".into());
        assert_eq!(a.content_hash().unwrap(), b.content_hash().unwrap());

        b.panels[0].position.y = 1.0;
        assert_ne!(a.content_hash().unwrap(), b.content_hash().unwrap());
    }

    #[test]
    fn missing_file_is_io_error() {
        let root = temp_dir("missing");
        let err = WorldDocument::load(root.join("nope.json")).expect_err("missing");
        assert!(matches!(err, WorldDocumentError::Io(_)));
    }
}
