//! Report builders behind the `parallax` binary.
//!
//! Each subcommand is a pure function from a world document (plus options)
//! to a serializable report, so the binary only parses arguments and prints.

use std::fmt;
use std::path::PathBuf;

use formats::{WorldDocument, WorldDocumentError, demo_document};
use foundation::ids::PanelId;
use foundation::math::Vec2;
use foundation::time::TimeMs;
use runtime::event_bus::{AudioSink, Event};
use scene::camera::Viewport;
use scene::interaction::InteractionError;
use scene::orbital::layout_orbit;
use scene::sequencer::sweep_order;
use scene::{Frame, Stage, StageConfig};
use serde::Serialize;
use tracing::{debug, info};

/// Environment variable naming the default world document.
pub const WORLD_ENV_VAR: &str = "PARALLAX_WORLD";

#[derive(Debug)]
pub enum ToolError {
    Document(WorldDocumentError),
    Interaction(InteractionError),
    Json(serde_json::Error),
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolError::Document(e) => write!(f, "world document: {e}"),
            ToolError::Interaction(e) => write!(f, "interaction: {e}"),
            ToolError::Json(e) => write!(f, "json: {e}"),
        }
    }
}

impl std::error::Error for ToolError {}

impl From<WorldDocumentError> for ToolError {
    fn from(e: WorldDocumentError) -> Self {
        ToolError::Document(e)
    }
}

impl From<InteractionError> for ToolError {
    fn from(e: InteractionError) -> Self {
        ToolError::Interaction(e)
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(e: serde_json::Error) -> Self {
        ToolError::Json(e)
    }
}

/// Where the world document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldSource {
    Path(PathBuf),
    Demo,
}

impl WorldSource {
    /// An explicit path wins, then the environment value, then the bundled demo.
    pub fn resolve(explicit: Option<PathBuf>, env_value: Option<String>) -> Self {
        match (explicit, env_value) {
            (Some(path), _) => WorldSource::Path(path),
            (None, Some(v)) if !v.trim().is_empty() => WorldSource::Path(PathBuf::from(v)),
            _ => WorldSource::Demo,
        }
    }

    pub fn load(&self) -> Result<WorldDocument, WorldDocumentError> {
        match self {
            WorldSource::Path(path) => {
                debug!(path = %path.display(), "loading world document");
                WorldDocument::load(path)
            }
            WorldSource::Demo => demo_document(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DanglingLink {
    pub from: PanelId,
    pub to: PanelId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    pub name: Option<String>,
    pub panel_count: usize,
    pub connection_count: usize,
    pub dangling: Vec<DanglingLink>,
    /// Order the singularity sweep would visit panels in.
    pub sweep_order: Vec<PanelId>,
    pub content_hash: String,
}

pub fn inspect(doc: &WorldDocument) -> Result<InspectReport, ToolError> {
    let world = doc.to_world()?;
    let mut connection_count = 0;
    let mut dangling = Vec::new();
    for (_, panel) in world.iter() {
        for target in &panel.connected_to {
            if world.key_of(target.as_str()).is_some() {
                connection_count += 1;
            } else {
                dangling.push(DanglingLink {
                    from: panel.id.clone(),
                    to: target.clone(),
                });
            }
        }
    }
    let sweep_order = sweep_order(&world)
        .into_iter()
        .filter_map(|key| world.get(key).map(|p| p.id.clone()))
        .collect();
    Ok(InspectReport {
        name: doc.name.clone(),
        panel_count: world.len(),
        connection_count,
        dangling,
        sweep_order,
        content_hash: doc.content_hash()?,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameRequest {
    pub scroll: f64,
    pub rotation_deg: f64,
    pub viewport: Viewport,
    /// Panel to put into focus mode before rendering.
    pub expand: Option<String>,
}

impl Default for FrameRequest {
    fn default() -> Self {
        Self {
            scroll: 0.0,
            rotation_deg: 0.0,
            viewport: Viewport::default(),
            expand: None,
        }
    }
}

fn build_stage(
    doc: &WorldDocument,
    config: StageConfig,
    viewport: Viewport,
) -> Result<Stage, ToolError> {
    let world = doc.to_world()?;
    Ok(Stage::new(config, world, viewport))
}

pub fn render_frame(
    doc: &WorldDocument,
    config: StageConfig,
    request: &FrameRequest,
) -> Result<Frame, ToolError> {
    let mut stage = build_stage(doc, config, request.viewport)?;
    stage.scroll_to(request.scroll);
    stage.set_rotation(request.rotation_deg);
    if let Some(id) = &request.expand {
        stage.expand(id)?;
    }
    Ok(stage.frame())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceSample {
    pub at_ms: u64,
    pub active: bool,
    pub exploding: Vec<PanelId>,
}

/// Audio sink that logs each cue.
#[derive(Debug, Default)]
pub struct TracingAudio {
    pub cues: usize,
}

impl AudioSink for TracingAudio {
    fn on_hover(&mut self, id: &PanelId) {
        self.cues += 1;
        info!(panel = %id, "audio: hover");
    }

    fn on_expand(&mut self) {
        self.cues += 1;
        info!("audio: expand");
    }

    fn on_close(&mut self) {
        self.cues += 1;
        info!("audio: close");
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceReport {
    pub samples: Vec<SequenceSample>,
    pub audio_cues: usize,
}

/// Triggers the singularity at `start` and samples the stage at every timer
/// deadline until the reset has fired.
pub fn simulate_singularity(
    doc: &WorldDocument,
    config: StageConfig,
    start: TimeMs,
) -> Result<SequenceReport, ToolError> {
    let mut stage = build_stage(doc, config, Viewport::default())?;
    let mut audio = TracingAudio::default();
    stage.tick(start);
    stage.trigger_singularity();

    let mut samples = vec![sample(&stage)];
    while let Some(due) = stage.next_due() {
        stage.tick(due);
        samples.push(sample(&stage));
    }
    let events: Vec<Event> = stage.flush_audio(&mut audio);
    debug!(events = events.len(), "sequence simulated");
    Ok(SequenceReport {
        samples,
        audio_cues: audio.cues,
    })
}

fn sample(stage: &Stage) -> SequenceSample {
    let world = stage.world();
    SequenceSample {
        at_ms: stage.now().as_millis(),
        active: stage.sequence_active(),
        exploding: stage
            .sequencer()
            .exploding()
            .iter()
            .filter_map(|key| world.get(key).map(|p| p.id.clone()))
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuSlot {
    pub label: String,
    pub color: String,
    pub target: String,
    pub angle_deg: f64,
    pub x: f64,
    pub y: f64,
}

pub fn menu_layout(config: &StageConfig, center: Vec2, open: bool) -> Vec<MenuSlot> {
    let entries = &config.menu.entries;
    layout_orbit(entries.len(), open, config.menu.open_radius, center)
        .into_iter()
        .zip(entries)
        .map(|(slot, entry)| MenuSlot {
            label: entry.label.clone(),
            color: entry.color.clone(),
            target: entry.target.clone(),
            angle_deg: slot.angle_deg,
            x: slot.position.x,
            y: slot.position.y,
        })
        .collect()
}

pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, ToolError> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(out)
}
