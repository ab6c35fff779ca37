use std::collections::BTreeMap;
use std::fmt;

use foundation::ids::PanelId;
use foundation::math::Vec3;

use crate::components::PanelSize;
use crate::entity::{Panel, PanelKey};

#[derive(Debug, Clone, PartialEq)]
pub enum WorldError {
    DuplicateId(PanelId),
    UnknownPanel(PanelId),
    InvalidSize { width: f64, height: f64 },
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::DuplicateId(id) => write!(f, "panel id already in use: {id}"),
            WorldError::UnknownPanel(id) => write!(f, "no panel with id {id}"),
            WorldError::InvalidSize { width, height } => {
                write!(f, "invalid panel size {width}x{height}")
            }
        }
    }
}

impl std::error::Error for WorldError {}

/// Owner of the panel collection.
///
/// Iteration is insertion order. Removal leaves a dead slot so keys held by
/// interaction state never alias a different panel.
#[derive(Debug, Default)]
pub struct World {
    slots: Vec<Option<Panel>>,
    index: BTreeMap<PanelId, PanelKey>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_panels(panels: impl IntoIterator<Item = Panel>) -> Result<Self, WorldError> {
        let mut world = Self::new();
        for panel in panels {
            world.insert(panel)?;
        }
        Ok(world)
    }

    pub fn insert(&mut self, panel: Panel) -> Result<PanelKey, WorldError> {
        if self.index.contains_key(&panel.id) {
            return Err(WorldError::DuplicateId(panel.id));
        }
        let key = PanelKey(self.slots.len() as u32);
        self.index.insert(panel.id.clone(), key);
        self.slots.push(Some(panel));
        Ok(key)
    }

    pub fn remove(&mut self, id: &str) -> Option<Panel> {
        let key = self.index.remove(id)?;
        self.slots.get_mut(key.index() as usize)?.take()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn key_of(&self, id: &str) -> Option<PanelKey> {
        self.index.get(id).copied()
    }

    pub fn get(&self, key: PanelKey) -> Option<&Panel> {
        self.slots.get(key.index() as usize).and_then(|s| s.as_ref())
    }

    pub fn panel(&self, id: &str) -> Option<&Panel> {
        self.key_of(id).and_then(|k| self.get(k))
    }

    /// Live panels in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (PanelKey, &Panel)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|p| (PanelKey(idx as u32), p)))
    }

    /// Resolved outgoing connections of `key`, skipping dangling ids.
    pub fn connections(&self, key: PanelKey) -> impl Iterator<Item = (PanelKey, &Panel)> + '_ {
        self.get(key)
            .into_iter()
            .flat_map(|p| p.connected_to.iter())
            .filter_map(|target| {
                let k = self.key_of(target.as_str())?;
                self.get(k).map(|p| (k, p))
            })
    }

    pub fn set_position(&mut self, id: &str, position: Vec3) -> Result<(), WorldError> {
        let panel = self.panel_mut(id)?;
        panel.position = position;
        Ok(())
    }

    /// Replaces a panel's size. Callers are expected to floor first.
    pub fn set_size(&mut self, id: &str, size: PanelSize) -> Result<(), WorldError> {
        if !size.is_valid() {
            return Err(WorldError::InvalidSize {
                width: size.width,
                height: size.height,
            });
        }
        let panel = self.panel_mut(id)?;
        panel.size = size;
        Ok(())
    }

    fn panel_mut(&mut self, id: &str) -> Result<&mut Panel, WorldError> {
        let Some(key) = self.key_of(id) else {
            return Err(WorldError::UnknownPanel(PanelId::from(id)));
        };
        self.slots
            .get_mut(key.index() as usize)
            .and_then(|s| s.as_mut())
            .ok_or_else(|| WorldError::UnknownPanel(PanelId::from(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::{World, WorldError};
    use crate::components::PanelSize;
    use crate::entity::{Panel, PanelKey};
    use foundation::ids::PanelId;
    use foundation::math::Vec3;

    fn panel(id: &str, y: f64) -> Panel {
        Panel::new(id, Vec3::new(0.0, y, 0.0), PanelSize::new(200.0, 200.0))
    }

    #[test]
    fn insert_and_lookup() {
        let mut world = World::new();
        let a = world.insert(panel("a", 10.0)).unwrap();
        let b = world.insert(panel("b", 20.0)).unwrap();
        assert_eq!((a, b), (PanelKey(0), PanelKey(1)));
        assert_eq!(world.key_of("b"), Some(b));
        assert_eq!(world.panel("a").map(|p| p.position.y), Some(10.0));
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut world = World::new();
        world.insert(panel("a", 0.0)).unwrap();
        let err = world.insert(panel("a", 5.0)).unwrap_err();
        assert_eq!(err, WorldError::DuplicateId(PanelId::from("a")));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn removal_keeps_keys_stable() {
        let mut world = World::new();
        world.insert(panel("a", 0.0)).unwrap();
        world.insert(panel("b", 0.0)).unwrap();
        world.insert(panel("c", 0.0)).unwrap();

        assert!(world.remove("b").is_some());
        assert!(world.remove("b").is_none());
        let keys: Vec<u32> = world.iter().map(|(k, _)| k.index()).collect();
        assert_eq!(keys, vec![0, 2]);

        let d = world.insert(panel("d", 0.0)).unwrap();
        assert_eq!(d, PanelKey(3));
    }

    #[test]
    fn connections_skip_dangling_ids() {
        let mut world = World::new();
        let a = world
            .insert(panel("a", 0.0).connect("ghost").connect("b"))
            .unwrap();
        world.insert(panel("b", 0.0)).unwrap();

        let targets: Vec<&str> = world.connections(a).map(|(_, p)| p.id.as_str()).collect();
        assert_eq!(targets, vec!["b"]);
    }

    #[test]
    fn set_size_validates() {
        let mut world = World::new();
        world.insert(panel("a", 0.0)).unwrap();
        assert!(world.set_size("a", PanelSize::new(300.0, 160.0)).is_ok());
        assert_eq!(world.panel("a").unwrap().size, PanelSize::new(300.0, 160.0));
        assert!(matches!(
            world.set_size("a", PanelSize::new(0.0, 10.0)),
            Err(WorldError::InvalidSize { .. })
        ));
        assert_eq!(
            world.set_size("nope", PanelSize::new(10.0, 10.0)),
            Err(WorldError::UnknownPanel(PanelId::from("nope")))
        );
    }

    #[test]
    fn set_position_moves_panel() {
        let mut world = World::new();
        world.insert(panel("a", 0.0)).unwrap();
        world.set_position("a", Vec3::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(world.panel("a").unwrap().position, Vec3::new(1.0, 2.0, 3.0));
    }
}
