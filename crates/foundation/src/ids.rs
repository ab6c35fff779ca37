use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable, author-assigned panel identity.
///
/// Ids are opaque strings; the engine never derives meaning from them.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(String);

impl PanelId {
    pub fn new(id: impl Into<String>) -> Self {
        PanelId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PanelId {
    fn from(s: &str) -> Self {
        PanelId::new(s)
    }
}

impl From<String> for PanelId {
    fn from(s: String) -> Self {
        PanelId(s)
    }
}

impl Borrow<str> for PanelId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::PanelId;
    use std::collections::BTreeMap;

    #[test]
    fn lookup_by_str_through_borrow() {
        let mut m = BTreeMap::new();
        m.insert(PanelId::from("gallery-1"), 3u32);
        assert_eq!(m.get("gallery-1"), Some(&3));
        assert_eq!(m.get("ghost"), None);
    }

    #[test]
    fn displays_raw_id() {
        assert_eq!(PanelId::new("intro-text").to_string(), "intro-text");
    }

    #[test]
    fn serializes_as_bare_string() {
        let json = serde_json::to_string(&PanelId::from("sat-fade")).unwrap();
        assert_eq!(json, "\"sat-fade\"");
    }
}
