use serde::{Deserialize, Serialize};

/// Per-kind panel payload.
///
/// The engine only carries this through to the rendering surface; geometry
/// and connectivity live on [`crate::entity::Panel`] itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PanelContent {
    #[default]
    Hero,
    Nav,
    GalleryMain,
    GallerySatelliteFade,
    GallerySatelliteCarousel,
    PdfViewer,
    ItemList,
    BlogPortal,
    SitePortal,
    TextBox {
        #[serde(default)]
        body: String,
    },
    TextEditor {
        #[serde(default)]
        body: String,
    },
    OsSandbox,
    Minigame,
    ExternalEmbed {
        url: String,
    },
    CustomCode {
        snippet: String,
    },
}

impl PanelContent {
    pub fn kind(&self) -> &'static str {
        match self {
            PanelContent::Hero => "HERO",
            PanelContent::Nav => "NAV",
            PanelContent::GalleryMain => "GALLERY_MAIN",
            PanelContent::GallerySatelliteFade => "GALLERY_SATELLITE_FADE",
            PanelContent::GallerySatelliteCarousel => "GALLERY_SATELLITE_CAROUSEL",
            PanelContent::PdfViewer => "PDF_VIEWER",
            PanelContent::ItemList => "ITEM_LIST",
            PanelContent::BlogPortal => "BLOG_PORTAL",
            PanelContent::SitePortal => "SITE_PORTAL",
            PanelContent::TextBox { .. } => "TEXT_BOX",
            PanelContent::TextEditor { .. } => "TEXT_EDITOR",
            PanelContent::OsSandbox => "OS_SANDBOX",
            PanelContent::Minigame => "MINIGAME",
            PanelContent::ExternalEmbed { .. } => "EXTERNAL_EMBED",
            PanelContent::CustomCode { .. } => "CUSTOM_CODE",
        }
    }
}
