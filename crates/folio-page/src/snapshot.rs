#![forbid(unsafe_code)]

use folio_viewer::MediaEntryAttrs;
use serde::{Deserialize, Serialize};

/// A deferred image, as marked up in the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LazyImageAttrs {
    /// Value of the `data-src` attribute, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_src: Option<String>,
}

impl LazyImageAttrs {
    #[must_use]
    pub fn new(data_src: &str) -> Self {
        Self {
            data_src: Some(data_src.to_string()),
        }
    }
}

/// What the host found in the page markup at startup.
///
/// Indexes into `media` and `lazy_images` are document order and are the
/// indexes carried by events and commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSnapshot {
    pub media: Vec<MediaEntryAttrs>,
    pub lazy_images: Vec<LazyImageAttrs>,
    /// Whether a year placeholder element exists.
    pub has_year: bool,
}

impl PageSnapshot {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
