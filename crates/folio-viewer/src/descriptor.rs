#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Rendering strategy for a media entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Self-hosted MP4 played by the native video element.
    Video,
    YouTube,
    Vimeo,
    /// A type attribute the viewer does not know. Kept verbatim for diagnostics.
    Unsupported(Box<str>),
}

impl MediaKind {
    /// Interpret a raw `type` attribute.
    ///
    /// Missing or blank attributes default to [`MediaKind::Video`]. Matching
    /// ignores surrounding whitespace and ASCII case.
    #[must_use]
    pub fn from_attr(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::Video;
        };
        if raw.eq_ignore_ascii_case("video") {
            Self::Video
        } else if raw.eq_ignore_ascii_case("youtube") {
            Self::YouTube
        } else if raw.eq_ignore_ascii_case("vimeo") {
            Self::Vimeo
        } else {
            Self::Unsupported(raw.into())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Video => "video",
            Self::YouTube => "youtube",
            Self::Vimeo => "vimeo",
            Self::Unsupported(raw) => raw,
        }
    }
}

/// Raw attributes of one catalog element, as read from the page markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEntryAttrs {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl MediaEntryAttrs {
    #[must_use]
    pub fn new(kind: &str, src: &str, title: &str) -> Self {
        Self {
            kind: Some(kind.to_string()),
            src: Some(src.to_string()),
            title: Some(title.to_string()),
        }
    }
}

/// Immutable description of one media item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaDescriptor {
    kind: MediaKind,
    source_ref: String,
    title: String,
}

impl MediaDescriptor {
    #[must_use]
    pub fn new(kind: MediaKind, source_ref: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind,
            source_ref: source_ref.into(),
            title: title.into(),
        }
    }

    /// Build a descriptor from element attributes. Missing source and title
    /// become empty strings.
    #[must_use]
    pub fn from_attrs(attrs: &MediaEntryAttrs) -> Self {
        Self {
            kind: MediaKind::from_attr(attrs.kind.as_deref()),
            source_ref: attrs.src.as_deref().map(str::trim).unwrap_or("").to_string(),
            title: attrs.title.clone().unwrap_or_default(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &MediaKind {
        &self.kind
    }

    /// Raw URL or bare platform ID.
    #[must_use]
    pub fn source_ref(&self) -> &str {
        &self.source_ref
    }

    /// Accessible label; may be empty.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }
}
