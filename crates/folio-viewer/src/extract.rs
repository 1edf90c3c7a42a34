#![forbid(unsafe_code)]

//! Normalization of platform references into embeddable IDs.
//!
//! Authors paste whatever they have: a share link, a watch URL, or a bare ID.
//! Extraction never fails; anything it cannot read as a URL is handed back as
//! [`Extraction::Unresolved`] and used verbatim.

use url::Url;

/// Embed platform an ID is extracted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    YouTube,
    Vimeo,
}

const YOUTUBE_SHORT_HOST: &str = "youtu.be";

/// Outcome of ID extraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extraction {
    /// An ID read out of a URL.
    Resolved(String),
    /// The input was not a usable URL; it is assumed to be an ID already.
    Unresolved(String),
}

impl Extraction {
    /// The ID to embed, whichever way it was obtained.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Resolved(id) | Self::Unresolved(id) => id,
        }
    }

    #[must_use]
    pub fn into_id(self) -> String {
        match self {
            Self::Resolved(id) | Self::Unresolved(id) => id,
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Extract the platform ID from `raw`.
#[must_use]
pub fn extract_id(platform: Platform, raw: &str) -> Extraction {
    let trimmed = raw.trim();
    let Ok(url) = Url::parse(trimmed) else {
        return Extraction::Unresolved(trimmed.to_string());
    };

    let id = match platform {
        Platform::YouTube => youtube_id(&url),
        Platform::Vimeo => last_path_segment(&url),
    };

    match id {
        Some(id) if !id.is_empty() => Extraction::Resolved(id),
        _ => {
            tracing::debug!(?platform, raw = trimmed, "no embed id in url");
            Extraction::Unresolved(trimmed.to_string())
        }
    }
}

fn youtube_id(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    if host.trim_start_matches("www.") == YOUTUBE_SHORT_HOST {
        return Some(url.path().trim_start_matches('/').to_string());
    }
    if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
        return Some(v.into_owned());
    }
    last_path_segment(url)
}

fn last_path_segment(url: &Url) -> Option<String> {
    url.path_segments()?.next_back().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn youtube_short_link() {
        assert_eq!(
            extract_id(Platform::YouTube, "https://youtu.be/abc123"),
            Extraction::Resolved("abc123".to_string())
        );
    }

    #[test]
    fn youtube_watch_query() {
        assert_eq!(
            extract_id(Platform::YouTube, "https://youtube.com/watch?v=xyz789"),
            Extraction::Resolved("xyz789".to_string())
        );
        assert_eq!(
            extract_id(
                Platform::YouTube,
                "https://www.youtube.com/watch?feature=share&v=q1w2e3"
            )
            .id(),
            "q1w2e3"
        );
    }

    #[test]
    fn youtube_embed_path_uses_last_segment() {
        assert_eq!(
            extract_id(Platform::YouTube, "https://www.youtube.com/embed/emb42").id(),
            "emb42"
        );
    }

    #[test]
    fn vimeo_last_segment() {
        assert_eq!(
            extract_id(Platform::Vimeo, "https://vimeo.com/555444"),
            Extraction::Resolved("555444".to_string())
        );
        assert_eq!(
            extract_id(Platform::Vimeo, "https://vimeo.com/channels/staffpicks/777").id(),
            "777"
        );
    }

    #[test]
    fn bare_ids_pass_through_unchanged() {
        for platform in [Platform::YouTube, Platform::Vimeo] {
            let out = extract_id(platform, "plainid");
            assert_eq!(out, Extraction::Unresolved("plainid".to_string()));
            assert!(!out.is_resolved());
        }
    }

    #[test]
    fn url_without_id_is_unresolved() {
        assert_eq!(
            extract_id(Platform::Vimeo, "https://vimeo.com/"),
            Extraction::Unresolved("https://vimeo.com/".to_string())
        );
    }
}
