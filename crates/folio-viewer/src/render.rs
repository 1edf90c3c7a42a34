#![forbid(unsafe_code)]

//! Player markup for media descriptors.
//!
//! Rendering is a pure function of the descriptor and the embed configuration.
//! Every interpolated value goes through [`escape_html`]; placeholders replace
//! players when there is nothing sensible to play.

use std::fmt::Write as _;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::descriptor::{MediaDescriptor, MediaKind};
use crate::escape::escape_html;
use crate::extract::{Platform, extract_id};

pub const NOT_FOUND_TEXT: &str = "Media not found.";
pub const UNSUPPORTED_TEXT: &str = "Unsupported media type.";
const VIDEO_FALLBACK_TEXT: &str = "Your browser does not support embedded video.";

/// Characters that would end or split a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Embed endpoints. IDs are appended as a single encoded path segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    pub youtube_base: String,
    pub vimeo_base: String,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            youtube_base: "https://www.youtube-nocookie.com/embed/".to_string(),
            vimeo_base: "https://player.vimeo.com/video/".to_string(),
        }
    }
}

/// Which branch the renderer took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderOutcome {
    Player,
    NotFound,
    Unsupported,
}

/// Markup ready to mount into the lightbox surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub outcome: RenderOutcome,
    pub html: String,
}

/// Render with the default embed endpoints.
#[must_use]
pub fn render(descriptor: &MediaDescriptor) -> Rendered {
    render_with(descriptor, &EmbedConfig::default())
}

/// Render a descriptor into player markup.
#[must_use]
pub fn render_with(descriptor: &MediaDescriptor, embeds: &EmbedConfig) -> Rendered {
    let source = descriptor.source_ref();
    if source.is_empty() {
        return placeholder(RenderOutcome::NotFound, NOT_FOUND_TEXT);
    }

    let label = accessible_label(descriptor);
    let html = match descriptor.kind() {
        MediaKind::Video => video_markup(source, &label),
        MediaKind::YouTube => {
            let id = extract_id(Platform::YouTube, source);
            let id = utf8_percent_encode(id.id(), PATH_SEGMENT);
            let src = format!("{}{id}?autoplay=1&rel=0", embeds.youtube_base);
            iframe_markup(&src, &label, "autoplay; encrypted-media; picture-in-picture")
        }
        MediaKind::Vimeo => {
            let id = extract_id(Platform::Vimeo, source);
            let id = utf8_percent_encode(id.id(), PATH_SEGMENT);
            let src = format!("{}{id}?autoplay=1", embeds.vimeo_base);
            iframe_markup(&src, &label, "autoplay; fullscreen; picture-in-picture")
        }
        MediaKind::Unsupported(raw) => {
            tracing::debug!(kind = %raw, "unsupported media type");
            return placeholder(RenderOutcome::Unsupported, UNSUPPORTED_TEXT);
        }
    };

    Rendered {
        outcome: RenderOutcome::Player,
        html,
    }
}

fn accessible_label(descriptor: &MediaDescriptor) -> String {
    let title = descriptor.title().trim();
    if !title.is_empty() {
        return title.to_string();
    }
    match descriptor.kind() {
        MediaKind::YouTube => "YouTube video".to_string(),
        MediaKind::Vimeo => "Vimeo video".to_string(),
        _ => "Video".to_string(),
    }
}

fn video_markup(source: &str, label: &str) -> String {
    let mut html = String::with_capacity(192 + source.len() + label.len());
    let _ = write!(
        html,
        r#"<video class="lightbox-player" controls playsinline preload="metadata" aria-label="{}"><source src="{}" type="video/mp4">{}</video>"#,
        escape_html(label),
        escape_html(source),
        VIDEO_FALLBACK_TEXT,
    );
    html
}

fn iframe_markup(src: &str, label: &str, allow: &str) -> String {
    let mut html = String::with_capacity(160 + src.len() + label.len());
    let _ = write!(
        html,
        r#"<iframe class="lightbox-player" src="{}" title="{}" allow="{}" allowfullscreen></iframe>"#,
        escape_html(src),
        escape_html(label),
        allow,
    );
    html
}

fn placeholder(outcome: RenderOutcome, text: &str) -> Rendered {
    Rendered {
        outcome,
        html: format!(r#"<p class="lightbox-message" role="alert">{text}</p>"#),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn desc(kind: MediaKind, src: &str, title: &str) -> MediaDescriptor {
        MediaDescriptor::new(kind, src, title)
    }

    #[test]
    fn video_player_has_native_controls() {
        let out = render(&desc(MediaKind::Video, "/media/reel.mp4", "Reel"));
        assert_eq!(out.outcome, RenderOutcome::Player);
        assert_eq!(
            out.html,
            r#"<video class="lightbox-player" controls playsinline preload="metadata" aria-label="Reel"><source src="/media/reel.mp4" type="video/mp4">Your browser does not support embedded video.</video>"#
        );
    }

    #[test]
    fn youtube_uses_privacy_host_with_autoplay_and_no_related() {
        let out = render(&desc(MediaKind::YouTube, "https://youtu.be/abc123", "Talk"));
        assert_eq!(
            out.html,
            r#"<iframe class="lightbox-player" src="https://www.youtube-nocookie.com/embed/abc123?autoplay=1&amp;rel=0" title="Talk" allow="autoplay; encrypted-media; picture-in-picture" allowfullscreen></iframe>"#
        );
    }

    #[test]
    fn vimeo_embeds_player_with_autoplay() {
        let out = render(&desc(MediaKind::Vimeo, "https://vimeo.com/555444", "Short"));
        assert!(
            out.html
                .contains(r#"src="https://player.vimeo.com/video/555444?autoplay=1""#)
        );
        assert!(out.html.contains(r#"title="Short""#));
    }

    #[test]
    fn titles_are_escaped() {
        let out = render(&desc(
            MediaKind::YouTube,
            "abc",
            "<script>alert('x')</script>",
        ));
        assert!(!out.html.contains("<script>"));
        assert!(out.html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }

    #[test]
    fn source_refs_cannot_break_out_of_attributes() {
        let out = render(&desc(MediaKind::Video, r#"x.mp4" onerror="boom"#, "t"));
        assert!(out.html.contains(r#"src="x.mp4&quot; onerror=&quot;boom""#));
    }

    #[test]
    fn empty_source_is_not_found_for_every_kind() {
        for kind in [
            MediaKind::Video,
            MediaKind::YouTube,
            MediaKind::Vimeo,
            MediaKind::Unsupported("gif".into()),
        ] {
            let out = render(&desc(kind, "", "Title"));
            assert_eq!(out.outcome, RenderOutcome::NotFound);
            assert!(out.html.contains(NOT_FOUND_TEXT));
            assert!(!out.html.contains("<iframe"));
            assert!(!out.html.contains("<video"));
        }
    }

    #[test]
    fn unknown_type_renders_placeholder() {
        let out = render(&desc(MediaKind::Unsupported("flash".into()), "x.swf", ""));
        assert_eq!(out.outcome, RenderOutcome::Unsupported);
        assert!(out.html.contains(UNSUPPORTED_TEXT));
    }

    #[test]
    fn empty_title_gets_a_kind_label() {
        let out = render(&desc(MediaKind::Vimeo, "42", ""));
        assert!(out.html.contains(r#"title="Vimeo video""#));
    }

    #[test]
    fn embed_params_survive_ids_with_url_delimiters() {
        let out = render(&desc(
            MediaKind::YouTube,
            "https://www.youtube.com/watch?v=abc%23x",
            "t",
        ));
        assert!(out.html.contains(
            r#"src="https://www.youtube-nocookie.com/embed/abc%23x?autoplay=1&amp;rel=0""#
        ));

        let out = render(&desc(MediaKind::Vimeo, "123?autoplay=0#", "t"));
        let src = r#"src="https://player.vimeo.com/video/123%3Fautoplay=0%23?autoplay=1""#;
        assert!(out.html.contains(src));

        let out = render(&desc(MediaKind::YouTube, "a/b", "t"));
        assert!(out.html.contains("/embed/a%2Fb?autoplay=1&amp;rel=0"));
    }

    #[test]
    fn custom_embed_bases_are_used() {
        let embeds = EmbedConfig {
            youtube_base: "https://example.test/yt/".to_string(),
            vimeo_base: "https://example.test/vm/".to_string(),
        };
        let out = render_with(&desc(MediaKind::YouTube, "abc", "t"), &embeds);
        assert!(out.html.contains(r#"src="https://example.test/yt/abc?autoplay=1&amp;rel=0""#));
    }
}
