#![forbid(unsafe_code)]

//! Media lightbox: catalog, navigation, player rendering, embed ID extraction.
//!
//! The pure pieces ([`Catalog`], [`Navigator`], [`render`], [`extract_id`],
//! [`escape_html`]) have no side effects. [`MediaViewer`] composes them and
//! speaks to the page through [`folio_core::PageHost`].

pub mod catalog;
pub mod descriptor;
pub mod escape;
pub mod extract;
pub mod focus_trap;
pub mod navigator;
pub mod render;
pub mod viewer;

pub use catalog::Catalog;
pub use descriptor::{MediaDescriptor, MediaEntryAttrs, MediaKind};
pub use escape::escape_html;
pub use extract::{Extraction, Platform, extract_id};
pub use focus_trap::FocusTrap;
pub use navigator::Navigator;
pub use render::{
    EmbedConfig, NOT_FOUND_TEXT, RenderOutcome, Rendered, UNSUPPORTED_TEXT, render, render_with,
};
pub use viewer::MediaViewer;
