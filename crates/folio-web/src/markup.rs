#![forbid(unsafe_code)]

//! The markup contract between the page and the DOM host.
//!
//! The host finds everything through these selectors and attributes; the page
//! author marks elements up accordingly. JS glue names event targets with the
//! strings accepted by [`parse_target`].

use folio_core::Target;

pub const MEDIA_ENTRY: &str = "[data-media-type]";
pub const MEDIA_TYPE_ATTR: &str = "data-media-type";
pub const MEDIA_SRC_ATTR: &str = "data-media-src";
pub const MEDIA_TITLE_ATTR: &str = "data-media-title";

pub const LIGHTBOX: &str = "[data-lightbox]";
pub const LIGHTBOX_CONTENT: &str = "[data-lightbox-content]";
pub const LIGHTBOX_CLOSE: &str = "[data-lightbox-close]";
pub const LIGHTBOX_PREV: &str = "[data-lightbox-prev]";
pub const LIGHTBOX_NEXT: &str = "[data-lightbox-next]";

pub const NAV_TOGGLE: &str = "[data-nav-toggle]";
pub const NAV_MENU: &str = "[data-nav-menu]";

pub const CONTACT_FORM: &str = "[data-contact-form]";
pub const FORM_STATUS: &str = "[data-form-status]";

pub const LAZY_IMAGE: &str = "img[data-src]";
pub const LAZY_SRC_ATTR: &str = "data-src";

pub const YEAR: &str = "[data-year]";

/// Class toggled on the lightbox and the nav menu while open.
pub const OPEN_CLASS: &str = "is-open";
pub const ERROR_CLASS: &str = "is-error";
pub const SUCCESS_CLASS: &str = "is-success";

/// Selector for a fixed page control. Catalog entries are addressed by index
/// instead and return `None`, as does [`Target::Other`].
#[must_use]
pub const fn control_selector(target: Target) -> Option<&'static str> {
    match target {
        Target::SurfaceBackdrop => Some(LIGHTBOX),
        Target::SurfaceClose => Some(LIGHTBOX_CLOSE),
        Target::SurfacePrev => Some(LIGHTBOX_PREV),
        Target::SurfaceNext => Some(LIGHTBOX_NEXT),
        Target::NavToggle => Some(NAV_TOGGLE),
        Target::NavLink => Some(NAV_MENU),
        Target::MediaEntry { .. } | Target::Other => None,
    }
}

/// Map a JS target name (plus an index for catalog entries) to a [`Target`].
///
/// Unknown names map to [`Target::Other`], which nothing handles.
#[must_use]
pub fn parse_target(name: &str, index: Option<usize>) -> Target {
    match (name, index) {
        ("media", Some(index)) => Target::MediaEntry { index },
        ("backdrop", _) => Target::SurfaceBackdrop,
        ("close", _) => Target::SurfaceClose,
        ("prev", _) => Target::SurfacePrev,
        ("next", _) => Target::SurfaceNext,
        ("nav_toggle" | "navToggle", _) => Target::NavToggle,
        ("nav_link" | "navLink", _) => Target::NavLink,
        _ => Target::Other,
    }
}
