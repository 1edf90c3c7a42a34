#![forbid(unsafe_code)]

//! WASM frontend for folio.
//!
//! Exposes `FolioWeb` to JS via `wasm-bindgen`: it scans the document for the
//! elements described in [`markup`], builds a [`folio_page::Page`], and applies
//! the page's host commands to the live DOM.

pub mod markup;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::FolioWeb;

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct FolioWeb;

#[cfg(not(target_arch = "wasm32"))]
impl FolioWeb {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}
