#![forbid(unsafe_code)]

//! Page controller: everything interactive on the portfolio page besides the
//! lightbox internals.
//!
//! A host builds a [`Page`] from a [`PageConfig`] and the [`PageSnapshot`] it
//! read from the markup, calls [`Page::start`] once, installs listeners for
//! [`Page::listeners`], and forwards events to [`Page::handle`]. The
//! [`session`] module records and replays those event streams.

pub mod config;
pub mod form;
pub mod lazy;
pub mod nav;
pub mod page;
pub mod session;
pub mod snapshot;

pub use config::{ConfigError, FormFieldNames, PageConfig};
pub use form::{ContactFields, MailDraft, SubmitOutcome, ValidationError, is_valid_email};
pub use lazy::LazyImages;
pub use nav::NavToggle;
pub use page::Page;
pub use session::{
    ReplayError, ReplayMismatch, ReplayResult, SessionRecorder, SessionTrace, TraceLoadError,
    TraceParseError, TraceRecord, TraceValidationError, replay,
};
pub use snapshot::{LazyImageAttrs, PageSnapshot};
