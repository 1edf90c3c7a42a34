#![forbid(unsafe_code)]

//! Core: page events, host-driven event sources, and the host command surface.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment pushes events; the page
//!   answers with [`host::HostCommand`]s and never reaches into the DOM itself.
//! - **Deterministic**: no clocks, no threads, no globals. The same event stream
//!   always produces the same command stream.

pub mod event;
pub mod host;
pub mod source;

pub use event::{
    EventKinds, KeyCode, KeyInput, KeyPhase, Modifiers, PageEvent, Target, normalize_dom_key_code,
};
pub use host::{HostCommand, HostError, MessageKind, PageHost, RecordingHost};
pub use source::{EventSource, HostEventQueue};
