#![forbid(unsafe_code)]

//! The page's side-effect surface.
//!
//! Core logic never touches the DOM. It emits [`HostCommand`]s and a
//! [`PageHost`] applies them: the wasm host writes to the real document, the
//! [`RecordingHost`] captures them for tests, traces, and the harness.

use serde::{Deserialize, Serialize};

use crate::event::Target;

/// Severity of a form status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Error,
    Success,
}

/// One side effect requested by the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostCommand {
    /// Replace the lightbox content with player markup.
    MountSurface { html: String },
    /// Remove the lightbox content (stops playback).
    ClearSurface,
    ShowSurface,
    HideSurface,
    /// Suspend page scroll behind the lightbox.
    LockScroll,
    UnlockScroll,
    Focus { target: Target },
    SetNavExpanded { expanded: bool },
    ShowFormMessage { kind: MessageKind, text: String },
    ClearFormMessage,
    ResetForm,
    CopyToClipboard { text: String },
    OpenMail { href: String },
    /// Swap a deferred image source in.
    LoadImage { index: usize, src: String },
    UnobserveImage { index: usize },
    SetYear { year: i32 },
}

impl HostCommand {
    /// Short stable name used in logs.
    #[must_use]
    pub const fn op(&self) -> &'static str {
        match self {
            Self::MountSurface { .. } => "mount_surface",
            Self::ClearSurface => "clear_surface",
            Self::ShowSurface => "show_surface",
            Self::HideSurface => "hide_surface",
            Self::LockScroll => "lock_scroll",
            Self::UnlockScroll => "unlock_scroll",
            Self::Focus { .. } => "focus",
            Self::SetNavExpanded { .. } => "set_nav_expanded",
            Self::ShowFormMessage { .. } => "show_form_message",
            Self::ClearFormMessage => "clear_form_message",
            Self::ResetForm => "reset_form",
            Self::CopyToClipboard { .. } => "copy_to_clipboard",
            Self::OpenMail { .. } => "open_mail",
            Self::LoadImage { .. } => "load_image",
            Self::UnobserveImage { .. } => "unobserve_image",
            Self::SetYear { .. } => "set_year",
        }
    }
}

/// Host-side failure applying a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The page markup lacks an element the command needs.
    MissingElement(&'static str),
    /// The host refused the operation (e.g. clipboard permission denied).
    Rejected(String),
    /// The host does not implement this command.
    Unsupported(&'static str),
}

impl core::fmt::Display for HostError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingElement(what) => write!(f, "missing page element: {what}"),
            Self::Rejected(reason) => write!(f, "rejected by host: {reason}"),
            Self::Unsupported(op) => write!(f, "unsupported: {op}"),
        }
    }
}

impl std::error::Error for HostError {}

/// Applies page side effects.
pub trait PageHost {
    fn apply(&mut self, command: HostCommand) -> Result<(), HostError>;

    /// Apply a command whose failure must not interrupt the caller.
    ///
    /// Failures are logged and dropped.
    fn dispatch(&mut self, command: HostCommand) {
        let op = command.op();
        if let Err(err) = self.apply(command) {
            tracing::warn!(op, error = %err, "host command failed");
        }
    }
}

impl<H: PageHost + ?Sized> PageHost for &mut H {
    fn apply(&mut self, command: HostCommand) -> Result<(), HostError> {
        (**self).apply(command)
    }
}

impl<H: PageHost + ?Sized> PageHost for Box<H> {
    fn apply(&mut self, command: HostCommand) -> Result<(), HostError> {
        (**self).apply(command)
    }
}

/// Deterministic host that records every command and tracks the page state
/// those commands imply.
#[derive(Debug, Default, Clone)]
pub struct RecordingHost {
    commands: Vec<HostCommand>,
    surface_html: Option<String>,
    surface_visible: bool,
    scroll_locked: bool,
    focused: Option<Target>,
    nav_expanded: bool,
    form_message: Option<(MessageKind, String)>,
    form_resets: usize,
    clipboard: Option<String>,
    mail_href: Option<String>,
    loaded_images: Vec<(usize, String)>,
    unobserved_images: Vec<usize>,
    year: Option<i32>,
    reject_clipboard: bool,
}

impl RecordingHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A host whose clipboard writes always fail.
    #[must_use]
    pub fn with_rejecting_clipboard() -> Self {
        Self {
            reject_clipboard: true,
            ..Self::default()
        }
    }

    /// Every command applied so far, in order (rejected ones included).
    #[must_use]
    pub fn commands(&self) -> &[HostCommand] {
        &self.commands
    }

    /// Take the recorded command log, leaving the tracked state untouched.
    pub fn take_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }

    #[must_use]
    pub fn surface_html(&self) -> Option<&str> {
        self.surface_html.as_deref()
    }

    #[must_use]
    pub const fn surface_visible(&self) -> bool {
        self.surface_visible
    }

    #[must_use]
    pub const fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    #[must_use]
    pub const fn focused(&self) -> Option<Target> {
        self.focused
    }

    #[must_use]
    pub const fn nav_expanded(&self) -> bool {
        self.nav_expanded
    }

    #[must_use]
    pub fn form_message(&self) -> Option<(MessageKind, &str)> {
        self.form_message
            .as_ref()
            .map(|(kind, text)| (*kind, text.as_str()))
    }

    #[must_use]
    pub const fn form_resets(&self) -> usize {
        self.form_resets
    }

    #[must_use]
    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    #[must_use]
    pub fn mail_href(&self) -> Option<&str> {
        self.mail_href.as_deref()
    }

    #[must_use]
    pub fn loaded_images(&self) -> &[(usize, String)] {
        &self.loaded_images
    }

    #[must_use]
    pub fn unobserved_images(&self) -> &[usize] {
        &self.unobserved_images
    }

    #[must_use]
    pub const fn year(&self) -> Option<i32> {
        self.year
    }
}

impl PageHost for RecordingHost {
    fn apply(&mut self, command: HostCommand) -> Result<(), HostError> {
        self.commands.push(command.clone());
        match command {
            HostCommand::MountSurface { html } => self.surface_html = Some(html),
            HostCommand::ClearSurface => self.surface_html = None,
            HostCommand::ShowSurface => self.surface_visible = true,
            HostCommand::HideSurface => self.surface_visible = false,
            HostCommand::LockScroll => self.scroll_locked = true,
            HostCommand::UnlockScroll => self.scroll_locked = false,
            HostCommand::Focus { target } => self.focused = Some(target),
            HostCommand::SetNavExpanded { expanded } => self.nav_expanded = expanded,
            HostCommand::ShowFormMessage { kind, text } => self.form_message = Some((kind, text)),
            HostCommand::ClearFormMessage => self.form_message = None,
            HostCommand::ResetForm => self.form_resets += 1,
            HostCommand::CopyToClipboard { text } => {
                if self.reject_clipboard {
                    return Err(HostError::Rejected("clipboard write denied".to_string()));
                }
                self.clipboard = Some(text);
            }
            HostCommand::OpenMail { href } => self.mail_href = Some(href),
            HostCommand::LoadImage { index, src } => self.loaded_images.push((index, src)),
            HostCommand::UnobserveImage { index } => self.unobserved_images.push(index),
            HostCommand::SetYear { year } => self.year = Some(year),
        }
        Ok(())
    }
}
