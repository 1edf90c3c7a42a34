#![forbid(unsafe_code)]

//! The lightbox controller.
//!
//! [`MediaViewer`] ties the catalog, navigator, renderer and focus trap
//! together and turns user intent into [`HostCommand`]s. It owns no DOM and is
//! driven entirely through a [`PageHost`], so every transition can be replayed
//! and asserted on in tests.
//!
//! Host command failures are logged and dropped: a missing overlay element
//! must not leave the viewer state out of step with what the user asked for.

use folio_core::{HostCommand, KeyCode, KeyInput, PageHost, Target};

use crate::catalog::Catalog;
use crate::descriptor::MediaEntryAttrs;
use crate::focus_trap::FocusTrap;
use crate::navigator::Navigator;
use crate::render::{EmbedConfig, render_with};

/// Lightbox state plus the command protocol that drives it.
#[derive(Debug, Clone)]
pub struct MediaViewer {
    catalog: Catalog,
    navigator: Navigator,
    embeds: EmbedConfig,
    trap: FocusTrap,
    /// Entry that opened the lightbox; focus returns here on close.
    opened_from: Option<usize>,
}

impl MediaViewer {
    #[must_use]
    pub fn new(catalog: Catalog, embeds: EmbedConfig) -> Self {
        let navigator = Navigator::new(catalog.len());
        Self {
            catalog,
            navigator,
            embeds,
            trap: FocusTrap::surface(),
            opened_from: None,
        }
    }

    /// Build from entry attributes in document order.
    #[must_use]
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = &'a MediaEntryAttrs>,
        embeds: EmbedConfig,
    ) -> Self {
        Self::new(Catalog::build(entries), embeds)
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.navigator.is_open()
    }

    #[must_use]
    pub const fn current(&self) -> Option<usize> {
        self.navigator.current()
    }

    /// Open the lightbox at `index`, or swap its content if already open.
    ///
    /// Out-of-range indexes are ignored. Scroll is locked and focus moved to
    /// the dismiss control only on the closed-to-open transition.
    pub fn open<H: PageHost + ?Sized>(&mut self, index: isize, host: &mut H) -> bool {
        match usize::try_from(index) {
            Ok(i) => self.open_at(i, host),
            Err(_) => {
                tracing::debug!(index, len = self.catalog.len(), "ignoring open outside catalog");
                false
            }
        }
    }

    /// Unsigned form of [`MediaViewer::open`].
    pub fn open_at<H: PageHost + ?Sized>(&mut self, index: usize, host: &mut H) -> bool {
        let was_open = self.navigator.is_open();
        if !self.navigator.open_at(index) {
            tracing::debug!(index, len = self.catalog.len(), "ignoring open outside catalog");
            return false;
        }
        let Some(descriptor) = self.catalog.get(index) else {
            return false;
        };

        let rendered = render_with(descriptor, &self.embeds);
        tracing::debug!(
            index,
            kind = descriptor.kind().as_str(),
            outcome = ?rendered.outcome,
            "lightbox showing entry"
        );
        host.dispatch(HostCommand::MountSurface {
            html: rendered.html,
        });

        if !was_open {
            self.opened_from = Some(index);
            host.dispatch(HostCommand::ShowSurface);
            host.dispatch(HostCommand::LockScroll);
            if let Some(target) = self.trap.engage() {
                host.dispatch(HostCommand::Focus { target });
            }
        }
        true
    }

    /// Close the lightbox, clearing its content and restoring scroll and
    /// focus. No-op while closed.
    pub fn close<H: PageHost + ?Sized>(&mut self, host: &mut H) -> bool {
        let Some(index) = self.navigator.close() else {
            return false;
        };
        self.trap.release();
        host.dispatch(HostCommand::ClearSurface);
        host.dispatch(HostCommand::HideSurface);
        host.dispatch(HostCommand::UnlockScroll);
        if let Some(from) = self.opened_from.take() {
            host.dispatch(HostCommand::Focus {
                target: Target::MediaEntry { index: from },
            });
        }
        tracing::debug!(index, "lightbox closed");
        true
    }

    /// Advance to the following entry, wrapping past the end.
    pub fn next<H: PageHost + ?Sized>(&mut self, host: &mut H) -> bool {
        match self.navigator.next_index() {
            Some(index) => self.open_at(index, host),
            None => false,
        }
    }

    /// Step back to the preceding entry, wrapping past the start.
    pub fn prev<H: PageHost + ?Sized>(&mut self, host: &mut H) -> bool {
        match self.navigator.prev_index() {
            Some(index) => self.open_at(index, host),
            None => false,
        }
    }

    /// Handle a document-level key press. Returns `true` if the key was
    /// consumed.
    ///
    /// Navigation keys only act while the lightbox is open. Activation keys on
    /// a focused catalog entry open it.
    pub fn handle_key<H: PageHost + ?Sized>(
        &mut self,
        key: &KeyInput,
        target: Option<Target>,
        host: &mut H,
    ) -> bool {
        if !key.is_press() {
            return false;
        }
        if !self.is_open() {
            return match target {
                Some(Target::MediaEntry { index }) if key.code.is_activation() => {
                    self.open_at(index, host)
                }
                _ => false,
            };
        }
        match key.code {
            KeyCode::Escape => self.close(host),
            KeyCode::Left => self.prev(host),
            KeyCode::Right => self.next(host),
            KeyCode::Tab | KeyCode::BackTab => {
                if let Some(target) = target {
                    self.trap.sync(target);
                }
                match self.trap.step(key.code == KeyCode::BackTab) {
                    Some(target) => {
                        host.dispatch(HostCommand::Focus { target });
                        true
                    }
                    None => false,
                }
            }
            ref code if code.is_activation() => match target {
                Some(t @ (Target::SurfaceClose | Target::SurfacePrev | Target::SurfaceNext)) => {
                    self.activate(t, host)
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Handle a click (or equivalent) on `target`. Returns `true` if handled.
    pub fn activate<H: PageHost + ?Sized>(&mut self, target: Target, host: &mut H) -> bool {
        match target {
            Target::MediaEntry { index } => self.open_at(index, host),
            Target::SurfaceBackdrop | Target::SurfaceClose => self.close(host),
            Target::SurfacePrev => {
                self.trap.sync(target);
                self.prev(host)
            }
            Target::SurfaceNext => {
                self.trap.sync(target);
                self.next(host)
            }
            Target::NavToggle | Target::NavLink | Target::Other => false,
        }
    }
}
