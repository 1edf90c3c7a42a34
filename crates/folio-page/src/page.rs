#![forbid(unsafe_code)]

//! The page controller.
//!
//! [`Page`] owns every interactive piece of the page and routes host events to
//! them. The lightbox gets first refusal on keys so its bindings win while it
//! is open; everything else falls through to the navigation menu.

use folio_core::{EventKinds, EventSource, HostCommand, KeyCode, PageEvent, PageHost};
use folio_viewer::{Catalog, MediaViewer};

use crate::config::PageConfig;
use crate::form::{self, SubmitOutcome};
use crate::lazy::LazyImages;
use crate::nav::NavToggle;
use crate::snapshot::PageSnapshot;

#[derive(Debug, Clone)]
pub struct Page {
    config: PageConfig,
    viewer: MediaViewer,
    nav: NavToggle,
    lazy: LazyImages,
    has_year: bool,
    last_submit: Option<SubmitOutcome>,
}

impl Page {
    #[must_use]
    pub fn new(config: PageConfig, snapshot: &PageSnapshot) -> Self {
        let viewer = MediaViewer::new(Catalog::build(&snapshot.media), config.embeds.clone());
        let lazy = LazyImages::new(&snapshot.lazy_images, config.lazy_margin_px);
        Self {
            viewer,
            nav: NavToggle::new(),
            lazy,
            has_year: snapshot.has_year,
            last_submit: None,
            config,
        }
    }

    /// Event kinds the host must deliver.
    #[must_use]
    pub fn listeners(&self) -> EventKinds {
        let mut kinds = EventKinds::KEY | EventKinds::ACTIVATE | EventKinds::SUBMIT;
        if !self.lazy.is_empty() {
            kinds |= EventKinds::PROXIMITY;
        }
        kinds
    }

    /// One-time startup work. `year` comes from the host clock.
    pub fn start<H: PageHost + ?Sized>(&mut self, year: i32, host: &mut H) {
        if self.has_year {
            host.dispatch(HostCommand::SetYear { year });
        }
        tracing::info!(
            media = self.viewer.catalog().len(),
            lazy_images = self.lazy.len(),
            listeners = ?self.listeners().names(),
            "page started"
        );
    }

    /// Route one event. Returns `true` if something handled it.
    pub fn handle<H: PageHost + ?Sized>(&mut self, event: PageEvent, host: &mut H) -> bool {
        match event {
            PageEvent::Key { key, target } => {
                if self.viewer.handle_key(&key, target, host) {
                    return true;
                }
                key.is_press() && key.code == KeyCode::Escape && self.nav.collapse(true, host)
            }
            PageEvent::Activate { target } => {
                self.viewer.activate(target, host) || self.nav.activate(target, host)
            }
            PageEvent::Submit { fields } => {
                self.last_submit = Some(form::submit(&fields, &self.config, host));
                true
            }
            PageEvent::Proximity { image, distance_px } => {
                self.lazy.report(image, distance_px, host)
            }
        }
    }

    /// Drain `source`, handling every pending event. Returns how many were
    /// handled.
    pub fn run<S, H>(&mut self, source: &mut S, host: &mut H) -> usize
    where
        S: EventSource + ?Sized,
        H: PageHost + ?Sized,
    {
        let mut handled = 0;
        while let Some(event) = source.next_event() {
            if self.handle(event, host) {
                handled += 1;
            }
        }
        handled
    }

    /// Close the lightbox and the menu so the page is left scrollable.
    pub fn teardown<H: PageHost + ?Sized>(&mut self, host: &mut H) {
        self.viewer.close(host);
        self.nav.collapse(false, host);
    }

    #[must_use]
    pub const fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub const fn viewer(&self) -> &MediaViewer {
        &self.viewer
    }

    #[must_use]
    pub const fn nav(&self) -> &NavToggle {
        &self.nav
    }

    #[must_use]
    pub const fn lazy_images(&self) -> &LazyImages {
        &self.lazy
    }

    /// Outcome of the most recent form submission.
    #[must_use]
    pub const fn last_submit(&self) -> Option<&SubmitOutcome> {
        self.last_submit.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::LazyImageAttrs;
    use folio_core::{HostEventQueue, KeyInput, RecordingHost, Target};
    use folio_viewer::MediaEntryAttrs;
    use pretty_assertions::assert_eq;

    fn snapshot() -> PageSnapshot {
        PageSnapshot {
            media: vec![
                MediaEntryAttrs::new("video", "/a.mp4", "A"),
                MediaEntryAttrs::new("vimeo", "https://vimeo.com/2", "B"),
            ],
            lazy_images: vec![LazyImageAttrs::new("/hero.jpg")],
            has_year: true,
        }
    }

    fn page() -> Page {
        Page::new(PageConfig::default(), &snapshot())
    }

    #[test]
    fn start_writes_year_when_placeholder_exists() {
        let mut host = RecordingHost::new();
        page().start(2026, &mut host);
        assert_eq!(host.year(), Some(2026));

        let mut host = RecordingHost::new();
        Page::new(PageConfig::default(), &PageSnapshot::default()).start(2026, &mut host);
        assert_eq!(host.year(), None);
    }

    #[test]
    fn listeners_skip_proximity_without_lazy_images() {
        assert!(page().listeners().contains(EventKinds::PROXIMITY));
        let bare = Page::new(PageConfig::default(), &PageSnapshot::default());
        assert_eq!(
            bare.listeners(),
            EventKinds::KEY | EventKinds::ACTIVATE | EventKinds::SUBMIT
        );
    }

    #[test]
    fn escape_closes_lightbox_before_menu() {
        let mut page = page();
        let mut host = RecordingHost::new();
        page.handle(PageEvent::activate(Target::NavToggle), &mut host);
        page.handle(PageEvent::activate(Target::MediaEntry { index: 0 }), &mut host);

        page.handle(PageEvent::key(KeyCode::Escape), &mut host);
        assert!(!page.viewer().is_open());
        assert!(page.nav().is_expanded());

        page.handle(PageEvent::key(KeyCode::Escape), &mut host);
        assert!(!page.nav().is_expanded());
        assert_eq!(host.focused(), Some(Target::NavToggle));
    }

    #[test]
    fn run_drains_queue() {
        let mut page = page();
        let mut host = RecordingHost::new();
        let mut queue: HostEventQueue = [
            PageEvent::activate(Target::MediaEntry { index: 1 }),
            PageEvent::key(KeyCode::Right),
            PageEvent::Key {
                key: KeyInput::press(KeyCode::Char('x')),
                target: None,
            },
            PageEvent::Proximity {
                image: 0,
                distance_px: 10,
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(page.run(&mut queue, &mut host), 3);
        assert!(queue.is_empty());
        assert_eq!(page.viewer().current(), Some(0));
        assert_eq!(host.loaded_images(), &[(0, "/hero.jpg".to_string())]);
    }

    #[test]
    fn teardown_restores_scroll() {
        let mut page = page();
        let mut host = RecordingHost::new();
        page.handle(PageEvent::activate(Target::MediaEntry { index: 0 }), &mut host);
        page.handle(PageEvent::activate(Target::NavToggle), &mut host);
        page.teardown(&mut host);
        assert!(!host.scroll_locked());
        assert!(!host.nav_expanded());

        let before = host.commands().len();
        page.teardown(&mut host);
        assert_eq!(host.commands().len(), before);
    }

    #[test]
    fn submit_records_outcome() {
        let mut page = page();
        let mut host = RecordingHost::new();
        page.handle(
            PageEvent::Submit {
                fields: Default::default(),
            },
            &mut host,
        );
        assert!(matches!(
            page.last_submit(),
            Some(SubmitOutcome::Rejected(_))
        ));
    }
}
