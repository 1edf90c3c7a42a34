#![forbid(unsafe_code)]

use folio_core::{HostCommand, PageHost};

use crate::snapshot::LazyImageAttrs;

#[derive(Debug, Clone, PartialEq, Eq)]
struct LazyImage {
    data_src: Option<String>,
    observed: bool,
}

/// One-shot observer over the page's deferred images.
///
/// Each image loads at most once: the first proximity report inside the
/// margin swaps its source in and stops observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyImages {
    images: Vec<LazyImage>,
    margin_px: u32,
}

impl LazyImages {
    #[must_use]
    pub fn new<'a>(attrs: impl IntoIterator<Item = &'a LazyImageAttrs>, margin_px: u32) -> Self {
        let images = attrs
            .into_iter()
            .map(|a| LazyImage {
                data_src: a
                    .data_src
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
                observed: true,
            })
            .collect();
        Self { images, margin_px }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Images still waiting to come into range.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.images.iter().filter(|i| i.observed).count()
    }

    /// Handle a proximity report. Returns `true` if the image was released.
    pub fn report<H: PageHost + ?Sized>(
        &mut self,
        index: usize,
        distance_px: u32,
        host: &mut H,
    ) -> bool {
        let margin = self.margin_px;
        let Some(image) = self.images.get_mut(index).filter(|i| i.observed) else {
            tracing::trace!(index, "proximity for unobserved image");
            return false;
        };
        if distance_px > margin {
            return false;
        }

        image.observed = false;
        if let Some(src) = image.data_src.clone() {
            tracing::debug!(index, %src, "loading deferred image");
            host.dispatch(HostCommand::LoadImage { index, src });
        }
        host.dispatch(HostCommand::UnobserveImage { index });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::RecordingHost;
    use pretty_assertions::assert_eq;

    fn images() -> LazyImages {
        let attrs = vec![
            LazyImageAttrs::new("/a.jpg"),
            LazyImageAttrs::default(),
            LazyImageAttrs::new("/c.jpg"),
        ];
        LazyImages::new(&attrs, 200)
    }

    #[test]
    fn loads_inside_margin_once() {
        let mut lazy = images();
        let mut host = RecordingHost::new();
        assert!(!lazy.report(0, 201, &mut host));
        assert!(lazy.report(0, 200, &mut host));
        assert!(!lazy.report(0, 0, &mut host));

        assert_eq!(host.loaded_images(), &[(0, "/a.jpg".to_string())]);
        assert_eq!(host.unobserved_images(), &[0]);
        assert_eq!(lazy.pending(), 2);
    }

    #[test]
    fn image_without_source_is_just_unobserved() {
        let mut lazy = images();
        let mut host = RecordingHost::new();
        assert!(lazy.report(1, 0, &mut host));
        assert!(host.loaded_images().is_empty());
        assert_eq!(host.unobserved_images(), &[1]);
    }

    #[test]
    fn unknown_index_is_ignored() {
        let mut lazy = images();
        let mut host = RecordingHost::new();
        assert!(!lazy.report(9, 0, &mut host));
        assert!(host.commands().is_empty());
    }
}
