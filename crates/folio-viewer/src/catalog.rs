#![forbid(unsafe_code)]

use crate::descriptor::{MediaDescriptor, MediaEntryAttrs};

/// Ordered, read-only list of the page's media entries.
///
/// Built once from the entries in document order; its length bounds every
/// navigator index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<MediaDescriptor>,
}

impl Catalog {
    /// Build the catalog from element attributes in document order.
    #[must_use]
    pub fn build<'a>(entries: impl IntoIterator<Item = &'a MediaEntryAttrs>) -> Self {
        let entries: Vec<MediaDescriptor> = entries
            .into_iter()
            .map(MediaDescriptor::from_attrs)
            .collect();
        tracing::debug!(entries = entries.len(), "media catalog built");
        Self { entries }
    }

    #[must_use]
    pub fn from_descriptors(entries: Vec<MediaDescriptor>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MediaDescriptor> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaDescriptor> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::MediaKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn build_preserves_document_order() {
        let attrs = vec![
            MediaEntryAttrs::new("youtube", "https://youtu.be/a", "First"),
            MediaEntryAttrs::new("video", "/reel.mp4", "Second"),
            MediaEntryAttrs::new("vimeo", "https://vimeo.com/3", "Third"),
        ];
        let catalog = Catalog::build(&attrs);

        let titles: Vec<&str> = catalog.iter().map(MediaDescriptor::title).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
        assert_eq!(catalog.get(1).map(MediaDescriptor::kind), Some(&MediaKind::Video));
        assert_eq!(catalog.get(3), None);
    }

    #[test]
    fn no_entries_yields_empty_catalog() {
        let catalog = Catalog::build(&[]);
        assert!(catalog.is_empty());
        assert_eq!(catalog.len(), 0);
    }
}
