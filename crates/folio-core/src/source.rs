#![forbid(unsafe_code)]

//! Host-driven event sources.
//!
//! The page never polls the browser. The embedding environment pushes events
//! into a queue and the page drains it; a drained queue means "nothing to do
//! until the host pushes again".

use std::collections::VecDeque;

use crate::event::PageEvent;

/// Anything that emits page events in delivery order.
pub trait EventSource {
    /// Pop the next pending event, if any. Never blocks.
    fn next_event(&mut self) -> Option<PageEvent>;

    /// Whether events are pending.
    fn has_pending(&self) -> bool;
}

/// FIFO queue the host pushes normalized events into.
#[derive(Debug, Clone, Default)]
pub struct HostEventQueue {
    queue: VecDeque<PageEvent>,
}

impl HostEventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a normalized event.
    pub fn push_event(&mut self, event: PageEvent) {
        self.queue.push_back(event);
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drain all pending events.
    pub fn drain_events(&mut self) -> impl Iterator<Item = PageEvent> + '_ {
        self.queue.drain(..)
    }
}

impl EventSource for HostEventQueue {
    fn next_event(&mut self) -> Option<PageEvent> {
        self.queue.pop_front()
    }

    fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }
}

impl Extend<PageEvent> for HostEventQueue {
    fn extend<I: IntoIterator<Item = PageEvent>>(&mut self, iter: I) {
        self.queue.extend(iter);
    }
}

impl FromIterator<PageEvent> for HostEventQueue {
    fn from_iter<I: IntoIterator<Item = PageEvent>>(iter: I) -> Self {
        Self {
            queue: iter.into_iter().collect(),
        }
    }
}
