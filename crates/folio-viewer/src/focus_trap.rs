#![forbid(unsafe_code)]

use folio_core::Target;

/// Keeps keyboard focus cycling inside the lightbox while it is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTrap {
    stops: Vec<Target>,
    position: Option<usize>,
}

impl Default for FocusTrap {
    fn default() -> Self {
        Self::surface()
    }
}

impl FocusTrap {
    /// Trap over explicit focus stops, in tab order.
    #[must_use]
    pub fn new(stops: Vec<Target>) -> Self {
        Self {
            stops,
            position: None,
        }
    }

    /// The lightbox controls: dismiss first, then prev, then next.
    #[must_use]
    pub fn surface() -> Self {
        Self::new(vec![
            Target::SurfaceClose,
            Target::SurfacePrev,
            Target::SurfaceNext,
        ])
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.position.is_some()
    }

    /// Activate the trap and return the stop that should receive focus.
    pub fn engage(&mut self) -> Option<Target> {
        let first = *self.stops.first()?;
        self.position = Some(0);
        Some(first)
    }

    pub fn release(&mut self) {
        self.position = None;
    }

    /// Record that focus landed on `target` by other means (pointer).
    pub fn sync(&mut self, target: Target) {
        if !self.is_active() {
            return;
        }
        if let Some(pos) = self.stops.iter().position(|s| *s == target) {
            self.position = Some(pos);
        }
    }

    /// Move focus one stop forward (`Tab`) or backward (`Shift+Tab`),
    /// wrapping at both ends. `None` while released.
    pub fn step(&mut self, backwards: bool) -> Option<Target> {
        let pos = self.position?;
        let len = self.stops.len();
        let next = if backwards {
            (pos + len - 1) % len
        } else {
            (pos + 1) % len
        };
        self.position = Some(next);
        Some(self.stops[next])
    }
}
