#![forbid(unsafe_code)]

/// Open/closed state and current index over a catalog of fixed size.
///
/// `current()` is `Some(i)` exactly when the viewer is open, and then
/// `i < len()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navigator {
    len: usize,
    current: Option<usize>,
}

impl Navigator {
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self { len, current: None }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn current(&self) -> Option<usize> {
        self.current
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Move to `index`. Returns `false` and leaves state unchanged when the
    /// index is outside `[0, len)`.
    ///
    /// Takes a signed index so callers can pass host-supplied values
    /// (including `-1`) without pre-validating them.
    pub fn open(&mut self, index: isize) -> bool {
        usize::try_from(index).is_ok_and(|i| self.open_at(i))
    }

    /// Unsigned form of [`Navigator::open`].
    pub fn open_at(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.current = Some(index);
        true
    }

    /// Returns the index that was open, if any.
    pub fn close(&mut self) -> Option<usize> {
        self.current.take()
    }

    /// Index after the current one, wrapping to the start.
    #[must_use]
    pub fn next_index(&self) -> Option<usize> {
        self.current.map(|i| (i + 1) % self.len)
    }

    /// Index before the current one, wrapping to the end.
    #[must_use]
    pub fn prev_index(&self) -> Option<usize> {
        self.current.map(|i| (i + self.len - 1) % self.len)
    }
}
