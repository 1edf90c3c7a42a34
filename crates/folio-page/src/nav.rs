#![forbid(unsafe_code)]

use folio_core::{HostCommand, PageHost, Target};

/// Mobile navigation menu toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavToggle {
    expanded: bool,
}

impl NavToggle {
    #[must_use]
    pub const fn new() -> Self {
        Self { expanded: false }
    }

    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Flip the menu between expanded and collapsed.
    pub fn toggle<H: PageHost + ?Sized>(&mut self, host: &mut H) {
        self.expanded = !self.expanded;
        tracing::trace!(expanded = self.expanded, "nav toggled");
        host.dispatch(HostCommand::SetNavExpanded {
            expanded: self.expanded,
        });
    }

    /// Collapse if expanded. With `restore_focus`, focus goes back to the
    /// toggle button.
    pub fn collapse<H: PageHost + ?Sized>(&mut self, restore_focus: bool, host: &mut H) -> bool {
        if !self.expanded {
            return false;
        }
        self.expanded = false;
        host.dispatch(HostCommand::SetNavExpanded { expanded: false });
        if restore_focus {
            host.dispatch(HostCommand::Focus {
                target: Target::NavToggle,
            });
        }
        true
    }

    /// Returns `true` if `target` belongs to the navigation.
    pub fn activate<H: PageHost + ?Sized>(&mut self, target: Target, host: &mut H) -> bool {
        match target {
            Target::NavToggle => {
                self.toggle(host);
                true
            }
            // Following a link closes the menu; the link itself still navigates.
            Target::NavLink => {
                self.collapse(false, host);
                true
            }
            _ => false,
        }
    }
}
