//! FocusTrap - Tab containment inside a container
//!
//! Snapshots the focusable descendants of a container and wraps Tab /
//! Shift+Tab at the ends of that list. The snapshot is not refreshed when
//! the container's content changes later.

use crate::engine;
use crate::state::focus;
use crate::types::{attr, is_interactive_tag};

/// Focusable descendants of `container` in document order.
///
/// Natively interactive elements (anchors need `href`) and anything with a
/// non-negative `tabindex`. A negative `tabindex` always excludes.
pub fn focusable_within(container: usize) -> Vec<usize> {
    engine::query_all(container, |index| {
        if !engine::is_connected(index) {
            return false;
        }
        match focus::tab_index(index) {
            Some(t) if t < 0 => false,
            Some(_) => true,
            None => {
                let tag = engine::tag(index);
                if tag == "a" {
                    engine::has_attribute(index, attr::HREF)
                } else {
                    is_interactive_tag(&tag)
                }
            }
        }
    })
}

/// Captured focus set of a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusTrap {
    container: usize,
    elements: Vec<usize>,
}

impl FocusTrap {
    /// Snapshot the focusable elements of `container`.
    pub fn capture(container: usize) -> Self {
        Self {
            container,
            elements: focusable_within(container),
        }
    }

    pub fn container(&self) -> usize {
        self.container
    }

    pub fn elements(&self) -> &[usize] {
        &self.elements
    }

    pub fn first(&self) -> Option<usize> {
        self.elements.first().copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.elements.last().copied()
    }

    /// Wrap focus at the boundaries. Returns true when the key was consumed.
    ///
    /// Tab on the last element goes to the first; Shift+Tab on the first goes
    /// to the last. Anywhere else the default navigation proceeds.
    pub fn handle_tab(&self, shift: bool) -> bool {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return false;
        };
        let active = focus::active_element();
        if shift && active == Some(first) {
            focus::focus(last);
            true
        } else if !shift && active == Some(last) {
            focus::focus(first);
            true
        } else {
            false
        }
    }
}
