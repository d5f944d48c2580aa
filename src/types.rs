//! Core types for spark-widgets.
//!
//! These types define the foundation that everything builds on:
//! element interaction flags, the attribute vocabulary the widgets speak,
//! and the small helpers that turn booleans into ARIA attribute values.

// =============================================================================
// Element State (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Interaction state of an element as a bitfield.
    ///
    /// Combine with bitwise OR: `ElementState::HOVERED | ElementState::FOCUSED`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ElementState: u8 {
        const NONE = 0;
        const HOVERED = 1 << 0;
        const FOCUSED = 1 << 1;
        const PRESSED = 1 << 2;
        const DISABLED = 1 << 3;
    }
}

// =============================================================================
// Attribute Vocabulary
// =============================================================================

/// Attribute names read and written by the widgets.
pub mod attr {
    pub const ID: &str = "id";
    pub const ROLE: &str = "role";
    pub const TYPE: &str = "type";
    pub const HREF: &str = "href";
    pub const NAME: &str = "name";
    pub const VALUE: &str = "value";
    pub const STYLE: &str = "style";
    pub const TABINDEX: &str = "tabindex";
    pub const DISABLED: &str = "disabled";
    pub const REQUIRED: &str = "required";

    pub const ARIA_HIDDEN: &str = "aria-hidden";
    pub const ARIA_MODAL: &str = "aria-modal";
    pub const ARIA_LABEL: &str = "aria-label";
    pub const ARIA_SELECTED: &str = "aria-selected";
    pub const ARIA_CONTROLS: &str = "aria-controls";
    pub const ARIA_LABELLEDBY: &str = "aria-labelledby";
    pub const ARIA_EXPANDED: &str = "aria-expanded";
    pub const ARIA_LIVE: &str = "aria-live";
    pub const ARIA_ATOMIC: &str = "aria-atomic";

    pub const DATA_MODAL_TRIGGER: &str = "data-modal-trigger";
    pub const DATA_TABS: &str = "data-tabs";
    pub const DATA_CAROUSEL: &str = "data-carousel";
}

/// Key names as delivered by the host (`KeyboardEvent::key`).
pub mod keys {
    pub const TAB: &str = "Tab";
    pub const ESCAPE: &str = "Escape";
    pub const ARROW_LEFT: &str = "ArrowLeft";
    pub const ARROW_RIGHT: &str = "ArrowRight";
    pub const HOME: &str = "Home";
    pub const END: &str = "End";
}

/// Render a boolean the way ARIA attributes expect it.
pub fn aria_bool(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Tags that take part in sequential focus navigation without a `tabindex`.
///
/// Anchors only count when they carry an `href`, which the caller checks.
pub fn is_interactive_tag(tag: &str) -> bool {
    matches!(tag, "button" | "a" | "input" | "select" | "textarea")
}

/// Parse a `tabindex` attribute value.
///
/// Anything that isn't an integer is treated as absent, like browsers do.
pub fn parse_tab_index(value: &str) -> Option<i32> {
    value.trim().parse::<i32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aria_bool() {
        assert_eq!(aria_bool(true), "true");
        assert_eq!(aria_bool(false), "false");
    }

    #[test]
    fn test_parse_tab_index() {
        assert_eq!(parse_tab_index("0"), Some(0));
        assert_eq!(parse_tab_index(" -1 "), Some(-1));
        assert_eq!(parse_tab_index("3"), Some(3));
        assert_eq!(parse_tab_index("abc"), None);
        assert_eq!(parse_tab_index(""), None);
    }

    #[test]
    fn test_element_state_flags() {
        let mut state = ElementState::NONE;
        state.insert(ElementState::HOVERED | ElementState::FOCUSED);
        assert!(state.contains(ElementState::HOVERED));
        state.remove(ElementState::HOVERED);
        assert_eq!(state, ElementState::FOCUSED);
    }
}
