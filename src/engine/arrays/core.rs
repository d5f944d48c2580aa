//! Core Arrays
//!
//! Structural element properties:
//! - tag: Lowercase tag name ("div", "button", ...)
//! - parent: Parent index (None for detached roots)
//! - children: Child indices in document order
//! - text: The element's own text content

use spark_signals::TrackedSlotArray;

thread_local! {
    /// Lowercase tag name.
    static TAG: TrackedSlotArray<String> = TrackedSlotArray::new(Some(String::new()));

    /// Parent element index.
    static PARENT: TrackedSlotArray<Option<usize>> = TrackedSlotArray::new(Some(None));

    /// Child indices in document order.
    static CHILDREN: TrackedSlotArray<Vec<usize>> = TrackedSlotArray::new(Some(Vec::new()));

    /// Own text content.
    static TEXT: TrackedSlotArray<String> = TrackedSlotArray::new(Some(String::new()));
}

// =============================================================================
// Capacity Management
// =============================================================================

/// Ensure arrays have capacity for the given index.
pub fn ensure_capacity(index: usize) {
    TAG.with(|arr| { let _ = arr.peek(index); });
    PARENT.with(|arr| { let _ = arr.peek(index); });
    CHILDREN.with(|arr| { let _ = arr.peek(index); });
    TEXT.with(|arr| { let _ = arr.peek(index); });
}

/// Clear values at index.
pub fn clear_at_index(index: usize) {
    TAG.with(|arr| arr.clear(index));
    PARENT.with(|arr| arr.clear(index));
    CHILDREN.with(|arr| arr.clear(index));
    TEXT.with(|arr| arr.clear(index));
}

/// Reset all arrays.
pub fn reset() {
    TAG.with(|arr| arr.clear_all());
    PARENT.with(|arr| arr.clear_all());
    CHILDREN.with(|arr| arr.clear_all());
    TEXT.with(|arr| arr.clear_all());
}

// =============================================================================
// Tag
// =============================================================================

/// Get tag name at index (reactive).
pub fn get_tag(index: usize) -> String {
    TAG.with(|arr| arr.get(index))
}

/// Set tag name at index.
pub fn set_tag(index: usize, tag: String) {
    TAG.with(|arr| arr.set_value(index, tag));
}

// =============================================================================
// Tree Links
// =============================================================================

/// Get parent index (reactive).
pub fn get_parent(index: usize) -> Option<usize> {
    PARENT.with(|arr| arr.get(index))
}

/// Set parent index.
pub fn set_parent(index: usize, parent: Option<usize>) {
    PARENT.with(|arr| arr.set_value(index, parent));
}

/// Get child indices (reactive).
pub fn get_children(index: usize) -> Vec<usize> {
    CHILDREN.with(|arr| arr.get(index))
}

/// Replace child indices.
pub fn set_children(index: usize, children: Vec<usize>) {
    CHILDREN.with(|arr| arr.set_value(index, children));
}

// =============================================================================
// Text
// =============================================================================

/// Get own text content (reactive).
pub fn get_text(index: usize) -> String {
    TEXT.with(|arr| arr.get(index))
}

/// Set own text content.
pub fn set_text(index: usize, text: String) {
    TEXT.with(|arr| arr.set_value(index, text));
}
