//! Attribute Arrays
//!
//! - attributes: Name → value map (ordered for stable iteration)
//! - classes: Class list in insertion order
//!
//! Reads return owned copies; mutators read-modify-write the slot and skip
//! the write when nothing changed.

use std::collections::BTreeMap;
use spark_signals::TrackedSlotArray;

thread_local! {
    /// Attribute map per element.
    static ATTRIBUTES: TrackedSlotArray<BTreeMap<String, String>> = TrackedSlotArray::new(Some(BTreeMap::new()));

    /// Class list per element.
    static CLASSES: TrackedSlotArray<Vec<String>> = TrackedSlotArray::new(Some(Vec::new()));
}

// =============================================================================
// Capacity Management
// =============================================================================

/// Ensure arrays have capacity for the given index.
pub fn ensure_capacity(index: usize) {
    ATTRIBUTES.with(|arr| { let _ = arr.peek(index); });
    CLASSES.with(|arr| { let _ = arr.peek(index); });
}

/// Clear values at index.
pub fn clear_at_index(index: usize) {
    ATTRIBUTES.with(|arr| arr.clear(index));
    CLASSES.with(|arr| arr.clear(index));
}

/// Reset all arrays.
pub fn reset() {
    ATTRIBUTES.with(|arr| arr.clear_all());
    CLASSES.with(|arr| arr.clear_all());
}

// =============================================================================
// Attributes
// =============================================================================

/// Get a single attribute value (reactive).
pub fn get_attribute(index: usize, name: &str) -> Option<String> {
    ATTRIBUTES.with(|arr| arr.get(index).get(name).cloned())
}

/// Get every attribute of an element (reactive).
pub fn get_attributes(index: usize) -> BTreeMap<String, String> {
    ATTRIBUTES.with(|arr| arr.get(index))
}

/// Set an attribute. Writing the current value is a no-op.
pub fn set_attribute(index: usize, name: &str, value: &str) {
    ATTRIBUTES.with(|arr| {
        let mut map = arr.get(index);
        if map.get(name).map(String::as_str) == Some(value) {
            return;
        }
        map.insert(name.to_string(), value.to_string());
        arr.set_value(index, map);
    });
}

/// Remove an attribute if present.
pub fn remove_attribute(index: usize, name: &str) {
    ATTRIBUTES.with(|arr| {
        let mut map = arr.get(index);
        if map.remove(name).is_some() {
            arr.set_value(index, map);
        }
    });
}

// =============================================================================
// Classes
// =============================================================================

/// Get the class list (reactive).
pub fn get_classes(index: usize) -> Vec<String> {
    CLASSES.with(|arr| arr.get(index))
}

/// Check class membership (reactive).
pub fn has_class(index: usize, class: &str) -> bool {
    CLASSES.with(|arr| arr.get(index).iter().any(|c| c == class))
}

/// Add a class if absent.
pub fn add_class(index: usize, class: &str) {
    CLASSES.with(|arr| {
        let mut classes = arr.get(index);
        if classes.iter().any(|c| c == class) {
            return;
        }
        classes.push(class.to_string());
        arr.set_value(index, classes);
    });
}

/// Remove a class if present.
pub fn remove_class(index: usize, class: &str) {
    CLASSES.with(|arr| {
        let mut classes = arr.get(index);
        let before = classes.len();
        classes.retain(|c| c != class);
        if classes.len() != before {
            arr.set_value(index, classes);
        }
    });
}
