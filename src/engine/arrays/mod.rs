//! Element Parallel Arrays
//!
//! All element state lives in these parallel arrays.
//! Each array index corresponds to one element of the document.
//!
//! All arrays use `TrackedSlotArray` so that readers inside deriveds or
//! effects only re-run when the specific indices they touched change.
//!
//! # Array Categories
//!
//! - **core**: Tag, parent, children, own text
//! - **attributes**: Attribute map and class list
//! - **interaction**: Hover/focus/pressed/disabled flags

pub mod core;
pub mod attributes;
pub mod interaction;

use self::core as core_arrays;
use self::attributes as attribute_arrays;
use self::interaction as interaction_arrays;

/// Ensure all arrays have capacity for the given index.
///
/// Called by registry when allocating.
pub fn ensure_all_capacity(index: usize) {
    core_arrays::ensure_capacity(index);
    attribute_arrays::ensure_capacity(index);
    interaction_arrays::ensure_capacity(index);
}

/// Clear all array values at an index.
///
/// Called by registry when releasing.
pub fn clear_all_at_index(index: usize) {
    core_arrays::clear_at_index(index);
    attribute_arrays::clear_at_index(index);
    interaction_arrays::clear_at_index(index);
}

/// Reset all parallel arrays to release memory.
pub fn reset_all_arrays() {
    core_arrays::reset();
    attribute_arrays::reset();
    interaction_arrays::reset();
}
