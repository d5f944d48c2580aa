//! Interaction Arrays
//!
//! User interaction state per element as [`ElementState`] flags:
//! hovered, focused, pressed, disabled.
//!
//! Uses `TrackedSlotArray` for stable reactive cells with fine-grained tracking.

use spark_signals::TrackedSlotArray;
use crate::types::ElementState;

thread_local! {
    /// Interaction flags.
    static STATE: TrackedSlotArray<ElementState> = TrackedSlotArray::new(Some(ElementState::NONE));
}

// =============================================================================
// Capacity Management
// =============================================================================

/// Ensure arrays have capacity for the given index.
pub fn ensure_capacity(index: usize) {
    STATE.with(|arr| { let _ = arr.peek(index); });
}

/// Clear values at index.
pub fn clear_at_index(index: usize) {
    STATE.with(|arr| arr.clear(index));
}

/// Reset all arrays.
pub fn reset() {
    STATE.with(|arr| arr.clear_all());
}

// =============================================================================
// State Flags
// =============================================================================

/// Get interaction flags at index (reactive).
pub fn get_state(index: usize) -> ElementState {
    STATE.with(|arr| arr.get(index))
}

/// Set or clear a flag at index.
pub fn set_flag(index: usize, flag: ElementState, on: bool) {
    STATE.with(|arr| {
        let mut state = arr.get(index);
        if state.contains(flag) == on {
            return;
        }
        state.set(flag, on);
        arr.set_value(index, state);
    });
}

/// Is element hovered.
pub fn get_hovered(index: usize) -> bool {
    get_state(index).contains(ElementState::HOVERED)
}

/// Is element focused.
pub fn get_focused(index: usize) -> bool {
    get_state(index).contains(ElementState::FOCUSED)
}

/// Is element pressed (touch or pointer down).
pub fn get_pressed(index: usize) -> bool {
    get_state(index).contains(ElementState::PRESSED)
}

/// Is element disabled.
pub fn get_disabled(index: usize) -> bool {
    get_state(index).contains(ElementState::DISABLED)
}
