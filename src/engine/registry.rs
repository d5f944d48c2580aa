//! Element Registry - Index allocation for parallel arrays.
//!
//! Manages the lifecycle of element indices:
//! - Key ↔ Index bidirectional mapping
//! - Free index pool for O(1) reuse
//! - ReactiveSet for allocated indices
//!
//! Keys are never reused, indices are. Anything that holds on to an index
//! across time (focus restoration, pending timers) should remember the key
//! too and compare it with [`get_key`] before touching the element again.

use std::cell::RefCell;
use std::collections::HashMap;
use spark_signals::ReactiveSet;

use super::arrays;

// =============================================================================
// Registry State
// =============================================================================

thread_local! {
    /// Map element key to array index.
    static KEY_TO_INDEX: RefCell<HashMap<String, usize>> = RefCell::new(HashMap::new());

    /// Map array index to element key.
    static INDEX_TO_KEY: RefCell<HashMap<usize, String>> = RefCell::new(HashMap::new());

    /// Set of currently allocated indices (for iteration).
    static ALLOCATED_INDICES: ReactiveSet<usize> = ReactiveSet::new();

    /// Pool of freed indices for reuse.
    static FREE_INDICES: RefCell<Vec<usize>> = RefCell::new(Vec::new());

    /// Next index to allocate if pool is empty.
    static NEXT_INDEX: RefCell<usize> = const { RefCell::new(0) };

    /// Counter for generating unique keys.
    static KEY_COUNTER: RefCell<usize> = const { RefCell::new(0) };
}

// =============================================================================
// Index Allocation
// =============================================================================

/// Allocate an index for a new element.
///
/// # Arguments
/// * `key` - Optional element key. If not provided, one is generated.
///
/// # Returns
/// The allocated index. Allocating an existing key returns its index.
pub fn allocate_index(key: Option<&str>) -> usize {
    let element_key = match key {
        Some(key) => key.to_string(),
        None => {
            KEY_COUNTER.with(|counter| {
                let mut counter = counter.borrow_mut();
                let key = format!("n{}", *counter);
                *counter += 1;
                key
            })
        }
    };

    let existing = KEY_TO_INDEX.with(|map| {
        map.borrow().get(&element_key).copied()
    });
    if let Some(index) = existing {
        return index;
    }

    let index = FREE_INDICES.with(|free| {
        let mut free = free.borrow_mut();
        if let Some(index) = free.pop() {
            index
        } else {
            NEXT_INDEX.with(|next| {
                let mut next = next.borrow_mut();
                let index = *next;
                *next += 1;
                index
            })
        }
    });

    KEY_TO_INDEX.with(|map| {
        map.borrow_mut().insert(element_key.clone(), index);
    });
    INDEX_TO_KEY.with(|map| {
        map.borrow_mut().insert(index, element_key);
    });
    ALLOCATED_INDICES.with(|set| {
        set.insert(index);
    });

    arrays::ensure_all_capacity(index);

    index
}

/// Release an index back to the pool.
///
/// Also recursively releases all children.
pub fn release_index(index: usize) {
    let key = INDEX_TO_KEY.with(|map| {
        map.borrow().get(&index).cloned()
    });
    let Some(key) = key else { return };

    for child_index in arrays::core::get_children(index) {
        release_index(child_index);
    }

    KEY_TO_INDEX.with(|map| {
        map.borrow_mut().remove(&key);
    });
    INDEX_TO_KEY.with(|map| {
        map.borrow_mut().remove(&index);
    });
    ALLOCATED_INDICES.with(|set| {
        set.remove(&index);
    });

    arrays::clear_all_at_index(index);

    FREE_INDICES.with(|free| {
        free.borrow_mut().push(index);
    });

    // Reset on zero: drop array memory once nothing is allocated
    let is_empty = ALLOCATED_INDICES.with(|set| set.is_empty());
    if is_empty {
        arrays::reset_all_arrays();
        FREE_INDICES.with(|free| {
            free.borrow_mut().clear();
        });
        NEXT_INDEX.with(|next| {
            *next.borrow_mut() = 0;
        });
    }
}

// =============================================================================
// Lookups
// =============================================================================

/// Get index for an element key.
pub fn get_index(key: &str) -> Option<usize> {
    KEY_TO_INDEX.with(|map| map.borrow().get(key).copied())
}

/// Get key for an index.
pub fn get_key(index: usize) -> Option<String> {
    INDEX_TO_KEY.with(|map| map.borrow().get(&index).cloned())
}

/// Check if an index is currently allocated.
pub fn is_allocated(index: usize) -> bool {
    ALLOCATED_INDICES.with(|set| set.contains(&index))
}

/// Get the count of currently allocated elements.
pub fn get_allocated_count() -> usize {
    ALLOCATED_INDICES.with(|set| set.len())
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Reset all registry state (for testing).
pub fn reset_registry() {
    KEY_TO_INDEX.with(|map| map.borrow_mut().clear());
    INDEX_TO_KEY.with(|map| map.borrow_mut().clear());
    ALLOCATED_INDICES.with(|set| set.clear());
    FREE_INDICES.with(|free| free.borrow_mut().clear());
    NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    KEY_COUNTER.with(|counter| *counter.borrow_mut() = 0);
    arrays::reset_all_arrays();
}
