//! Global Keys Module - Default keyboard navigation
//!
//! Provides the document-level default for:
//! - Tab: Focus next tabbable element
//! - Shift+Tab: Focus previous tabbable element
//!
//! These run only when nothing closer to the focused element consumed the
//! key, so widgets that wrap focus themselves (modal, nav menu) win.
//!
//! # Example
//!
//! ```ignore
//! use spark_widgets::state::global_keys;
//!
//! let handle = global_keys::setup_global_keys();
//! // Later, on unmount:
//! handle.cleanup();
//! ```

use super::focus;
use super::keyboard;
use crate::types::keys;

// =============================================================================
// GLOBAL KEYS HANDLE
// =============================================================================

/// Cleanup handle for global key handlers
pub struct GlobalKeysHandle {
    tab_cleanup: Option<Box<dyn FnOnce()>>,
}

impl GlobalKeysHandle {
    /// Clean up all global key handlers
    pub fn cleanup(mut self) {
        if let Some(cleanup) = self.tab_cleanup.take() {
            cleanup();
        }
    }
}

// =============================================================================
// SETUP FUNCTIONS
// =============================================================================

/// Set up sequential focus navigation.
/// Returns a handle for cleanup.
pub fn setup_global_keys() -> GlobalKeysHandle {
    let tab_cleanup = keyboard::on_key(keys::TAB, |event| {
        if event.modifiers.shift {
            focus::focus_previous();
        } else {
            focus::focus_next();
        }
        true
    });

    GlobalKeysHandle {
        tab_cleanup: Some(Box::new(tab_cleanup)),
    }
}

// =============================================================================
// TESTS
// =============================================================================
