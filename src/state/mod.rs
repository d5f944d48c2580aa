//! State Module - Runtime state management systems
//!
//! This module contains the state systems that make the document interactive:
//!
//! - **Focus** - Focused element, focus traps, sequential navigation, memos
//! - **Keyboard** - Event types, bubbling dispatch, handler registry
//! - **Global keys** - Default Tab / Shift+Tab navigation
//! - **Pointer** - Click bubbling, hover enter/leave, touch gestures
//! - **Input** - Host event routing, field edits, form submission
//! - **Timers** - Host-driven clock, timeouts, intervals, scopes
//! - **Scroll lock** - Counted page scroll suppression
//! - **Events** - Widget notifications (`modal:open`, `tabs:change`, ...)
//! - **Announcer** - Live-region announcements

pub mod announcer;
pub mod events;
pub mod focus;
pub mod global_keys;
pub mod input;
pub mod keyboard;
pub mod pointer;
pub mod scroll_lock;
pub mod timers;

/// Drop every handler registered on an element index.
pub fn cleanup_element(index: usize) {
    keyboard::cleanup_index(index);
    pointer::cleanup_index(index);
    events::cleanup_index(index);
    input::cleanup_index(index);
    focus::cleanup_index(index);
}

/// Reset every state system (for testing).
pub fn reset_all_state() {
    focus::reset_focus_state();
    keyboard::reset_keyboard_state();
    pointer::reset_pointer_state();
    input::reset_input_state();
    events::reset_events();
    timers::reset_timers();
    scroll_lock::reset_scroll_lock();
}
