//! Focus System - Keyboard focus state and navigation
//!
//! Manages focus state and navigation:
//! - `focused` signal (currently focused element)
//! - Sequential navigation (Tab/Shift+Tab), honoring focus traps
//! - Focus trapping for modal surfaces
//! - Focus memos for restoration
//! - Focus callbacks (on_focus/on_blur)
//!
//! # Example
//!
//! ```ignore
//! use spark_widgets::state::focus;
//!
//! // Remember where focus was, move it, then put it back
//! let memo = focus::capture();
//! focus::focus(close_button);
//! if let Some(memo) = memo {
//!     memo.restore();
//! }
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use spark_signals::{signal, Signal};

use crate::engine::arrays::interaction;
use crate::engine::{self, get_key};
use crate::types::{attr, is_interactive_tag, parse_tab_index, ElementState};

// =============================================================================
// FOCUSED ELEMENT SIGNAL
// =============================================================================

thread_local! {
    static FOCUSED: Signal<Option<usize>> = signal(None);
}

/// The currently focused element, if it is still in the document.
pub fn active_element() -> Option<usize> {
    FOCUSED
        .with(|s| s.get())
        .filter(|&index| engine::is_connected(index))
}

/// Check if any element is focused
pub fn has_focus() -> bool {
    active_element().is_some()
}

/// Check if a specific element is focused
pub fn is_focused(index: usize) -> bool {
    active_element() == Some(index)
}

// =============================================================================
// FOCUSABILITY
// =============================================================================

/// Explicit `tabindex` of an element, if it parses.
pub fn tab_index(index: usize) -> Option<i32> {
    engine::get_attribute(index, attr::TABINDEX).and_then(|v| parse_tab_index(&v))
}

/// Natively interactive element (anchors only with `href`).
fn is_native_focusable(index: usize) -> bool {
    let tag = engine::tag(index);
    if tag == "a" {
        return engine::has_attribute(index, attr::HREF);
    }
    is_interactive_tag(&tag)
}

/// Can receive focus programmatically.
pub fn is_focusable(index: usize) -> bool {
    engine::is_connected(index)
        && !interaction::get_disabled(index)
        && (is_native_focusable(index) || tab_index(index).is_some())
}

/// Takes part in sequential (Tab) navigation.
pub fn is_tabbable(index: usize) -> bool {
    is_focusable(index) && tab_index(index).is_none_or(|t| t >= 0)
}

/// Tabbable elements under `root` in navigation order.
///
/// Positive `tabindex` values come first in ascending order, then everything
/// else in document order.
pub fn tabbable_within(root: usize) -> Vec<usize> {
    let mut result = engine::query_all(root, is_tabbable);
    // Stable sort keeps document order within equal keys
    result.sort_by_key(|&i| match tab_index(i) {
        Some(t) if t > 0 => (0, t),
        _ => (1, 0),
    });
    result
}

// =============================================================================
// FOCUS CALLBACKS
// =============================================================================

/// Callbacks fired when focus changes
#[derive(Default)]
pub struct FocusCallbacks {
    pub on_focus: Option<Rc<dyn Fn()>>,
    pub on_blur: Option<Rc<dyn Fn()>>,
}

struct CallbackEntry {
    id: usize,
    callbacks: FocusCallbacks,
}

thread_local! {
    static FOCUS_CALLBACK_REGISTRY: RefCell<HashMap<usize, Vec<CallbackEntry>>> = RefCell::new(HashMap::new());
    static NEXT_CALLBACK_ID: RefCell<usize> = const { RefCell::new(0) };
}

/// Register focus callbacks for an element.
/// Returns cleanup function to unregister.
pub fn register_callbacks(index: usize, callbacks: FocusCallbacks) -> impl FnOnce() {
    let id = NEXT_CALLBACK_ID.with(|next| {
        let mut next = next.borrow_mut();
        let id = *next;
        *next += 1;
        id
    });
    FOCUS_CALLBACK_REGISTRY.with(|reg| {
        reg.borrow_mut()
            .entry(index)
            .or_default()
            .push(CallbackEntry { id, callbacks });
    });

    move || {
        FOCUS_CALLBACK_REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(list) = reg.get_mut(&index) {
                list.retain(|entry| entry.id != id);
                if list.is_empty() {
                    reg.remove(&index);
                }
            }
        });
    }
}

/// Drop all focus callbacks of an element; forget focus if it held it.
pub fn cleanup_index(index: usize) {
    FOCUS_CALLBACK_REGISTRY.with(|reg| {
        reg.borrow_mut().remove(&index);
    });
    if FOCUSED.with(|s| s.get()) == Some(index) {
        FOCUSED.with(|s| s.set(None));
    }
}

fn collect_callbacks(index: usize, blur: bool) -> Vec<Rc<dyn Fn()>> {
    FOCUS_CALLBACK_REGISTRY.with(|reg| {
        reg.borrow()
            .get(&index)
            .map(|list| {
                list.iter()
                    .filter_map(|entry| {
                        if blur {
                            entry.callbacks.on_blur.clone()
                        } else {
                            entry.callbacks.on_focus.clone()
                        }
                    })
                    .collect()
            })
            .unwrap_or_default()
    })
}

/// Internal: Set focus and fire callbacks at the source
fn set_focus_with_callbacks(new_focus: Option<usize>) {
    let old_focus = FOCUSED.with(|s| s.get());
    if old_focus == new_focus {
        return;
    }

    if let Some(old) = old_focus {
        interaction::set_flag(old, ElementState::FOCUSED, false);
    }
    FOCUSED.with(|s| s.set(new_focus));
    if let Some(new) = new_focus {
        interaction::set_flag(new, ElementState::FOCUSED, true);
    }

    // Handlers are cloned out first so they may register or move focus again
    if let Some(old) = old_focus {
        for on_blur in collect_callbacks(old, true) {
            on_blur();
        }
    }
    if let Some(new) = new_focus {
        for on_focus in collect_callbacks(new, false) {
            on_focus();
        }
    }
}

// =============================================================================
// FOCUS TRAP (for modal surfaces)
// =============================================================================

thread_local! {
    static FOCUS_TRAP_STACK: RefCell<Vec<usize>> = RefCell::new(Vec::new());
}

/// Push a focus trap - sequential navigation stays inside this container
pub fn push_focus_trap(container: usize) {
    FOCUS_TRAP_STACK.with(|stack| {
        stack.borrow_mut().push(container);
    });
}

/// Remove the most recent trap for `container`, wherever it sits in the stack.
pub fn remove_focus_trap(container: usize) -> bool {
    FOCUS_TRAP_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        match stack.iter().rposition(|&c| c == container) {
            Some(position) => {
                stack.remove(position);
                true
            }
            None => false,
        }
    })
}

/// Get the current focus trap container
pub fn get_focus_trap_container() -> Option<usize> {
    FOCUS_TRAP_STACK.with(|stack| {
        stack.borrow().last().copied()
    })
}

// =============================================================================
// FOCUS MEMO (for restoration)
// =============================================================================

/// A remembered focus target that survives index recycling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusMemo {
    index: usize,
    key: Option<String>,
}

impl FocusMemo {
    /// Remember a specific element.
    pub fn of(index: usize) -> Self {
        Self { index, key: get_key(index) }
    }

    /// The remembered element index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Still the same element and still in the document.
    pub fn is_valid(&self) -> bool {
        self.key.is_some() && get_key(self.index) == self.key && engine::is_connected(self.index)
    }

    /// Move focus back. Fails silently (returns false) when the element is gone.
    pub fn restore(&self) -> bool {
        self.is_valid() && focus(self.index)
    }
}

/// Remember the currently focused element.
pub fn capture() -> Option<FocusMemo> {
    active_element().map(FocusMemo::of)
}

// =============================================================================
// FOCUS NAVIGATION
// =============================================================================

/// Scope of sequential navigation: the innermost trap, else the body.
fn navigation_root() -> usize {
    get_focus_trap_container()
        .filter(|&c| engine::is_connected(c))
        .unwrap_or_else(engine::body)
}

fn find_next_tabbable(direction: isize) -> Option<usize> {
    let tabbables = tabbable_within(navigation_root());
    if tabbables.is_empty() {
        return None;
    }

    let current_pos = active_element().and_then(|a| tabbables.iter().position(|&i| i == a));
    let len = tabbables.len() as isize;
    let next_pos = match current_pos {
        None if direction > 0 => 0,
        None => len - 1,
        Some(pos) => ((pos as isize + direction) % len + len) % len,
    };
    Some(tabbables[next_pos as usize])
}

/// Move focus to the next tabbable element
pub fn focus_next() -> bool {
    match find_next_tabbable(1) {
        Some(next) if Some(next) != active_element() => focus(next),
        _ => false,
    }
}

/// Move focus to the previous tabbable element
pub fn focus_previous() -> bool {
    match find_next_tabbable(-1) {
        Some(prev) if Some(prev) != active_element() => focus(prev),
        _ => false,
    }
}

/// Focus a specific element
pub fn focus(index: usize) -> bool {
    if !is_focusable(index) {
        return false;
    }
    if active_element() != Some(index) {
        set_focus_with_callbacks(Some(index));
    }
    true
}

/// Clear focus (focus returns to the body)
pub fn blur() {
    set_focus_with_callbacks(None);
}

// =============================================================================
// RESET (for testing)
// =============================================================================

/// Reset all focus state (for testing)
pub fn reset_focus_state() {
    FOCUSED.with(|s| s.set(None));
    FOCUS_TRAP_STACK.with(|stack| stack.borrow_mut().clear());
    FOCUS_CALLBACK_REGISTRY.with(|reg| reg.borrow_mut().clear());
}

// =============================================================================
// TESTS
// =============================================================================
