//! Pointer Module - Click, hover and touch dispatch
//!
//! Hover tracking with enter/leave transitions, click bubbling, and touch
//! start/end delivery for swipe gestures. Does NOT own any input device;
//! the host reports what happened at which element.
//!
//! # API
//!
//! - `click(target)` - Activate an element (bubbles until consumed)
//! - `hover(target)` / `leave_document()` - Move the pointer
//! - `touch_start(target, x, y)` / `touch_end(target, x, y)` - Touch gestures
//! - `on_element(index, handlers)` - Per-element handlers
//! - `hovered_element` - Currently hovered (innermost) element
//!
//! # Example
//!
//! ```ignore
//! use spark_widgets::state::pointer;
//!
//! let cleanup = pointer::on_element(next_button, PointerHandlers {
//!     on_click: Some(Rc::new(|_| { next_slide(); true })),
//!     ..Default::default()
//! });
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use spark_signals::{signal, Signal};

use crate::engine::arrays::interaction;
use crate::engine;
use crate::types::ElementState;

// =============================================================================
// TYPES
// =============================================================================

/// Pointer action type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Click,
    Enter,
    Leave,
    TouchStart,
    TouchEnd,
}

/// Pointer event
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    /// What happened
    pub action: PointerAction,
    /// Innermost element the pointer acted on
    pub target: usize,
    /// Horizontal client coordinate in pixels
    pub x: f64,
    /// Vertical client coordinate in pixels
    pub y: f64,
}

impl PointerEvent {
    fn new(action: PointerAction, target: usize, x: f64, y: f64) -> Self {
        Self { action, target, x, y }
    }
}

/// Click handler. Return true to stop propagation.
pub type ClickHandler = Rc<dyn Fn(&PointerEvent) -> bool>;

/// Handler for enter/leave/touch events (no return value).
pub type PointerCallback = Rc<dyn Fn(&PointerEvent)>;

/// Handlers for an element.
#[derive(Default, Clone)]
pub struct PointerHandlers {
    pub on_click: Option<ClickHandler>,
    pub on_enter: Option<PointerCallback>,
    pub on_leave: Option<PointerCallback>,
    pub on_touch_start: Option<PointerCallback>,
    pub on_touch_end: Option<PointerCallback>,
}

impl PointerHandlers {
    /// Handlers with only a click callback.
    pub fn click(handler: impl Fn(&PointerEvent) -> bool + 'static) -> Self {
        Self {
            on_click: Some(Rc::new(handler)),
            ..Default::default()
        }
    }
}

// =============================================================================
// REACTIVE STATE
// =============================================================================

thread_local! {
    static HOVERED_ELEMENT: Signal<Option<usize>> = signal(None);
    static HOVER_PATH: RefCell<Vec<usize>> = RefCell::new(Vec::new());
}

/// Get the currently hovered (innermost) element
pub fn hovered_element() -> Option<usize> {
    HOVERED_ELEMENT.with(|s| s.get())
}

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

struct HandlerRegistry {
    element_handlers: HashMap<usize, Vec<(usize, PointerHandlers)>>,
    next_id: usize,
}

impl HandlerRegistry {
    fn new() -> Self {
        Self {
            element_handlers: HashMap::new(),
            next_id: 0,
        }
    }
}

thread_local! {
    static REGISTRY: RefCell<HandlerRegistry> = RefCell::new(HandlerRegistry::new());
}

fn handlers_for(index: usize) -> Vec<PointerHandlers> {
    REGISTRY.with(|reg| {
        reg.borrow()
            .element_handlers
            .get(&index)
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    })
}

/// Register handlers for an element. Returns cleanup function.
pub fn on_element(index: usize, handlers: PointerHandlers) -> impl FnOnce() {
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.element_handlers.entry(index).or_default().push((id, handlers));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(list) = reg.element_handlers.get_mut(&index) {
                list.retain(|(handler_id, _)| *handler_id != id);
                if list.is_empty() {
                    reg.element_handlers.remove(&index);
                }
            }
        });
    }
}

/// Clean up all handlers for an element index.
pub fn cleanup_index(index: usize) {
    REGISTRY.with(|reg| {
        reg.borrow_mut().element_handlers.remove(&index);
    });
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Target and its ancestors, innermost first.
fn propagation_path(target: usize) -> Vec<usize> {
    let mut path = Vec::new();
    let mut current = Some(target);
    while let Some(index) = current {
        path.push(index);
        current = engine::parent(index);
    }
    path
}

/// Activate an element. Returns true if a handler stopped propagation.
pub fn click(target: usize) -> bool {
    let event = PointerEvent::new(PointerAction::Click, target, 0.0, 0.0);

    for index in propagation_path(target) {
        for handlers in handlers_for(index) {
            if let Some(on_click) = handlers.on_click {
                if on_click(&event) {
                    return true;
                }
            }
        }
    }
    false
}

/// Move the pointer over `target` (or out of the document with `None`).
///
/// Fires leave on elements no longer under the pointer (innermost first)
/// and enter on newly covered elements (outermost first). Neither bubbles.
pub fn hover(target: Option<usize>) {
    let new_path = target.map(propagation_path).unwrap_or_default();
    let old_path = HOVER_PATH.with(|p| p.replace(new_path.clone()));
    HOVERED_ELEMENT.with(|s| s.set(target));

    for &index in old_path.iter().filter(|i| !new_path.contains(i)) {
        interaction::set_flag(index, ElementState::HOVERED, false);
        let event = PointerEvent::new(PointerAction::Leave, index, 0.0, 0.0);
        for handlers in handlers_for(index) {
            if let Some(on_leave) = handlers.on_leave {
                on_leave(&event);
            }
        }
    }

    for &index in new_path.iter().rev().filter(|i| !old_path.contains(i)) {
        interaction::set_flag(index, ElementState::HOVERED, true);
        let event = PointerEvent::new(PointerAction::Enter, index, 0.0, 0.0);
        for handlers in handlers_for(index) {
            if let Some(on_enter) = handlers.on_enter {
                on_enter(&event);
            }
        }
    }
}

/// Pointer left the document entirely.
pub fn leave_document() {
    hover(None);
}

fn dispatch_touch(action: PointerAction, target: usize, x: f64, y: f64) {
    let event = PointerEvent::new(action, target, x, y);

    for index in propagation_path(target) {
        for handlers in handlers_for(index) {
            let callback = match action {
                PointerAction::TouchStart => handlers.on_touch_start,
                _ => handlers.on_touch_end,
            };
            if let Some(callback) = callback {
                callback(&event);
            }
        }
    }
}

/// A touch began on `target` at client position (x, y).
pub fn touch_start(target: usize, x: f64, y: f64) {
    interaction::set_flag(target, ElementState::PRESSED, true);
    dispatch_touch(PointerAction::TouchStart, target, x, y);
}

/// A touch ended on `target` at client position (x, y).
pub fn touch_end(target: usize, x: f64, y: f64) {
    interaction::set_flag(target, ElementState::PRESSED, false);
    dispatch_touch(PointerAction::TouchEnd, target, x, y);
}

/// Reset pointer state (for testing)
pub fn reset_pointer_state() {
    REGISTRY.with(|reg| *reg.borrow_mut() = HandlerRegistry::new());
    HOVER_PATH.with(|p| p.borrow_mut().clear());
    HOVERED_ELEMENT.with(|s| s.set(None));
}

// =============================================================================
// TESTS
// =============================================================================
