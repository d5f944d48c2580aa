//! Keyboard Module - Keyboard event state and handler registry
//!
//! Events are delivered to the focused element (or the body when nothing is
//! focused) and bubble up through its ancestors, then reach document-level
//! handlers. A handler returns `true` to consume the event, which both
//! prevents the default action and stops propagation.
//!
//! # API
//!
//! - `on(handler)` - Document-level handler for every key
//! - `on_key(key, fn)` - Document-level handler for one key
//! - `on_element(i, fn)` - Handler for events targeted at or inside element i
//!
//! # Example
//!
//! ```ignore
//! use spark_widgets::state::keyboard;
//!
//! let cleanup = keyboard::on_element(dialog, |event| {
//!     if event.key == "Escape" {
//!         close_dialog();
//!         return true;
//!     }
//!     false
//! });
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::focus;
use crate::engine;

// =============================================================================
// TYPES
// =============================================================================

/// Keyboard modifier state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Create empty modifiers
    pub fn none() -> Self {
        Self::default()
    }

    /// Create modifiers with shift
    pub fn shift() -> Self {
        Self { shift: true, ..Self::default() }
    }
}

/// Key event state (press, repeat, release)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Keyboard event
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// The key that was pressed (e.g., "a", "Enter", "ArrowUp")
    pub key: String,
    /// Modifier keys state
    pub modifiers: Modifiers,
    /// Press/repeat/release state
    pub state: KeyState,
    /// Element the event was delivered to (filled by dispatch)
    pub target: Option<usize>,
}

impl KeyboardEvent {
    /// Create a simple key press event
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
            state: KeyState::Press,
            target: None,
        }
    }

    /// Create a key press with modifiers
    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            modifiers,
            ..Self::new(key)
        }
    }

    /// Check if this is a press event
    pub fn is_press(&self) -> bool {
        self.state == KeyState::Press
    }

    /// Check key name and shift state together
    pub fn is(&self, key: &str, shift: bool) -> bool {
        self.key == key && self.modifiers.shift == shift
    }
}

/// Handler for keyboard events. Return true to consume the event.
pub type KeyHandler = Rc<dyn Fn(&KeyboardEvent) -> bool>;

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

struct HandlerRegistry {
    global_handlers: Vec<(usize, KeyHandler)>,
    key_handlers: HashMap<String, Vec<(usize, KeyHandler)>>,
    element_handlers: HashMap<usize, Vec<(usize, KeyHandler)>>,
    next_id: usize,
}

impl HandlerRegistry {
    fn new() -> Self {
        Self {
            global_handlers: Vec::new(),
            key_handlers: HashMap::new(),
            element_handlers: HashMap::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

thread_local! {
    static REGISTRY: RefCell<HandlerRegistry> = RefCell::new(HandlerRegistry::new());
}

fn handlers_for_element(index: usize) -> Vec<KeyHandler> {
    REGISTRY.with(|reg| {
        reg.borrow()
            .element_handlers
            .get(&index)
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    })
}

fn document_handlers(key: &str) -> Vec<KeyHandler> {
    REGISTRY.with(|reg| {
        let reg = reg.borrow();
        let keyed = reg
            .key_handlers
            .get(key)
            .into_iter()
            .flatten()
            .map(|(_, h)| h.clone());
        let global = reg.global_handlers.iter().map(|(_, h)| h.clone());
        keyed.chain(global).collect()
    })
}

// =============================================================================
// EVENT DISPATCH
// =============================================================================

/// Dispatch a keyboard event from the host.
///
/// Delivered to the focused element, bubbled to the body, then offered to
/// document handlers. Returns true if any handler consumed the event.
pub fn dispatch(mut event: KeyboardEvent) -> bool {
    let target = focus::active_element().unwrap_or_else(engine::body);
    event.target = Some(target);

    if !event.is_press() {
        return false;
    }

    let mut current = Some(target);
    while let Some(index) = current {
        for handler in handlers_for_element(index) {
            if handler(&event) {
                log::trace!("key {} consumed at element {}", event.key, index);
                return true;
            }
        }
        current = engine::parent(index);
    }

    document_handlers(&event.key).iter().any(|handler| handler(&event))
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Subscribe to all keyboard events at document level.
/// Returns cleanup function.
pub fn on<F>(handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> bool + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.global_handlers.push((id, Rc::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            reg.global_handlers.retain(|(handler_id, _)| *handler_id != id);
        });
    }
}

/// Subscribe to a specific key at document level.
/// Returns cleanup function.
pub fn on_key<F>(key: &str, handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> bool + 'static,
{
    let key = key.to_string();
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.key_handlers
            .entry(key.clone())
            .or_default()
            .push((id, Rc::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(handlers) = reg.key_handlers.get_mut(&key) {
                handlers.retain(|(handler_id, _)| *handler_id != id);
                if handlers.is_empty() {
                    reg.key_handlers.remove(&key);
                }
            }
        });
    }
}

/// Subscribe to events delivered to an element or bubbling through it.
/// Returns cleanup function.
pub fn on_element<F>(index: usize, handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> bool + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.element_handlers
            .entry(index)
            .or_default()
            .push((id, Rc::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(handlers) = reg.element_handlers.get_mut(&index) {
                handlers.retain(|(handler_id, _)| *handler_id != id);
                if handlers.is_empty() {
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

/// Reset keyboard state (for testing)
pub fn reset_keyboard_state() {
    REGISTRY.with(|reg| {
        *reg.borrow_mut() = HandlerRegistry::new();
    });
}

// =============================================================================
// TESTS
// =============================================================================
