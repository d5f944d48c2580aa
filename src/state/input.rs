//! Input Module - Host event routing and form field events
//!
//! The host reports everything through one `InputEvent` enum; `route_event`
//! hands each variant to the module that owns it. Field edits and form
//! submissions are handled here as well.
//!
//! # API
//!
//! - `route_event` - Dispatch a host event to the right module
//! - `set_value(field, value)` - User edited a field (fires input listeners)
//! - `submit(form)` - User submitted a form (fires submit listeners)
//! - `on_input` / `on_submit` - Listener registration
//!
//! # Example
//!
//! ```ignore
//! use spark_widgets::state::input::{route_event, InputEvent};
//!
//! route_event(InputEvent::Click(next_button));
//! route_event(InputEvent::Tick(16));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::keyboard::{self, KeyboardEvent};
use super::{focus, pointer, timers};
use crate::engine;
use crate::types::attr;

// =============================================================================
// INPUT EVENT ENUM
// =============================================================================

/// Unified host event
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Key press delivered to the focused element
    Key(KeyboardEvent),
    /// Primary activation of an element
    Click(usize),
    /// Pointer moved over an element (`None`: left the document)
    Hover(Option<usize>),
    /// Touch began
    TouchStart { target: usize, x: f64, y: f64 },
    /// Touch ended
    TouchEnd { target: usize, x: f64, y: f64 },
    /// Focus moved by the user (pointer focus, not sequential navigation)
    Focus(usize),
    /// Field value edited
    Input { target: usize, value: String },
    /// Form submitted
    Submit(usize),
    /// Clock advanced by this many milliseconds
    Tick(u64),
}

/// Route a host event. Returns true if it was consumed.
pub fn route_event(event: InputEvent) -> bool {
    match event {
        InputEvent::Key(key) => keyboard::dispatch(key),
        InputEvent::Click(target) => {
            // Activation moves focus onto focusable targets first
            focus::focus(target);
            pointer::click(target)
        }
        InputEvent::Hover(target) => {
            pointer::hover(target);
            false
        }
        InputEvent::TouchStart { target, x, y } => {
            pointer::touch_start(target, x, y);
            false
        }
        InputEvent::TouchEnd { target, x, y } => {
            pointer::touch_end(target, x, y);
            false
        }
        InputEvent::Focus(target) => focus::focus(target),
        InputEvent::Input { target, value } => {
            set_value(target, &value);
            false
        }
        InputEvent::Submit(form) => submit(form),
        InputEvent::Tick(ms) => {
            timers::advance(ms);
            false
        }
    }
}

// =============================================================================
// FIELD LISTENERS
// =============================================================================

pub type InputHandler = Rc<dyn Fn(usize, &str)>;
pub type SubmitHandler = Rc<dyn Fn(usize)>;

#[derive(Default)]
struct ListenerRegistry {
    input: HashMap<usize, Vec<(usize, InputHandler)>>,
    submit: HashMap<usize, Vec<(usize, SubmitHandler)>>,
    next_id: usize,
}

thread_local! {
    static REGISTRY: RefCell<ListenerRegistry> = RefCell::new(ListenerRegistry::default());
}

fn next_id() -> usize {
    REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        id
    })
}

/// Listen for edits of `field`. The handler gets the field and its new value.
pub fn on_input(field: usize, handler: impl Fn(usize, &str) + 'static) -> impl FnOnce() {
    let id = next_id();
    REGISTRY.with(|reg| {
        reg.borrow_mut()
            .input
            .entry(field)
            .or_default()
            .push((id, Rc::new(handler)));
    });

    move || {
        REGISTRY.with(|reg| {
            if let Some(list) = reg.borrow_mut().input.get_mut(&field) {
                list.retain(|(handler_id, _)| *handler_id != id);
            }
        });
    }
}

/// Listen for submissions of `form`.
pub fn on_submit(form: usize, handler: impl Fn(usize) + 'static) -> impl FnOnce() {
    let id = next_id();
    REGISTRY.with(|reg| {
        reg.borrow_mut()
            .submit
            .entry(form)
            .or_default()
            .push((id, Rc::new(handler)));
    });

    move || {
        REGISTRY.with(|reg| {
            if let Some(list) = reg.borrow_mut().submit.get_mut(&form) {
                list.retain(|(handler_id, _)| *handler_id != id);
            }
        });
    }
}

/// The user changed a field's value.
pub fn set_value(field: usize, value: &str) {
    engine::set_attribute(field, attr::VALUE, value);
    let handlers: Vec<InputHandler> = REGISTRY.with(|reg| {
        reg.borrow()
            .input
            .get(&field)
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    });
    for handler in handlers {
        handler(field, value);
    }
}

/// The user submitted a form. Returns true if anything handled it.
pub fn submit(form: usize) -> bool {
    let handlers: Vec<SubmitHandler> = REGISTRY.with(|reg| {
        reg.borrow()
            .submit
            .get(&form)
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    });
    for handler in &handlers {
        handler(form);
    }
    !handlers.is_empty()
}

/// Remove all listeners on an element index.
pub fn cleanup_index(index: usize) {
    REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        reg.input.remove(&index);
        reg.submit.remove(&index);
    });
}

/// Reset listener state (for testing)
pub fn reset_input_state() {
    REGISTRY.with(|reg| *reg.borrow_mut() = ListenerRegistry::default());
}

// =============================================================================
// TESTS
// =============================================================================
