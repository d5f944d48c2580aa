//! Widget Notifications - Named events with typed detail
//!
//! Widgets announce state changes on their own element: `modal:open`,
//! `tabs:change`, `carousel:change` and so on. Notifications do not bubble;
//! only listeners registered on the target element hear them.
//!
//! # Example
//!
//! ```ignore
//! use spark_widgets::state::events::{self, WidgetEvent};
//!
//! let cleanup = events::on_event(carousel_el, |event| {
//!     if let WidgetEvent::CarouselChanged { current, total } = event {
//!         println!("slide {} of {}", current + 1, total);
//!     }
//! });
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;

// =============================================================================
// TYPES
// =============================================================================

/// Notification emitted by a widget on its element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WidgetEvent {
    ModalOpened,
    ModalClosed,
    TabsChanged {
        active: usize,
        tabs: Vec<usize>,
        panels: Vec<usize>,
    },
    CarouselChanged {
        current: usize,
        total: usize,
    },
    NavToggled {
        expanded: bool,
    },
    FormSubmitted {
        success: bool,
    },
}

impl WidgetEvent {
    /// Event name as seen by listeners.
    pub fn name(&self) -> &'static str {
        match self {
            WidgetEvent::ModalOpened => "modal:open",
            WidgetEvent::ModalClosed => "modal:close",
            WidgetEvent::TabsChanged { .. } => "tabs:change",
            WidgetEvent::CarouselChanged { .. } => "carousel:change",
            WidgetEvent::NavToggled { .. } => "nav:toggle",
            WidgetEvent::FormSubmitted { .. } => "form:submit",
        }
    }

    /// Event detail as JSON (`null` for events without detail).
    pub fn detail_json(&self) -> String {
        match self {
            WidgetEvent::ModalOpened | WidgetEvent::ModalClosed => "null".to_string(),
            detail => serde_json::to_string(detail).unwrap_or_else(|_| "null".to_string()),
        }
    }
}

pub type EventHandler = Rc<dyn Fn(&WidgetEvent)>;

// =============================================================================
// LISTENER REGISTRY
// =============================================================================

#[derive(Default)]
struct ListenerRegistry {
    listeners: HashMap<usize, Vec<(usize, EventHandler)>>,
    next_id: usize,
}

thread_local! {
    static REGISTRY: RefCell<ListenerRegistry> = RefCell::new(ListenerRegistry::default());
}

/// Listen for notifications on an element. Returns cleanup function.
pub fn on_event(index: usize, handler: impl Fn(&WidgetEvent) + 'static) -> impl FnOnce() {
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.listeners.entry(index).or_default().push((id, Rc::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(list) = reg.listeners.get_mut(&index) {
                list.retain(|(listener_id, _)| *listener_id != id);
                if list.is_empty() {
                    reg.listeners.remove(&index);
                }
            }
        });
    }
}

/// Deliver a notification to the listeners on `target`.
pub fn emit(target: usize, event: WidgetEvent) {
    log::debug!("{} on element {}: {}", event.name(), target, event.detail_json());
    let handlers: Vec<EventHandler> = REGISTRY.with(|reg| {
        reg.borrow()
            .listeners
            .get(&target)
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    });
    for handler in handlers {
        handler(&event);
    }
}

/// Remove all listeners on an element index.
pub fn cleanup_index(index: usize) {
    REGISTRY.with(|reg| {
        reg.borrow_mut().listeners.remove(&index);
    });
}

/// Reset listener state (for testing)
pub fn reset_events() {
    REGISTRY.with(|reg| *reg.borrow_mut() = ListenerRegistry::default());
}
