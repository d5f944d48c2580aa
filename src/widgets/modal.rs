//! Modal - Dialog state machine with focus containment
//!
//! States are `closed` (initial) and `open`. Opening remembers the focused
//! element, locks page scroll, traps Tab inside the dialog and moves focus
//! in after a short settle delay. Closing undoes all of it and puts focus
//! back where it was, if that element still exists.
//!
//! # Example
//!
//! ```ignore
//! use spark_widgets::widgets::Modal;
//!
//! let modal = Modal::new(dialog, &WidgetConfig::default())?;
//! modal.open();
//! timers::advance(100); // first focusable element is now focused
//! modal.close();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::focus_trap::FocusTrap;
use crate::config::WidgetConfig;
use crate::engine::{self, ElementBuilder};
use crate::error::{Result, WidgetError};
use crate::state::events::{self, WidgetEvent};
use crate::state::focus::{self, FocusMemo};
use crate::state::keyboard;
use crate::state::pointer::{self, PointerHandlers};
use crate::state::scroll_lock::{self, ScrollLockGuard};
use crate::state::timers::{TimerId, TimerScope};
use crate::types::{attr, keys};

pub const MODAL_CLASS: &str = "ui-modal";
pub const BACKDROP_CLASS: &str = "ui-modal-backdrop";
pub const CLOSE_CLASS: &str = "ui-modal-close";

struct ModalInner {
    element: usize,
    focus_delay_ms: u64,
    is_open: Cell<bool>,
    disposed: Cell<bool>,
    previous_focus: RefCell<Option<FocusMemo>>,
    trap: RefCell<FocusTrap>,
    scroll_lock: RefCell<Option<ScrollLockGuard>>,
    focus_timer: Cell<Option<TimerId>>,
    timers: TimerScope,
    cleanups: RefCell<Vec<Box<dyn FnOnce()>>>,
}

/// Modal dialog bound to one element.
///
/// Cloning shares the same dialog.
#[derive(Clone)]
pub struct Modal(Rc<ModalInner>);

impl Modal {
    /// Prepare `element` as a dialog and bind its close affordances.
    pub fn new(element: usize, config: &WidgetConfig) -> Result<Self> {
        if !engine::is_connected(element) {
            return Err(WidgetError::MissingContainer {
                id: engine::get_attribute(element, attr::ID).unwrap_or_default(),
            });
        }

        engine::add_class(element, MODAL_CLASS);
        engine::set_attribute(element, attr::ROLE, "dialog");
        engine::set_attribute(element, attr::ARIA_MODAL, "true");
        engine::set_attribute(element, attr::ARIA_HIDDEN, "true");
        engine::set_attribute(element, attr::TABINDEX, "-1");

        let backdrop = match engine::query_by_class(element, BACKDROP_CLASS).first() {
            Some(&existing) => existing,
            None => {
                let backdrop = ElementBuilder::new("div").class(BACKDROP_CLASS).build();
                let first = engine::children(element).first().copied();
                engine::insert_before(element, backdrop, first);
                backdrop
            }
        };

        let close_button = match engine::query_by_class(element, CLOSE_CLASS).first() {
            Some(&existing) => existing,
            None => ElementBuilder::new("button")
                .class(CLOSE_CLASS)
                .attr(attr::TYPE, "button")
                .attr(attr::ARIA_LABEL, "Close modal")
                .text("×")
                .append_to(element),
        };

        let modal = Modal(Rc::new(ModalInner {
            element,
            focus_delay_ms: config.modal_focus_delay_ms,
            is_open: Cell::new(false),
            disposed: Cell::new(false),
            previous_focus: RefCell::new(None),
            trap: RefCell::new(FocusTrap::default()),
            scroll_lock: RefCell::new(None),
            focus_timer: Cell::new(None),
            timers: TimerScope::new(),
            cleanups: RefCell::new(Vec::new()),
        }));
        modal.bind(close_button, backdrop);
        Ok(modal)
    }

    fn bind(&self, close_button: usize, backdrop: usize) {
        let mut cleanups: Vec<Box<dyn FnOnce()>> = Vec::new();

        for target in [close_button, backdrop] {
            let weak = self.downgrade();
            cleanups.push(Box::new(pointer::on_element(
                target,
                PointerHandlers::click(move |_| {
                    if let Some(modal) = Modal::upgrade(&weak) {
                        modal.close();
                    }
                    true
                }),
            )));
        }

        let weak = self.downgrade();
        cleanups.push(Box::new(keyboard::on_element(self.0.element, move |event| {
            let Some(modal) = Modal::upgrade(&weak) else {
                return false;
            };
            if !modal.is_open() {
                return false;
            }
            match event.key.as_str() {
                keys::ESCAPE => {
                    modal.close();
                    true
                }
                keys::TAB => modal.0.trap.borrow().handle_tab(event.modifiers.shift),
                _ => false,
            }
        })));

        self.0.cleanups.borrow_mut().extend(cleanups);
    }

    fn downgrade(&self) -> Weak<ModalInner> {
        Rc::downgrade(&self.0)
    }

    fn upgrade(weak: &Weak<ModalInner>) -> Option<Modal> {
        weak.upgrade().map(Modal)
    }

    /// The dialog element.
    pub fn element(&self) -> usize {
        self.0.element
    }

    pub fn is_open(&self) -> bool {
        self.0.is_open.get()
    }

    /// Focus set captured at the last `open()`.
    pub fn focusable_elements(&self) -> Vec<usize> {
        self.0.trap.borrow().elements().to_vec()
    }

    /// Show the dialog. No-op when already open.
    pub fn open(&self) {
        let inner = &self.0;
        if inner.is_open.get() || inner.disposed.get() {
            log::trace!("modal {} already open", inner.element);
            return;
        }
        inner.is_open.set(true);

        *inner.previous_focus.borrow_mut() = focus::capture();
        *inner.trap.borrow_mut() = FocusTrap::capture(inner.element);

        engine::set_attribute(inner.element, attr::ARIA_HIDDEN, "false");
        *inner.scroll_lock.borrow_mut() = Some(scroll_lock::acquire());
        focus::push_focus_trap(inner.element);

        self.cancel_focus_timer();
        let weak = self.downgrade();
        let timer = inner.timers.timeout(inner.focus_delay_ms, move || {
            let Some(modal) = Modal::upgrade(&weak) else {
                return;
            };
            modal.0.focus_timer.set(None);
            if !modal.is_open() {
                return;
            }
            let target = modal.0.trap.borrow().first().unwrap_or(modal.0.element);
            focus::focus(target);
        });
        inner.focus_timer.set(timer);

        log::debug!("modal {} opened", inner.element);
        events::emit(inner.element, WidgetEvent::ModalOpened);
    }

    /// Hide the dialog. No-op when already closed.
    pub fn close(&self) {
        let inner = &self.0;
        if !inner.is_open.get() {
            return;
        }
        inner.is_open.set(false);

        engine::set_attribute(inner.element, attr::ARIA_HIDDEN, "true");
        inner.scroll_lock.borrow_mut().take();
        focus::remove_focus_trap(inner.element);
        self.cancel_focus_timer();

        let previous = inner.previous_focus.borrow_mut().take();
        match previous {
            Some(memo) => {
                if !memo.restore() {
                    log::trace!("previous focus target is gone, leaving focus in place");
                }
            }
            // Nothing was focused before opening: hand focus back to the body
            None => {
                if focus::active_element().is_some_and(|a| engine::contains(inner.element, a)) {
                    focus::blur();
                }
            }
        }

        log::debug!("modal {} closed", inner.element);
        events::emit(inner.element, WidgetEvent::ModalClosed);
    }

    fn cancel_focus_timer(&self) {
        if let Some(id) = self.0.focus_timer.take() {
            self.0.timers.cancel(id);
        }
    }

    /// Close if open, then drop every handler and timer.
    pub fn dispose(&self) {
        if self.0.disposed.get() {
            return;
        }
        self.close();
        self.0.disposed.set(true);
        self.0.timers.cancel_all();
        let cleanups: Vec<_> = self.0.cleanups.borrow_mut().drain(..).collect();
        for cleanup in cleanups {
            cleanup();
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
