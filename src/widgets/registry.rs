//! Widget Registry - Page-lifetime owner of every widget instance
//!
//! Installed once per page. `scan()` looks for the declarative markers
//! (`data-modal-trigger`, `data-tabs`, `data-carousel`) and creates one
//! widget per marked element. Modals are created lazily the first time
//! they are opened and cached by id from then on.
//!
//! Configuration problems are logged and skip only the affected widget.
//!
//! # Example
//!
//! ```ignore
//! use spark_widgets::widgets::WidgetRegistry;
//!
//! let registry = WidgetRegistry::install(WidgetConfig::default());
//! registry.scan();
//! registry.open_modal("signup");
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::{Carousel, Modal, Tabs};
use crate::config::WidgetConfig;
use crate::engine;
use crate::error::{Result, WidgetError};
use crate::state::pointer::{self, PointerHandlers};
use crate::types::attr;

struct RegistryInner {
    config: WidgetConfig,
    modals: RefCell<HashMap<String, Modal>>,
    tabs: RefCell<Vec<Tabs>>,
    carousels: RefCell<Vec<Carousel>>,
    /// Keys of elements already wired, so rescans skip them
    bound: RefCell<HashSet<String>>,
    cleanups: RefCell<Vec<Box<dyn FnOnce()>>>,
}

/// Shared handle to the page's widget registry.
#[derive(Clone)]
pub struct WidgetRegistry(Rc<RegistryInner>);

thread_local! {
    static GLOBAL: RefCell<Option<WidgetRegistry>> = const { RefCell::new(None) };
}

impl WidgetRegistry {
    /// Create a standalone registry (not installed as the page singleton).
    pub fn new(config: WidgetConfig) -> Self {
        WidgetRegistry(Rc::new(RegistryInner {
            config,
            modals: RefCell::new(HashMap::new()),
            tabs: RefCell::new(Vec::new()),
            carousels: RefCell::new(Vec::new()),
            bound: RefCell::new(HashSet::new()),
            cleanups: RefCell::new(Vec::new()),
        }))
    }

    /// Install the page singleton. Later calls return the first instance
    /// and ignore their `config`.
    pub fn install(config: WidgetConfig) -> Self {
        GLOBAL.with(|global| {
            let mut global = global.borrow_mut();
            if let Some(existing) = global.as_ref() {
                log::debug!("widget registry already installed");
                return existing.clone();
            }
            let registry = WidgetRegistry::new(config);
            *global = Some(registry.clone());
            registry
        })
    }

    /// The installed singleton.
    pub fn global() -> Result<Self> {
        GLOBAL.with(|global| global.borrow().clone().ok_or(WidgetError::NotInstalled))
    }

    /// Dispose and forget the installed singleton (for testing)
    pub fn reset_global() {
        let registry = GLOBAL.with(|global| global.borrow_mut().take());
        if let Some(registry) = registry {
            registry.dispose();
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.0.config
    }

    /// First time this element is seen by the registry.
    fn claim(&self, index: usize) -> bool {
        let key = engine::get_key(index).unwrap_or_else(|| index.to_string());
        self.0.bound.borrow_mut().insert(key)
    }

    /// Wire every marked element in the document not seen before.
    pub fn scan(&self) {
        let body = engine::body();

        for trigger in engine::query_by_attribute(body, attr::DATA_MODAL_TRIGGER) {
            if self.claim(trigger) {
                self.bind_trigger(trigger);
            }
        }

        for container in engine::query_by_attribute(body, attr::DATA_TABS) {
            if !self.claim(container) {
                continue;
            }
            match Tabs::new(container) {
                Ok(tabs) => self.0.tabs.borrow_mut().push(tabs),
                Err(err) => log::error!("Error initializing tabs: {err}"),
            }
        }

        for container in engine::query_by_attribute(body, attr::DATA_CAROUSEL) {
            if self.claim(container) {
                let carousel = Carousel::new(container, &self.0.config);
                self.0.carousels.borrow_mut().push(carousel);
            }
        }

        log::debug!(
            "scan complete: {} tabs, {} carousels",
            self.0.tabs.borrow().len(),
            self.0.carousels.borrow().len()
        );
    }

    fn bind_trigger(&self, trigger: usize) {
        let weak = Rc::downgrade(&self.0);
        let cleanup = pointer::on_element(
            trigger,
            PointerHandlers::click(move |_| {
                let Some(inner) = weak.upgrade() else {
                    return false;
                };
                let id = engine::get_attribute(trigger, attr::DATA_MODAL_TRIGGER).unwrap_or_default();
                if id.is_empty() {
                    let err = WidgetError::MissingAttribute {
                        element: engine::tag(trigger),
                        attribute: attr::DATA_MODAL_TRIGGER.to_string(),
                    };
                    log::error!("Modal trigger misconfigured: {err}");
                } else {
                    WidgetRegistry(inner).open_modal(&id);
                }
                true
            }),
        );
        self.0.cleanups.borrow_mut().push(Box::new(cleanup));
    }

    /// Open the modal whose element has `id`, creating it on first use.
    ///
    /// Returns false (and logs) when no such element exists.
    pub fn open_modal(&self, id: &str) -> bool {
        match self.modal_or_create(id) {
            Ok(modal) => {
                modal.open();
                true
            }
            Err(err) => {
                log::error!("Error opening modal: {err}");
                false
            }
        }
    }

    fn modal_or_create(&self, id: &str) -> Result<Modal> {
        let cached = self.0.modals.borrow().get(id).cloned();
        if let Some(modal) = cached {
            if engine::is_connected(modal.element())
                && engine::get_attribute(modal.element(), attr::ID).as_deref() == Some(id)
            {
                return Ok(modal);
            }
            // Element was replaced since the modal was built
            modal.dispose();
            self.0.modals.borrow_mut().remove(id);
        }

        let element = engine::get_element_by_id(id)
            .ok_or_else(|| WidgetError::MissingContainer { id: id.to_string() })?;
        let modal = Modal::new(element, &self.0.config)?;
        self.0.modals.borrow_mut().insert(id.to_string(), modal.clone());
        Ok(modal)
    }

    /// Close a previously opened modal. Returns false if it was never opened.
    pub fn close_modal(&self, id: &str) -> bool {
        let modal = self.0.modals.borrow().get(id).cloned();
        match modal {
            Some(modal) => {
                modal.close();
                true
            }
            None => false,
        }
    }

    pub fn modal(&self, id: &str) -> Option<Modal> {
        self.0.modals.borrow().get(id).cloned()
    }

    pub fn modal_count(&self) -> usize {
        self.0.modals.borrow().len()
    }

    pub fn tabs(&self) -> Vec<Tabs> {
        self.0.tabs.borrow().clone()
    }

    pub fn carousels(&self) -> Vec<Carousel> {
        self.0.carousels.borrow().clone()
    }

    /// Dispose every owned widget and trigger binding.
    pub fn dispose(&self) {
        let modals: Vec<Modal> = self.0.modals.borrow_mut().drain().map(|(_, m)| m).collect();
        for modal in modals {
            modal.dispose();
        }
        let tabs: Vec<Tabs> = self.0.tabs.borrow_mut().drain(..).collect();
        for tab_set in tabs {
            tab_set.dispose();
        }
        let carousels: Vec<Carousel> = self.0.carousels.borrow_mut().drain(..).collect();
        for carousel in carousels {
            carousel.dispose();
        }
        let cleanups: Vec<_> = self.0.cleanups.borrow_mut().drain(..).collect();
        for cleanup in cleanups {
            cleanup();
        }
        self.0.bound.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{body, get_attribute, reset_document, ElementBuilder};
    use crate::state::{reset_all_state, timers};

    fn setup() {
        WidgetRegistry::reset_global();
        reset_document();
        reset_all_state();
    }

    fn page() -> (usize, usize) {
        let trigger = ElementBuilder::new("button")
            .attr(attr::DATA_MODAL_TRIGGER, "signup")
            .append_to(body());
        let dialog = ElementBuilder::new("div").id("signup").append_to(body());
        ElementBuilder::new("input").append_to(dialog);

        let tabs = ElementBuilder::new("div").attr(attr::DATA_TABS, "").append_to(body());
        ElementBuilder::new("button").attr("role", "tab").append_to(tabs);
        ElementBuilder::new("div").attr("role", "tabpanel").append_to(tabs);

        let carousel = ElementBuilder::new("div").attr(attr::DATA_CAROUSEL, "").append_to(body());
        ElementBuilder::new("div").class("ui-carousel-slide").append_to(carousel);
        (trigger, dialog)
    }

    #[test]
    fn test_install_is_idempotent() {
        setup();
        assert!(matches!(WidgetRegistry::global(), Err(WidgetError::NotInstalled)));
        let first = WidgetRegistry::install(WidgetConfig::default());
        let second = WidgetRegistry::install(WidgetConfig { carousel_settle_ms: 1, ..Default::default() });
        assert!(Rc::ptr_eq(&first.0, &second.0));
        assert_eq!(second.config().carousel_settle_ms, 500);
        assert!(WidgetRegistry::global().is_ok());
    }

    #[test]
    fn test_scan_creates_widgets_once() {
        setup();
        page();
        let registry = WidgetRegistry::new(WidgetConfig::default());
        registry.scan();
        registry.scan();
        assert_eq!(registry.tabs().len(), 1);
        assert_eq!(registry.carousels().len(), 1);
        assert_eq!(registry.modal_count(), 0);
    }

    #[test]
    fn test_trigger_click_opens_lazily_and_caches() {
        setup();
        let (trigger, dialog) = page();
        let registry = WidgetRegistry::new(WidgetConfig::default());
        registry.scan();

        pointer::click(trigger);
        assert_eq!(registry.modal_count(), 1);
        let modal = registry.modal("signup").unwrap();
        assert!(modal.is_open());
        assert_eq!(get_attribute(dialog, attr::ARIA_HIDDEN).as_deref(), Some("false"));

        assert!(registry.close_modal("signup"));
        assert!(!modal.is_open());

        pointer::click(trigger);
        assert_eq!(registry.modal_count(), 1);
        assert!(registry.modal("signup").unwrap().is_open());
        // Close affordances were bound once
        assert_eq!(engine::query_by_class(dialog, "ui-modal-close").len(), 1);
    }

    #[test]
    fn test_missing_modal_is_reported() {
        setup();
        let registry = WidgetRegistry::new(WidgetConfig::default());
        assert!(!registry.open_modal("nowhere"));
        assert!(!registry.close_modal("nowhere"));
        assert_eq!(registry.modal_count(), 0);
    }

    #[test]
    fn test_empty_trigger_value_is_skipped() {
        setup();
        let trigger = ElementBuilder::new("a")
            .attr(attr::DATA_MODAL_TRIGGER, "")
            .append_to(body());
        let registry = WidgetRegistry::new(WidgetConfig::default());
        registry.scan();
        assert!(pointer::click(trigger));
        assert_eq!(registry.modal_count(), 0);
    }

    #[test]
    fn test_bad_tabs_do_not_stop_scan() {
        setup();
        let broken = ElementBuilder::new("div").attr(attr::DATA_TABS, "").append_to(body());
        ElementBuilder::new("button").attr("role", "tab").append_to(broken);
        page();

        let registry = WidgetRegistry::new(WidgetConfig::default());
        registry.scan();
        assert_eq!(registry.tabs().len(), 1);
        assert_eq!(registry.carousels().len(), 1);
    }

    #[test]
    fn test_dispose_stops_everything() {
        setup();
        let (trigger, _) = page();
        let registry = WidgetRegistry::new(WidgetConfig::default());
        registry.scan();
        registry.open_modal("signup");
        registry.dispose();

        assert_eq!(timers::pending_count(), 0);
        assert!(!pointer::click(trigger));
        assert_eq!(registry.modal_count(), 0);
    }
}
