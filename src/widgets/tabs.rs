//! Tabs - Single-selection panel switcher
//!
//! Pairs `[role=tab]` controls with `[role=tabpanel]` regions by position.
//! Exactly one pair is active. Arrow keys wrap, Home/End jump, clicking a
//! tab selects it.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};

use crate::engine;
use crate::error::{Result, WidgetError};
use crate::state::events::{self, WidgetEvent};
use crate::state::focus;
use crate::state::keyboard::{self, KeyboardEvent};
use crate::state::pointer::{self, PointerHandlers};
use crate::types::{aria_bool, attr, keys};

pub const TABS_CLASS: &str = "ui-tabs";

struct TabsInner {
    container: usize,
    tabs: Vec<usize>,
    panels: Vec<usize>,
    active: Signal<usize>,
    disposed: Cell<bool>,
    cleanups: RefCell<Vec<Box<dyn FnOnce()>>>,
}

/// Tab set bound to one container.
#[derive(Clone)]
pub struct Tabs(Rc<TabsInner>);

impl Tabs {
    /// Wire up every tab and panel inside `container` and select the first.
    pub fn new(container: usize) -> Result<Self> {
        engine::add_class(container, TABS_CLASS);

        let tabs = engine::query_by_role(container, "tab");
        let panels = engine::query_by_role(container, "tabpanel");
        if tabs.len() != panels.len() {
            return Err(WidgetError::TabPanelMismatch {
                tabs: tabs.len(),
                panels: panels.len(),
            });
        }

        let prefix = engine::get_attribute(container, attr::ID)
            .filter(|id| !id.is_empty())
            .or_else(|| engine::get_key(container))
            .unwrap_or_else(|| container.to_string());

        let tab_ids: Vec<String> = tabs
            .iter()
            .enumerate()
            .map(|(i, &tab)| ensure_id(tab, &format!("{prefix}-tab-{i}")))
            .collect();
        let panel_ids: Vec<String> = panels
            .iter()
            .enumerate()
            .map(|(i, &panel)| ensure_id(panel, &format!("{prefix}-panel-{i}")))
            .collect();

        for (i, &tab) in tabs.iter().enumerate() {
            engine::set_attribute(tab, attr::ARIA_SELECTED, "false");
            engine::set_attribute(tab, attr::TABINDEX, "-1");
            engine::set_attribute(tab, attr::ARIA_CONTROLS, &panel_ids[i]);
        }
        for (i, &panel) in panels.iter().enumerate() {
            engine::set_attribute(panel, attr::ARIA_LABELLEDBY, &tab_ids[i]);
            engine::set_attribute(panel, attr::ARIA_HIDDEN, "true");
        }

        let widget = Tabs(Rc::new(TabsInner {
            container,
            tabs,
            panels,
            active: signal(0),
            disposed: Cell::new(false),
            cleanups: RefCell::new(Vec::new()),
        }));
        widget.bind();

        // Initial selection: no focus move, no notification
        widget.apply(0, false);
        Ok(widget)
    }

    fn bind(&self) {
        let mut cleanups: Vec<Box<dyn FnOnce()>> = Vec::new();
        for (i, &tab) in self.0.tabs.iter().enumerate() {
            let weak = Rc::downgrade(&self.0);
            cleanups.push(Box::new(pointer::on_element(
                tab,
                PointerHandlers::click(move |_| {
                    if let Some(inner) = weak.upgrade() {
                        Tabs(inner).activate_tab(i);
                    }
                    false
                }),
            )));

            let weak: Weak<TabsInner> = Rc::downgrade(&self.0);
            cleanups.push(Box::new(keyboard::on_element(tab, move |event| {
                weak.upgrade()
                    .is_some_and(|inner| Tabs(inner).handle_key(event, i))
            })));
        }
        self.0.cleanups.borrow_mut().extend(cleanups);
    }

    fn handle_key(&self, event: &KeyboardEvent, index: usize) -> bool {
        let count = self.0.tabs.len();
        if count == 0 {
            return false;
        }
        let target = match event.key.as_str() {
            keys::ARROW_RIGHT => (index + 1) % count,
            keys::ARROW_LEFT => (index + count - 1) % count,
            keys::HOME => 0,
            keys::END => count - 1,
            _ => return false,
        };
        self.activate_tab(target);
        true
    }

    pub fn container(&self) -> usize {
        self.0.container
    }

    pub fn tabs(&self) -> &[usize] {
        &self.0.tabs
    }

    pub fn panels(&self) -> &[usize] {
        &self.0.panels
    }

    /// Index of the selected pair.
    pub fn active_index(&self) -> usize {
        self.0.active.get()
    }

    /// Select pair `index`, focus its tab and notify. Out of range is ignored.
    ///
    /// Selecting the already active pair re-applies its state and focus
    /// without a second notification.
    pub fn activate_tab(&self, index: usize) {
        if self.0.disposed.get() || index >= self.0.tabs.len() {
            log::trace!("ignoring tab index {index}");
            return;
        }
        let changed = index != self.active_index();
        self.apply(index, true);

        if changed {
            events::emit(
                self.0.container,
                WidgetEvent::TabsChanged {
                    active: index,
                    tabs: self.0.tabs.clone(),
                    panels: self.0.panels.clone(),
                },
            );
        }
    }

    fn apply(&self, index: usize, move_focus: bool) {
        let inner = &self.0;
        let (Some(&tab), Some(&panel)) = (inner.tabs.get(index), inner.panels.get(index)) else {
            return;
        };

        let previous = inner.active.get();
        if let Some(&old_tab) = inner.tabs.get(previous) {
            engine::set_attribute(old_tab, attr::ARIA_SELECTED, aria_bool(false));
            engine::set_attribute(old_tab, attr::TABINDEX, "-1");
        }
        if let Some(&old_panel) = inner.panels.get(previous) {
            engine::set_attribute(old_panel, attr::ARIA_HIDDEN, aria_bool(true));
        }

        inner.active.set(index);
        engine::set_attribute(tab, attr::ARIA_SELECTED, aria_bool(true));
        engine::set_attribute(tab, attr::TABINDEX, "0");
        if move_focus {
            focus::focus(tab);
        }
        engine::set_attribute(panel, attr::ARIA_HIDDEN, aria_bool(false));
    }

    /// Drop every handler. The current selection stays as it is.
    pub fn dispose(&self) {
        if self.0.disposed.replace(true) {
            return;
        }
        let cleanups: Vec<_> = self.0.cleanups.borrow_mut().drain(..).collect();
        for cleanup in cleanups {
            cleanup();
        }
    }
}

/// Existing non-empty id, or assign `fallback`.
fn ensure_id(index: usize, fallback: &str) -> String {
    match engine::get_attribute(index, attr::ID) {
        Some(id) if !id.is_empty() => id,
        _ => {
            engine::set_attribute(index, attr::ID, fallback);
            fallback.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{body, get_attribute, reset_document, ElementBuilder};
    use crate::state::focus::active_element;
    use crate::state::keyboard::dispatch;
    use crate::state::reset_all_state;

    fn setup() {
        reset_document();
        reset_all_state();
    }

    fn build(tab_count: usize, panel_count: usize) -> usize {
        let container = ElementBuilder::new("div").id("features").attr("data-tabs", "").append_to(body());
        let list = ElementBuilder::new("div").attr("role", "tablist").append_to(container);
        for i in 0..tab_count {
            ElementBuilder::new("button").attr("role", "tab").text(&format!("Tab {i}")).append_to(list);
        }
        for _ in 0..panel_count {
            ElementBuilder::new("div").attr("role", "tabpanel").append_to(container);
        }
        container
    }

    fn selected(tabs: &Tabs) -> Vec<bool> {
        tabs.tabs()
            .iter()
            .map(|&t| get_attribute(t, attr::ARIA_SELECTED).as_deref() == Some("true"))
            .collect()
    }

    fn visible(tabs: &Tabs) -> Vec<bool> {
        tabs.panels()
            .iter()
            .map(|&p| get_attribute(p, attr::ARIA_HIDDEN).as_deref() == Some("false"))
            .collect()
    }

    #[test]
    fn test_initial_state_is_silent() {
        setup();
        let container = build(3, 3);
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let _cleanup = events::on_event(container, move |_| c.set(c.get() + 1));

        let tabs = Tabs::new(container).unwrap();
        assert_eq!(tabs.active_index(), 0);
        assert_eq!(selected(&tabs), vec![true, false, false]);
        assert_eq!(visible(&tabs), vec![true, false, false]);
        assert_eq!(get_attribute(tabs.tabs()[0], attr::TABINDEX).as_deref(), Some("0"));
        assert_eq!(active_element(), None);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_generated_ids_link_pairs() {
        setup();
        let container = build(2, 2);
        let tabs = Tabs::new(container).unwrap();
        let tab = tabs.tabs()[1];
        let panel = tabs.panels()[1];
        assert_eq!(get_attribute(tab, attr::ID).as_deref(), Some("features-tab-1"));
        assert_eq!(get_attribute(tab, attr::ARIA_CONTROLS).as_deref(), Some("features-panel-1"));
        assert_eq!(get_attribute(panel, attr::ARIA_LABELLEDBY).as_deref(), Some("features-tab-1"));
    }

    #[test]
    fn test_existing_ids_kept() {
        setup();
        let container = build(1, 1);
        let panel = engine::query_by_role(container, "tabpanel")[0];
        engine::set_attribute(panel, attr::ID, "pricing");
        let tabs = Tabs::new(container).unwrap();
        assert_eq!(get_attribute(tabs.tabs()[0], attr::ARIA_CONTROLS).as_deref(), Some("pricing"));
    }

    #[test]
    fn test_mismatch_is_configuration_error() {
        setup();
        let container = build(3, 2);
        let err = Tabs::new(container).err().unwrap();
        assert!(matches!(err, WidgetError::TabPanelMismatch { tabs: 3, panels: 2 }));
    }

    #[test]
    fn test_activate_switches_pair_and_notifies() {
        setup();
        let container = build(3, 3);
        let tabs = Tabs::new(container).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let _cleanup = events::on_event(container, move |e| {
            if let WidgetEvent::TabsChanged { active, tabs, panels } = e {
                s.borrow_mut().push((*active, tabs.len(), panels.len()));
            }
        });

        tabs.activate_tab(2);
        assert_eq!(selected(&tabs), vec![false, false, true]);
        assert_eq!(visible(&tabs), vec![false, false, true]);
        assert_eq!(get_attribute(tabs.tabs()[0], attr::TABINDEX).as_deref(), Some("-1"));
        assert_eq!(active_element(), Some(tabs.tabs()[2]));

        tabs.activate_tab(2);
        tabs.activate_tab(7);
        assert_eq!(*seen.borrow(), vec![(2, 3, 3)]);
    }

    #[test]
    fn test_keyboard_wraps_and_jumps() {
        setup();
        let container = build(3, 3);
        let tabs = Tabs::new(container).unwrap();
        focus::focus(tabs.tabs()[0]);

        assert!(dispatch(KeyboardEvent::new("ArrowLeft")));
        assert_eq!(tabs.active_index(), 2);
        assert!(dispatch(KeyboardEvent::new("ArrowRight")));
        assert_eq!(tabs.active_index(), 0);
        dispatch(KeyboardEvent::new("End"));
        assert_eq!(tabs.active_index(), 2);
        dispatch(KeyboardEvent::new("Home"));
        assert_eq!(tabs.active_index(), 0);
        assert!(!dispatch(KeyboardEvent::new("a")));
    }

    #[test]
    fn test_arrow_right_wraps_from_last_of_four() {
        setup();
        let tabs = Tabs::new(build(4, 4)).unwrap();
        tabs.activate_tab(2);

        dispatch(KeyboardEvent::new("ArrowRight"));
        assert_eq!(tabs.active_index(), 3);
        dispatch(KeyboardEvent::new("ArrowRight"));
        assert_eq!(tabs.active_index(), 0);

        assert_eq!(selected(&tabs), vec![true, false, false, false]);
        assert_eq!(visible(&tabs), vec![true, false, false, false]);
    }

    #[test]
    fn test_click_selects() {
        setup();
        let container = build(3, 3);
        let tabs = Tabs::new(container).unwrap();
        pointer::click(tabs.tabs()[1]);
        assert_eq!(tabs.active_index(), 1);
    }

    #[test]
    fn test_zero_tabs_ignores_everything() {
        setup();
        let container = build(0, 0);
        let tabs = Tabs::new(container).unwrap();
        tabs.activate_tab(0);
        assert_eq!(tabs.active_index(), 0);
        assert!(tabs.tabs().is_empty());
    }

    #[test]
    fn test_dispose_unbinds_handlers() {
        setup();
        let container = build(2, 2);
        let tabs = Tabs::new(container).unwrap();
        tabs.dispose();
        pointer::click(tabs.tabs()[1]);
        assert_eq!(tabs.active_index(), 0);
    }
}
