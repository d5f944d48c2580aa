//! NavMenu - Responsive navigation toggle
//!
//! A `.nav-toggle` button expands and collapses the `.nav-menu`. While
//! expanded the page does not scroll and Tab cycles through the menu
//! links. Choosing a link, clicking anywhere else or pressing Escape
//! collapses it again.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::config::WidgetConfig;
use crate::engine;
use crate::error::{Result, WidgetError};
use crate::state::events::{self, WidgetEvent};
use crate::state::focus;
use crate::state::keyboard;
use crate::state::pointer::{self, PointerHandlers};
use crate::state::scroll_lock::{self, ScrollLockGuard};
use crate::state::timers::TimerScope;
use crate::types::{aria_bool, attr, keys};

pub const TOGGLE_CLASS: &str = "nav-toggle";
pub const MENU_CLASS: &str = "nav-menu";
pub const ACTIVE_CLASS: &str = "active";

struct NavInner {
    toggle: usize,
    menu: usize,
    focus_delay_ms: u64,
    expanded: Cell<bool>,
    scroll_lock: RefCell<Option<ScrollLockGuard>>,
    timers: TimerScope,
    cleanups: RefCell<Vec<Box<dyn FnOnce()>>>,
}

#[derive(Clone)]
pub struct NavMenu(Rc<NavInner>);

impl NavMenu {
    /// Find the toggle and menu in the document and bind them.
    pub fn attach(config: &WidgetConfig) -> Result<Self> {
        let body = engine::body();
        let toggle = *engine::query_by_class(body, TOGGLE_CLASS)
            .first()
            .ok_or_else(|| WidgetError::MissingElement { selector: format!(".{TOGGLE_CLASS}") })?;
        let menu = *engine::query_by_class(body, MENU_CLASS)
            .first()
            .ok_or_else(|| WidgetError::MissingElement { selector: format!(".{MENU_CLASS}") })?;

        let nav = NavMenu(Rc::new(NavInner {
            toggle,
            menu,
            focus_delay_ms: config.nav_focus_delay_ms,
            expanded: Cell::new(false),
            scroll_lock: RefCell::new(None),
            timers: TimerScope::new(),
            cleanups: RefCell::new(Vec::new()),
        }));
        nav.bind();
        Ok(nav)
    }

    fn bind(&self) {
        let (toggle, menu) = (self.0.toggle, self.0.menu);
        let mut cleanups: Vec<Box<dyn FnOnce()>> = Vec::new();

        let weak = self.downgrade();
        cleanups.push(Box::new(pointer::on_element(
            toggle,
            PointerHandlers::click(move |_| {
                if let Some(nav) = NavMenu::upgrade(&weak) {
                    nav.toggle();
                }
                false
            }),
        )));

        for link in self.links() {
            let weak = self.downgrade();
            cleanups.push(Box::new(pointer::on_element(
                link,
                PointerHandlers::click(move |_| {
                    if let Some(nav) = NavMenu::upgrade(&weak) {
                        nav.collapse();
                    }
                    false
                }),
            )));
        }

        // Clicks anywhere outside toggle and menu
        let weak = self.downgrade();
        cleanups.push(Box::new(pointer::on_element(
            engine::body(),
            PointerHandlers::click(move |event| {
                if let Some(nav) = NavMenu::upgrade(&weak) {
                    if !engine::contains(toggle, event.target) && !engine::contains(menu, event.target) {
                        nav.collapse();
                    }
                }
                false
            }),
        )));

        let weak = self.downgrade();
        cleanups.push(Box::new(keyboard::on_key(keys::ESCAPE, move |_| {
            if let Some(nav) = NavMenu::upgrade(&weak) {
                nav.collapse();
            }
            false
        })));

        let weak = self.downgrade();
        cleanups.push(Box::new(keyboard::on_element(menu, move |event| {
            let Some(nav) = NavMenu::upgrade(&weak) else {
                return false;
            };
            if !nav.is_expanded() || event.key != keys::TAB {
                return false;
            }
            let links = nav.links();
            let (Some(&first), Some(&last)) = (links.first(), links.last()) else {
                return false;
            };
            let active = focus::active_element();
            if event.modifiers.shift && active == Some(first) {
                focus::focus(last);
                true
            } else if !event.modifiers.shift && active == Some(last) {
                focus::focus(first);
                true
            } else {
                false
            }
        })));

        self.0.cleanups.borrow_mut().extend(cleanups);
    }

    fn downgrade(&self) -> Weak<NavInner> {
        Rc::downgrade(&self.0)
    }

    fn upgrade(weak: &Weak<NavInner>) -> Option<NavMenu> {
        weak.upgrade().map(NavMenu)
    }

    pub fn toggle_element(&self) -> usize {
        self.0.toggle
    }

    pub fn menu_element(&self) -> usize {
        self.0.menu
    }

    /// Anchors inside the menu, in document order.
    pub fn links(&self) -> Vec<usize> {
        engine::query_by_tag(self.0.menu, &["a"])
    }

    pub fn is_expanded(&self) -> bool {
        self.0.expanded.get()
    }

    pub fn toggle(&self) {
        self.set_expanded(!self.is_expanded());
    }

    pub fn expand(&self) {
        self.set_expanded(true);
    }

    pub fn collapse(&self) {
        self.set_expanded(false);
    }

    fn set_expanded(&self, expanded: bool) {
        let inner = &self.0;
        if inner.expanded.get() == expanded {
            return;
        }
        inner.expanded.set(expanded);

        engine::set_class(inner.toggle, ACTIVE_CLASS, expanded);
        engine::set_class(inner.menu, ACTIVE_CLASS, expanded);
        engine::set_attribute(inner.toggle, attr::ARIA_EXPANDED, aria_bool(expanded));

        if expanded {
            *inner.scroll_lock.borrow_mut() = Some(scroll_lock::acquire());
            if let Some(&first) = self.links().first() {
                let weak = self.downgrade();
                inner.timers.timeout(inner.focus_delay_ms, move || {
                    if NavMenu::upgrade(&weak).is_some_and(|nav| nav.is_expanded()) {
                        focus::focus(first);
                    }
                });
            }
        } else {
            inner.scroll_lock.borrow_mut().take();
        }

        log::debug!("nav menu {}", if expanded { "expanded" } else { "collapsed" });
        events::emit(inner.menu, WidgetEvent::NavToggled { expanded });
    }

    /// Collapse and drop every handler and timer.
    pub fn dispose(&self) {
        self.collapse();
        self.0.timers.cancel_all();
        let cleanups: Vec<_> = self.0.cleanups.borrow_mut().drain(..).collect();
        for cleanup in cleanups {
            cleanup();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{body, get_attribute, has_class, reset_document, ElementBuilder};
    use crate::state::focus::active_element;
    use crate::state::keyboard::{dispatch, KeyboardEvent, Modifiers};
    use crate::state::{reset_all_state, timers};

    fn setup() {
        reset_document();
        reset_all_state();
    }

    fn build() -> (usize, usize, Vec<usize>, usize) {
        let nav = ElementBuilder::new("nav").class("navbar").append_to(body());
        let toggle = ElementBuilder::new("button").class(TOGGLE_CLASS).append_to(nav);
        let menu = ElementBuilder::new("ul").class(MENU_CLASS).append_to(nav);
        let links = ["#about", "#features", "#contact"]
            .iter()
            .map(|href| {
                let item = ElementBuilder::new("li").append_to(menu);
                ElementBuilder::new("a").attr("href", href).append_to(item)
            })
            .collect();
        let main = ElementBuilder::new("main").append_to(body());
        (toggle, menu, links, main)
    }

    #[test]
    fn test_missing_parts_error() {
        setup();
        let err = NavMenu::attach(&WidgetConfig::default()).err().unwrap();
        assert!(matches!(err, WidgetError::MissingElement { .. }));
    }

    #[test]
    fn test_toggle_expands_locks_and_focuses() {
        setup();
        let (toggle, menu, links, _) = build();
        let nav = NavMenu::attach(&WidgetConfig::default()).unwrap();

        pointer::click(toggle);
        assert!(nav.is_expanded());
        assert!(has_class(toggle, ACTIVE_CLASS));
        assert!(has_class(menu, ACTIVE_CLASS));
        assert_eq!(get_attribute(toggle, attr::ARIA_EXPANDED).as_deref(), Some("true"));
        assert!(scroll_lock::is_scroll_locked());

        timers::advance(100);
        assert_eq!(active_element(), Some(links[0]));

        pointer::click(toggle);
        assert!(!nav.is_expanded());
        assert!(!scroll_lock::is_scroll_locked());
        assert_eq!(get_attribute(toggle, attr::ARIA_EXPANDED).as_deref(), Some("false"));
    }

    #[test]
    fn test_link_and_outside_click_collapse() {
        setup();
        let (_, _, links, main) = build();
        let nav = NavMenu::attach(&WidgetConfig::default()).unwrap();

        nav.expand();
        pointer::click(links[1]);
        assert!(!nav.is_expanded());

        nav.expand();
        pointer::click(main);
        assert!(!nav.is_expanded());
    }

    #[test]
    fn test_escape_collapses() {
        setup();
        build();
        let nav = NavMenu::attach(&WidgetConfig::default()).unwrap();
        nav.expand();
        dispatch(KeyboardEvent::new("Escape"));
        assert!(!nav.is_expanded());
    }

    #[test]
    fn test_tab_cycles_links_while_expanded() {
        setup();
        let (_, _, links, _) = build();
        let nav = NavMenu::attach(&WidgetConfig::default()).unwrap();
        nav.expand();
        timers::advance(100);

        assert!(dispatch(KeyboardEvent::with_modifiers("Tab", Modifiers::shift())));
        assert_eq!(active_element(), Some(links[2]));
        assert!(dispatch(KeyboardEvent::new("Tab")));
        assert_eq!(active_element(), Some(links[0]));

        nav.collapse();
        assert!(!dispatch(KeyboardEvent::new("Tab")));
    }

    #[test]
    fn test_toggle_notifications() {
        setup();
        let (_, menu, _, _) = build();
        let nav = NavMenu::attach(&WidgetConfig::default()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let _cleanup = events::on_event(menu, move |e| {
            if let WidgetEvent::NavToggled { expanded } = e {
                s.borrow_mut().push(*expanded);
            }
        });

        nav.toggle();
        nav.collapse();
        nav.collapse();
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn test_collapse_before_delay_keeps_focus() {
        setup();
        let (toggle, _, _, _) = build();
        let nav = NavMenu::attach(&WidgetConfig::default()).unwrap();
        focus::focus(toggle);
        nav.expand();
        nav.collapse();
        timers::advance(100);
        assert_eq!(active_element(), Some(toggle));
    }
}
