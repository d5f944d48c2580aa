//! End-to-end page scenarios: build a landing page, mount it, and drive it
//! through host events the way a browser shell would.

use std::cell::RefCell;
use std::rc::Rc;

use spark_widgets::engine::{self, body, get_attribute, has_class, text, ElementBuilder};
use spark_widgets::forms::contact::{SENDING_LABEL, SUBMIT_LABEL, SUCCESS_MESSAGE};
use spark_widgets::state::focus::active_element;
use spark_widgets::state::{announcer, events, scroll_lock};
use spark_widgets::{
    attr, mount, reset_all_state, reset_document, route_event, InputEvent, KeyboardEvent,
    Modifiers, SimulatedTransport, SubmitError, WidgetConfig, WidgetEvent, WidgetRegistry,
};

struct Page {
    toggle: usize,
    links: Vec<usize>,
    signup: usize,
    modal: usize,
    modal_email: usize,
    tab_container: usize,
    tabs: Vec<usize>,
    panels: Vec<usize>,
    carousel: usize,
    slides: Vec<usize>,
    form: usize,
    name: usize,
    email: usize,
    message: usize,
    submit: usize,
}

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
    WidgetRegistry::reset_global();
    reset_document();
    reset_all_state();
}

fn field(form: usize, tag: &str, name: &str, label: &str) -> usize {
    let group = ElementBuilder::new("div").class("form-group").append_to(form);
    ElementBuilder::new("label").text(label).append_to(group);
    let field = ElementBuilder::new(tag).attr("name", name).attr("required", "").append_to(group);
    ElementBuilder::new("div").id(&format!("{name}-error")).class("error-message").append_to(group);
    field
}

fn build_page() -> Page {
    let nav = ElementBuilder::new("nav").class("navbar").append_to(body());
    let toggle = ElementBuilder::new("button").class("nav-toggle").append_to(nav);
    let menu = ElementBuilder::new("ul").class("nav-menu").append_to(nav);
    let links = ["#features", "#pricing", "#contact"]
        .iter()
        .map(|href| {
            let item = ElementBuilder::new("li").append_to(menu);
            ElementBuilder::new("a").attr("href", href).append_to(item)
        })
        .collect();

    let hero = ElementBuilder::new("section").id("hero").append_to(body());
    let signup = ElementBuilder::new("button")
        .attr("data-modal-trigger", "signupModal")
        .text("Get started")
        .append_to(hero);

    let modal = ElementBuilder::new("div").id("signupModal").append_to(body());
    let modal_email = ElementBuilder::new("input").attr("name", "signup-email").append_to(modal);

    let tab_container = ElementBuilder::new("div").attr("data-tabs", "").id("plans").append_to(body());
    let list = ElementBuilder::new("div").attr("role", "tablist").append_to(tab_container);
    let tabs: Vec<usize> = ["Monthly", "Yearly", "Lifetime"]
        .iter()
        .map(|label| ElementBuilder::new("button").attr("role", "tab").text(label).append_to(list))
        .collect();
    let panels = (0..tabs.len())
        .map(|_| ElementBuilder::new("div").attr("role", "tabpanel").append_to(tab_container))
        .collect();

    let carousel = ElementBuilder::new("div").attr("data-carousel", "").append_to(body());
    let slides = (0..3)
        .map(|i| {
            ElementBuilder::new("div")
                .class("ui-carousel-slide")
                .text(&format!("Testimonial {i}"))
                .append_to(carousel)
        })
        .collect();

    let form = ElementBuilder::new("form").id("contactForm").append_to(body());
    let name = field(form, "input", "name", "Name *");
    let email = field(form, "input", "email", "Email *");
    let message = field(form, "textarea", "message", "Message *");
    let submit = ElementBuilder::new("button")
        .class("form-submit")
        .text(SUBMIT_LABEL)
        .append_to(form);
    ElementBuilder::new("div").id("form-success").append_to(body());

    Page {
        toggle,
        links,
        signup,
        modal,
        modal_email,
        tab_container,
        tabs,
        panels,
        carousel,
        slides,
        form,
        name,
        email,
        message,
        submit,
    }
}

fn key(name: &str) -> bool {
    route_event(InputEvent::Key(KeyboardEvent::new(name)))
}

fn record(target: usize) -> (Rc<RefCell<Vec<WidgetEvent>>>, impl FnOnce()) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    let cleanup = events::on_event(target, move |e| s.borrow_mut().push(e.clone()));
    (seen, cleanup)
}

#[test]
fn mount_wires_every_widget() {
    init();
    let page = build_page();
    let handle = mount(WidgetConfig::default(), Rc::new(SimulatedTransport));

    assert!(handle.nav().is_some());
    assert!(handle.form().is_some());
    let registry = handle.registry().unwrap();
    assert_eq!(registry.tabs().len(), 1);
    assert_eq!(registry.carousels().len(), 1);
    assert_eq!(registry.modal_count(), 0);

    let skip = engine::children(body())[0];
    assert!(has_class(skip, "skip-link"));
    assert_eq!(get_attribute(skip, attr::HREF).as_deref(), Some("#hero"));

    // Initial tab state
    assert_eq!(get_attribute(page.tabs[0], attr::ARIA_SELECTED).as_deref(), Some("true"));
    assert_eq!(get_attribute(page.panels[1], attr::ARIA_HIDDEN).as_deref(), Some("true"));
    assert_eq!(get_attribute(page.tabs[0], attr::ARIA_CONTROLS).as_deref(), Some("plans-panel-0"));

    // Rescanning does not double-bind
    registry.scan();
    assert_eq!(registry.tabs().len(), 1);
    assert_eq!(registry.carousels().len(), 1);
}

#[test]
fn signup_modal_traps_and_restores_focus() {
    init();
    let page = build_page();
    let handle = mount(WidgetConfig::default(), Rc::new(SimulatedTransport));
    let (seen, _cleanup) = record(page.modal);

    route_event(InputEvent::Click(page.signup));
    assert_eq!(get_attribute(page.modal, attr::ARIA_HIDDEN).as_deref(), Some("false"));
    assert!(scroll_lock::is_scroll_locked());
    assert_eq!(active_element(), Some(page.signup));

    route_event(InputEvent::Tick(100));
    assert_eq!(active_element(), Some(page.modal_email));

    // Tab walks to the close button, then wraps back to the input
    assert!(key("Tab"));
    let close = active_element().unwrap();
    assert!(has_class(close, "ui-modal-close"));
    assert!(key("Tab"));
    assert_eq!(active_element(), Some(page.modal_email));
    assert!(route_event(InputEvent::Key(KeyboardEvent::with_modifiers("Tab", Modifiers::shift()))));
    assert_eq!(active_element(), Some(close));

    assert!(key("Escape"));
    assert_eq!(get_attribute(page.modal, attr::ARIA_HIDDEN).as_deref(), Some("true"));
    assert!(!scroll_lock::is_scroll_locked());
    assert_eq!(active_element(), Some(page.signup));

    let names: Vec<_> = seen.borrow().iter().map(WidgetEvent::name).collect();
    assert_eq!(names, vec!["modal:open", "modal:close"]);
    assert_eq!(handle.registry().unwrap().modal_count(), 1);
}

#[test]
fn tabs_follow_arrow_keys() {
    init();
    let page = build_page();
    let _handle = mount(WidgetConfig::default(), Rc::new(SimulatedTransport));
    let (seen, _cleanup) = record(page.tab_container);

    route_event(InputEvent::Click(page.tabs[0]));
    assert!(seen.borrow().is_empty());

    assert!(key("ArrowRight"));
    assert_eq!(active_element(), Some(page.tabs[1]));
    assert_eq!(get_attribute(page.tabs[1], attr::ARIA_SELECTED).as_deref(), Some("true"));
    assert_eq!(get_attribute(page.tabs[0], attr::TABINDEX).as_deref(), Some("-1"));
    assert_eq!(get_attribute(page.panels[1], attr::ARIA_HIDDEN).as_deref(), Some("false"));
    assert_eq!(get_attribute(page.panels[0], attr::ARIA_HIDDEN).as_deref(), Some("true"));

    key("End");
    assert_eq!(active_element(), Some(page.tabs[2]));
    key("ArrowRight");
    assert_eq!(active_element(), Some(page.tabs[0]));

    let actives: Vec<_> = seen
        .borrow()
        .iter()
        .filter_map(|e| match e {
            WidgetEvent::TabsChanged { active, .. } => Some(*active),
            _ => None,
        })
        .collect();
    assert_eq!(actives, vec![1, 2, 0]);
}

#[test]
fn carousel_autoplays_and_swipes() {
    init();
    let page = build_page();
    let handle = mount(WidgetConfig::default(), Rc::new(SimulatedTransport));
    let carousel = handle.registry().unwrap().carousels()[0].clone();
    let (seen, _cleanup) = record(page.carousel);

    assert_eq!(carousel.current_slide(), 0);
    assert_eq!(get_attribute(page.slides[0], attr::ARIA_HIDDEN).as_deref(), Some("false"));

    route_event(InputEvent::Tick(5000));
    assert_eq!(carousel.current_slide(), 1);
    route_event(InputEvent::Tick(600));

    route_event(InputEvent::TouchStart { target: page.slides[1], x: 300.0, y: 10.0 });
    route_event(InputEvent::TouchEnd { target: page.slides[1], x: 120.0, y: 12.0 });
    assert_eq!(carousel.current_slide(), 2);
    assert_eq!(get_attribute(page.slides[2], attr::ARIA_HIDDEN).as_deref(), Some("false"));
    assert_eq!(get_attribute(page.slides[1], attr::ARIA_HIDDEN).as_deref(), Some("true"));

    // Hovering pauses autoplay
    route_event(InputEvent::Hover(Some(page.slides[2])));
    assert!(!carousel.is_autoplaying());
    route_event(InputEvent::Tick(20_000));
    assert_eq!(carousel.current_slide(), 2);
    route_event(InputEvent::Hover(None));
    assert!(carousel.is_autoplaying());

    let currents: Vec<_> = seen
        .borrow()
        .iter()
        .filter_map(|e| match e {
            WidgetEvent::CarouselChanged { current, total } => {
                assert_eq!(*total, 3);
                Some(*current)
            }
            _ => None,
        })
        .collect();
    assert_eq!(currents, vec![1, 2]);
}

#[test]
fn nav_menu_opens_and_closes() {
    init();
    let page = build_page();
    let handle = mount(WidgetConfig::default(), Rc::new(SimulatedTransport));
    let nav = handle.nav().unwrap();

    route_event(InputEvent::Click(page.toggle));
    assert!(nav.is_expanded());
    assert!(scroll_lock::is_scroll_locked());
    route_event(InputEvent::Tick(100));
    assert_eq!(active_element(), Some(page.links[0]));

    route_event(InputEvent::Click(page.links[2]));
    assert!(!nav.is_expanded());
    assert!(!scroll_lock::is_scroll_locked());

    route_event(InputEvent::Click(page.toggle));
    key("Escape");
    assert!(!nav.is_expanded());
}

#[test]
fn contact_form_validates_then_submits() {
    init();
    let page = build_page();
    let payloads = Rc::new(RefCell::new(Vec::new()));
    let p = payloads.clone();
    let transport = move |payload: &str| -> Result<(), SubmitError> {
        p.borrow_mut().push(payload.to_string());
        Ok(())
    };
    let _handle = mount(WidgetConfig::default(), Rc::new(transport));
    let (seen, _cleanup) = record(page.form);

    // Empty submit shows every error and focuses the first
    route_event(InputEvent::Click(page.submit));
    assert!(has_class(page.name, "error"));
    assert!(has_class(page.email, "error"));
    assert!(has_class(page.message, "error"));
    let name_error = engine::get_element_by_id("name-error").unwrap();
    assert_eq!(text(name_error), "Name is required.");
    assert!(has_class(name_error, "show"));
    assert_eq!(active_element(), Some(page.name));
    assert!(!announcer::active_announcements().is_empty());

    // Typing clears the error right away
    route_event(InputEvent::Input { target: page.name, value: "Luna".into() });
    assert!(!has_class(page.name, "error"));
    assert!(!has_class(name_error, "show"));

    // Blur validates the field that was left
    route_event(InputEvent::Input { target: page.email, value: "luna@".into() });
    route_event(InputEvent::Focus(page.email));
    route_event(InputEvent::Focus(page.message));
    let email_error = engine::get_element_by_id("email-error").unwrap();
    assert_eq!(text(email_error), "Please enter a valid email address.");

    route_event(InputEvent::Input { target: page.email, value: "luna@nebula.pets".into() });
    route_event(InputEvent::Input { target: page.message, value: "Tell me about pricing".into() });

    route_event(InputEvent::Click(page.submit));
    assert_eq!(text(page.submit), SENDING_LABEL);
    assert!(engine::has_attribute(page.submit, attr::DISABLED));
    assert!(payloads.borrow().is_empty());

    // Clicking again while sending does nothing
    route_event(InputEvent::Click(page.submit));

    route_event(InputEvent::Tick(2000));
    assert_eq!(payloads.borrow().len(), 1);
    let sent: serde_json::Value = serde_json::from_str(&payloads.borrow()[0]).unwrap();
    assert_eq!(sent["email"], "luna@nebula.pets");
    assert_eq!(sent["name"], "Luna");

    let status = engine::get_element_by_id("form-success").unwrap();
    assert_eq!(text(status), SUCCESS_MESSAGE);
    assert!(has_class(status, "show"));
    assert_eq!(engine::value(page.name), "");
    assert_eq!(text(page.submit), SUBMIT_LABEL);
    assert!(!engine::has_attribute(page.submit, attr::DISABLED));
    assert!(matches!(seen.borrow().as_slice(), [WidgetEvent::FormSubmitted { success: true }]));

    route_event(InputEvent::Tick(5000));
    assert!(!has_class(status, "show"));
}

#[test]
fn unmount_unbinds_the_page() {
    init();
    let page = build_page();
    let handle = mount(WidgetConfig::default(), Rc::new(SimulatedTransport));
    let skip = handle.skip_link().unwrap();

    handle.unmount();
    assert!(WidgetRegistry::global().is_err());
    assert!(!engine::is_connected(skip));

    route_event(InputEvent::Click(page.signup));
    assert_ne!(get_attribute(page.modal, attr::ARIA_HIDDEN).as_deref(), Some("false"));
    route_event(InputEvent::Click(page.toggle));
    assert!(!has_class(page.toggle, "active"));

    // Tab falls back to no handling once global keys are gone
    assert!(!key("Tab"));
}
