//! Carousel - Cyclic slide show
//!
//! One slide is visible at a time. Transitions come from the prev/next
//! controls, the indicators, arrow keys, horizontal swipes and an autoplay
//! timer. After each transition the carousel stays busy for a settle window
//! and ignores further requests until it closes.
//!
//! # Example
//!
//! ```ignore
//! use spark_widgets::widgets::Carousel;
//!
//! let carousel = Carousel::new(container, &WidgetConfig::default());
//! carousel.next_slide();
//! timers::advance(500); // settle window over
//! carousel.go_to_slide(0);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};

use crate::config::WidgetConfig;
use crate::engine::{self, ElementBuilder};
use crate::error::WidgetError;
use crate::state::events::{self, WidgetEvent};
use crate::state::keyboard;
use crate::state::pointer::{self, PointerHandlers};
use crate::state::timers::{TimerId, TimerScope};
use crate::types::{aria_bool, attr, keys};

pub const CAROUSEL_CLASS: &str = "ui-carousel";
pub const SLIDE_CLASS: &str = "ui-carousel-slide";
pub const PREV_CLASS: &str = "ui-carousel-prev";
pub const NEXT_CLASS: &str = "ui-carousel-next";
pub const INDICATORS_CLASS: &str = "ui-carousel-indicators";
pub const INDICATOR_CLASS: &str = "ui-carousel-indicator";

struct CarouselInner {
    container: usize,
    slides: Vec<usize>,
    indicators: Vec<usize>,
    current: Signal<usize>,
    busy: Cell<bool>,
    settle_ms: u64,
    autoplay_ms: u64,
    swipe_threshold: f64,
    touch_start_x: Cell<f64>,
    settle_timer: Cell<Option<TimerId>>,
    autoplay_timer: Cell<Option<TimerId>>,
    timers: TimerScope,
    disposed: Cell<bool>,
    cleanups: RefCell<Vec<Box<dyn FnOnce()>>>,
}

/// Slide show bound to one container.
#[derive(Clone)]
pub struct Carousel(Rc<CarouselInner>);

impl Carousel {
    /// Prepare `container`, show the first slide and start autoplay.
    ///
    /// Without any `.ui-carousel-slide` the carousel stays inert.
    pub fn new(container: usize, config: &WidgetConfig) -> Self {
        engine::add_class(container, CAROUSEL_CLASS);
        let slides = engine::query_by_class(container, SLIDE_CLASS);

        let indicators = if slides.is_empty() {
            log::debug!("carousel {container} has no slides");
            Vec::new()
        } else {
            setup_markup(container, &slides)
        };

        let carousel = Carousel(Rc::new(CarouselInner {
            container,
            slides,
            indicators,
            current: signal(0),
            busy: Cell::new(false),
            settle_ms: config.carousel_settle_ms,
            autoplay_ms: config.autoplay_interval_ms,
            swipe_threshold: config.swipe_threshold_px,
            touch_start_x: Cell::new(0.0),
            settle_timer: Cell::new(None),
            autoplay_timer: Cell::new(None),
            timers: TimerScope::new(),
            disposed: Cell::new(false),
            cleanups: RefCell::new(Vec::new()),
        }));

        if !carousel.0.slides.is_empty() {
            carousel.bind();
            carousel.apply(0);
            carousel.start_autoplay();
        }
        carousel
    }

    fn bind(&self) {
        let container = self.0.container;
        let mut cleanups: Vec<Box<dyn FnOnce()>> = Vec::new();

        let mut on_click = |target: usize, action: fn(&Carousel)| {
            let weak = self.downgrade();
            cleanups.push(Box::new(pointer::on_element(
                target,
                PointerHandlers::click(move |_| {
                    if let Some(carousel) = Carousel::upgrade(&weak) {
                        action(&carousel);
                    }
                    true
                }),
            )));
        };
        if let Some(&prev) = engine::query_by_class(container, PREV_CLASS).first() {
            on_click(prev, Carousel::previous_slide);
        }
        if let Some(&next) = engine::query_by_class(container, NEXT_CLASS).first() {
            on_click(next, Carousel::next_slide);
        }

        for (i, &indicator) in self.0.indicators.iter().enumerate() {
            let weak = self.downgrade();
            cleanups.push(Box::new(pointer::on_element(
                indicator,
                PointerHandlers::click(move |_| {
                    if let Some(carousel) = Carousel::upgrade(&weak) {
                        carousel.go_to_slide(i);
                    }
                    true
                }),
            )));
        }

        let weak = self.downgrade();
        cleanups.push(Box::new(keyboard::on_element(container, move |event| {
            let Some(carousel) = Carousel::upgrade(&weak) else {
                return false;
            };
            match event.key.as_str() {
                keys::ARROW_LEFT => carousel.previous_slide(),
                keys::ARROW_RIGHT => carousel.next_slide(),
                keys::HOME => carousel.go_to_slide(0),
                keys::END => carousel.go_to_slide(carousel.slide_count() - 1),
                _ => return false,
            }
            true
        })));

        let (w_start, w_end, w_enter, w_leave) =
            (self.downgrade(), self.downgrade(), self.downgrade(), self.downgrade());
        cleanups.push(Box::new(pointer::on_element(
            container,
            PointerHandlers {
                on_touch_start: Some(Rc::new(move |event| {
                    if let Some(carousel) = Carousel::upgrade(&w_start) {
                        carousel.0.touch_start_x.set(event.x);
                    }
                })),
                on_touch_end: Some(Rc::new(move |event| {
                    if let Some(carousel) = Carousel::upgrade(&w_end) {
                        carousel.handle_swipe(event.x);
                    }
                })),
                on_enter: Some(Rc::new(move |_| {
                    if let Some(carousel) = Carousel::upgrade(&w_enter) {
                        carousel.stop_autoplay();
                    }
                })),
                on_leave: Some(Rc::new(move |_| {
                    if let Some(carousel) = Carousel::upgrade(&w_leave) {
                        carousel.start_autoplay();
                    }
                })),
                ..Default::default()
            },
        )));

        self.0.cleanups.borrow_mut().extend(cleanups);
    }

    fn downgrade(&self) -> Weak<CarouselInner> {
        Rc::downgrade(&self.0)
    }

    fn upgrade(weak: &Weak<CarouselInner>) -> Option<Carousel> {
        weak.upgrade().map(Carousel)
    }

    pub fn container(&self) -> usize {
        self.0.container
    }

    pub fn slides(&self) -> &[usize] {
        &self.0.slides
    }

    pub fn indicators(&self) -> &[usize] {
        &self.0.indicators
    }

    pub fn slide_count(&self) -> usize {
        self.0.slides.len()
    }

    /// Index of the visible slide.
    pub fn current_slide(&self) -> usize {
        self.0.current.get()
    }

    /// Inside a settle window.
    pub fn is_busy(&self) -> bool {
        self.0.busy.get()
    }

    pub fn is_autoplaying(&self) -> bool {
        self.0.autoplay_timer.get().is_some()
    }

    /// Show slide `index`. Ignored while busy or when out of range.
    pub fn show_slide(&self, index: usize) {
        let inner = &self.0;
        if inner.disposed.get() || inner.busy.get() || index >= inner.slides.len() {
            log::trace!("carousel {} ignoring slide {index}", inner.container);
            return;
        }

        inner.busy.set(true);
        self.apply(index);

        let weak = self.downgrade();
        let timer = inner.timers.timeout(inner.settle_ms, move || {
            if let Some(carousel) = Carousel::upgrade(&weak) {
                carousel.0.settle_timer.set(None);
                carousel.0.busy.set(false);
            }
        });
        inner.settle_timer.set(timer);

        events::emit(
            inner.container,
            WidgetEvent::CarouselChanged {
                current: index,
                total: inner.slides.len(),
            },
        );
    }

    fn apply(&self, index: usize) {
        let inner = &self.0;
        let previous = inner.current.get();
        if let Some(&slide) = inner.slides.get(previous) {
            engine::set_attribute(slide, attr::ARIA_HIDDEN, aria_bool(true));
        }
        if let Some(&indicator) = inner.indicators.get(previous) {
            engine::set_attribute(indicator, attr::ARIA_SELECTED, aria_bool(false));
        }

        inner.current.set(index);
        if let Some(&slide) = inner.slides.get(index) {
            engine::set_attribute(slide, attr::ARIA_HIDDEN, aria_bool(false));
        }
        if let Some(&indicator) = inner.indicators.get(index) {
            engine::set_attribute(indicator, attr::ARIA_SELECTED, aria_bool(true));
        }
    }

    pub fn next_slide(&self) {
        let count = self.slide_count();
        if count > 0 {
            self.show_slide((self.current_slide() + 1) % count);
        }
    }

    pub fn previous_slide(&self) {
        let count = self.slide_count();
        if count > 0 {
            self.show_slide((self.current_slide() + count - 1) % count);
        }
    }

    pub fn go_to_slide(&self, index: usize) {
        self.show_slide(index);
    }

    fn handle_swipe(&self, end_x: f64) {
        let distance = self.0.touch_start_x.get() - end_x;
        if distance.abs() > self.0.swipe_threshold {
            if distance > 0.0 {
                self.next_slide();
            } else {
                self.previous_slide();
            }
        }
    }

    /// (Re)start the autoplay timer. Any running timer is replaced.
    pub fn start_autoplay(&self) {
        self.stop_autoplay();
        let inner = &self.0;
        if inner.disposed.get() || inner.slides.is_empty() || inner.autoplay_ms == 0 {
            return;
        }
        let weak = self.downgrade();
        let timer = inner.timers.interval(inner.autoplay_ms, move || {
            if let Some(carousel) = Carousel::upgrade(&weak) {
                carousel.next_slide();
            }
        });
        inner.autoplay_timer.set(timer);
    }

    pub fn stop_autoplay(&self) {
        if let Some(id) = self.0.autoplay_timer.take() {
            self.0.timers.cancel(id);
        }
    }

    /// Stop autoplay, cancel the settle window and drop every handler.
    pub fn dispose(&self) {
        let inner = &self.0;
        if inner.disposed.replace(true) {
            return;
        }
        self.stop_autoplay();
        inner.settle_timer.set(None);
        inner.busy.set(false);
        inner.timers.cancel_all();
        let cleanups: Vec<_> = inner.cleanups.borrow_mut().drain(..).collect();
        for cleanup in cleanups {
            cleanup();
        }
    }
}

/// ARIA labelling plus prev/next controls and indicators (created if absent).
/// Returns the indicator elements.
fn setup_markup(container: usize, slides: &[usize]) -> Vec<usize> {
    let total = slides.len();
    engine::set_attribute(container, attr::ROLE, "region");
    engine::set_attribute(container, attr::ARIA_LABEL, "Image carousel");
    for (i, &slide) in slides.iter().enumerate() {
        engine::set_attribute(slide, attr::ARIA_HIDDEN, "true");
        engine::set_attribute(slide, attr::ARIA_LABEL, &format!("Slide {} of {}", i + 1, total));
    }

    if engine::query_by_class(container, PREV_CLASS).is_empty() {
        control_button(PREV_CLASS, "‹", "Previous slide").append_to(container);
    }
    if engine::query_by_class(container, NEXT_CLASS).is_empty() {
        control_button(NEXT_CLASS, "›", "Next slide").append_to(container);
    }

    let strip = match engine::query_by_class(container, INDICATORS_CLASS).first() {
        Some(&existing) => existing,
        None => ElementBuilder::new("div")
            .class(INDICATORS_CLASS)
            .attr(attr::ROLE, "tablist")
            .attr(attr::ARIA_LABEL, "Slide indicators")
            .append_to(container),
    };

    let existing = engine::query_by_class(strip, INDICATOR_CLASS);
    if existing.len() == total {
        return existing;
    }
    if !existing.is_empty() {
        let err = WidgetError::IndicatorMismatch { indicators: existing.len(), slides: total };
        log::warn!("Rebuilding carousel indicators: {err}");
        for indicator in existing {
            engine::remove_element(indicator);
        }
    }
    (0..total)
        .map(|i| {
            control_button(INDICATOR_CLASS, "", &format!("Go to slide {}", i + 1))
                .attr(attr::ROLE, "tab")
                .attr(attr::ARIA_SELECTED, "false")
                .append_to(strip)
        })
        .collect()
}

fn control_button(class: &str, text: &str, label: &str) -> ElementBuilder {
    let builder = ElementBuilder::new("button")
        .class(class)
        .attr(attr::TYPE, "button")
        .attr(attr::ARIA_LABEL, label);
    if text.is_empty() { builder } else { builder.text(text) }
}
