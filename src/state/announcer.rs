//! Live-region announcements for assistive technology.
//!
//! Each announcement is a short-lived, visually hidden element appended to
//! the body. It removes itself once its time to live elapses.

use super::timers;
use crate::engine;
use crate::types::attr;

/// Class that hides an element visually while keeping it readable.
pub const SR_ONLY_CLASS: &str = "sr-only";

/// Announce `message` and remove the region after `ttl_ms`.
///
/// Returns the live-region element.
pub fn announce(message: &str, ttl_ms: u64) -> usize {
    let region = engine::ElementBuilder::new("div")
        .attr(attr::ARIA_LIVE, "assertive")
        .attr(attr::ARIA_ATOMIC, "true")
        .class(SR_ONLY_CLASS)
        .text(message)
        .append_to(engine::body());

    let key = engine::get_key(region);
    timers::set_timeout(ttl_ms, move || {
        // The index may have been recycled if the document was rebuilt
        if engine::get_key(region) == key {
            engine::remove_element(region);
        }
    });
    log::trace!("announced: {message}");
    region
}

/// Live regions currently in the document.
pub fn active_announcements() -> Vec<usize> {
    engine::query_all(engine::body(), |i| {
        engine::has_class(i, SR_ONLY_CLASS) && engine::has_attribute(i, attr::ARIA_LIVE)
    })
}
