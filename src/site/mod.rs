//! Site - Page-level wiring of every widget and helper
//!
//! - **mount** - One call that sets up the whole page and its teardown
//! - skip link for keyboard users

mod mount;

pub use mount::{mount, MountHandle, CONTACT_FORM_ID, MAIN_CONTENT_ID};

use crate::engine::{self, ElementBuilder};
use crate::types::attr;

pub const SKIP_LINK_CLASS: &str = "skip-link";

/// Put a "Skip to main content" link first in the body.
///
/// Returns the existing link if one is already installed.
pub fn install_skip_link(target_id: &str) -> usize {
    let body = engine::body();
    if let Some(&existing) = engine::query_by_class(body, SKIP_LINK_CLASS).first() {
        return existing;
    }
    let link = ElementBuilder::new("a")
        .class(SKIP_LINK_CLASS)
        .attr(attr::HREF, &format!("#{target_id}"))
        .text("Skip to main content")
        .build();
    let first = engine::children(body).first().copied();
    engine::insert_before(body, link, first);
    link
}
