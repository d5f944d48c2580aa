//! Document Tree - Element creation, mutation and queries.
//!
//! The document is a forest of element indices. One element is the body;
//! anything whose parent chain reaches it is *connected*. Widgets only ever
//! see connected elements through the queries here.
//!
//! # Example
//!
//! ```ignore
//! use spark_widgets::engine::{body, ElementBuilder, query_by_class};
//!
//! let carousel = ElementBuilder::new("div").attr("data-carousel", "").append_to(body());
//! for _ in 0..3 {
//!     ElementBuilder::new("div").class("ui-carousel-slide").append_to(carousel);
//! }
//! assert_eq!(query_by_class(carousel, "ui-carousel-slide").len(), 3);
//! ```

use std::cell::Cell;

use super::arrays::{attributes, core, interaction};
use super::registry::{allocate_index, get_index, is_allocated, release_index, reset_registry};
use crate::types::{attr, ElementState};

const BODY_KEY: &str = "body";

thread_local! {
    static BODY: Cell<Option<usize>> = const { Cell::new(None) };
}

// =============================================================================
// Document Root
// =============================================================================

/// The document body, created on first use.
pub fn body() -> usize {
    BODY.with(|cell| {
        if let Some(index) = cell.get() {
            if is_allocated(index) {
                return index;
            }
        }
        let index = get_index(BODY_KEY).unwrap_or_else(|| {
            let index = allocate_index(Some(BODY_KEY));
            core::set_tag(index, "body".to_string());
            index
        });
        cell.set(Some(index));
        index
    })
}

/// Drop every element and start from an empty body (for testing).
pub fn reset_document() {
    reset_registry();
    BODY.with(|cell| cell.set(None));
}

// =============================================================================
// Creation & Mutation
// =============================================================================

/// Create a detached element.
pub fn create_element(tag: &str) -> usize {
    let index = allocate_index(None);
    core::set_tag(index, tag.to_ascii_lowercase());
    index
}

/// Detach an element from its parent, keeping it allocated.
pub fn detach(index: usize) {
    if let Some(parent) = core::get_parent(index) {
        let mut siblings = core::get_children(parent);
        siblings.retain(|&c| c != index);
        core::set_children(parent, siblings);
        core::set_parent(index, None);
    }
}

/// Append `child` as the last child of `parent`.
pub fn append_child(parent: usize, child: usize) {
    insert_before(parent, child, None);
}

/// Insert `child` into `parent` before `reference` (or last when `None`).
///
/// Inserting an ancestor into its own subtree is ignored.
pub fn insert_before(parent: usize, child: usize, reference: Option<usize>) {
    if contains(child, parent) {
        return;
    }
    detach(child);
    let mut children = core::get_children(parent);
    let position = reference
        .and_then(|r| children.iter().position(|&c| c == r))
        .unwrap_or(children.len());
    children.insert(position, child);
    core::set_children(parent, children);
    core::set_parent(child, Some(parent));
}

/// Remove an element and its subtree from the document and release them.
pub fn remove_element(index: usize) {
    if index == body() {
        return;
    }
    detach(index);
    let mut released = descendants(index);
    released.push(index);
    release_index(index);
    // Recycled indices must not inherit the old element's handlers
    for released_index in released {
        crate::state::cleanup_element(released_index);
    }
}

// =============================================================================
// Structure Queries
// =============================================================================

/// Tag name of an element.
pub fn tag(index: usize) -> String {
    core::get_tag(index)
}

/// Parent of an element.
pub fn parent(index: usize) -> Option<usize> {
    core::get_parent(index)
}

/// Children in document order.
pub fn children(index: usize) -> Vec<usize> {
    core::get_children(index)
}

/// Element immediately before this one under the same parent.
pub fn previous_sibling(index: usize) -> Option<usize> {
    let parent = core::get_parent(index)?;
    let siblings = core::get_children(parent);
    let position = siblings.iter().position(|&c| c == index)?;
    position.checked_sub(1).map(|p| siblings[p])
}

/// True when `node` is `ancestor` or lies inside its subtree.
pub fn contains(ancestor: usize, node: usize) -> bool {
    let mut current = Some(node);
    while let Some(index) = current {
        if index == ancestor {
            return true;
        }
        current = core::get_parent(index);
    }
    false
}

/// True when the element is allocated and reachable from the body.
pub fn is_connected(index: usize) -> bool {
    is_allocated(index) && contains(body(), index)
}

/// All descendants of `root` in document (pre-)order, excluding `root`.
pub fn descendants(root: usize) -> Vec<usize> {
    let mut result = Vec::new();
    let mut stack: Vec<usize> = core::get_children(root).into_iter().rev().collect();
    while let Some(index) = stack.pop() {
        result.push(index);
        stack.extend(core::get_children(index).into_iter().rev());
    }
    result
}

/// Descendants of `root` matching a predicate, in document order.
pub fn query_all(root: usize, predicate: impl Fn(usize) -> bool) -> Vec<usize> {
    descendants(root).into_iter().filter(|&i| predicate(i)).collect()
}

/// First descendant of `root` matching a predicate.
pub fn query_first(root: usize, predicate: impl Fn(usize) -> bool) -> Option<usize> {
    descendants(root).into_iter().find(|&i| predicate(i))
}

/// Descendants carrying an attribute (any value).
pub fn query_by_attribute(root: usize, name: &str) -> Vec<usize> {
    query_all(root, |i| has_attribute(i, name))
}

/// Descendants carrying a class.
pub fn query_by_class(root: usize, class: &str) -> Vec<usize> {
    query_all(root, |i| has_class(i, class))
}

/// Descendants with a given `role`.
pub fn query_by_role(root: usize, role: &str) -> Vec<usize> {
    query_all(root, |i| get_attribute(i, attr::ROLE).as_deref() == Some(role))
}

/// Descendants with one of the given tags.
pub fn query_by_tag(root: usize, tags: &[&str]) -> Vec<usize> {
    query_all(root, |i| {
        let tag = core::get_tag(i);
        tags.iter().any(|t| *t == tag)
    })
}

/// Connected element with the given `id` attribute.
pub fn get_element_by_id(id: &str) -> Option<usize> {
    if id.is_empty() {
        return None;
    }
    query_first(body(), |i| get_attribute(i, attr::ID).as_deref() == Some(id))
}

// =============================================================================
// Attributes, Classes, Text
// =============================================================================

/// Read an attribute.
pub fn get_attribute(index: usize, name: &str) -> Option<String> {
    attributes::get_attribute(index, name)
}

/// Check whether an attribute is present.
pub fn has_attribute(index: usize, name: &str) -> bool {
    attributes::get_attribute(index, name).is_some()
}

/// Write an attribute. `disabled` is mirrored into the interaction flags.
pub fn set_attribute(index: usize, name: &str, value: &str) {
    attributes::set_attribute(index, name, value);
    if name == attr::DISABLED {
        interaction::set_flag(index, ElementState::DISABLED, true);
    }
}

/// Remove an attribute.
pub fn remove_attribute(index: usize, name: &str) {
    attributes::remove_attribute(index, name);
    if name == attr::DISABLED {
        interaction::set_flag(index, ElementState::DISABLED, false);
    }
}

/// Check class membership.
pub fn has_class(index: usize, class: &str) -> bool {
    attributes::has_class(index, class)
}

/// Add a class.
pub fn add_class(index: usize, class: &str) {
    attributes::add_class(index, class);
}

/// Remove a class.
pub fn remove_class(index: usize, class: &str) {
    attributes::remove_class(index, class);
}

/// Add or remove a class depending on `on`.
pub fn set_class(index: usize, class: &str, on: bool) {
    if on {
        add_class(index, class);
    } else {
        remove_class(index, class);
    }
}

/// Flip a class. Returns whether it is now present.
pub fn toggle_class(index: usize, class: &str) -> bool {
    let on = !has_class(index, class);
    set_class(index, class, on);
    on
}

/// The element's own text.
pub fn text(index: usize) -> String {
    core::get_text(index)
}

/// Replace the element's own text.
pub fn set_text(index: usize, text: &str) {
    core::set_text(index, text.to_string());
}

/// Current form value (`value` attribute).
pub fn value(index: usize) -> String {
    get_attribute(index, attr::VALUE).unwrap_or_default()
}

// =============================================================================
// Builder
// =============================================================================

/// Fluent construction of elements, used by hosts and tests.
pub struct ElementBuilder {
    tag: String,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    text: Option<String>,
}

impl ElementBuilder {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: Vec::new(),
            classes: Vec::new(),
            text: None,
        }
    }

    pub fn id(self, id: &str) -> Self {
        self.attr(attr::ID, id)
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Create the element without attaching it.
    pub fn build(self) -> usize {
        let index = create_element(&self.tag);
        for (name, value) in &self.attributes {
            set_attribute(index, name, value);
        }
        for class in &self.classes {
            add_class(index, class);
        }
        if let Some(text) = &self.text {
            set_text(index, text);
        }
        index
    }

    /// Create the element as the last child of `parent`.
    pub fn append_to(self, parent: usize) -> usize {
        let index = self.build();
        append_child(parent, index);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() {
        reset_document();
    }

    #[test]
    fn test_body_is_stable() {
        setup();
        let b = body();
        assert_eq!(body(), b);
        assert!(is_connected(b));
        assert_eq!(tag(b), "body");
    }

    #[test]
    fn test_append_and_descendants_order() {
        setup();
        let list = ElementBuilder::new("ul").append_to(body());
        let a = ElementBuilder::new("li").append_to(list);
        let b = ElementBuilder::new("li").append_to(list);
        let inner = ElementBuilder::new("span").append_to(a);

        assert_eq!(descendants(list), vec![a, inner, b]);
        assert_eq!(children(list), vec![a, b]);
        assert_eq!(parent(inner), Some(a));
        assert!(contains(list, inner));
        assert!(!contains(b, inner));
    }

    #[test]
    fn test_insert_before_first_child() {
        setup();
        let modal = ElementBuilder::new("div").append_to(body());
        let content = ElementBuilder::new("div").append_to(modal);
        let backdrop = create_element("div");

        let first = children(modal).first().copied();
        insert_before(modal, backdrop, first);
        assert_eq!(children(modal), vec![backdrop, content]);
    }

    #[test]
    fn test_detach_disconnects() {
        setup();
        let section = ElementBuilder::new("section").append_to(body());
        let button = ElementBuilder::new("button").append_to(section);
        assert!(is_connected(button));

        detach(section);
        assert!(!is_connected(button));
        assert!(is_allocated(button));
    }

    #[test]
    fn test_remove_element_releases_subtree() {
        setup();
        let section = ElementBuilder::new("section").append_to(body());
        let button = ElementBuilder::new("button").append_to(section);

        remove_element(section);
        assert!(!is_allocated(section));
        assert!(!is_allocated(button));
        assert!(children(body()).is_empty());
    }

    #[test]
    fn test_get_element_by_id_ignores_detached() {
        setup();
        let dialog = ElementBuilder::new("div").id("signup").append_to(body());
        assert_eq!(get_element_by_id("signup"), Some(dialog));

        detach(dialog);
        assert_eq!(get_element_by_id("signup"), None);
        assert_eq!(get_element_by_id(""), None);
    }

    #[test]
    fn test_queries() {
        setup();
        let tabs = ElementBuilder::new("div").attr("data-tabs", "").append_to(body());
        let t0 = ElementBuilder::new("button").attr("role", "tab").append_to(tabs);
        let p0 = ElementBuilder::new("div").attr("role", "tabpanel").class("panel").append_to(tabs);

        assert_eq!(query_by_attribute(body(), "data-tabs"), vec![tabs]);
        assert_eq!(query_by_role(tabs, "tab"), vec![t0]);
        assert_eq!(query_by_class(tabs, "panel"), vec![p0]);
        assert_eq!(query_by_tag(tabs, &["button"]), vec![t0]);
    }

    #[test]
    fn test_previous_sibling() {
        setup();
        let form = ElementBuilder::new("form").append_to(body());
        let label = ElementBuilder::new("label").text("Email *").append_to(form);
        let input = ElementBuilder::new("input").append_to(form);

        assert_eq!(previous_sibling(input), Some(label));
        assert_eq!(previous_sibling(label), None);
    }

    #[test]
    fn test_classes_and_disabled_flag() {
        setup();
        let button = ElementBuilder::new("button").class("form-submit").append_to(body());

        assert!(toggle_class(button, "active"));
        assert!(has_class(button, "active"));
        assert!(!toggle_class(button, "active"));

        set_attribute(button, "disabled", "");
        assert!(interaction::get_disabled(button));
        remove_attribute(button, "disabled");
        assert!(!interaction::get_disabled(button));
    }
}
