//! # spark-widgets
//!
//! Accessible interactive widgets for a marketing page, running over a
//! headless document model.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! fine-grained reactivity.
//!
//! ## Architecture
//!
//! Elements are indices into parallel arrays (ECS-style) rather than objects.
//! Widgets bind handlers to those indices, and the host feeds events in:
//!
//! ```text
//! host events → input::route_event → focus / keyboard / pointer → widgets → document
//!                                   timers::advance ────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Element flags, attribute names, key names
//! - [`engine`] - Element registry, parallel arrays, tree operations
//! - [`state`] - Focus, keyboard, pointer, timers, scroll lock, notifications
//! - [`widgets`] - Modal, tabs, carousel, navigation menu, widget registry
//! - [`forms`] - Contact form validation and submission
//! - [`site`] - Page mount (skip link, global keys, every widget)

pub mod config;
pub mod engine;
pub mod error;
pub mod forms;
pub mod site;
pub mod state;
pub mod types;
pub mod widgets;

// Re-export commonly used items
pub use types::*;

pub use config::WidgetConfig;
pub use error::{Result, WidgetError};

pub use engine::{
    body, create_element, get_element_by_id, remove_element, reset_document, ElementBuilder,
};

pub use state::events::WidgetEvent;
pub use state::input::{route_event, InputEvent};
pub use state::keyboard::{KeyboardEvent, Modifiers};
pub use state::reset_all_state;

pub use widgets::{focusable_within, Carousel, FocusTrap, Modal, NavMenu, Tabs, WidgetRegistry};

pub use forms::{ContactForm, FieldError, FormData, SimulatedTransport, SubmitError, SubmitTransport};

pub use site::{install_skip_link, mount, MountHandle};
