//! Widgets - Interactive components bound to document elements
//!
//! - **FocusTrap** - Tab wrapping inside a container
//! - **Modal** - Dialog with focus containment and scroll lock
//! - **Tabs** - Single-selection tab/panel switcher
//! - **Carousel** - Cyclic slide show with gestures and autoplay
//! - **NavMenu** - Responsive navigation toggle
//! - **WidgetRegistry** - Scans markers and owns every instance
//!
//! Every widget is a cheap `Rc` handle. Event handlers hold weak
//! references only, and `dispose()` unbinds everything the widget owns.

pub mod carousel;
pub mod focus_trap;
pub mod modal;
pub mod nav_menu;
pub mod registry;
pub mod tabs;

pub use carousel::Carousel;
pub use focus_trap::{focusable_within, FocusTrap};
pub use modal::Modal;
pub use nav_menu::NavMenu;
pub use registry::WidgetRegistry;
pub use tabs::Tabs;
