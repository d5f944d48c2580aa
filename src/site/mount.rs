//! Mount API - Page lifecycle.
//!
//! `mount` installs the widget registry, scans the document, binds the
//! navigation menu and contact form, adds the skip link and turns on default
//! Tab navigation. The returned handle tears all of it down again.
//!
//! # Example
//!
//! ```ignore
//! use spark_widgets::site::mount;
//!
//! let handle = mount(WidgetConfig::default(), Rc::new(SimulatedTransport));
//!
//! // Feed host events
//! input::route_event(InputEvent::Click(signup_button));
//! input::route_event(InputEvent::Tick(16));
//!
//! // Clean up
//! handle.unmount();
//! ```

use std::rc::Rc;

use super::install_skip_link;
use crate::config::WidgetConfig;
use crate::engine;
use crate::forms::{ContactForm, SubmitTransport};
use crate::state::global_keys::{self, GlobalKeysHandle};
use crate::widgets::{NavMenu, WidgetRegistry};

/// Id of the contact form element.
pub const CONTACT_FORM_ID: &str = "contactForm";

/// Id of the element the skip link jumps to.
pub const MAIN_CONTENT_ID: &str = "hero";

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by `mount()`. Unmounting (or dropping) tears down the page.
pub struct MountHandle {
    registry: Option<WidgetRegistry>,
    nav: Option<NavMenu>,
    form: Option<ContactForm>,
    skip_link: Option<usize>,
    global_keys: Option<GlobalKeysHandle>,
}

impl MountHandle {
    pub fn registry(&self) -> Option<&WidgetRegistry> {
        self.registry.as_ref()
    }

    pub fn nav(&self) -> Option<&NavMenu> {
        self.nav.as_ref()
    }

    pub fn form(&self) -> Option<&ContactForm> {
        self.form.as_ref()
    }

    pub fn skip_link(&self) -> Option<usize> {
        self.skip_link
    }

    pub fn is_mounted(&self) -> bool {
        self.registry.is_some()
    }

    /// Dispose every widget, handler and timer owned by the page.
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(handle) = self.global_keys.take() {
            handle.cleanup();
        }
        if let Some(form) = self.form.take() {
            form.dispose();
        }
        if let Some(nav) = self.nav.take() {
            nav.dispose();
        }
        if let Some(link) = self.skip_link.take() {
            engine::remove_element(link);
        }
        if self.registry.take().is_some() {
            WidgetRegistry::reset_global();
            log::debug!("page unmounted");
        }
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// Mount Function
// =============================================================================

/// Set up the whole page.
///
/// Only the first mount owns the page. While it is alive, further calls
/// return an inert handle whose teardown touches nothing.
///
/// Missing optional pieces (navigation, contact form) are warned about and
/// skipped; everything else still works.
pub fn mount(config: WidgetConfig, transport: Rc<dyn SubmitTransport>) -> MountHandle {
    if WidgetRegistry::global().is_ok() {
        log::warn!("page already mounted; returning an inert handle");
        return MountHandle {
            registry: None,
            nav: None,
            form: None,
            skip_link: None,
            global_keys: None,
        };
    }

    let registry = WidgetRegistry::install(config.clone());
    registry.scan();

    let nav = match NavMenu::attach(&config) {
        Ok(nav) => Some(nav),
        Err(err) => {
            log::warn!("Navigation elements not found: {err}");
            None
        }
    };

    let form = match ContactForm::attach(CONTACT_FORM_ID, transport, &config) {
        Ok(form) => Some(form),
        Err(err) => {
            log::warn!("Contact form not found: {err}");
            None
        }
    };

    let skip_link = install_skip_link(MAIN_CONTENT_ID);
    let global_keys = global_keys::setup_global_keys();

    log::debug!("page mounted");
    MountHandle {
        registry: Some(registry),
        nav,
        form,
        skip_link: Some(skip_link),
        global_keys: Some(global_keys),
    }
}
