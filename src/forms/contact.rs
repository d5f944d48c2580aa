//! ContactForm - Inline validation and submission of the contact form
//!
//! Fields are validated when they lose focus and cleared as soon as the user
//! types. Submitting validates every required field, then hands a JSON
//! payload to a `SubmitTransport` after the configured latency.
//!
//! # Example
//!
//! ```ignore
//! use spark_widgets::forms::{ContactForm, SimulatedTransport};
//!
//! let form = ContactForm::attach("contactForm", Rc::new(SimulatedTransport), &config)?;
//! input::set_value(email_field, "luna@nebula.pets");
//! input::submit(form.element());
//! timers::advance(config.submit_latency_ms);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use serde::Serialize;

use super::validation::{clean_label, validate_value, FieldError};
use crate::config::WidgetConfig;
use crate::engine;
use crate::error::{Result, WidgetError};
use crate::state::events::{self, WidgetEvent};
use crate::state::focus::{self, FocusCallbacks};
use crate::state::pointer::{self, PointerHandlers};
use crate::state::timers::TimerScope;
use crate::state::{announcer, input};
use crate::types::attr;

pub const SUBMIT_CLASS: &str = "form-submit";
pub const STATUS_ID: &str = "form-success";
pub const ERROR_CLASS: &str = "error";
pub const SHOW_CLASS: &str = "show";

pub const SUBMIT_LABEL: &str = "Send Message";
pub const SENDING_LABEL: &str = "Sending...";
pub const SUCCESS_MESSAGE: &str =
    "Thank you! Your message has been sent successfully. We'll get back to you soon!";
pub const FAILURE_MESSAGE: &str = "Sorry, there was an error sending your message. Please try again.";

// =============================================================================
// TRANSPORT
// =============================================================================

/// Submission failure.
#[derive(thiserror::Error, Debug)]
pub enum SubmitError {
    #[error("transport rejected the submission: {0}")]
    Rejected(String),

    #[error("could not encode form data: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Delivers a serialized form payload.
pub trait SubmitTransport {
    fn send(&self, payload: &str) -> std::result::Result<(), SubmitError>;
}

impl<F> SubmitTransport for F
where
    F: Fn(&str) -> std::result::Result<(), SubmitError>,
{
    fn send(&self, payload: &str) -> std::result::Result<(), SubmitError> {
        self(payload)
    }
}

/// Stand-in for a real endpoint: accepts every submission.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedTransport;

impl SubmitTransport for SimulatedTransport {
    fn send(&self, payload: &str) -> std::result::Result<(), SubmitError> {
        log::info!("simulated submission: {payload}");
        Ok(())
    }
}

/// Named field values of a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormData(BTreeMap<String, String>);

impl FormData {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> std::result::Result<String, SubmitError> {
        Ok(serde_json::to_string(self)?)
    }
}

// =============================================================================
// CONTACT FORM
// =============================================================================

struct FormInner {
    form: usize,
    fields: Vec<usize>,
    submit_button: Option<usize>,
    status: Option<usize>,
    transport: Rc<dyn SubmitTransport>,
    announcement_ttl_ms: u64,
    submit_latency_ms: u64,
    success_ttl_ms: u64,
    submitting: Cell<bool>,
    timers: TimerScope,
    cleanups: RefCell<Vec<Box<dyn FnOnce()>>>,
}

#[derive(Clone)]
pub struct ContactForm(Rc<FormInner>);

impl ContactForm {
    /// Bind validation and submission to the form with id `form_id`.
    pub fn attach(form_id: &str, transport: Rc<dyn SubmitTransport>, config: &WidgetConfig) -> Result<Self> {
        let form = engine::get_element_by_id(form_id)
            .ok_or_else(|| WidgetError::MissingContainer { id: form_id.to_string() })?;
        let fields = engine::query_by_tag(form, &["input", "textarea", "select"]);
        let submit_button = engine::query_by_class(form, SUBMIT_CLASS).first().copied();
        let status = engine::get_element_by_id(STATUS_ID);
        if status.is_none() {
            log::warn!("form status element #{STATUS_ID} not found");
        }

        let contact = ContactForm(Rc::new(FormInner {
            form,
            fields,
            submit_button,
            status,
            transport,
            announcement_ttl_ms: config.announcement_ttl_ms,
            submit_latency_ms: config.submit_latency_ms,
            success_ttl_ms: config.success_message_ttl_ms,
            submitting: Cell::new(false),
            timers: TimerScope::new(),
            cleanups: RefCell::new(Vec::new()),
        }));
        contact.bind();
        Ok(contact)
    }

    fn bind(&self) {
        let mut cleanups: Vec<Box<dyn FnOnce()>> = Vec::new();

        for &field in &self.0.fields {
            let weak = self.downgrade();
            let on_blur: Rc<dyn Fn()> = Rc::new(move || {
                if let Some(contact) = ContactForm::upgrade(&weak) {
                    // Outcome is shown inline; nothing else to do here
                    let _ = contact.validate_field(field);
                }
            });
            cleanups.push(Box::new(focus::register_callbacks(
                field,
                FocusCallbacks { on_focus: None, on_blur: Some(on_blur) },
            )));

            let weak = self.downgrade();
            cleanups.push(Box::new(input::on_input(field, move |field, _| {
                if let Some(contact) = ContactForm::upgrade(&weak) {
                    contact.clear_error(field);
                }
            })));
        }

        let weak = self.downgrade();
        cleanups.push(Box::new(input::on_submit(self.0.form, move |_| {
            if let Some(contact) = ContactForm::upgrade(&weak) {
                contact.handle_submit();
            }
        })));

        if let Some(button) = self.0.submit_button {
            let form = self.0.form;
            cleanups.push(Box::new(pointer::on_element(
                button,
                PointerHandlers::click(move |_| {
                    if !engine::has_attribute(button, attr::DISABLED) {
                        input::submit(form);
                    }
                    true
                }),
            )));
        }

        self.0.cleanups.borrow_mut().extend(cleanups);
    }

    fn downgrade(&self) -> Weak<FormInner> {
        Rc::downgrade(&self.0)
    }

    fn upgrade(weak: &Weak<FormInner>) -> Option<ContactForm> {
        weak.upgrade().map(ContactForm)
    }

    pub fn element(&self) -> usize {
        self.0.form
    }

    pub fn fields(&self) -> &[usize] {
        &self.0.fields
    }

    /// A submission is waiting for the transport.
    pub fn is_submitting(&self) -> bool {
        self.0.submitting.get()
    }

    /// Field by its `name` attribute.
    pub fn field(&self, name: &str) -> Option<usize> {
        self.0
            .fields
            .iter()
            .copied()
            .find(|&f| engine::get_attribute(f, attr::NAME).as_deref() == Some(name))
    }

    fn field_name(field: usize) -> String {
        engine::get_attribute(field, attr::NAME).unwrap_or_default()
    }

    fn error_element(field: usize) -> Option<usize> {
        let name = Self::field_name(field);
        engine::get_element_by_id(&format!("{name}-error"))
    }

    /// Preceding sibling's text (the visible label), else the field name.
    fn field_label(field: usize) -> String {
        match engine::previous_sibling(field) {
            Some(label) => clean_label(&engine::text(label)),
            None => Self::field_name(field),
        }
    }

    /// Validate one field and show or clear its inline error.
    pub fn validate_field(&self, field: usize) -> std::result::Result<(), FieldError> {
        self.clear_error(field);

        let name = Self::field_name(field);
        let required = engine::has_attribute(field, attr::REQUIRED);
        let result = validate_value(&name, &engine::value(field), required, &Self::field_label(field));

        if let Err(err) = &result {
            if let Some(error_el) = Self::error_element(field) {
                let message = err.to_string();
                engine::add_class(field, ERROR_CLASS);
                engine::set_text(error_el, &message);
                engine::add_class(error_el, SHOW_CLASS);
                announcer::announce(&message, self.0.announcement_ttl_ms);
            }
        }
        result
    }

    /// Remove a field's inline error.
    pub fn clear_error(&self, field: usize) {
        engine::remove_class(field, ERROR_CLASS);
        if let Some(error_el) = Self::error_element(field) {
            engine::remove_class(error_el, SHOW_CLASS);
            engine::set_text(error_el, "");
        }
    }

    /// Current values of all named fields.
    pub fn form_data(&self) -> FormData {
        FormData(
            self.0
                .fields
                .iter()
                .filter_map(|&f| {
                    let name = Self::field_name(f);
                    (!name.is_empty()).then(|| (name, engine::value(f)))
                })
                .collect(),
        )
    }

    fn handle_submit(&self) {
        if self.is_submitting() {
            log::trace!("submission already in flight");
            return;
        }

        let mut valid = true;
        for &field in &self.0.fields {
            if engine::has_attribute(field, attr::REQUIRED) && self.validate_field(field).is_err() {
                valid = false;
            }
        }

        if !valid {
            let first_error = self.0.fields.iter().copied().find(|&f| engine::has_class(f, ERROR_CLASS));
            if let Some(field) = first_error {
                focus::focus(field);
            }
            return;
        }
        self.submit_form();
    }

    fn submit_form(&self) {
        let inner = &self.0;
        inner.submitting.set(true);
        if let Some(button) = inner.submit_button {
            engine::set_text(button, SENDING_LABEL);
            engine::set_attribute(button, attr::DISABLED, "");
        }

        let payload = self.form_data().to_json();
        let weak = self.downgrade();
        inner.timers.timeout(inner.submit_latency_ms, move || {
            let Some(contact) = ContactForm::upgrade(&weak) else {
                return;
            };
            let outcome = match &payload {
                Ok(json) => contact.0.transport.send(json),
                Err(err) => Err(SubmitError::Rejected(err.to_string())),
            };
            contact.finish_submit(outcome);
        });
    }

    fn finish_submit(&self, outcome: std::result::Result<(), SubmitError>) {
        let inner = &self.0;
        let success = outcome.is_ok();

        match outcome {
            Ok(()) => {
                if let Some(status) = inner.status {
                    engine::set_text(status, SUCCESS_MESSAGE);
                    engine::add_class(status, SHOW_CLASS);
                    inner.timers.timeout(inner.success_ttl_ms, move || {
                        engine::remove_class(status, SHOW_CLASS);
                    });
                }
                for &field in &inner.fields {
                    engine::set_attribute(field, attr::VALUE, "");
                }
            }
            Err(err) => {
                log::error!("Form submission error: {err}");
                if let Some(status) = inner.status {
                    engine::set_text(status, FAILURE_MESSAGE);
                    engine::add_class(status, SHOW_CLASS);
                }
            }
        }

        if let Some(button) = inner.submit_button {
            engine::set_text(button, SUBMIT_LABEL);
            engine::remove_attribute(button, attr::DISABLED);
        }
        inner.submitting.set(false);
        events::emit(inner.form, WidgetEvent::FormSubmitted { success });
    }

    /// Drop every handler and pending submission.
    pub fn dispose(&self) {
        self.0.timers.cancel_all();
        let cleanups: Vec<_> = self.0.cleanups.borrow_mut().drain(..).collect();
        for cleanup in cleanups {
            cleanup();
        }
    }
}
