//! Forms - Contact form validation and submission
//!
//! - **validation** - Field rules and their user-facing messages
//! - **contact** - Binding of the rules to a form, submission via a transport

pub mod contact;
pub mod validation;

pub use contact::{
    ContactForm, FormData, SimulatedTransport, SubmitError, SubmitTransport,
};
pub use validation::{validate_value, FieldError};
