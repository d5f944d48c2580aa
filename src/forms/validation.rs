//! Field validation rules for the contact form.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_MESSAGE_LEN: usize = 10;

/// Why a field value was rejected. The display text is shown to the user.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{label} is required.")]
    Required { label: String },

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Name must be at least 2 characters long.")]
    NameTooShort,

    #[error("Message must be at least 10 characters long.")]
    MessageTooShort,
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.as_ref().is_some_and(|re| re.is_match(value))
}

/// Check one field value.
///
/// Empty values only fail when the field is required; the content rules
/// for `email`, `name` and `message` apply to non-empty values.
pub fn validate_value(name: &str, value: &str, required: bool, label: &str) -> Result<(), FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return if required {
            Err(FieldError::Required { label: label.to_string() })
        } else {
            Ok(())
        };
    }

    match name {
        "email" if !is_valid_email(value) => Err(FieldError::InvalidEmail),
        "name" if value.chars().count() < MIN_NAME_LEN => Err(FieldError::NameTooShort),
        "message" if value.chars().count() < MIN_MESSAGE_LEN => Err(FieldError::MessageTooShort),
        _ => Ok(()),
    }
}

/// Label text as displayed, without the required-marker suffix.
pub fn clean_label(text: &str) -> String {
    text.replace(" *", "")
}
