use serde::{Deserialize, Serialize};

use crate::domain::model::NewRequest;
use crate::foundation::{
    CivicError, Result, DEFAULT_MAX_DESCRIPTION_CHARS, DEFAULT_MAX_DESCRIPTION_WORDS,
    DEFAULT_MAX_MESSAGE_CHARS, DEFAULT_MAX_TITLE_CHARS,
};

/// Input bounds enforced before a request or free-text message is stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RequestLimits {
    #[serde(default = "default_max_title_chars")]
    pub max_title_chars: usize,
    #[serde(default = "default_max_description_chars")]
    pub max_description_chars: usize,
    #[serde(default = "default_max_description_words")]
    pub max_description_words: usize,
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

fn default_max_title_chars() -> usize {
    DEFAULT_MAX_TITLE_CHARS
}

fn default_max_description_chars() -> usize {
    DEFAULT_MAX_DESCRIPTION_CHARS
}

fn default_max_description_words() -> usize {
    DEFAULT_MAX_DESCRIPTION_WORDS
}

fn default_max_message_chars() -> usize {
    DEFAULT_MAX_MESSAGE_CHARS
}

impl Default for RequestLimits {
    fn default() -> Self {
        RequestLimits {
            max_title_chars: default_max_title_chars(),
            max_description_chars: default_max_description_chars(),
            max_description_words: default_max_description_words(),
            max_message_chars: default_max_message_chars(),
        }
    }
}

/// Validates create-time input. Leading and trailing whitespace does not
/// count toward any bound.
pub fn validate_new_request(input: &NewRequest, limits: &RequestLimits) -> Result<()> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(CivicError::validation("title is required"));
    }
    if title.chars().count() > limits.max_title_chars {
        return Err(CivicError::validation(format!(
            "title exceeds {} characters",
            limits.max_title_chars
        )));
    }

    let description = input.description.trim();
    if description.is_empty() {
        return Err(CivicError::validation("description is required"));
    }
    if description.chars().count() > limits.max_description_chars {
        return Err(CivicError::validation(format!(
            "description exceeds {} characters",
            limits.max_description_chars
        )));
    }
    let words = description.split_whitespace().count();
    if words > limits.max_description_words {
        return Err(CivicError::validation(format!(
            "description exceeds {} words",
            limits.max_description_words
        )));
    }

    Ok(())
}

/// Bounds-checks an optional free-text field attached to an operation.
pub fn validate_message(field: &'static str, value: &str, limits: &RequestLimits) -> Result<()> {
    if value.chars().count() > limits.max_message_chars {
        return Err(CivicError::validation(format!(
            "{field} exceeds {} characters",
            limits.max_message_chars
        )));
    }
    Ok(())
}

/// Like [`validate_message`], but the field must also be non-empty after
/// trimming.
pub fn validate_required_message(
    field: &'static str,
    value: &str,
    limits: &RequestLimits,
) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CivicError::validation(format!("{field} is required")));
    }
    validate_message(field, value, limits)
}
