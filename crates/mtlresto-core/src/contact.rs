//! Contact form validation and the stored message shape.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_NAME_CHARS: usize = 2;
pub const MIN_MESSAGE_CHARS: usize = 10;
pub const SEND_FAILURE_MESSAGE: &str = "Failed to send message. Please try again later.";

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Every field must be non-blank.
    Presence,
    /// Presence plus minimum lengths and an email shape check.
    #[default]
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("invalid email address")]
    InvalidEmail,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid contact form: {}", render(.errors))]
pub struct ContactValidationError {
    pub errors: Vec<FieldError>,
}

fn render(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    /// Checks the form locally. Nothing may be written unless this succeeds.
    ///
    /// # Errors
    ///
    /// Returns every failed rule at once.
    pub fn validate(&self, mode: ValidationMode) -> Result<(), ContactValidationError> {
        let mut errors = Vec::new();

        let fields = [
            ("name", self.name.trim(), MIN_NAME_CHARS),
            ("email", self.email.trim(), 0),
            ("message", self.message.trim(), MIN_MESSAGE_CHARS),
        ];

        for (field, value, min) in fields {
            if value.is_empty() {
                errors.push(FieldError::Missing { field });
                continue;
            }
            if mode == ValidationMode::Strict {
                if value.chars().count() < min {
                    errors.push(FieldError::TooShort { field, min });
                }
                if field == "email" && !EMAIL_SHAPE.is_match(value) {
                    errors.push(FieldError::InvalidEmail);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ContactValidationError { errors })
        }
    }
}

/// A stored message. `received_at` is assigned by the store, never the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub received_at: DateTime<Utc>,
}

/// Terminal state of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Sent,
    Failed(String),
}

impl SubmissionOutcome {
    #[must_use]
    pub fn failed() -> Self {
        SubmissionOutcome::Failed(SEND_FAILURE_MESSAGE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn strict_rejects_five_character_message() {
        let err = form("Jean", "jean@example.com", "Salut")
            .validate(ValidationMode::Strict)
            .unwrap_err();
        assert_eq!(
            err.errors,
            vec![FieldError::TooShort {
                field: "message",
                min: MIN_MESSAGE_CHARS
            }]
        );
        assert!(err.to_string().contains("message must be at least 10 characters"));
    }

    #[test]
    fn presence_accepts_short_message() {
        assert!(form("J", "not-an-email", "Salut")
            .validate(ValidationMode::Presence)
            .is_ok());
    }

    #[test]
    fn blank_fields_are_missing_in_both_modes() {
        for mode in [ValidationMode::Presence, ValidationMode::Strict] {
            let err = form("  ", "", "\n").validate(mode).unwrap_err();
            assert_eq!(err.errors.len(), 3, "mode {mode:?}");
            assert!(err
                .errors
                .iter()
                .all(|e| matches!(e, FieldError::Missing { .. })));
        }
    }

    #[test]
    fn strict_checks_email_shape_and_name_length() {
        let err = form("J", "jean@localhost", "Bonjour, une question.")
            .validate(ValidationMode::Strict)
            .unwrap_err();
        assert!(err.errors.contains(&FieldError::InvalidEmail));
        assert!(err.errors.contains(&FieldError::TooShort {
            field: "name",
            min: MIN_NAME_CHARS
        }));
    }

    #[test]
    fn strict_accepts_valid_form() {
        assert!(form("Jean", "jean@example.com", "Bonjour, une question.")
            .validate(ValidationMode::Strict)
            .is_ok());
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let sent = serde_json::to_value(SubmissionOutcome::Sent).expect("serialize");
        assert_eq!(sent["status"], "sent");
        let failed = serde_json::to_value(SubmissionOutcome::failed()).expect("serialize");
        assert_eq!(failed["status"], "failed");
        assert_eq!(failed["message"], SEND_FAILURE_MESSAGE);
    }
}
