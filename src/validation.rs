//! Input validation utilities for the service layer.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid regex"));

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_TITLE_LENGTH: usize = 255;
pub const MAX_CONTENT_LENGTH: usize = 10_000;

/// Validates email format and returns the normalized (trimmed, lowercased) address.
///
/// # Examples
/// ```
/// use taskboard::validation::validate_email;
///
/// assert_eq!(validate_email(" Ada@Example.com ").unwrap(), "ada@example.com");
/// assert!(validate_email("invalid-email").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(Error::validation("email", "Email cannot be empty"));
    }

    if email.len() > 254 {
        return Err(Error::validation("email", "Email address is too long (max 254 characters)"));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(Error::validation("email", "Email must contain exactly one @ symbol"));
    }

    let (local_part, domain) = (parts[0], parts[1]);
    if local_part.is_empty() || local_part.len() > 64 {
        return Err(Error::validation("email", "Invalid local part"));
    }

    if domain.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(Error::validation("email", "Invalid domain"));
    }

    if email.contains("..") {
        return Err(Error::validation("email", "Email cannot contain consecutive dots"));
    }

    let invalid_chars = ['<', '>', '(', ')', '[', ']', '\\', ',', ';', ':', '"', ' '];
    if let Some(c) = invalid_chars.iter().find(|c| email.contains(**c)) {
        return Err(Error::validation("email", format!("Email cannot contain '{}'", c)));
    }

    Ok(email.to_lowercase())
}

/// Validates a required text field and returns it trimmed.
pub fn validate_required_text(input: &str, field_name: &str, max_length: usize) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field_name, format!("{} is required", field_name)));
    }
    if trimmed.chars().count() > max_length {
        return Err(Error::validation(
            field_name,
            format!("{} must be at most {} characters", field_name, max_length),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validates an optional text field. Blank input collapses to `None`.
pub fn validate_optional_text(input: Option<String>, field_name: &str, max_length: usize) -> Result<Option<String>> {
    match input {
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => {
            if text.chars().count() > max_length {
                return Err(Error::validation(
                    field_name,
                    format!("{} must be at most {} characters", field_name, max_length),
                ));
            }
            Ok(Some(text))
        }
        None => Ok(None),
    }
}

/// Validates a `#RRGGBB` color.
pub fn validate_color(color: &str) -> Result<String> {
    let color = color.trim();
    if !HEX_COLOR.is_match(color) {
        return Err(Error::validation("color", "Color must be a hex value like #RRGGBB"));
    }
    Ok(color.to_string())
}

/// Explicit positions must be non-negative.
pub fn validate_position(position: i64) -> Result<i64> {
    if position < 0 {
        return Err(Error::validation("position", "Position cannot be negative"));
    }
    Ok(position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_normalizes() {
        assert_eq!(validate_email("  Grace@Navy.MIL ").unwrap(), "grace@navy.mil");
    }

    #[test]
    fn test_validate_email_rejects_malformed() {
        for email in ["", "no-at-sign", "a@b@c.com", "@example.com", "user@nodot", "a..b@x.com", "a b@x.com"] {
            assert!(validate_email(email).is_err(), "expected {email:?} to be rejected");
        }
    }

    #[test]
    fn test_required_text() {
        assert_eq!(validate_required_text("  Todo  ", "title", 10).unwrap(), "Todo");
        assert!(validate_required_text("   ", "title", 10).is_err());
        assert!(validate_required_text("abcdefghijk", "title", 10).is_err());
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        assert_eq!(validate_optional_text(Some("  ".into()), "description", 10).unwrap(), None);
        assert_eq!(
            validate_optional_text(Some("notes".into()), "description", 10).unwrap(),
            Some("notes".to_string())
        );
        assert!(validate_optional_text(Some("x".repeat(11)), "description", 10).is_err());
    }

    #[test]
    fn test_color() {
        assert_eq!(validate_color("#A1b2C3").unwrap(), "#A1b2C3");
        assert!(validate_color("A1B2C3").is_err());
        assert!(validate_color("#12345").is_err());
        assert!(validate_color("#GGGGGG").is_err());
    }

    #[test]
    fn test_position() {
        assert_eq!(validate_position(0).unwrap(), 0);
        assert!(validate_position(-1).is_err());
    }
}
