//! Input validation utilities
//!
//! Custom validators plugged into `validator` derives on request types.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

use crate::constants::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

/// Letters (Latin or Cyrillic), spaces and hyphens
pub static PERSON_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[а-яёА-ЯЁa-zA-Z\s\-]+$").expect("person name regex is valid")
});

/// Russian phone formats: +7 / 8 prefix, optional separators and area-code parentheses
pub static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+7|8)?[\s\-]?\(?[489][0-9]{2}\)?[\s\-]?[0-9]{3}[\s\-]?[0-9]{2}[\s\-]?[0-9]{2}$")
        .expect("phone regex is valid")
});

const PASSWORD_SPECIALS: &str = "@$!%*?&";

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Password strength: one lowercase, one uppercase, one digit and one of `@$!%*?&`
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count() as u64;
    if len < MIN_PASSWORD_LENGTH || len > MAX_PASSWORD_LENGTH {
        return Err(error(
            "password_length",
            "Password must be between 8 and 128 characters",
        ));
    }
    let strong = password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    if !strong {
        return Err(error(
            "password_strength",
            "Password must contain an uppercase letter, a lowercase letter, a digit and a special character",
        ));
    }
    Ok(())
}

/// Sanitize string input (remove control characters, trim whitespace)
pub fn sanitize_string(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Sanitized `search` query parameter; blank input means no filter
pub fn search_term(raw: Option<String>) -> Option<String> {
    raw.map(|s| sanitize_string(&s)).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_name() {
        assert!(PERSON_NAME_REGEX.is_match("Anna-Maria"));
        assert!(PERSON_NAME_REGEX.is_match("Иван"));
        assert!(!PERSON_NAME_REGEX.is_match("R2D2"));
        assert!(!PERSON_NAME_REGEX.is_match(""));
    }

    #[test]
    fn test_phone() {
        assert!(PHONE_REGEX.is_match("+7 (912) 345-67-89"));
        assert!(PHONE_REGEX.is_match("89123456789"));
        assert!(!PHONE_REGEX.is_match("12345"));
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("Passw0rd!").is_ok());
        assert!(validate_password_strength("Sh0r!").is_err());
        assert!(validate_password_strength("password1!").is_err());
        assert!(validate_password_strength("PASSWORD1!").is_err());
        assert!(validate_password_strength("Password!!").is_err());
        assert!(validate_password_strength("Password11").is_err());
    }

    #[test]
    fn test_search_term() {
        assert_eq!(search_term(Some("  hack ".into())), Some("hack".to_string()));
        assert_eq!(search_term(Some(" \u{0000} ".into())), None);
        assert_eq!(search_term(None), None);
    }

    #[test]
    fn test_sanitize_string() {
        assert_eq!(sanitize_string("  Hackathon\u{0007} "), "Hackathon");
    }
}
