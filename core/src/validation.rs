//! Form-field validators for the sign-in, sign-up and task forms.
//!
//! All functions are pure and total: they never touch the network and
//! report problems as data instead of returning `Err`.

use lazy_static::lazy_static;
use regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_TITLE_LEN: usize = 200;

lazy_static! {
    // Permissive local@domain.tld shape; no deliverability check.
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Outcome of a validation: valid when no error messages were collected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub errors: Vec<String>,
}

impl Validation {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// First error, for single-message fields such as the task title.
    pub fn error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }

    fn push(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Check every password rule and report all that fail, in a fixed order.
pub fn validate_password(password: &str) -> Validation {
    let mut result = Validation::valid();

    if password.chars().count() < MIN_PASSWORD_LEN {
        result.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        result.push("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        result.push("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        result.push("Password must contain at least one number");
    }

    result
}

/// A title must be non-blank and at most 200 characters. At most one error
/// is reported.
pub fn validate_task_title(title: &str) -> Validation {
    let mut result = Validation::valid();
    if title.trim().is_empty() {
        result.push("Task title is required");
    } else if title.chars().count() > MAX_TITLE_LEN {
        result.push("Task title must be less than 200 characters");
    }
    result
}

/// Combined check for the sign-in and sign-up forms.
pub fn validate_credentials(email: &str, password: &str) -> Validation {
    let mut result = Validation::valid();
    if !validate_email(email) {
        result.push("Please enter a valid email address");
    }
    result.errors.extend(validate_password(password).errors);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(validate_email("a@b.co"));
        assert!(validate_email("first.last+tag@mail.example.org"));
        assert!(!validate_email("not-an-email"));
        assert!(!validate_email("a@b"));
        assert!(!validate_email("a b@c.de"));
        assert!(!validate_email("@b.co"));
        assert!(!validate_email(""));
    }

    #[test]
    fn strong_password_is_valid() {
        let v = validate_password("Secret123");
        assert!(v.is_valid());
        assert!(v.errors.is_empty());
    }

    #[test]
    fn short_passwords_report_length() {
        for pw in ["", "A", "Ab1", "Abcde12"] {
            let v = validate_password(pw);
            assert!(!v.is_valid(), "{pw:?}");
            assert!(
                v.errors.iter().any(|e| e.contains("at least 8 characters")),
                "{pw:?}: {:?}",
                v.errors
            );
        }
    }

    #[test]
    fn missing_digit_is_reported_even_when_other_rules_pass() {
        let v = validate_password("NoDigitsHere");
        assert_eq!(v.errors, vec!["Password must contain at least one number"]);
    }

    #[test]
    fn every_violated_rule_is_reported() {
        let v = validate_password("abc");
        assert_eq!(
            v.errors,
            vec![
                "Password must be at least 8 characters long",
                "Password must contain at least one uppercase letter",
                "Password must contain at least one number",
            ]
        );
    }

    #[test]
    fn empty_or_blank_title_is_required() {
        for title in ["", "   ", "\t\n"] {
            let v = validate_task_title(title);
            assert!(!v.is_valid());
            assert_eq!(v.error(), Some("Task title is required"));
        }
    }

    #[test]
    fn long_title_is_rejected() {
        let title = "x".repeat(201);
        let v = validate_task_title(&title);
        assert!(!v.is_valid());
        assert_eq!(v.errors.len(), 1);
        assert!(v.error().unwrap().contains("200 characters"));

        assert!(validate_task_title(&"x".repeat(200)).is_valid());
    }

    #[test]
    fn ordinary_title_is_valid() {
        let v = validate_task_title("Buy milk");
        assert!(v.is_valid());
        assert_eq!(v.error(), None);
    }

    #[test]
    fn lengths_count_chars_not_utf16_units() {
        // Each emoji is one char but two UTF-16 code units.
        let title = "\u{1F600}".repeat(200);
        assert_eq!(title.chars().count(), 200);
        assert!(validate_task_title(&title).is_valid());
        assert!(!validate_task_title(&"\u{1F600}".repeat(201)).is_valid());

        // Seven chars, fourteen UTF-16 units: still too short.
        let v = validate_password("Ab1\u{1F600}\u{1F600}\u{1F600}\u{1F600}");
        assert_eq!(v.errors, vec!["Password must be at least 8 characters long"]);
    }

    #[test]
    fn credentials_combine_both_checks() {
        let v = validate_credentials("nope", "Secret123");
        assert_eq!(v.errors, vec!["Please enter a valid email address"]);
        assert!(validate_credentials("a@b.co", "Secret123").is_valid());
        assert_eq!(validate_credentials("nope", "short").errors.len(), 4);
    }
}
