//! Field-level input checks shared by the signup, profile and password
//! handlers. Violations are collected per request, never short-circuited,
//! so one round trip reports everything that is wrong.

use lazy_static::lazy_static;
use regex::Regex;

/// Characters accepted as the "special" class in passwords.
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

pub const FULL_NAME_MIN: usize = 2;
pub const FULL_NAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 8;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Canonical form used for storage and lookups: addresses differing only
/// in case or surrounding whitespace are the same account.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Policy check for a candidate password. `length_label` names the field
/// in the length message ("Password" on signup, "New password" on change).
pub fn password_violations(password: &str, length_label: &str) -> Vec<String> {
    let mut violations = Vec::new();
    if password.chars().count() < PASSWORD_MIN {
        violations.push(format!(
            "{length_label} must be at least {PASSWORD_MIN} characters long"
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        violations.push("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("Password must contain at least one number".to_string());
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        violations.push("Password must contain at least one special character".to_string());
    }
    violations
}

/// Length check on the trimmed name.
pub fn full_name_violation(full_name: &str) -> Option<String> {
    let len = full_name.trim().chars().count();
    if (FULL_NAME_MIN..=FULL_NAME_MAX).contains(&len) {
        None
    } else {
        Some(format!(
            "Full name must be between {FULL_NAME_MIN} and {FULL_NAME_MAX} characters"
        ))
    }
}
