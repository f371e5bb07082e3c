//! Validation presets for the forms the Agora UI submits

use crate::validation::{FormValidator, ValidationRule};
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    })
}

fn username_regex() -> &'static Regex {
    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"))
}

pub fn email_rule() -> ValidationRule {
    ValidationRule::new()
        .required("Email is required")
        .max_length(254, "Email must be at most 254 characters long")
        .pattern(email_regex().clone(), "Invalid email format")
}

pub fn password_rule() -> ValidationRule {
    ValidationRule::new()
        .required("Password is required")
        .min_length(8, "Password must be at least 8 characters long")
        .max_length(128, "Password must be at most 128 characters long")
}

pub fn username_rule() -> ValidationRule {
    ValidationRule::new()
        .required("Username is required")
        .min_length(3, "Username must be at least 3 characters long")
        .max_length(32, "Username must be at most 32 characters long")
        .pattern(
            username_regex().clone(),
            "Username can only contain letters, numbers, and underscores",
        )
}

/// Rule for a confirm-password field, bound to the password it must match.
///
/// The expected value is captured at build time, so the validator has to
/// be rebuilt when the password input changes.
pub fn confirm_password_rule(password: &str) -> ValidationRule {
    let expected = password.to_string();
    ValidationRule::new()
        .required("Please confirm your password")
        .custom(move |value| (value != expected).then(|| "Passwords do not match".to_string()))
}

/// Login only checks that both fields were filled in; the server is the
/// authority on whether the credentials are right.
pub fn login() -> FormValidator {
    FormValidator::new()
        .field(
            "email",
            ValidationRule::new()
                .required("Email is required")
                .pattern(email_regex().clone(), "Invalid email format"),
        )
        .field("password", ValidationRule::new().required("Password is required"))
}

pub fn registration() -> FormValidator {
    FormValidator::new()
        .field("username", username_rule())
        .field("email", email_rule())
        .field("password", password_rule())
}

pub fn new_thread() -> FormValidator {
    FormValidator::new()
        .field(
            "title",
            ValidationRule::new()
                .required("Title is required")
                .min_length(5, "Title must be at least 5 characters long")
                .max_length(120, "Title must be at most 120 characters long"),
        )
        .field(
            "content",
            ValidationRule::new()
                .required("Content is required")
                .min_length(10, "Content must be at least 10 characters long")
                .max_length(10_000, "Content must be at most 10000 characters long"),
        )
        .field("category_id", ValidationRule::new().required("Category is required"))
}

pub fn new_post() -> FormValidator {
    FormValidator::new().field(
        "content",
        ValidationRule::new()
            .required("Content is required")
            .max_length(10_000, "Content must be at most 10000 characters long"),
    )
}

pub fn new_category() -> FormValidator {
    FormValidator::new()
        .field(
            "name",
            ValidationRule::new()
                .required("Name is required")
                .min_length(3, "Name must be at least 3 characters long")
                .max_length(50, "Name must be at most 50 characters long"),
        )
        .field(
            "description",
            ValidationRule::new().max_length(200, "Description must be at most 200 characters long"),
        )
}
