//! Rule-based form validation
//!
//! Forms declare a [`ValidationRule`] per field and run them locally before
//! anything is sent to the server. A rule applies its checks in a fixed
//! order: required-ness first, then, only when a value is present, minimum
//! length, maximum length, pattern match, and finally an optional custom
//! check. Every failing check after the required gate appends its message,
//! so a single field can report several errors at once.

use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

type CustomCheck = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Declarative validation rule for one form field.
#[derive(Clone, Default)]
pub struct ValidationRule {
    required: Option<String>,
    min_length: Option<(usize, String)>,
    max_length: Option<(usize, String)>,
    pattern: Option<(Regex, String)>,
    custom: Option<CustomCheck>,
}

impl ValidationRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject empty values with the given message.
    ///
    /// When this check fails it is the only error reported; the
    /// length, pattern, and custom checks all presuppose a value.
    #[must_use]
    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.required = Some(message.into());
        self
    }

    /// Require at least `min` characters.
    #[must_use]
    pub fn min_length(mut self, min: usize, message: impl Into<String>) -> Self {
        self.min_length = Some((min, message.into()));
        self
    }

    /// Require at most `max` characters.
    #[must_use]
    pub fn max_length(mut self, max: usize, message: impl Into<String>) -> Self {
        self.max_length = Some((max, message.into()));
        self
    }

    /// Require the whole value to match `pattern`.
    #[must_use]
    pub fn pattern(mut self, pattern: Regex, message: impl Into<String>) -> Self {
        self.pattern = Some((pattern, message.into()));
        self
    }

    /// Attach a custom check, run after all built-in checks.
    ///
    /// The closure returns `Some(message)` to report a failure.
    #[must_use]
    pub fn custom(mut self, check: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        self.custom = Some(Arc::new(check));
        self
    }

    /// Run every applicable check against `value`.
    pub fn validate(&self, value: &str) -> ValidationResult {
        let mut errors = Vec::new();

        if value.is_empty() {
            if let Some(message) = &self.required {
                errors.push(message.clone());
            }
            // An absent value has nothing for the remaining checks to inspect.
            return ValidationResult::from_errors(errors);
        }

        let length = value.chars().count();
        if let Some((min, message)) = &self.min_length {
            if length < *min {
                errors.push(message.clone());
            }
        }
        if let Some((max, message)) = &self.max_length {
            if length > *max {
                errors.push(message.clone());
            }
        }
        if let Some((pattern, message)) = &self.pattern {
            if !pattern.is_match(value) {
                errors.push(message.clone());
            }
        }
        if let Some(custom) = &self.custom {
            if let Some(message) = custom(value) {
                errors.push(message);
            }
        }

        ValidationResult::from_errors(errors)
    }
}

impl std::fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationRule")
            .field("required", &self.required.is_some())
            .field("min_length", &self.min_length.as_ref().map(|(n, _)| n))
            .field("max_length", &self.max_length.as_ref().map(|(n, _)| n))
            .field("pattern", &self.pattern.as_ref().map(|(p, _)| p.as_str()))
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

/// Outcome of validating a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// A set of named field rules making up one form.
#[derive(Debug, Clone, Default)]
pub struct FormValidator {
    rules: Vec<(String, ValidationRule)>,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a rule for `field`.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>, rule: ValidationRule) -> Self {
        self.rules.push((field.into(), rule));
        self
    }

    pub fn rule(&self, field: &str) -> Option<&ValidationRule> {
        self.rules
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, rule)| rule)
    }

    /// Validate every declared field against `data`.
    ///
    /// Fields missing from `data` are validated as empty strings, so a
    /// required field that was never filled in still reports its error.
    pub fn validate(&self, data: &HashMap<String, String>) -> HashMap<String, ValidationResult> {
        self.rules
            .iter()
            .map(|(field, rule)| {
                let value = data.get(field).map_or("", String::as_str);
                (field.clone(), rule.validate(value))
            })
            .collect()
    }

    /// Re-run a single field's rule and overwrite only that field's entry.
    ///
    /// Results for other fields are left untouched, which is what a
    /// per-keystroke revalidation needs.
    pub fn revalidate_field(
        &self,
        field: &str,
        value: &str,
        results: &mut HashMap<String, ValidationResult>,
    ) {
        if let Some(rule) = self.rule(field) {
            results.insert(field.to_string(), rule.validate(value));
        }
    }
}

/// Whether any field in a form result set failed validation.
pub fn has_errors(results: &HashMap<String, ValidationResult>) -> bool {
    results.values().any(|result| !result.is_valid)
}
