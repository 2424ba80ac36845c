//! Field validation for the add/edit form.
//!
//! Each field carries a list of rules; a field fails with the first rule
//! that rejects it, and all fields are checked independently (no
//! cross-field rules, no early exit across fields).

use shared::protocol::ValidationErrors;

use crate::{messages, FormState};

/// A single validation capability applied to one field value.
pub trait Rule {
    fn check(&self, value: &str) -> Option<String>;
}

/// Rejects values that trim to the empty string.
pub struct NotEmpty;

impl Rule for NotEmpty {
    fn check(&self, value: &str) -> Option<String> {
        if value.trim().is_empty() {
            Some(messages::FIELD_REQUIRED.to_string())
        } else {
            None
        }
    }
}

fn check_field(errors: &mut ValidationErrors, name: &str, value: &str, rules: &[&dyn Rule]) {
    for rule in rules {
        if let Some(message) = rule.check(value) {
            errors.insert(name.to_string(), message);
            break;
        }
    }
}

/// Checks the submittable form fields and returns one error message per
/// failing field. An empty map means the form may be submitted.
pub fn validate_form(form: &FormState) -> ValidationErrors {
    let required: [&dyn Rule; 1] = [&NotEmpty];
    let mut errors = ValidationErrors::new();
    check_field(&mut errors, "resource", &form.resource, &required);
    check_field(&mut errors, "description", &form.description, &required);
    check_field(&mut errors, "method", &form.method, &required);
    check_field(&mut errors, "path", &form.path, &required);
    errors
}

#[cfg(test)]
#[path = "tests/validate_tests.rs"]
mod tests;
