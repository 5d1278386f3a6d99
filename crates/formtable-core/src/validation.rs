//! Schema validation
//!
//! Every field is checked independently and every failure is reported, so a
//! user sees all problems at once. Validation is a pure function of the
//! schema and the values.

use crate::domain::*;
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum ValidationResult {
    Valid(ValidatedFields),
    Invalid(FieldErrors),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    /// Errors of an invalid result; `None` when valid.
    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            ValidationResult::Invalid(errors) => Some(errors),
            ValidationResult::Valid(_) => None,
        }
    }
}

pub struct Validator<'a> {
    schema: &'a FormSchema,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a FormSchema) -> Self {
        Self { schema }
    }

    /// Validate a whole form.
    pub fn validate(&self, values: &FormValues) -> ValidationResult {
        let mut errors = FieldErrors::new();
        let mut fields = ValidatedFields::default();

        for field in self.schema.fields() {
            let value = field.coerce_value(values.get(&field.name).clone());
            match check_field(field, &value) {
                Some(message) => errors.insert(field.name.clone(), message),
                None => fields.push(field.name.clone(), accepted_value(field, value)),
            }
        }

        if errors.is_empty() {
            ValidationResult::Valid(fields)
        } else {
            ValidationResult::Invalid(errors)
        }
    }

    /// Validate one field; `Ok(None)` means it passes.
    pub fn validate_field(&self, name: &str, value: &FieldValue) -> crate::Result<Option<String>> {
        let field = self.schema.require_field(name)?;
        Ok(check_field(field, &field.coerce_value(value.clone())))
    }
}

/// Type conformance, then presence, then constraints in declared order.
fn check_field(field: &FieldSchema, value: &FieldValue) -> Option<String> {
    match (field.kind, value) {
        // An unset checkbox reads as unchecked.
        (FieldKind::Boolean, FieldValue::Bool(_) | FieldValue::Empty) => None,
        (FieldKind::Boolean, _) => Some(format!("{} has an invalid value.", field.label)),
        (_, FieldValue::Empty) => field.required.then(|| missing_message(field)),
        (FieldKind::Text | FieldKind::Email | FieldKind::Enum, FieldValue::Text(s)) => {
            if s.is_empty() {
                return field.required.then(|| missing_message(field));
            }
            field.constraints.iter().find_map(|c| check_text(field, c, s))
        }
        (FieldKind::Date, FieldValue::Date(d)) => {
            field.constraints.iter().find_map(|c| check_date(field, c, *d))
        }
        // A date control that produced text held a malformed date.
        (FieldKind::Date, _) => Some(missing_message(field)),
        (FieldKind::Enum, _) => Some(missing_message(field)),
        _ => Some(format!("{} has an invalid value.", field.label)),
    }
}

fn accepted_value(field: &FieldSchema, value: FieldValue) -> FieldValue {
    match field.kind {
        FieldKind::Boolean => FieldValue::Bool(value.as_bool().unwrap_or(false)),
        _ => value,
    }
}

fn missing_message(field: &FieldSchema) -> String {
    match field.kind {
        FieldKind::Email => INVALID_EMAIL.to_string(),
        FieldKind::Date => format!("A {} is required.", field.label.to_lowercase()),
        FieldKind::Enum => format!("Please select a {}.", field.label.to_lowercase()),
        FieldKind::Text | FieldKind::Boolean => field
            .constraints
            .iter()
            .find_map(|c| match c {
                Constraint::MinLength { min } => Some(min_length_message(field, *min)),
                _ => None,
            })
            .unwrap_or_else(|| format!("{} is required.", field.label)),
    }
}

const INVALID_EMAIL: &str = "Please enter a valid email address.";

fn min_length_message(field: &FieldSchema, min: usize) -> String {
    format!("{} must be at least {} characters.", field.label, min)
}

fn check_text(field: &FieldSchema, constraint: &Constraint, s: &str) -> Option<String> {
    match constraint {
        Constraint::MinLength { min } if s.chars().count() < *min => Some(min_length_message(field, *min)),
        Constraint::MaxLength { max } if s.chars().count() > *max => {
            Some(format!("{} must be at most {} characters.", field.label, max))
        }
        Constraint::EmailFormat if !is_valid_email(s) => Some(INVALID_EMAIL.to_string()),
        Constraint::OneOf { options } if !options.iter().any(|o| o.value == s) => {
            Some(format!("Please select a {}.", field.label.to_lowercase()))
        }
        _ => None,
    }
}

fn check_date(field: &FieldSchema, constraint: &Constraint, d: NaiveDate) -> Option<String> {
    match constraint {
        Constraint::DateRange { min: Some(min), .. } if d < *min => {
            Some(format!("{} must be on or after {}.", field.label, min))
        }
        Constraint::DateRange { max: Some(max), .. } if d > *max => {
            Some(format!("{} must be on or before {}.", field.label, max))
        }
        _ => None,
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$")
            .expect("email pattern is valid")
    })
}

/// Local part may not start with a dot nor contain consecutive dots.
pub fn is_valid_email(s: &str) -> bool {
    !s.starts_with('.') && !s.contains("..") && email_regex().is_match(s)
}
