//! Form schema
//!
//! A [`FormSchema`] is declared once at startup and shared read-only. Field
//! declaration order is the order fields are checked and the order columns
//! are displayed.

use super::value_objects::*;
use crate::{FormsError, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

/// Keys a [`Record`](super::Record) serializes beside its fields.
pub const RESERVED_FIELD_NAMES: [&str; 2] = ["id", "createdAt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Date,
    Enum,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumOption {
    pub value: String,
    pub label: String,
}

impl EnumOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self { value: value.into(), label: label.into() }
    }
}

/// Constraint for one field kind, checked after presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    MinLength { min: usize },
    MaxLength { max: usize },
    EmailFormat,
    OneOf { options: Vec<EnumOption> },
    DateRange { min: Option<NaiveDate>, max: Option<NaiveDate> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    pub name: String,
    /// Noun used in labels and validation messages, e.g. "Date of birth".
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub constraints: Vec<Constraint>,
    pub default: FieldValue,
    pub placeholder: Option<String>,
}

impl FieldSchema {
    fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            constraints: Vec::new(),
            default: FieldValue::Empty,
            placeholder: None,
        }
    }

    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn email(name: impl Into<String>, label: impl Into<String>) -> Self {
        let mut field = Self::new(name, label, FieldKind::Email);
        field.constraints.push(Constraint::EmailFormat);
        field
    }

    pub fn date(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Date)
    }

    pub fn select<I>(name: impl Into<String>, label: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = EnumOption>,
    {
        let mut field = Self::new(name, label, FieldKind::Enum);
        field.constraints.push(Constraint::OneOf { options: options.into_iter().collect() });
        field
    }

    /// Checkboxes default to unchecked and are never required.
    pub fn checkbox(name: impl Into<String>, label: impl Into<String>) -> Self {
        let mut field = Self::new(name, label, FieldKind::Boolean);
        field.default = FieldValue::Bool(false);
        field
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.constraints.push(Constraint::MinLength { min });
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.constraints.push(Constraint::MaxLength { max });
        self
    }

    pub fn date_range(mut self, min: Option<NaiveDate>, max: Option<NaiveDate>) -> Self {
        self.constraints.push(Constraint::DateRange { min, max });
        self
    }

    pub fn default_value(mut self, value: FieldValue) -> Self {
        self.default = value;
        self
    }

    pub fn placeholder(mut self, hint: impl Into<String>) -> Self {
        self.placeholder = Some(hint.into());
        self
    }

    pub fn options(&self) -> &[EnumOption] {
        self.constraints
            .iter()
            .find_map(|c| match c {
                Constraint::OneOf { options } => Some(options.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Label of the option whose value is `value`.
    pub fn option_label(&self, value: &str) -> Option<&str> {
        self.options().iter().find(|o| o.value == value).map(|o| o.label.as_str())
    }

    /// Read free-form control text as input for this field.
    ///
    /// Dates that do not parse are kept as text so validation reports them;
    /// only checkbox words outside the tri-state vocabulary are rejected here.
    pub fn parse_input(&self, raw: &str) -> Result<RawInput> {
        let trimmed = raw.trim();
        match self.kind {
            FieldKind::Text | FieldKind::Email => Ok(RawInput::Text(raw.to_string())),
            FieldKind::Enum if trimmed.is_empty() => Ok(RawInput::Clear),
            FieldKind::Enum => Ok(RawInput::Text(trimmed.to_string())),
            FieldKind::Date if trimmed.is_empty() => Ok(RawInput::Date(None)),
            FieldKind::Date => Ok(NaiveDate::parse_from_str(trimmed, DATE_INPUT_FORMAT)
                .map(|d| RawInput::Date(Some(d)))
                .unwrap_or_else(|_| RawInput::Text(trimmed.to_string()))),
            FieldKind::Boolean if trimmed.is_empty() => Ok(RawInput::Checkbox(CheckState::Unchecked)),
            FieldKind::Boolean => trimmed
                .parse::<CheckState>()
                .map(RawInput::Checkbox)
                .map_err(|_| FormsError::UnparsableInput {
                    field: self.name.clone(),
                    input: raw.to_string(),
                }),
        }
    }

    /// Normalize `input` into a value of this field's kind.
    ///
    /// Text aimed at a date or checkbox is read the way [`parse_input`](Self::parse_input)
    /// reads control text, so `"true"` stores `Bool(true)`.
    pub fn coerce(&self, input: RawInput) -> Result<FieldValue> {
        match input {
            RawInput::Text(raw) => Ok(self.parse_input(&raw)?.normalize()),
            other => Ok(other.normalize()),
        }
    }

    /// Like [`coerce`](Self::coerce) for an already stored value. Text that
    /// does not read as this kind is left for validation to report.
    pub fn coerce_value(&self, value: FieldValue) -> FieldValue {
        if let FieldValue::Text(raw) = &value {
            if matches!(self.kind, FieldKind::Date | FieldKind::Boolean) {
                if let Ok(input) = self.parse_input(raw) {
                    return input.normalize();
                }
            }
        }
        value
    }
}

/// Ordered, immutable set of field declarations.
///
/// # Invariants
/// - Field names are unique
/// - No field is named like a record key (`id`, `createdAt`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSchema {
    fields: Vec<FieldSchema>,
}

impl FormSchema {
    pub fn new(fields: Vec<FieldSchema>) -> Result<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if RESERVED_FIELD_NAMES.contains(&field.name.as_str()) {
                return Err(FormsError::ReservedField(field.name.clone()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(FormsError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn require_field(&self, name: &str) -> Result<&FieldSchema> {
        self.field(name).ok_or_else(|| FormsError::UnknownField(name.to_string()))
    }

    /// Declared default for every field.
    pub fn defaults(&self) -> FormValues {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.default.clone()))
            .collect()
    }
}

/// The registration form: name, email, date of birth, department, active flag.
///
/// Birth dates are bounded to `1900-01-01..=today`; `today` is fixed when the
/// schema is built so validation stays a pure function of the values.
pub fn registration_schema(today: NaiveDate) -> Result<FormSchema> {
    let earliest = NaiveDate::from_ymd_opt(1900, 1, 1);
    let fields = vec![
        FieldSchema::text("name", "Name")
            .required()
            .min_length(2)
            .placeholder("Jane Doe"),
        FieldSchema::email("email", "Email")
            .required()
            .placeholder("jane@example.com"),
        FieldSchema::date("birthDate", "Date of birth")
            .required()
            .date_range(earliest, Some(today)),
        FieldSchema::select(
            "department",
            "Department",
            [
                EnumOption::new("engineering", "Engineering"),
                EnumOption::new("marketing", "Marketing"),
                EnumOption::new("sales", "Sales"),
                EnumOption::new("hr", "Human Resources"),
                EnumOption::new("finance", "Finance"),
            ],
        )
        .required(),
        FieldSchema::checkbox("isActive", "Active"),
    ];
    FormSchema::new(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = FormSchema::new(vec![
            FieldSchema::text("name", "Name"),
            FieldSchema::email("name", "Email"),
        ])
        .unwrap_err();
        assert_eq!(err, FormsError::DuplicateField("name".into()));
    }

    #[test]
    fn test_record_keys_rejected_as_field_names() {
        for name in RESERVED_FIELD_NAMES {
            let err = FormSchema::new(vec![FieldSchema::text(name, "Clash")]).unwrap_err();
            assert_eq!(err, FormsError::ReservedField(name.into()));
        }
    }

    #[test]
    fn test_coerce_by_kind() {
        let schema = registration_schema(today()).unwrap();
        let active = schema.field("isActive").unwrap();
        assert_eq!(active.coerce("true".into()).unwrap(), FieldValue::Bool(true));
        assert_eq!(active.coerce("".into()).unwrap(), FieldValue::Bool(false));
        assert!(active.coerce("perhaps".into()).is_err());
        assert_eq!(active.coerce_value(FieldValue::Text("perhaps".into())), FieldValue::Text("perhaps".into()));

        let birth = schema.field("birthDate").unwrap();
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        assert_eq!(birth.coerce("2000-01-01".into()).unwrap(), FieldValue::Date(date));
        assert_eq!(birth.coerce_value(FieldValue::Text("2000-01-01".into())), FieldValue::Date(date));
        assert_eq!(birth.coerce("yesterday".into()).unwrap(), FieldValue::Text("yesterday".into()));

        let name = schema.field("name").unwrap();
        assert_eq!(name.coerce(" Al ".into()).unwrap(), FieldValue::Text(" Al ".into()));
    }

    #[test]
    fn test_registration_defaults() {
        let schema = registration_schema(today()).unwrap();
        let defaults = schema.defaults();
        assert_eq!(defaults.len(), 5);
        assert!(defaults.get("name").is_empty());
        assert_eq!(defaults.get("isActive"), &FieldValue::Bool(false));
    }

    #[test]
    fn test_parse_input_per_kind() {
        let schema = registration_schema(today()).unwrap();
        let date = schema.field("birthDate").unwrap();
        assert_eq!(
            date.parse_input("2000-01-01").unwrap(),
            RawInput::Date(NaiveDate::from_ymd_opt(2000, 1, 1))
        );
        assert_eq!(date.parse_input("  ").unwrap(), RawInput::Date(None));
        assert_eq!(date.parse_input("01/02/2000").unwrap(), RawInput::Text("01/02/2000".into()));

        let active = schema.field("isActive").unwrap();
        assert_eq!(active.parse_input("indeterminate").unwrap(), RawInput::Checkbox(CheckState::Indeterminate));
        assert!(matches!(
            active.parse_input("perhaps"),
            Err(FormsError::UnparsableInput { .. })
        ));
    }

    #[test]
    fn test_option_label() {
        let schema = registration_schema(today()).unwrap();
        let dept = schema.field("department").unwrap();
        assert_eq!(dept.option_label("hr"), Some("Human Resources"));
        assert_eq!(dept.option_label("legal"), None);
    }
}
