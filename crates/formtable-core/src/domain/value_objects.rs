//! Value Objects - Immutable form primitives
//!
//! Raw control input is normalized into a [`FieldValue`] before it is stored,
//! so nothing downstream ever sees a tri-state checkbox or an "unset" date.

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Tri-state checkbox as emitted by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Checked,
    Unchecked,
    Indeterminate,
}

impl CheckState {
    /// Collapse to a plain boolean; indeterminate counts as unchecked.
    pub fn normalize(self) -> bool {
        matches!(self, CheckState::Checked)
    }
}

impl From<bool> for CheckState {
    fn from(checked: bool) -> Self {
        if checked {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        }
    }
}

impl FromStr for CheckState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" | "checked" => Ok(CheckState::Checked),
            "false" | "no" | "off" | "0" | "unchecked" => Ok(CheckState::Unchecked),
            "indeterminate" | "mixed" => Ok(CheckState::Indeterminate),
            _ => Err(()),
        }
    }
}

/// Stored (normalized, unvalidated) value of one field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Date(NaiveDate),
    Bool(bool),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Date(d) => write!(f, "{}", d),
            FieldValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Value emitted by an input control, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    Text(String),
    /// Date picker selection; `None` means the picker was cleared.
    Date(Option<NaiveDate>),
    Checkbox(CheckState),
    Clear,
}

impl RawInput {
    pub fn normalize(self) -> FieldValue {
        match self {
            RawInput::Text(s) => FieldValue::Text(s),
            RawInput::Date(Some(d)) => FieldValue::Date(d),
            RawInput::Date(None) | RawInput::Clear => FieldValue::Empty,
            RawInput::Checkbox(state) => FieldValue::Bool(state.normalize()),
        }
    }
}

impl From<&str> for RawInput {
    fn from(s: &str) -> Self {
        RawInput::Text(s.to_string())
    }
}

impl From<String> for RawInput {
    fn from(s: String) -> Self {
        RawInput::Text(s)
    }
}

impl From<NaiveDate> for RawInput {
    fn from(d: NaiveDate) -> Self {
        RawInput::Date(Some(d))
    }
}

impl From<Option<NaiveDate>> for RawInput {
    fn from(d: Option<NaiveDate>) -> Self {
        RawInput::Date(d)
    }
}

impl From<bool> for RawInput {
    fn from(b: bool) -> Self {
        RawInput::Checkbox(b.into())
    }
}

impl From<CheckState> for RawInput {
    fn from(state: CheckState) -> Self {
        RawInput::Checkbox(state)
    }
}

/// Current field values keyed by field name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, FieldValue>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy when assembling a submission by hand.
    pub fn with(mut self, name: impl Into<String>, input: impl Into<RawInput>) -> Self {
        self.insert(name, input.into().normalize());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.0.insert(name.into(), value)
    }

    /// Missing entries read as [`FieldValue::Empty`].
    pub fn get(&self, name: &str) -> &FieldValue {
        static EMPTY: FieldValue = FieldValue::Empty;
        self.0.get(name).unwrap_or(&EMPTY)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Per-field validation messages keyed by field name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.0.insert(name.into(), message.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Field values that passed validation, in schema declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidatedFields(Vec<(String, FieldValue)>);

impl ValidatedFields {
    pub(crate) fn push(&mut self, name: impl Into<String>, value: FieldValue) {
        self.0.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ValidatedFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Record identifier (Value Object)
///
/// # Invariants
/// - Non-empty
/// - Unique within a session's table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Returns `None` for an empty id.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indeterminate_normalizes_to_false() {
        assert_eq!(RawInput::Checkbox(CheckState::Indeterminate).normalize(), FieldValue::Bool(false));
        assert_eq!(RawInput::Checkbox(CheckState::Checked).normalize(), FieldValue::Bool(true));
    }

    #[test]
    fn test_cleared_date_is_empty() {
        assert_eq!(RawInput::Date(None).normalize(), FieldValue::Empty);
        assert_eq!(RawInput::Clear.normalize(), FieldValue::Empty);
    }

    #[test]
    fn test_check_state_parse() {
        assert_eq!("on".parse::<CheckState>(), Ok(CheckState::Checked));
        assert_eq!("False".parse::<CheckState>(), Ok(CheckState::Unchecked));
        assert_eq!("indeterminate".parse::<CheckState>(), Ok(CheckState::Indeterminate));
        assert!("maybe".parse::<CheckState>().is_err());
    }

    #[test]
    fn test_missing_value_reads_empty() {
        let values = FormValues::new().with("name", "Al");
        assert_eq!(values.get("name"), &FieldValue::Text("Al".into()));
        assert!(values.get("email").is_empty());
    }

    #[test]
    fn test_record_id_rejects_empty() {
        assert!(RecordId::new("").is_none());
        assert_eq!(RecordId::new("r-1").unwrap().as_str(), "r-1");
    }

    #[test]
    fn test_validated_fields_serialize_in_order() {
        let mut fields = ValidatedFields::default();
        fields.push("name", FieldValue::Text("Al".into()));
        fields.push("birthDate", FieldValue::Date(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()));
        fields.push("isActive", FieldValue::Bool(true));
        let json = serde_json::to_string(&fields).unwrap();
        assert_eq!(json, r#"{"name":"Al","birthDate":"2000-01-01","isActive":true}"#);
    }
}
