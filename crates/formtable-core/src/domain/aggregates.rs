//! Aggregates - Consistency boundaries for form entry
//!
//! - [`FormState`] holds in-progress values and their messages
//! - [`Record`] is a committed, immutable submission
//! - [`TableStore`] is the ordered, append-only list of records

use super::schema::FormSchema;
use super::value_objects::*;
use crate::validation::Validator;
use crate::{FormsError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// When a field is re-validated outside of submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    #[default]
    OnSubmit,
    OnBlur,
    OnChange,
    All,
}

impl ValidationMode {
    fn on_change(self) -> bool {
        matches!(self, ValidationMode::OnChange | ValidationMode::All)
    }

    fn on_blur(self) -> bool {
        matches!(self, ValidationMode::OnBlur | ValidationMode::All)
    }
}

impl FromStr for ValidationMode {
    type Err = FormsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "on_submit" | "submit" => Ok(ValidationMode::OnSubmit),
            "on_blur" | "blur" => Ok(ValidationMode::OnBlur),
            "on_change" | "change" => Ok(ValidationMode::OnChange),
            "all" => Ok(ValidationMode::All),
            _ => Err(FormsError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidationMode::OnSubmit => "on_submit",
            ValidationMode::OnBlur => "on_blur",
            ValidationMode::OnChange => "on_change",
            ValidationMode::All => "all",
        };
        f.write_str(name)
    }
}

/// Stamp of the edit generation a validation pass started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ValidationTicket(u64);

/// Form State Holder
///
/// # Invariants
/// - Every stored value belongs to a schema field
/// - Checkbox values are stored as plain booleans
/// - Errors only come from a validation pass, never from `set_field` alone
#[derive(Debug, Clone)]
pub struct FormState {
    schema: Arc<FormSchema>,
    values: FormValues,
    errors: FieldErrors,
    touched: BTreeSet<String>,
    mode: ValidationMode,
    submit_count: u32,
    generation: u64,
}

impl FormState {
    pub fn new(schema: Arc<FormSchema>, mode: ValidationMode) -> Self {
        Self {
            values: schema.defaults(),
            schema,
            errors: FieldErrors::new(),
            touched: BTreeSet::new(),
            mode,
            submit_count: 0,
            generation: 0,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub(crate) fn schema_handle(&self) -> Arc<FormSchema> {
        Arc::clone(&self.schema)
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> &FieldValue {
        self.values.get(name)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name)
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn submit_count(&self) -> u32 {
        self.submit_count
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    /// A field is dirty when it differs from its declared default.
    pub fn is_dirty(&self, name: &str) -> bool {
        self.schema
            .field(name)
            .map(|f| self.values.get(name) != &f.default)
            .unwrap_or(false)
    }

    pub fn is_form_dirty(&self) -> bool {
        self.schema.fields().iter().any(|f| self.is_dirty(&f.name))
    }

    /// Update exactly one field. Input is coerced to the field's kind first,
    /// so tri-state and text checkbox values land as plain booleans.
    pub fn set_field(&mut self, name: &str, input: impl Into<RawInput>) -> Result<()> {
        let value = self.schema.require_field(name)?.coerce(input.into())?;
        tracing::debug!(field = name, value = %value, "field updated");
        self.values.insert(name, value);
        self.generation += 1;

        // After a submit attempt edits re-validate, so fixed fields clear.
        if self.mode.on_change() || self.submit_count > 0 {
            self.revalidate(name)?;
        }
        Ok(())
    }

    /// Update one field from control text, parsed according to its kind.
    pub fn set_field_str(&mut self, name: &str, raw: &str) -> Result<()> {
        self.set_field(name, raw)
    }

    /// Mark a field as visited.
    pub fn blur(&mut self, name: &str) -> Result<()> {
        self.schema.require_field(name)?;
        self.touched.insert(name.to_string());
        if self.mode.on_blur() {
            self.revalidate(name)?;
        }
        Ok(())
    }

    /// Restore `defaults`, clearing errors, touched flags and the submit count.
    pub fn reset(&mut self, defaults: FormValues) {
        self.values = defaults;
        self.errors.clear();
        self.touched.clear();
        self.submit_count = 0;
        self.generation += 1;
    }

    pub fn reset_to_defaults(&mut self) {
        self.reset(self.schema.defaults());
    }

    /// Replace all values at once, as carried by a submit event. Entries
    /// for names outside the schema are dropped.
    pub(crate) fn load(&mut self, values: FormValues) {
        self.values = values
            .iter()
            .filter_map(|(name, value)| {
                let field = self.schema.field(name)?;
                Some((name.to_string(), field.coerce_value(value.clone())))
            })
            .collect();
        self.generation += 1;
    }

    /// Ticket for a validation pass over the current values.
    pub fn ticket(&self) -> ValidationTicket {
        ValidationTicket(self.generation)
    }

    /// Attach errors produced for `ticket`. Results for an older generation
    /// are discarded and `false` is returned.
    pub fn apply_errors(&mut self, ticket: ValidationTicket, errors: FieldErrors) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(stale = ticket.0, current = self.generation, "discarding stale validation");
            return false;
        }
        self.errors = errors;
        true
    }

    /// Count a submit attempt and start a new generation for it.
    pub(crate) fn begin_submit(&mut self) -> ValidationTicket {
        self.submit_count += 1;
        self.generation += 1;
        self.ticket()
    }

    fn revalidate(&mut self, name: &str) -> Result<()> {
        let message = Validator::new(&self.schema).validate_field(name, self.values.get(name))?;
        match message {
            Some(message) => self.errors.insert(name, message),
            None => {
                self.errors.remove(name);
            }
        }
        Ok(())
    }
}

/// Committed submission (immutable once created).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    id: RecordId,
    #[serde(flatten)]
    fields: ValidatedFields,
    created_at: DateTime<Utc>,
}

impl Record {
    pub(crate) fn new(id: RecordId, fields: ValidatedFields, created_at: DateTime<Utc>) -> Self {
        Self { id, fields, created_at }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn fields(&self) -> &ValidatedFields {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Ordered, append-only record table for one session.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct TableStore {
    records: Vec<Record>,
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn contains_id(&self, id: &RecordId) -> bool {
        self.records.iter().any(|r| r.id() == id)
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Records in insertion order. Call again to restart.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a TableStore {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
