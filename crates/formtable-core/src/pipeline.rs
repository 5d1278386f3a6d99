//! Submission pipeline
//!
//! [`Session`] is the top-level controller for one application session. It
//! owns the form state and the record table; nothing else mutates them.

use crate::domain::*;
use crate::validation::{ValidationResult, Validator};
use crate::Result;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Attempts with the configured generator before falling back to UUID v4.
const MAX_ID_ATTEMPTS: usize = 8;

/// Source of record identifiers.
pub trait IdGenerator {
    fn generate(&mut self) -> String;
}

/// Random UUID v4 ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Receives the outcome of every submit and cancel.
pub trait Notifier {
    fn notify(&self, event: &FormEvent);
}

impl<F: Fn(&FormEvent)> Notifier for F {
    fn notify(&self, event: &FormEvent) {
        self(event)
    }
}

/// Writes events to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &FormEvent) {
        match event {
            FormEvent::Submitted { record } => {
                tracing::info!(event = event.event_type(), id = %record.id(), "record added")
            }
            FormEvent::Rejected { errors } => {
                tracing::info!(event = event.event_type(), fields = errors.len(), "submission rejected")
            }
            FormEvent::Reset => tracing::debug!(event = event.event_type(), "form reset"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _event: &FormEvent) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "data", rename_all = "lowercase")]
pub enum SubmitOutcome {
    Accepted(Record),
    Rejected(FieldErrors),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }

    pub fn record(&self) -> Option<&Record> {
        match self {
            SubmitOutcome::Accepted(record) => Some(record),
            SubmitOutcome::Rejected(_) => None,
        }
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            SubmitOutcome::Rejected(errors) => Some(errors),
            SubmitOutcome::Accepted(_) => None,
        }
    }
}

pub struct Session {
    schema: Arc<FormSchema>,
    form: FormState,
    table: TableStore,
    ids: Box<dyn IdGenerator>,
    notifier: Box<dyn Notifier>,
    last_accepted: Option<bool>,
}

impl Session {
    pub fn new(schema: Arc<FormSchema>, mode: ValidationMode) -> Self {
        Self {
            form: FormState::new(Arc::clone(&schema), mode),
            schema,
            table: TableStore::new(),
            ids: Box::new(UuidGenerator),
            notifier: Box::new(LogNotifier),
            last_accepted: None,
        }
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub fn table(&self) -> &TableStore {
        &self.table
    }

    /// Result of the most recent submit; `None` before the first one.
    pub fn last_accepted(&self) -> Option<bool> {
        self.last_accepted
    }

    pub fn set_field(&mut self, name: &str, input: impl Into<RawInput>) -> Result<()> {
        self.form.set_field(name, input)
    }

    pub fn set_field_str(&mut self, name: &str, raw: &str) -> Result<()> {
        self.form.set_field_str(name, raw)
    }

    pub fn blur(&mut self, name: &str) -> Result<()> {
        self.form.blur(name)
    }

    /// Validate the current values without submitting.
    pub fn validate(&self) -> ValidationResult {
        Validator::new(&self.schema).validate(self.form.values())
    }

    /// Discard edits and errors.
    pub fn cancel(&mut self) {
        self.form.reset_to_defaults();
        self.notifier.notify(&FormEvent::Reset);
    }

    /// Submit an explicit set of values, replacing the current ones.
    pub fn submit_values(&mut self, values: FormValues) -> SubmitOutcome {
        self.form.load(values);
        self.submit()
    }

    /// Validate the current values and, when valid, commit them as a record.
    ///
    /// A rejected submit attaches errors and keeps the values for correction;
    /// the table is only touched on acceptance.
    pub fn submit(&mut self) -> SubmitOutcome {
        let ticket = self.form.begin_submit();
        let result = Validator::new(&self.schema).validate(self.form.values());

        let outcome = match result {
            ValidationResult::Invalid(errors) => {
                self.form.apply_errors(ticket, errors.clone());
                let event = FormEvent::Rejected { errors: errors.clone() };
                self.notifier.notify(&event);
                SubmitOutcome::Rejected(errors)
            }
            ValidationResult::Valid(fields) => {
                let id = self.next_record_id();
                let record = Record::new(id, fields, Utc::now());
                self.table.append(record.clone());
                self.form.reset_to_defaults();
                let event = FormEvent::Submitted { record: record.clone() };
                self.notifier.notify(&event);
                SubmitOutcome::Accepted(record)
            }
        };

        self.last_accepted = Some(outcome.is_accepted());
        outcome
    }

    fn next_record_id(&mut self) -> RecordId {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            if let Some(id) = RecordId::new(self.ids.generate()) {
                if !self.table.contains_id(&id) {
                    return id;
                }
            }
            tracing::warn!(attempt, "record id collision, regenerating");
        }

        loop {
            if let Some(id) = RecordId::new(Uuid::new_v4().to_string()) {
                if !self.table.contains_id(&id) {
                    return id;
                }
            }
        }
    }
}
