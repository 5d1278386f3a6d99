//! Form events
use super::aggregates::Record;
use super::value_objects::FieldErrors;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FormEvent {
    Submitted { record: Record },
    Rejected { errors: FieldErrors },
    Reset,
}

impl FormEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            FormEvent::Submitted { .. } => "form.submitted",
            FormEvent::Rejected { .. } => "form.rejected",
            FormEvent::Reset => "form.reset",
        }
    }
}
