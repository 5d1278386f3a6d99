//! formtable Core
//!
//! Schema-driven form entry that commits validated submissions to an
//! in-memory, append-only table.
//!
//! ## Features
//! - Declarative field schema (text, email, date, select, checkbox)
//! - Aggregated per-field validation messages
//! - Form state with dirty/touched tracking and validation modes
//! - Append-only record table with generated ids and timestamps
//! - Lazy table projection with locale-aware date formatting
//!
//! # Architecture
//!
//! - **Value Objects**: raw inputs, stored field values, record ids
//! - **Aggregates**: [`FormState`], [`TableStore`], [`Record`]
//! - **Domain Events**: [`FormEvent`], delivered through a [`Notifier`]
//! - **Controller**: [`Session`] owns the state for one application session

#![warn(clippy::all)]

pub mod binding;
pub mod domain;
pub mod pipeline;
pub mod projection;
pub mod validation;

pub use binding::FieldBinding;
pub use domain::*;
pub use pipeline::{IdGenerator, LogNotifier, Notifier, NoopNotifier, Session, SubmitOutcome, UuidGenerator};
pub use projection::{DisplayOptions, DisplayRow, TableView};
pub use validation::{ValidationResult, Validator};

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormsError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("duplicate field in schema: {0}")]
    DuplicateField(String),

    #[error("field name is reserved for record metadata: {0}")]
    ReservedField(String),

    #[error("cannot read {input:?} as a value for {field}")]
    UnparsableInput { field: String, input: String },

    #[error("unknown locale: {0}")]
    UnknownLocale(String),

    #[error("unknown validation mode: {0}")]
    UnknownMode(String),
}

pub type Result<T> = std::result::Result<T, FormsError>;
