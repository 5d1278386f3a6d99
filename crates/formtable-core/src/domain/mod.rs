//! formtable Domain Model
//!
//! - **Value Objects**: FieldValue, RawInput, CheckState, RecordId
//! - **Schema**: FieldSchema, FormSchema, Constraint
//! - **Aggregates**: FormState, Record, TableStore
//! - **Domain Events**: FormEvent

pub mod value_objects;
pub mod schema;
pub mod aggregates;
pub mod events;

pub use value_objects::*;
pub use schema::*;
pub use aggregates::*;
pub use events::*;
