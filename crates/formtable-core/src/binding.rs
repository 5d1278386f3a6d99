//! Per-field access for input controls.
//!
//! A control only needs to read one value, write one value and show one
//! message; [`FieldBinding`] is that capability for a single field name.

use crate::domain::{FieldSchema, FieldValue, FormSchema, FormState, RawInput};
use crate::Result;
use std::sync::Arc;

pub struct FieldBinding<'a> {
    form: &'a mut FormState,
    schema: Arc<FormSchema>,
    index: usize,
    name: String,
}

impl FormState {
    /// Bind a control to `name`. Fails for names outside the schema.
    pub fn bind(&mut self, name: &str) -> Result<FieldBinding<'_>> {
        let schema = self.schema_handle();
        let index = schema
            .fields()
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| crate::FormsError::UnknownField(name.to_string()))?;
        Ok(FieldBinding { form: self, schema, index, name: name.to_string() })
    }
}

impl<'a> FieldBinding<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema.fields()[self.index]
    }

    pub fn get(&self) -> &FieldValue {
        self.form.value(&self.name)
    }

    pub fn set(&mut self, input: impl Into<RawInput>) -> Result<()> {
        self.form.set_field(&self.name, input)
    }

    pub fn set_str(&mut self, raw: &str) -> Result<()> {
        self.form.set_field_str(&self.name, raw)
    }

    pub fn error(&self) -> Option<&str> {
        self.form.error(&self.name)
    }

    pub fn blur(&mut self) -> Result<()> {
        self.form.blur(&self.name)
    }

    pub fn is_dirty(&self) -> bool {
        self.form.is_dirty(&self.name)
    }

    pub fn is_touched(&self) -> bool {
        self.form.is_touched(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::*;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn form() -> FormState {
        let schema = registration_schema(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()).unwrap();
        FormState::new(Arc::new(schema), ValidationMode::OnBlur)
    }

    #[test]
    fn test_binding_reads_and_writes_one_field() {
        let mut form = form();
        {
            let mut email = form.bind("email").unwrap();
            assert_eq!(email.schema().kind, FieldKind::Email);
            email.set("bad").unwrap();
            email.blur().unwrap();
            assert_eq!(email.get(), &FieldValue::Text("bad".into()));
            assert_eq!(email.error(), Some("Please enter a valid email address."));
            assert!(email.is_dirty());
            assert!(email.is_touched());
        }
        assert!(form.value("name").is_empty());
    }

    #[test]
    fn test_binding_unknown_field() {
        let mut form = form();
        assert!(form.bind("nope").is_err());
    }

    #[test]
    fn test_binding_set_str_parses_dates() {
        let mut form = form();
        let mut birth = form.bind("birthDate").unwrap();
        birth.set_str("2000-01-01").unwrap();
        assert_eq!(birth.get().as_date(), NaiveDate::from_ymd_opt(2000, 1, 1));
    }
}
