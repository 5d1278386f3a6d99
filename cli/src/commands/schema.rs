//! Schema command

use crate::output::{self, OutputFormat};
use formtable_core::{Constraint, FieldSchema, FormSchema};
use tabled::builder::Builder;

pub fn render(schema: &FormSchema, format: OutputFormat) -> anyhow::Result<String> {
    if !format.is_table() {
        return format.render(schema);
    }
    let mut builder = Builder::default();
    builder.push_record(["Field", "Label", "Kind", "Required", "Rules"].map(String::from));
    for field in schema.fields() {
        builder.push_record([
            field.name.clone(),
            field.label.clone(),
            format!("{:?}", field.kind).to_lowercase(),
            (if field.required { "yes" } else { "no" }).to_string(),
            rules(field),
        ]);
    }
    Ok(output::grid(builder))
}

fn rules(field: &FieldSchema) -> String {
    field
        .constraints
        .iter()
        .map(|c| match c {
            Constraint::MinLength { min } => format!("min {} chars", min),
            Constraint::MaxLength { max } => format!("max {} chars", max),
            Constraint::EmailFormat => "email address".to_string(),
            Constraint::OneOf { options } => {
                let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
                format!("one of {}", values.join("|"))
            }
            Constraint::DateRange { min, max } => match (min, max) {
                (Some(min), Some(max)) => format!("{} to {}", min, max),
                (Some(min), None) => format!("from {}", min),
                (None, Some(max)) => format!("until {}", max),
                (None, None) => "any date".to_string(),
            },
        })
        .collect::<Vec<_>>()
        .join(", ")
}
