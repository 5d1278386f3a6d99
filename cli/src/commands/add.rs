//! One-shot submit

use super::{new_session, render_errors, render_records};
use crate::config::Settings;
use anyhow::{bail, Result};
use clap::Args;

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long, default_value = "")]
    pub name: String,
    #[arg(long, default_value = "")]
    pub email: String,
    /// YYYY-MM-DD
    #[arg(long, default_value = "")]
    pub birth_date: String,
    #[arg(long, default_value = "")]
    pub department: String,
    /// true, false or indeterminate
    #[arg(long, default_value = "false")]
    pub active: String,
}

impl AddArgs {
    fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("birthDate", self.birth_date.as_str()),
            ("department", self.department.as_str()),
            ("isActive", self.active.as_str()),
        ]
    }
}

/// Submit one registration. Returns the text to print.
pub fn handle(args: AddArgs, settings: &Settings) -> Result<String> {
    let mut session = new_session(settings)?;
    for (name, raw) in args.fields() {
        session.set_field_str(name, raw)?;
    }

    let outcome = session.submit();
    match outcome.errors() {
        Some(errors) => {
            let listing = render_errors(session.schema(), errors, settings.format)?;
            bail!("submission rejected\n{}", listing.trim_end())
        }
        None => render_records(&session, settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use formtable_core::{DisplayOptions, ValidationMode};

    fn settings(format: OutputFormat) -> Settings {
        Settings { display: DisplayOptions::default(), mode: ValidationMode::OnSubmit, format }
    }

    fn args() -> AddArgs {
        AddArgs {
            name: "Al".into(),
            email: "al@example.com".into(),
            birth_date: "2000-01-01".into(),
            department: "engineering".into(),
            active: "indeterminate".into(),
        }
    }

    #[test]
    fn test_add_prints_table() {
        let out = handle(args(), &settings(OutputFormat::Table)).unwrap();
        assert!(out.contains("Al"));
        assert!(out.contains("Jan 1, 2000"));
        assert!(out.contains("Engineering"));
    }

    #[test]
    fn test_add_json() {
        let out = handle(args(), &settings(OutputFormat::Json)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(1));
        assert_eq!(json[0]["isActive"], false);
    }

    #[test]
    fn test_add_rejected_lists_fields() {
        let bad = AddArgs { name: "A".into(), email: "bad".into(), ..args() };
        let err = handle(bad, &settings(OutputFormat::Table)).unwrap_err().to_string();
        assert!(err.contains("Name must be at least 2 characters."));
        assert!(err.contains("Please enter a valid email address."));
    }
}
