//! CLI Commands

pub mod add;
pub mod config;
pub mod schema;
pub mod session;

use crate::config::Settings;
use crate::output::{self, OutputFormat};
use chrono::Local;
use colored::Colorize;
use formtable_core::{registration_schema, FieldErrors, FormEvent, FormSchema, Notifier, Session, TableView};
use std::fmt::Write;
use std::sync::Arc;

/// Acknowledges submits on stderr so stdout stays machine-readable.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, event: &FormEvent) {
        tracing::debug!(event = event.event_type(), "notify");
        match event {
            FormEvent::Submitted { record } => {
                eprintln!("{} {}", "✔ Record added".green().bold(), record.id().as_str().dimmed())
            }
            FormEvent::Rejected { errors } => eprintln!(
                "{} {} field(s) need attention",
                "✘ Submission rejected:".red().bold(),
                errors.len()
            ),
            FormEvent::Reset => eprintln!("{}", "Form reset".dimmed()),
        }
    }
}

/// Fresh session over the registration form; the date-of-birth upper bound
/// is today's local date.
pub fn new_session(settings: &Settings) -> anyhow::Result<Session> {
    let schema: Arc<FormSchema> = Arc::new(registration_schema(Local::now().date_naive())?);
    Ok(Session::new(schema, settings.mode).with_notifier(ConsoleNotifier))
}

/// Current table in the configured format.
pub fn render_records(session: &Session, settings: &Settings) -> anyhow::Result<String> {
    if settings.format.is_table() {
        let view = TableView::new(session.schema(), &settings.display);
        Ok(output::render_table(&view, session.table()))
    } else {
        settings.format.render(session.table())
    }
}

/// Field messages, one per line, in schema order.
pub fn render_errors(schema: &FormSchema, errors: &FieldErrors, format: OutputFormat) -> anyhow::Result<String> {
    if !format.is_table() {
        return format.render(errors);
    }
    let mut out = String::new();
    for field in schema.fields() {
        if let Some(message) = errors.get(&field.name) {
            writeln!(out, "  {} {}", format!("{}:", field.name).yellow(), message)?;
        }
    }
    Ok(out)
}
