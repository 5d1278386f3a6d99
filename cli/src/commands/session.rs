//! Interactive entry session
//!
//! Each input line is one event: an edit, a blur, a submit or a reset.
//! Lines are handled one at a time, to completion.

use super::{new_session, render_errors, render_records, schema};
use crate::config::Settings;
use anyhow::{anyhow, Result};
use colored::Colorize;
use formtable_core::{FieldValue, Session, SubmitOutcome};
use std::io::{IsTerminal, Write as _};
use tabled::builder::Builder;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub const HELP: &str = "\
Commands:
  set <field> <value>   edit a field (dates as YYYY-MM-DD, checkbox true|false|indeterminate)
  clear <field>         unset a field
  blur <field>          leave a field (validates in on_blur/all modes)
  submit                validate and add a record
  reset                 discard edits and errors
  show                  current values and messages
  table                 submitted records
  schema                field declarations
  help                  this text
  quit                  end the session";

#[derive(Debug, PartialEq, Eq)]
enum Event<'a> {
    Set { field: &'a str, value: &'a str },
    Clear { field: &'a str },
    Blur { field: &'a str },
    Submit,
    Reset,
    Show,
    Table,
    Schema,
    Help,
    Quit,
}

fn parse(line: &str) -> Result<Option<Event<'_>>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let field = || {
        if rest.is_empty() {
            Err(anyhow!("{} needs a field name", command))
        } else {
            Ok(rest)
        }
    };

    let event = match command {
        "set" => {
            let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if field.is_empty() {
                return Err(anyhow!("set needs a field name"));
            }
            Event::Set { field, value: value.trim() }
        }
        "clear" => Event::Clear { field: field()? },
        "blur" => Event::Blur { field: field()? },
        "submit" => Event::Submit,
        "reset" | "cancel" => Event::Reset,
        "show" => Event::Show,
        "table" => Event::Table,
        "schema" => Event::Schema,
        "help" | "?" => Event::Help,
        "quit" | "exit" => Event::Quit,
        other => return Err(anyhow!("unknown command: {} (try `help`)", other)),
    };
    Ok(Some(event))
}

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Handle one line. Returns whether to keep going and the text to print.
pub fn apply(session: &mut Session, line: &str, settings: &Settings) -> Result<(Flow, String)> {
    let Some(event) = parse(line)? else {
        return Ok((Flow::Continue, String::new()));
    };

    let out = match event {
        Event::Set { field, value } => {
            session.set_field_str(field, value)?;
            field_message(session, field)
        }
        Event::Clear { field } => {
            session.set_field(field, formtable_core::RawInput::Clear)?;
            field_message(session, field)
        }
        Event::Blur { field } => {
            session.blur(field)?;
            field_message(session, field)
        }
        Event::Submit => match session.submit() {
            SubmitOutcome::Accepted(_) => render_records(session, settings)?,
            SubmitOutcome::Rejected(errors) => render_errors(session.schema(), &errors, settings.format)?,
        },
        Event::Reset => {
            session.cancel();
            String::new()
        }
        Event::Show => show(session, settings)?,
        Event::Table => render_records(session, settings)?,
        Event::Schema => schema::render(session.schema(), settings.format)?,
        Event::Help => HELP.to_string(),
        Event::Quit => return Ok((Flow::Quit, String::new())),
    };
    Ok((Flow::Continue, out))
}

fn field_message(session: &Session, field: &str) -> String {
    session
        .form()
        .error(field)
        .map(|message| format!("  {} {}", format!("{}:", field).yellow(), message))
        .unwrap_or_default()
}

fn show(session: &Session, settings: &Settings) -> Result<String> {
    let form = session.form();
    if !settings.format.is_table() {
        return settings.format.render(&serde_json::json!({
            "values": form.values(),
            "errors": form.errors(),
            "submitCount": form.submit_count(),
        }));
    }

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value", "Dirty", "Touched", "Message"].map(String::from));
    for field in session.schema().fields() {
        let value = match form.value(&field.name) {
            FieldValue::Empty => "-".to_string(),
            other => other.to_string(),
        };
        let flag = |on: bool| (if on { "*" } else { "" }).to_string();
        builder.push_record([
            field.name.clone(),
            value,
            flag(form.is_dirty(&field.name)),
            flag(form.is_touched(&field.name)),
            form.error(&field.name).unwrap_or_default().to_string(),
        ]);
    }
    Ok(crate::output::grid(builder))
}

/// Drive a session from `reader` until end of input or `quit`.
pub async fn run<R>(reader: R, settings: &Settings, interactive: bool) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut session = new_session(settings)?;
    let mut lines = reader.lines();
    if interactive {
        println!("{}", "Registration form. Type `help` for commands.".bold());
    }

    loop {
        if interactive {
            print!("> ");
            std::io::stdout().flush()?;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match apply(&mut session, &line, settings) {
            Ok((Flow::Quit, _)) => break,
            Ok((Flow::Continue, out)) => {
                if !out.is_empty() {
                    println!("{}", out.trim_end());
                }
            }
            // Boundary errors are local to one line; the session stays usable.
            Err(e) => eprintln!("{} {:#}", "Error:".red(), e),
        }
    }

    tracing::debug!(records = session.table().len(), "session ended");
    Ok(())
}

pub fn stdin_is_terminal() -> bool {
    std::io::stdin().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use formtable_core::{DisplayOptions, ValidationMode};

    fn settings(mode: ValidationMode) -> Settings {
        Settings { display: DisplayOptions::default(), mode, format: OutputFormat::Table }
    }

    fn feed(session: &mut Session, settings: &Settings, lines: &[&str]) -> Vec<String> {
        lines
            .iter()
            .map(|line| apply(session, line, settings).map(|(_, out)| out).unwrap())
            .collect()
    }

    #[test]
    fn test_parse_events() {
        assert_eq!(parse("  ").unwrap(), None);
        assert_eq!(parse("# comment").unwrap(), None);
        assert_eq!(
            parse("set name Jane Doe").unwrap(),
            Some(Event::Set { field: "name", value: "Jane Doe" })
        );
        assert_eq!(parse("set birthDate").unwrap(), Some(Event::Set { field: "birthDate", value: "" }));
        assert_eq!(parse("cancel").unwrap(), Some(Event::Reset));
        assert!(parse("blur").is_err());
        assert!(parse("dance").is_err());
    }

    #[test]
    fn test_scripted_session() {
        let settings = settings(ValidationMode::OnSubmit);
        let mut session = new_session(&settings).unwrap();
        let out = feed(
            &mut session,
            &settings,
            &[
                "set name Al",
                "set email al@example.com",
                "set birthDate 2000-01-01",
                "set department engineering",
                "set isActive indeterminate",
                "submit",
            ],
        );
        assert!(out[5].contains("Engineering"));
        assert_eq!(session.table().len(), 1);
        assert_eq!(
            session.table().records()[0].field("isActive"),
            Some(&FieldValue::Bool(false))
        );
        assert_eq!(session.form().values(), &session.schema().defaults());
    }

    #[test]
    fn test_rejected_submit_then_fix() {
        let settings = settings(ValidationMode::OnSubmit);
        let mut session = new_session(&settings).unwrap();
        let out = feed(&mut session, &settings, &["set name A", "submit"]);
        assert!(out[1].contains("Name must be at least 2 characters."));
        assert!(out[1].contains("A date of birth is required."));

        let out = feed(&mut session, &settings, &["set name Al"]);
        assert!(out[0].is_empty());
        assert!(session.table().is_empty());
    }

    #[test]
    fn test_on_blur_mode_reports_on_blur() {
        let settings = settings(ValidationMode::OnBlur);
        let mut session = new_session(&settings).unwrap();
        let out = feed(&mut session, &settings, &["set email bad", "blur email"]);
        assert!(out[0].is_empty());
        assert!(out[1].contains("Please enter a valid email address."));
    }

    #[test]
    fn test_bad_line_leaves_session_usable() {
        let settings = settings(ValidationMode::OnSubmit);
        let mut session = new_session(&settings).unwrap();
        assert!(apply(&mut session, "set age 3", &settings).is_err());
        assert!(apply(&mut session, "set isActive maybe", &settings).is_err());
        let (flow, out) = apply(&mut session, "table", &settings).unwrap();
        assert_eq!(flow, Flow::Continue);
        assert!(out.contains(formtable_core::projection::EMPTY_TABLE_TEXT));
        assert_eq!(apply(&mut session, "quit", &settings).unwrap().0, Flow::Quit);
    }

    #[tokio::test]
    async fn test_run_reads_until_quit() {
        let settings = settings(ValidationMode::OnSubmit);
        let script: &[u8] = b"set name Al\nshow\nquit\nset name ignored\n";
        run(script, &settings, false).await.unwrap();
    }
}
