//! Table projection
//!
//! Turns the record table into display rows. Purely derived: nothing here
//! mutates the store, and formatting never feeds back into record data.

use crate::domain::*;
use crate::{FormsError, Result};
use chrono::{DateTime, Local, Locale, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

pub const EMPTY_TABLE_TEXT: &str = "No records yet. Submit the form to add one.";
pub const CREATED_HEADER: &str = "Created";

/// US medium-length formats, e.g. "Jan 1, 2000" and "Jan 1, 2000, 9:30:00 AM".
pub const MEDIUM_DATE: &str = "%b %-d, %Y";
pub const MEDIUM_DATETIME: &str = "%b %-d, %Y, %-I:%M:%S %p";

/// Medium date and date-time patterns for a POSIX locale name.
///
/// Day-month-year with a 24-hour clock unless the language orders it
/// otherwise.
pub fn medium_patterns(name: &str) -> (&'static str, &'static str) {
    let normalized = name.replace('-', "_");
    let mut parts = normalized.split('_');
    let language = parts.next().unwrap_or_default();
    let region = parts.next().unwrap_or_default();

    match (language, region) {
        ("en", "US" | "CA" | "PH") => (MEDIUM_DATE, MEDIUM_DATETIME),
        ("de" | "da" | "fi" | "nb" | "nn" | "pl" | "ru" | "tr" | "cs" | "sk" | "uk", _) => {
            ("%d.%m.%Y", "%d.%m.%Y, %H:%M:%S")
        }
        ("nl", _) => ("%-d %b %Y", "%-d %b %Y, %H:%M:%S"),
        ("ja", _) => ("%Y/%m/%d", "%Y/%m/%d %H:%M:%S"),
        ("zh", _) => ("%Y年%-m月%-d日", "%Y年%-m月%-d日 %H:%M:%S"),
        ("ko", _) => ("%Y. %-m. %-d.", "%Y. %-m. %-d. %H:%M:%S"),
        ("sv", _) => ("%Y-%m-%d", "%Y-%m-%d %H:%M:%S"),
        _ => ("%-d %b %Y", "%-d %b %Y, %H:%M:%S"),
    }
}

#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub locale: Locale,
    pub date_format: String,
    pub datetime_format: String,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            locale: Locale::en_US,
            date_format: MEDIUM_DATE.to_string(),
            datetime_format: MEDIUM_DATETIME.to_string(),
        }
    }
}

impl DisplayOptions {
    /// Medium formats for a POSIX locale name such as `de_DE`.
    pub fn for_locale(name: &str) -> Result<Self> {
        let locale = parse_locale(name)?;
        let (date, datetime) = medium_patterns(name);
        Ok(Self {
            locale,
            date_format: date.to_string(),
            datetime_format: datetime.to_string(),
        })
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        let midnight = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        midnight.format_localized(&self.date_format, self.locale).to_string()
    }

    /// Timestamps are shown in the local time zone.
    pub fn format_timestamp(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&Local)
            .format_localized(&self.datetime_format, self.locale)
            .to_string()
    }
}

pub fn parse_locale(name: &str) -> Result<Locale> {
    Locale::try_from(name.replace('-', "_").as_str()).map_err(|_| FormsError::UnknownLocale(name.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DisplayRow {
    /// Stand-in row for an empty table.
    Placeholder { text: String, columns: usize },
    Record { id: String, cells: Vec<String> },
}

#[derive(Clone, Copy)]
pub struct TableView<'a> {
    schema: &'a FormSchema,
    options: &'a DisplayOptions,
}

impl<'a> TableView<'a> {
    pub fn new(schema: &'a FormSchema, options: &'a DisplayOptions) -> Self {
        Self { schema, options }
    }

    /// One column per schema field, then the creation time.
    pub fn headers(&self) -> Vec<String> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.label.clone())
            .chain(std::iter::once(CREATED_HEADER.to_string()))
            .collect()
    }

    /// Lazily project `store` into rows. An empty store yields exactly one
    /// placeholder row.
    pub fn rows(&self, store: &'a TableStore) -> impl Iterator<Item = DisplayRow> + 'a {
        let view = *self;
        let placeholder = store.is_empty().then(|| DisplayRow::Placeholder {
            text: EMPTY_TABLE_TEXT.to_string(),
            columns: self.schema.fields().len() + 1,
        });
        placeholder.into_iter().chain(store.iter().map(move |r| view.row(r)))
    }

    fn row(&self, record: &Record) -> DisplayRow {
        let mut cells: Vec<String> = self
            .schema
            .fields()
            .iter()
            .map(|f| self.cell(f, record.field(&f.name).unwrap_or(&FieldValue::Empty)))
            .collect();
        cells.push(self.options.format_timestamp(record.created_at()));
        DisplayRow::Record { id: record.id().to_string(), cells }
    }

    fn cell(&self, field: &FieldSchema, value: &FieldValue) -> String {
        match (field.kind, value) {
            (_, FieldValue::Empty) => String::new(),
            (_, FieldValue::Date(d)) => self.options.format_date(*d),
            (_, FieldValue::Bool(b)) => (if *b { "Yes" } else { "No" }).to_string(),
            (FieldKind::Enum, FieldValue::Text(v)) => field.option_label(v).unwrap_or(v).to_string(),
            (_, FieldValue::Text(v)) => v.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{NoopNotifier, Session};
    use std::sync::Arc;

    fn session() -> Session {
        let schema = registration_schema(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()).unwrap();
        Session::new(Arc::new(schema), ValidationMode::OnSubmit).with_notifier(NoopNotifier)
    }

    #[test]
    fn test_empty_table_renders_placeholder() {
        let session = session();
        let options = DisplayOptions::default();
        let view = TableView::new(session.schema(), &options);
        let rows: Vec<_> = view.rows(session.table()).collect();

        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            DisplayRow::Placeholder { text: EMPTY_TABLE_TEXT.to_string(), columns: 6 }
        );
    }

    #[test]
    fn test_record_row_cells() {
        let mut session = session();
        session.set_field("name", "Al").unwrap();
        session.set_field("email", "al@example.com").unwrap();
        session.set_field_str("birthDate", "2000-01-01").unwrap();
        session.set_field("department", "hr").unwrap();
        session.set_field("isActive", true).unwrap();
        assert!(session.submit().is_accepted());

        let options = DisplayOptions::default();
        let view = TableView::new(session.schema(), &options);
        assert_eq!(
            view.headers(),
            vec!["Name", "Email", "Date of birth", "Department", "Active", "Created"]
        );

        let rows: Vec<_> = view.rows(session.table()).collect();
        assert_eq!(rows.len(), 1);
        match &rows[0] {
            DisplayRow::Record { cells, .. } => {
                assert_eq!(&cells[..5], &["Al", "al@example.com", "Jan 1, 2000", "Human Resources", "Yes"]);
                assert!(!cells[5].is_empty());
            }
            other => panic!("expected record row, got {:?}", other),
        }

        // Restartable: a second pass yields the same rows.
        assert_eq!(view.rows(session.table()).count(), 1);
    }

    #[test]
    fn test_medium_date_per_locale() {
        let date = NaiveDate::from_ymd_opt(2000, 3, 1).unwrap();
        let formatted = |name: &str| DisplayOptions::for_locale(name).unwrap().format_date(date);

        assert_eq!(formatted("en_US"), "Mar 1, 2000");
        assert_eq!(formatted("en-US"), "Mar 1, 2000");
        assert_eq!(formatted("en_GB"), "1 Mar 2000");
        assert_eq!(formatted("de_DE"), "01.03.2000");
        assert_eq!(formatted("fr_FR"), "1 mars 2000");
        assert_eq!(formatted("ja_JP"), "2000/03/01");
    }

    #[test]
    fn test_medium_datetime_clock() {
        assert_eq!(medium_patterns("en_US").1, MEDIUM_DATETIME);
        assert!(medium_patterns("de_DE").1.contains("%H"));
        assert!(!medium_patterns("fr_FR").1.contains("%p"));
    }

    #[test]
    fn test_unknown_locale() {
        assert!(matches!(
            DisplayOptions::for_locale("xx_YY"),
            Err(FormsError::UnknownLocale(_))
        ));
    }
}
