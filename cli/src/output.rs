//! Output formatting

use clap::ValueEnum;
use formtable_core::{DisplayRow, TableStore, TableView};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Structured dump for json/yaml; table output goes through [`render_table`].
    pub fn render<T: Serialize>(&self, data: &T) -> anyhow::Result<String> {
        Ok(match self {
            OutputFormat::Yaml => serde_yaml::to_string(data)?,
            OutputFormat::Json | OutputFormat::Table => serde_json::to_string_pretty(data)?,
        })
    }

    pub fn is_table(&self) -> bool {
        matches!(self, OutputFormat::Table)
    }
}

/// Render the record table; an empty store shows the placeholder row.
pub fn render_table<'a>(view: &TableView<'a>, store: &'a TableStore) -> String {
    let mut builder = Builder::default();
    builder.push_record(view.headers());
    for row in view.rows(store) {
        match row {
            DisplayRow::Placeholder { text, columns } => {
                let mut cells = vec![String::new(); columns.max(1)];
                cells[0] = text;
                builder.push_record(cells);
            }
            DisplayRow::Record { cells, .. } => builder.push_record(cells),
        }
    }
    grid(builder)
}

/// Rounded grid for any header + rows pair.
pub fn grid(builder: Builder) -> String {
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use formtable_core::*;
    use std::sync::Arc;

    #[test]
    fn test_empty_table_shows_placeholder() {
        let schema = Arc::new(registration_schema(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()).unwrap());
        let session = Session::new(schema, ValidationMode::OnSubmit).with_notifier(NoopNotifier);
        let options = DisplayOptions::default();
        let view = TableView::new(session.schema(), &options);

        let rendered = render_table(&view, session.table());
        assert!(rendered.contains("Date of birth"));
        assert!(rendered.contains(formtable_core::projection::EMPTY_TABLE_TEXT));
    }

    #[test]
    fn test_yaml_output() {
        let out = OutputFormat::Yaml.render(&vec!["a", "b"]).unwrap();
        assert_eq!(out, "- a\n- b\n");
    }
}
