//! Command handlers for the siteledger CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod expense;
mod init;
mod project;
mod status;

use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use expense::{expense_add, expense_list, expense_update, ExpenseHistory};
pub use init::init;
pub use project::{project_add, project_list, ProjectList};
pub use status::status;

/// The output type for a command. This allows the command to return a consistent message,
/// optionally a rendered table for the terminal, and optionally structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// A plain-text table written to stdout.
    #[serde(skip)]
    table: Option<String>,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            table: None,
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            table: None,
            structure: None,
        }
    }

    /// Attaches a rendered table.
    pub fn with_table(mut self, table: String) -> Self {
        self.table = Some(table);
        self
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the rendered table, if any.
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the table (if it exists) to stdout, the message to `info!` and the structured data
    /// (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        if let Some(table) = self.table() {
            println!("{table}");
        }
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Which side of its column a cell is padded to.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Align {
    Left,
    Right,
}

/// Renders rows as a plain-text table with a header line and a rule under it. Column widths are
/// measured in characters so that accented names line up.
pub(crate) fn render_table(columns: &[(&str, Align)], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|(h, _)| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(columns)
            .zip(&widths)
            .map(|((cell, (_, align)), &width)| match align {
                Align::Left => format!("{cell:<width$}"),
                Align::Right => format!("{cell:>width$}"),
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![
        line(columns.iter().map(|(h, _)| *h).collect()),
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    ];
    out.extend(
        rows.iter()
            .map(|row| line(row.iter().map(String::as_str).collect())),
    );
    out.join("\n")
}

/// Formats an optional date, leaving missing dates blank.
pub(crate) fn fmt_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format(crate::model::coerce::ISO_DATE).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table() {
        let table = render_table(
            &[("id", Align::Left), ("name", Align::Left), ("total", Align::Right)],
            &[
                vec!["001".into(), "Casa Alpha".into(), "R$ 2.000,00".into()],
                vec!["002".into(), "Galpão".into(), "R$ 60.750,40".into()],
            ],
        );
        let expected = "\
id   name               total
---  ----------  ------------
001  Casa Alpha   R$ 2.000,00
002  Galpão      R$ 60.750,40";
        assert_eq!(table, expected);
    }

    #[test]
    fn test_render_empty_table() {
        let table = render_table(&[("week", Align::Right), ("amount", Align::Right)], &[]);
        assert_eq!(table, "week  amount\n----  ------");
    }

    #[test]
    fn test_out() {
        let out: Out<u32> = Out::new("done", 7).with_table("t".to_string());
        assert_eq!(out.message(), "done");
        assert_eq!(out.table(), Some("t"));
        assert_eq!(out.structure(), Some(&7));
        let json = serde_json::to_string(&out).unwrap();
        assert_eq!(json, r#"{"message":"done","structure":7}"#);

        let out: Out<()> = "hello".into();
        assert!(out.structure().is_none());
        assert!(out.table().is_none());
    }
}
