use crate::api::Cell;
use crate::error::Res;
use crate::model::coerce::{self, ISO_DATE};
use crate::model::mapping::Mapping;
use crate::model::Amount;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The leading headers of the projects tab, in order.
pub const PROJECT_HEADERS: &[&str] = &["id", "name", "initial_budget", "start_date"];

/// The rows of the projects tab.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Projects {
    mapping: Mapping,
    data: Vec<Project>,
}

impl Projects {
    /// Parses the raw tab values, header row first. Values are coerced leniently, only a missing
    /// or malformed header is an error.
    pub fn parse<S, R>(sheet_data: impl IntoIterator<Item = R>) -> Res<Self>
    where
        S: Into<String>,
        R: IntoIterator<Item = S>,
    {
        let mut rows = sheet_data.into_iter();
        let mapping = match rows.next() {
            Some(header_row) => Mapping::new(header_row, PROJECT_HEADERS)
                .context("The projects tab has a malformed header")?,
            None => bail!("The projects tab is empty, it needs at least a header row"),
        };

        let data = rows
            .map(|row| row.into_iter().map(Into::into).collect::<Vec<String>>())
            .filter(|values| values.iter().any(|v| !v.trim().is_empty()))
            .map(|values| Project::from_values(&values))
            .collect();

        Ok(Self { mapping, data })
    }

    pub fn data(&self) -> &[Project] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.data.iter().find(|p| p.id == id)
    }

    /// The id the next registered project should receive.
    ///
    /// Every non-digit is stripped from each existing id and the largest number plus one is used,
    /// zero-padded to three digits. If any id has no usable number, the count of projects plus one
    /// is used instead.
    pub fn next_id(&self) -> String {
        if self.data.is_empty() {
            return pad_id(1);
        }
        let max = self
            .data
            .iter()
            .map(|p| digits(&p.id).parse::<u64>().ok())
            .collect::<Option<Vec<u64>>>()
            .and_then(|ids| ids.into_iter().max())
            .and_then(|max| max.checked_add(1));
        pad_id(max.unwrap_or(self.data.len() as u64 + 1))
    }
}

fn digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn pad_id(n: u64) -> String {
    format!("{n:03}")
}

/// Represents a single row from the projects tab.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Project {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) initial_budget: Option<Amount>,
    pub(crate) start_date: Option<NaiveDate>,
}

impl Project {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        initial_budget: Amount,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            initial_budget: Some(initial_budget),
            start_date: Some(start_date),
        }
    }

    fn from_values(values: &[String]) -> Self {
        let cell = |ix: usize| values.get(ix).map(String::as_str).unwrap_or_default();
        Self {
            id: cell(0).to_string(),
            name: cell(1).to_string(),
            initial_budget: coerce::amount(cell(2)),
            start_date: coerce::date(cell(3)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initial_budget(&self) -> Option<Amount> {
        self.initial_budget
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    /// The label used when choosing a project, e.g. `Casa Alpha (001)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }

    /// The row as it is appended to the projects tab.
    pub(crate) fn to_cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.id.clone()),
            Cell::Text(self.name.clone()),
            Cell::Number(self.initial_budget.unwrap_or_default().to_f64()),
            Cell::Text(
                self.start_date
                    .map(|d| d.format(ISO_DATE).to_string())
                    .unwrap_or_default(),
            ),
        ]
    }
}
