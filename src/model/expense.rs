use crate::api::Cell;
use crate::error::Res;
use crate::model::coerce::{self, ISO_DATE};
use crate::model::mapping::Mapping;
use crate::model::Amount;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The leading headers of the expenses tab, in order.
pub const EXPENSE_HEADERS: &[&str] = &["project_id", "week_number", "reference_date", "amount"];

/// The zero-based column positions of the key fields in the expenses tab.
pub(crate) const PROJECT_ID_COL: usize = 0;
pub(crate) const WEEK_NUMBER_COL: usize = 1;
pub(crate) const REFERENCE_DATE_COL: usize = 2;

/// The rows of the expenses tab.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Expenses {
    mapping: Mapping,
    data: Vec<WeeklyExpense>,
}

impl Expenses {
    /// Parses the raw tab values, header row first.
    pub fn parse<S, R>(sheet_data: impl IntoIterator<Item = R>) -> Res<Self>
    where
        S: Into<String>,
        R: IntoIterator<Item = S>,
    {
        let mut rows = sheet_data.into_iter();
        let mapping = match rows.next() {
            Some(header_row) => Mapping::new(header_row, EXPENSE_HEADERS)
                .context("The expenses tab has a malformed header")?,
            None => bail!("The expenses tab is empty, it needs at least a header row"),
        };

        let data = rows
            .map(|row| row.into_iter().map(Into::into).collect::<Vec<String>>())
            .filter(|values| values.iter().any(|v| !v.trim().is_empty()))
            .map(|values| WeeklyExpense::from_values(&values))
            .collect();

        Ok(Self { mapping, data })
    }

    pub fn data(&self) -> &[WeeklyExpense] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The expenses of one project, in sheet order.
    pub fn for_project<'a>(
        &'a self,
        project_id: &'a str,
    ) -> impl Iterator<Item = &'a WeeklyExpense> + 'a {
        self.data.iter().filter(move |e| e.project_id == project_id)
    }

    /// The expenses of one project sorted by week number, latest week first.
    pub fn history(&self, project_id: &str) -> Vec<WeeklyExpense> {
        let mut history: Vec<WeeklyExpense> = self.for_project(project_id).cloned().collect();
        history.sort_by(|a, b| b.week_number.cmp(&a.week_number));
        history
    }

    /// The week number the next expense of `project_id` should receive: one past the largest
    /// existing week, or `1` if the project has no expenses.
    pub fn next_week(&self, project_id: &str) -> u32 {
        self.for_project(project_id)
            .map(|e| e.week_number)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }
}

/// Represents a single row from the expenses tab.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WeeklyExpense {
    pub(crate) project_id: String,
    pub(crate) week_number: u32,
    pub(crate) reference_date: Option<NaiveDate>,
    pub(crate) amount: Option<Amount>,
}

impl WeeklyExpense {
    pub fn new(
        project_id: impl Into<String>,
        week_number: u32,
        reference_date: NaiveDate,
        amount: Amount,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            week_number,
            reference_date: Some(reference_date),
            amount: Some(amount),
        }
    }

    fn from_values(values: &[String]) -> Self {
        let cell = |ix: usize| values.get(ix).map(String::as_str).unwrap_or_default();
        Self {
            project_id: cell(PROJECT_ID_COL).to_string(),
            week_number: coerce::week(cell(WEEK_NUMBER_COL)),
            reference_date: coerce::date(cell(REFERENCE_DATE_COL)),
            amount: coerce::amount(cell(3)),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn week_number(&self) -> u32 {
        self.week_number
    }

    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.reference_date
    }

    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    /// The row as it is written to the expenses tab. Each field is sent with its native type: the
    /// project id as text (so `001` keeps its zeros), the week as an integer and the amount as a
    /// number.
    pub(crate) fn to_cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.project_id.clone()),
            Cell::Int(i64::from(self.week_number)),
            Cell::Text(
                self.reference_date
                    .map(|d| d.format(ISO_DATE).to_string())
                    .unwrap_or_default(),
            ),
            Cell::Number(self.amount.unwrap_or_default().to_f64()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn expenses(rows: &[[&str; 4]]) -> Expenses {
        let mut data = vec![EXPENSE_HEADERS.to_vec()];
        data.extend(rows.iter().map(|r| r.to_vec()));
        Expenses::parse(data).unwrap()
    }

    #[test]
    fn test_next_week_none() {
        let e = expenses(&[["002", "1", "2025-01-06", "100"]]);
        assert_eq!(e.next_week("001"), 1);
    }

    #[test]
    fn test_next_week_after_gap() {
        let e = expenses(&[
            ["001", "1", "2025-01-06", "100"],
            ["001", "2", "2025-01-13", "100"],
            ["001", "4", "2025-01-27", "100"],
            ["002", "9", "2025-01-27", "100"],
        ]);
        assert_eq!(e.next_week("001"), 5);
        assert_eq!(e.next_week("002"), 10);
    }

    #[test]
    fn test_next_week_tolerates_garbage_weeks() {
        let e = expenses(&[
            ["001", "abc", "2025-01-06", "100"],
            ["001", "", "2025-01-13", "100"],
        ]);
        assert_eq!(e.next_week("001"), 1);

        let e = expenses(&[
            ["001", "abc", "2025-01-06", "100"],
            ["001", "2", "2025-01-13", "100"],
        ]);
        assert_eq!(e.next_week("001"), 3);
    }

    #[test]
    fn test_history_sorted_latest_first() {
        let e = expenses(&[
            ["001", "1", "2025-01-06", "100"],
            ["002", "1", "2025-01-06", "100"],
            ["001", "3", "2025-01-20", "300"],
            ["001", "2", "2025-01-13", "200"],
        ]);
        let weeks: Vec<u32> = e.history("001").iter().map(|x| x.week_number()).collect();
        assert_eq!(weeks, vec![3, 2, 1]);
    }

    #[test]
    fn test_parse_coerces_values() {
        let e = expenses(&[
            ["001", "3", "2025-01-20", "R$ 1.200,50"],
            ["001", "4", "bad date", "lots"],
        ]);
        let first = &e.data()[0];
        assert_eq!(first.project_id(), "001");
        assert_eq!(first.week_number(), 3);
        assert_eq!(first.reference_date(), NaiveDate::from_ymd_opt(2025, 1, 20));
        assert_eq!(first.amount().unwrap().value(), Decimal::new(120050, 2));

        let second = &e.data()[1];
        assert!(second.reference_date().is_none());
        assert!(second.amount().is_none());
    }

    #[test]
    fn test_parse_bad_header() {
        let err = Expenses::parse(vec![vec!["Obra_ID", "Semana_Ref", "Data_Semana", "Gasto"]])
            .unwrap_err();
        assert!(format!("{err:#}").contains("malformed header"));
    }

    #[test]
    fn test_to_cells_native_types() {
        let e = WeeklyExpense::new(
            "001",
            3,
            NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            Amount::new(Decimal::from(750)),
        );
        assert_eq!(
            e.to_cells(),
            vec![
                Cell::Text("001".into()),
                Cell::Int(3),
                Cell::Text("2025-01-20".into()),
                Cell::Number(750.0),
            ]
        );
    }
}
