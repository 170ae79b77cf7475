use crate::api::Sheet;
use crate::error::Res;
use crate::model::{
    Dataset, Expenses, Project, Projects, WeeklyExpense, PROJECT_ID_COL, WEEK_NUMBER_COL,
};
use tracing::debug;

/// Reads and writes projects and expenses through a dynamically-dispatched `Sheet`.
pub(crate) struct Gateway {
    sheet: Box<dyn Sheet + Send>,
    projects_tab: String,
    expenses_tab: String,
}

impl Gateway {
    pub(crate) fn new(
        sheet: Box<dyn Sheet + Send>,
        projects_tab: impl Into<String>,
        expenses_tab: impl Into<String>,
    ) -> Self {
        Self {
            sheet,
            projects_tab: projects_tab.into(),
            expenses_tab: expenses_tab.into(),
        }
    }

    /// Fetches and parses both tabs. Fails if either tab is missing or has a malformed header.
    pub(crate) async fn fetch_dataset(&mut self) -> Res<Dataset> {
        let projects = Projects::parse(self.sheet.get(&self.projects_tab).await?)?;
        let expenses = Expenses::parse(self.sheet.get(&self.expenses_tab).await?)?;
        debug!(
            "Fetched {} projects and {} expenses",
            projects.len(),
            expenses.len()
        );
        Ok(Dataset { projects, expenses })
    }

    pub(crate) async fn append_project(&mut self, project: &Project) -> Res<()> {
        self.sheet
            .append_row(&self.projects_tab, &project.to_cells())
            .await
    }

    pub(crate) async fn append_expense(&mut self, expense: &WeeklyExpense) -> Res<()> {
        self.sheet
            .append_row(&self.expenses_tab, &expense.to_cells())
            .await
    }

    /// Finds the first expense whose raw project id and week number cells equal `project_id` and
    /// `week_number`, returning its one-based sheet row and its cells. The tab is read directly,
    /// not from a cached copy, and compared as text. This is a linear scan over the whole tab.
    pub(crate) async fn find_expense_row(
        &mut self,
        project_id: &str,
        week_number: u32,
    ) -> Res<Option<(usize, Vec<String>)>> {
        fn cell(row: &[String], ix: usize) -> &str {
            row.get(ix).map(String::as_str).unwrap_or_default()
        }

        let rows = self.sheet.get(&self.expenses_tab).await?;
        let week = week_number.to_string();
        let found = rows.into_iter().enumerate().skip(1).find(|(_, row)| {
            cell(row, PROJECT_ID_COL) == project_id && cell(row, WEEK_NUMBER_COL) == week
        });
        // sheet rows are one-based
        Ok(found.map(|(ix, row)| (ix + 1, row)))
    }

    /// Overwrites the one-based sheet `row` of the expenses tab with `expense`.
    pub(crate) async fn write_expense(&mut self, row: usize, expense: &WeeklyExpense) -> Res<()> {
        self.sheet
            .write_row(&self.expenses_tab, row, &expense.to_cells())
            .await
    }
}
