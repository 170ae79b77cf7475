//! Types that represent the ledger data model, such as `Project` and `WeeklyExpense`.
mod amount;
pub(crate) mod coerce;
mod expense;
mod mapping;
mod project;
mod row_col;
mod status;

pub use amount::{Amount, AmountError};
pub use expense::{Expenses, WeeklyExpense, EXPENSE_HEADERS};
pub(crate) use expense::{PROJECT_ID_COL, REFERENCE_DATE_COL, WEEK_NUMBER_COL};
pub use project::{Project, Projects, PROJECT_HEADERS};
pub use row_col::{column_letters, quote_tab, row_range, whole_tab, RowCol};
pub use status::{compute_status, StatusRow};

use serde::{Deserialize, Serialize};

/// Both tabs of the ledger spreadsheet, typed. An empty `Dataset` is what readers get when the
/// spreadsheet could not be loaded.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Dataset {
    pub(crate) projects: Projects,
    pub(crate) expenses: Expenses,
}

impl Dataset {
    pub fn projects(&self) -> &Projects {
        &self.projects
    }

    pub fn expenses(&self) -> &Expenses {
        &self.expenses
    }
}
