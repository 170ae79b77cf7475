use crate::model::{Amount, Dataset};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One line of the financial status report.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StatusRow {
    pub(crate) project_id: String,
    pub(crate) name: String,
    pub(crate) initial_budget: Amount,
    pub(crate) total_spent: Amount,
    pub(crate) remaining: Amount,
    pub(crate) start_date: Option<NaiveDate>,
}

impl StatusRow {
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initial_budget(&self) -> Amount {
        self.initial_budget
    }

    pub fn total_spent(&self) -> Amount {
        self.total_spent
    }

    /// May be negative when the project is over budget.
    pub fn remaining(&self) -> Amount {
        self.remaining
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }
}

/// Computes one status row per project, in project order.
///
/// Expense totals are grouped by project id, missing amounts count as zero, and totals are
/// rounded to cents. Projects without expenses get a zero total. A missing initial budget is
/// treated as zero.
pub fn compute_status(dataset: &Dataset) -> Vec<StatusRow> {
    let mut totals: HashMap<&str, Amount> = HashMap::new();
    for expense in dataset.expenses.data() {
        let total = totals.entry(expense.project_id()).or_default();
        *total = *total + expense.amount().unwrap_or_default();
    }

    dataset
        .projects
        .data()
        .iter()
        .map(|project| {
            let initial_budget = project.initial_budget().unwrap_or_default();
            let total_spent = totals
                .get(project.id())
                .copied()
                .unwrap_or_default()
                .round_cents();
            StatusRow {
                project_id: project.id().to_string(),
                name: project.name().to_string(),
                initial_budget,
                total_spent,
                remaining: initial_budget - total_spent,
                start_date: project.start_date(),
            }
        })
        .collect()
}
