use crate::commands::{fmt_date, render_table, Align, Out};
use crate::ledger::today;
use crate::model::{Amount, Project, WeeklyExpense};
use crate::{Ledger, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One project's expenses, most recent week first, and the week the next expense will get.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExpenseHistory {
    pub project: Project,
    pub expenses: Vec<WeeklyExpense>,
    pub next_week: u32,
}

/// Records the next week's expense for `project_id`. `date` defaults to today.
pub async fn expense_add(
    ledger: &mut Ledger,
    project_id: &str,
    amount: Amount,
    date: Option<NaiveDate>,
) -> Result<Out<WeeklyExpense>> {
    let date = date.unwrap_or_else(today);
    let expense = ledger.create_expense(project_id, amount, date).await?;
    Ok(Out::new(
        format!(
            "Recorded week {} for project {}: {amount}",
            expense.week_number(),
            expense.project_id()
        ),
        expense,
    ))
}

/// Corrects the amount, and optionally the date, of an existing week.
pub async fn expense_update(
    ledger: &mut Ledger,
    project_id: &str,
    week: u32,
    amount: Amount,
    date: Option<NaiveDate>,
) -> Result<Out<WeeklyExpense>> {
    let expense = ledger
        .update_expense(project_id, week, amount, date)
        .await?;
    Ok(Out::new(
        format!(
            "Updated week {week} for project {project_id}: {amount} on {}",
            fmt_date(expense.reference_date())
        ),
        expense,
    ))
}

/// Shows the expense history of `project_id`.
pub async fn expense_list(ledger: &mut Ledger, project_id: &str) -> Result<Out<ExpenseHistory>> {
    let dataset = ledger.dataset().await;
    let project = ledger.require_project(&dataset, project_id)?.clone();
    let expenses = dataset.expenses().history(project_id);
    let next_week = dataset.expenses().next_week(project_id);

    let rows: Vec<Vec<String>> = expenses
        .iter()
        .map(|e| {
            vec![
                e.week_number().to_string(),
                fmt_date(e.reference_date()),
                e.amount().map(|a| a.to_string()).unwrap_or_default(),
                e.project_id().to_string(),
            ]
        })
        .collect();
    let table = render_table(
        &[
            ("week", Align::Right),
            ("reference date", Align::Left),
            ("amount", Align::Right),
            ("project", Align::Left),
        ],
        &rows,
    );

    let total: Amount = expenses.iter().filter_map(WeeklyExpense::amount).sum();
    let message = format!(
        "{}: {} week(s) totalling {}, the next expense will be week {next_week}",
        project.label(),
        expenses.len(),
        total.round_cents()
    );
    Ok(Out::new(
        message,
        ExpenseHistory {
            project,
            expenses,
            next_week,
        },
    )
    .with_table(table))
}
