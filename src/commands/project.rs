use crate::commands::{fmt_date, render_table, Align, Out};
use crate::error::{Error, ErrorType};
use crate::ledger::today;
use crate::model::{Amount, Project};
use crate::{Ledger, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The projects in the spreadsheet and the id that the next registration will receive.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProjectList {
    pub projects: Vec<Project>,
    pub next_id: String,
}

/// Registers a project. `start_date` defaults to today.
pub async fn project_add(
    ledger: &mut Ledger,
    name: &str,
    initial_budget: Amount,
    start_date: Option<NaiveDate>,
) -> Result<Out<Project>> {
    let start_date = start_date.unwrap_or_else(today);
    let project = ledger
        .create_project(name, initial_budget, start_date)
        .await?;
    Ok(Out::new(
        format!(
            "Registered project {} with a budget of {}",
            project.label(),
            initial_budget
        ),
        project,
    ))
}

/// Lists every project.
pub async fn project_list(ledger: &mut Ledger) -> Result<Out<ProjectList>> {
    let dataset = ledger.dataset().await;
    if ledger.last_load_failed() {
        return Err(Error::msg(
            ErrorType::Fetch,
            "Unable to list projects, the spreadsheet could not be read",
        ));
    }

    let projects = dataset.projects();
    let rows: Vec<Vec<String>> = projects
        .data()
        .iter()
        .map(|p| {
            vec![
                p.label(),
                p.initial_budget()
                    .map(|b| b.to_string())
                    .unwrap_or_default(),
                fmt_date(p.start_date()),
            ]
        })
        .collect();
    let table = render_table(
        &[
            ("project", Align::Left),
            ("initial budget", Align::Right),
            ("start date", Align::Left),
        ],
        &rows,
    );

    let list = ProjectList {
        projects: projects.data().to_vec(),
        next_id: projects.next_id(),
    };
    Ok(Out::new(
        format!(
            "{} project(s), the next project will be {}",
            list.projects.len(),
            list.next_id
        ),
        list,
    )
    .with_table(table))
}
