//! The `Ledger` performs every operation against the spreadsheet: registering projects, recording
//! and correcting weekly expenses, and computing the budget status.

use crate::api::{self, Gateway, Mode};
use crate::cache::DatasetCache;
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{
    coerce, compute_status, Amount, Dataset, Project, StatusRow, WeeklyExpense,
    REFERENCE_DATE_COL,
};
use crate::{Config, Result};
use anyhow::Context;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// An open connection to the ledger spreadsheet together with its read cache.
pub struct Ledger {
    gateway: Gateway,
    cache: DatasetCache,
}

impl Ledger {
    /// Connects to the spreadsheet described by `config`. In `Mode::Google` the service-account
    /// credential is loaded and checked here, so a bad credential halts the command with an
    /// `Auth` error before anything is read.
    pub async fn open(config: &Config, mode: Mode) -> Result<Self> {
        let gateway = api::gateway(config, mode).await?;
        Ok(Self::new(gateway, config.cache_ttl()))
    }

    pub(crate) fn new(gateway: Gateway, ttl: Duration) -> Self {
        Self {
            gateway,
            cache: DatasetCache::new(ttl),
        }
    }

    /// Both tabs, from the cache when it is fresh. Never fails; see `DatasetCache::load`.
    pub async fn dataset(&mut self) -> Arc<Dataset> {
        self.cache.load(&mut self.gateway).await
    }

    /// True when the last attempt to read the spreadsheet failed.
    pub fn last_load_failed(&self) -> bool {
        self.cache.last_load_failed()
    }

    /// Registers a new project with the next free id.
    pub async fn create_project(
        &mut self,
        name: &str,
        initial_budget: Amount,
        start_date: NaiveDate,
    ) -> Result<Project> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::msg(
                ErrorType::Validation,
                "The project name must not be empty",
            ));
        }
        if !initial_budget.is_positive() {
            return Err(Error::msg(
                ErrorType::Validation,
                format!("The initial budget must be greater than zero, got {initial_budget}"),
            ));
        }

        let dataset = self.dataset().await;
        if self.last_load_failed() {
            // Without the existing projects the next id would collide with one already in use.
            return Err(Error::msg(
                ErrorType::Fetch,
                "The projects tab could not be read, so no id can be assigned",
            ));
        }

        let id = dataset.projects().next_id();
        let project = Project::new(id, name, initial_budget, start_date);
        debug!("Appending project {project:?}");
        self.gateway
            .append_project(&project)
            .await
            .with_context(|| format!("Unable to register the project {}", project.label()))
            .pub_result(ErrorType::Write)?;
        self.cache.invalidate();
        info!("Registered project {}", project.label());
        Ok(project)
    }

    /// Records the next week's expense for `project_id`.
    pub async fn create_expense(
        &mut self,
        project_id: &str,
        amount: Amount,
        reference_date: NaiveDate,
    ) -> Result<WeeklyExpense> {
        if !amount.is_positive() {
            return Err(Error::msg(
                ErrorType::Validation,
                format!("The expense amount must be greater than zero, got {amount}"),
            ));
        }

        let dataset = self.dataset().await;
        self.require_project(&dataset, project_id)?;

        let week_number = dataset.expenses().next_week(project_id);
        let expense = WeeklyExpense::new(project_id, week_number, reference_date, amount);
        debug!("Appending expense {expense:?}");
        self.gateway
            .append_expense(&expense)
            .await
            .with_context(|| {
                format!("Unable to record week {week_number} for project {project_id}")
            })
            .pub_result(ErrorType::Write)?;
        self.cache.invalidate();
        info!("Recorded week {week_number} for project {project_id}: {amount}");
        Ok(expense)
    }

    /// Overwrites the amount and reference date of an existing expense, identified by
    /// `project_id` and `week_number`.
    ///
    /// When `reference_date` is `None` the expense keeps the date currently stored in its row. A row
    /// whose date is missing or unreadable is refused with a `Validation` error.
    pub async fn update_expense(
        &mut self,
        project_id: &str,
        week_number: u32,
        amount: Amount,
        reference_date: Option<NaiveDate>,
    ) -> Result<WeeklyExpense> {
        if amount.is_negative() {
            return Err(Error::msg(
                ErrorType::Validation,
                format!("The expense amount must not be negative, got {amount}"),
            ));
        }

        let (row, cells) = self
            .gateway
            .find_expense_row(project_id, week_number)
            .await
            .context("Unable to read the expenses tab")
            .pub_result(ErrorType::Fetch)?
            .ok_or_else(|| {
                Error::msg(
                    ErrorType::NotFound,
                    format!("There is no week {week_number} for project {project_id}"),
                )
            })?;

        let reference_date = match reference_date {
            Some(date) => date,
            None => cells
                .get(REFERENCE_DATE_COL)
                .and_then(|cell| coerce::date(cell))
                .ok_or_else(|| {
                    Error::msg(
                        ErrorType::Validation,
                        format!(
                            "Week {week_number} of project {project_id} has no readable reference \
                             date, pass --date"
                        ),
                    )
                })?,
        };

        let expense = WeeklyExpense::new(project_id, week_number, reference_date, amount);
        debug!("Writing {expense:?} to row {row}");
        self.gateway
            .write_expense(row, &expense)
            .await
            .with_context(|| format!("Unable to update week {week_number} for project {project_id}"))
            .pub_result(ErrorType::Write)?;
        self.cache.invalidate();
        info!("Updated week {week_number} for project {project_id}: {amount}");
        Ok(expense)
    }

    /// One status row per project.
    pub async fn status(&mut self) -> Vec<StatusRow> {
        let dataset = self.dataset().await;
        compute_status(&dataset)
    }

    /// Checks that `project_id` is a known project. When the dataset could not be loaded at all
    /// the problem is reported as a `Fetch` error, since the project may well exist.
    pub(crate) fn require_project<'a>(
        &self,
        dataset: &'a Dataset,
        project_id: &str,
    ) -> Result<&'a Project> {
        match dataset.projects().get(project_id) {
            Some(project) => Ok(project),
            None if self.last_load_failed() => Err(Error::msg(
                ErrorType::Fetch,
                format!("The spreadsheet could not be read, unable to look up project {project_id}"),
            )),
            None => Err(Error::msg(
                ErrorType::Validation,
                format!("There is no project with id '{project_id}'"),
            )),
        }
    }
}

/// Today's date in the local time zone.
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestSheet;
    use crate::test::TestEnv;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reject_writes(env: &TestEnv) {
        let mut state = env.state();
        state.reject_writes = true;
        env.set_state(state);
    }

    #[tokio::test]
    async fn test_create_project_assigns_next_id() {
        let env = TestEnv::new().await;
        let mut ledger = env.ledger();
        let project = ledger
            .create_project("  Ponte Norte ", amount("75.000,00"), date(2025, 4, 7))
            .await
            .unwrap();
        assert_eq!(project.id(), "004");
        assert_eq!(project.name(), "Ponte Norte");

        let state = env.state();
        assert_eq!(
            state.tabs["Projects"][4],
            vec!["004", "Ponte Norte", "75000", "2025-04-07"]
        );
        assert_eq!(state.writes, 1);

        // The cache was invalidated, so the new project is visible.
        assert_eq!(ledger.dataset().await.projects().len(), 4);
    }

    #[tokio::test]
    async fn test_create_project_rejections_never_write() {
        let env = TestEnv::new().await;
        let mut ledger = env.ledger();

        let err = ledger
            .create_project("   ", amount("100"), date(2025, 4, 7))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);

        let err = ledger
            .create_project("Ponte", Amount::ZERO, date(2025, 4, 7))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);

        let err = ledger
            .create_project("Ponte", amount("-1"), date(2025, 4, 7))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);

        assert_eq!(env.state().writes, 0);
    }

    #[tokio::test]
    async fn test_create_project_refused_when_load_fails() {
        let env = TestEnv::new().await;
        let mut state = env.state();
        state.tabs.remove("Projects");
        env.set_state(state);

        let mut ledger = env.ledger();
        let err = ledger
            .create_project("Ponte", amount("100"), date(2025, 4, 7))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Fetch);
        assert_eq!(env.state().writes, 0);
    }

    #[tokio::test]
    async fn test_create_expense_assigns_next_week() {
        let env = TestEnv::new().await;
        let mut ledger = env.ledger();
        let expense = ledger
            .create_expense("001", amount("R$ 450,75"), date(2025, 1, 27))
            .await
            .unwrap();
        assert_eq!(expense.week_number(), 4);

        let expense = ledger
            .create_expense("003", amount("100"), date(2025, 3, 10))
            .await
            .unwrap();
        assert_eq!(expense.week_number(), 1);

        let state = env.state();
        let rows = &state.tabs["Expenses"];
        assert_eq!(rows[6], vec!["001", "4", "2025-01-27", "450.75"]);
        assert_eq!(rows[7], vec!["003", "1", "2025-03-10", "100"]);
    }

    #[tokio::test]
    async fn test_create_expense_rejections_never_write() {
        let env = TestEnv::new().await;
        let mut ledger = env.ledger();

        for bad in ["0", "-10"] {
            let err = ledger
                .create_expense("001", amount(bad), date(2025, 1, 27))
                .await
                .unwrap_err();
            assert_eq!(err.error_type(), ErrorType::Validation);
        }

        let err = ledger
            .create_expense("999", amount("10"), date(2025, 1, 27))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);

        assert_eq!(env.state().writes, 0);
    }

    #[tokio::test]
    async fn test_create_expense_unknown_project_when_load_fails_is_fetch_error() {
        let env = TestEnv::new().await;
        let mut state = env.state();
        state.tabs.remove("Expenses");
        env.set_state(state);

        let mut ledger = env.ledger();
        let err = ledger
            .create_expense("001", amount("10"), date(2025, 1, 27))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Fetch);
    }

    #[tokio::test]
    async fn test_update_expense_mutates_exactly_one_row() {
        let env = TestEnv::new().await;
        let mut ledger = env.ledger();
        let before = env.state().tabs["Expenses"].clone();

        ledger
            .update_expense("001", 3, amount("750"), Some(date(2025, 1, 21)))
            .await
            .unwrap();

        let after = env.state().tabs["Expenses"].clone();
        assert_eq!(before.len(), after.len());
        let changed: Vec<usize> = (0..after.len()).filter(|&i| before[i] != after[i]).collect();
        assert_eq!(changed, vec![3]);
        assert_eq!(after[3], vec!["001", "3", "2025-01-21", "750"]);

        let status = ledger.status().await;
        let casa = status.iter().find(|r| r.project_id() == "001").unwrap();
        assert_eq!(casa.total_spent(), Amount::new(Decimal::from(1550)));
        assert_eq!(casa.remaining(), Amount::new(Decimal::from(8450)));
    }

    #[tokio::test]
    async fn test_update_expense_keeps_date_when_omitted() {
        let env = TestEnv::new().await;
        let mut ledger = env.ledger();
        let expense = ledger
            .update_expense("001", 2, amount("0"), None)
            .await
            .unwrap();
        assert_eq!(expense.reference_date(), Some(date(2025, 1, 13)));
        assert_eq!(
            env.state().tabs["Expenses"][2],
            vec!["001", "2", "2025-01-13", "0"]
        );
    }

    #[tokio::test]
    async fn test_update_expense_keeps_date_when_projects_tab_is_unreadable() {
        let env = TestEnv::new().await;
        let mut state = env.state();
        state.tabs.get_mut("Projects").unwrap()[0] = vec!["wrong".into(), "headers".into()];
        env.set_state(state);

        let mut ledger = env.ledger();
        let expense = ledger
            .update_expense("001", 2, amount("300"), None)
            .await
            .unwrap();
        assert_eq!(expense.reference_date(), Some(date(2025, 1, 13)));
        assert_eq!(
            env.state().tabs["Expenses"][2],
            vec!["001", "2", "2025-01-13", "300"]
        );
    }

    #[tokio::test]
    async fn test_update_expense_without_readable_date_is_refused() {
        let env = TestEnv::new().await;
        let mut state = env.state();
        state.tabs.get_mut("Expenses").unwrap()[2][2] = "not a date".into();
        env.set_state(state);
        let before = env.state().tabs.clone();

        let mut ledger = env.ledger();
        let err = ledger
            .update_expense("001", 2, amount("300"), None)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert_eq!(env.state().tabs, before);
        assert_eq!(env.state().writes, 0);

        // An explicit date still corrects the row.
        ledger
            .update_expense("001", 2, amount("300"), Some(date(2025, 1, 14)))
            .await
            .unwrap();
        assert_eq!(
            env.state().tabs["Expenses"][2],
            vec!["001", "2", "2025-01-14", "300"]
        );
    }

    #[tokio::test]
    async fn test_update_missing_expense_is_not_found() {
        let env = TestEnv::new().await;
        let mut ledger = env.ledger();
        let before = env.state().tabs.clone();

        let err = ledger
            .update_expense("001", 9, amount("1"), Some(date(2025, 1, 21)))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);
        // Week numbers are matched as text, so "1" is not "001".
        let err = ledger
            .update_expense("1", 1, amount("1"), Some(date(2025, 1, 21)))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);

        assert_eq!(env.state().tabs, before);
        assert_eq!(env.state().writes, 0);
    }

    #[tokio::test]
    async fn test_update_negative_amount_is_rejected() {
        let env = TestEnv::new().await;
        let mut ledger = env.ledger();
        let err = ledger
            .update_expense("001", 1, amount("-5"), None)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert_eq!(env.state().writes, 0);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_cache() {
        let env = TestEnv::new().await;
        let mut ledger = env.ledger();
        ledger.dataset().await;
        let reads = env.state().reads;
        reject_writes(&env);

        let err = ledger
            .create_expense("001", amount("10"), date(2025, 1, 27))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Write);

        let err = ledger
            .create_project("Ponte", amount("10"), date(2025, 1, 27))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Write);

        // Both creates were served from the cache and neither write invalidated it.
        ledger.dataset().await;
        assert_eq!(env.state().reads, reads);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_cache() {
        let env = TestEnv::new().await;
        let mut ledger = env.ledger();
        ledger.dataset().await;
        reject_writes(&env);
        let before = env.state().tabs.clone();

        let err = ledger
            .update_expense("001", 1, amount("10"), Some(date(2025, 1, 6)))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Write);
        assert_eq!(env.state().tabs, before);

        // The row lookup reads the tab itself. The cached dataset is still served afterwards.
        let reads = env.state().reads;
        ledger.dataset().await;
        assert_eq!(env.state().reads, reads);
    }

    #[tokio::test]
    async fn test_status() {
        let env = TestEnv::new().await;
        let mut ledger = env.ledger();
        let status = ledger.status().await;
        assert_eq!(status.len(), 3);
        assert_eq!(status[0].total_spent(), Amount::new(Decimal::from(2000)));
        assert_eq!(status[0].remaining(), Amount::new(Decimal::from(8000)));
        assert_eq!(status[2].total_spent(), Amount::ZERO);
        assert_eq!(status[2].remaining(), amount("18500.50"));
    }

    #[tokio::test]
    async fn test_status_after_failed_load_is_empty() {
        let sheet = TestSheet::seeded("Obras_Info", "Despesas_Semanas");
        let gateway = Gateway::new(Box::new(sheet), "Projects", "Expenses");
        let mut ledger = Ledger::new(gateway, DatasetCache::DEFAULT_TTL);
        assert!(ledger.status().await.is_empty());
        assert!(ledger.last_load_failed());
    }
}
