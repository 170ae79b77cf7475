//! Access to the ledger spreadsheet.
//!
//! The `Sheet` trait is the raw boundary: rows of cell text in, typed cells out. `GoogleSheet`
//! implements it against the Google Sheets API and `TestSheet` implements it in memory. The
//! `Gateway` sits on top of a `Sheet` and speaks in terms of projects and expenses.

mod credentials;
mod gateway;
mod google;
mod test_sheet;

use crate::error::{IntoResult, Res};
use crate::{Config, ErrorType, Result};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use tracing::debug;

pub(crate) use credentials::TokenProvider;
pub(crate) use gateway::Gateway;
pub(crate) use test_sheet::TestSheet;
#[cfg(test)]
pub(crate) use test_sheet::TestSheetState;

/// Scope required for reading and writing spreadsheet values with a service account.
const SHEETS_SCOPES: &[&str] = &["https://www.googleapis.com/auth/spreadsheets"];

/// The default name of the tab that holds projects.
pub(crate) const PROJECTS: &str = "Projects";

/// The default name of the tab that holds weekly expenses.
pub(crate) const EXPENSES: &str = "Expenses";

/// Set this environment variable to any non-empty value to run against the in-memory `TestSheet`
/// instead of Google.
const TEST_MODE_ENV: &str = "SITE_LEDGER_IN_TEST_MODE";

/// Chooses the `Sheet` implementation.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Google,
    Test,
}

impl Mode {
    /// `Mode::Test` when `SITE_LEDGER_IN_TEST_MODE` is set and non-empty, otherwise
    /// `Mode::Google`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Google,
        }
    }
}

/// A value written to a spreadsheet cell. Serializes to its native JSON type so that the sheet
/// stores numbers as numbers and text as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub(crate) enum Cell {
    Text(String),
    Int(i64),
    Number(f64),
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Int(n) => write!(f, "{n}"),
            Cell::Number(n) => write!(f, "{n}"),
        }
    }
}

/// The raw spreadsheet operations the ledger needs.
#[async_trait::async_trait]
pub(crate) trait Sheet {
    /// Returns every row of `tab` as formatted cell text, header row included. Trailing empty
    /// cells may be missing from a row.
    async fn get(&mut self, tab: &str) -> Res<Vec<Vec<String>>>;

    /// Appends `cells` as a new row after the last row of `tab`.
    async fn append_row(&mut self, tab: &str, cells: &[Cell]) -> Res<()>;

    /// Overwrites the one-based `row` of `tab`, starting at column A, with `cells`.
    async fn write_row(&mut self, tab: &str, row: usize, cells: &[Cell]) -> Res<()>;
}

/// Creates the `Gateway` for `config`. In `Mode::Google` this loads the service-account key and
/// obtains a first access token, so a broken credential is reported here as an `Auth` error.
pub(crate) async fn gateway(config: &Config, mode: Mode) -> Result<Gateway> {
    let sheet: Box<dyn Sheet + Send> = match mode {
        Mode::Google => {
            let token_provider = TokenProvider::load(&config.service_account_path())
                .await
                .pub_result(ErrorType::Auth)?;
            token_provider.token().await.pub_result(ErrorType::Auth)?;
            Box::new(google::GoogleSheet::new(
                config.spreadsheet_id(),
                token_provider,
            ))
        }
        Mode::Test => {
            debug!("Using the in-memory test sheet");
            Box::new(TestSheet::seeded(config.projects_tab(), config.expenses_tab()))
        }
    };
    Ok(Gateway::new(
        sheet,
        config.projects_tab(),
        config.expenses_tab(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_json_native_types() {
        let row = vec![
            Cell::Text("001".into()),
            Cell::Int(3),
            Cell::Text("2025-01-20".into()),
            Cell::Number(750.5),
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"["001",3,"2025-01-20",750.5]"#);
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Text("001".into()).to_string(), "001");
        assert_eq!(Cell::Int(4).to_string(), "4");
        assert_eq!(Cell::Number(750.0).to_string(), "750");
        assert_eq!(Cell::Number(12.25).to_string(), "12.25");
    }

    #[tokio::test]
    async fn test_gateway_test_mode_does_not_need_credentials() {
        let env = crate::test::TestEnv::new().await;
        let mut gateway = gateway(&env.config(), Mode::Test).await.unwrap();
        let dataset = gateway.fetch_dataset().await.unwrap();
        assert!(!dataset.projects().is_empty());
    }

    #[tokio::test]
    async fn test_gateway_google_mode_bad_key_is_auth_error() {
        let env = crate::test::TestEnv::new().await;
        crate::utils::write(env.config().service_account_path(), "{}")
            .await
            .unwrap();
        let err = gateway(&env.config(), Mode::Google).await.err().unwrap();
        assert_eq!(err.error_type(), ErrorType::Auth);
    }
}
