//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::{Gateway, TestSheet, TestSheetState};
use crate::{Config, Ledger};
use tempfile::TempDir;
use uuid::Uuid;

/// Test environment that sets up a site-ledger home directory with a Config and a seeded
/// `TestSheet`. Holds TempDir to keep the directory alive for the duration of the test.
pub(crate) struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
    sheet: TestSheet,
}

impl TestEnv {
    /// Creates a test environment with a Config and a `TestSheet` holding the seed data.
    pub(crate) async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("site-ledger");
        let key_path = temp_dir.path().join("service_account.json");

        // Never used to authenticate, the TestSheet does not need credentials.
        let key_content = r#"{
            "type": "service_account",
            "project_id": "test-project",
            "private_key_id": "test-key-id",
            "private_key": "dGVzdA==",
            "client_email": "ledger@test-project.iam.gserviceaccount.com",
            "client_id": "test-client-id",
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": "https://oauth2.googleapis.com/token"
        }"#;
        std::fs::write(&key_path, key_content).unwrap();

        let rand = Uuid::new_v4().to_string().replace('-', "");
        let sheet_url = format!("https://docs.google.com/spreadsheets/d/{}/edit", rand);
        let config = Config::create(&root, &key_path, &sheet_url).await.unwrap();
        let sheet = TestSheet::seeded(config.projects_tab(), config.expenses_tab());

        Self {
            _temp_dir: temp_dir,
            config,
            sheet,
        }
    }

    /// Returns a clone of the Config.
    pub(crate) fn config(&self) -> Config {
        self.config.clone()
    }

    /// A new `Ledger` working on this environment's `TestSheet`, with an empty cache.
    pub(crate) fn ledger(&self) -> Ledger {
        let gateway = Gateway::new(
            Box::new(self.sheet.clone()),
            self.config.projects_tab(),
            self.config.expenses_tab(),
        );
        Ledger::new(gateway, self.config.cache_ttl())
    }

    /// Gets the current state of the TestSheet associated with this environment.
    pub(crate) fn state(&self) -> TestSheetState {
        self.sheet.state()
    }

    /// Sets the state of the TestSheet associated with this environment.
    pub(crate) fn set_state(&self, state: TestSheetState) {
        self.sheet.set_state(state)
    }
}
