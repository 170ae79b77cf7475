//! Configuration file handling for site-ledger.
//!
//! The configuration file is stored at `$SITE_LEDGER_HOME/config.json` and contains the URL of the
//! ledger spreadsheet, the names of its tabs, the cache lifetime and, optionally, the location of
//! the service-account key.

use crate::api::{EXPENSES, PROJECTS};
use crate::error::{IntoResult, Res};
use crate::{utils, ErrorType, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "site-ledger";
const CONFIG_VERSION: u8 = 1;
const CACHE_TTL_SECONDS: u64 = 600;
const SECRETS: &str = ".secrets";
const SERVICE_ACCOUNT_JSON: &str = "service_account.json";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$SITE_LEDGER_HOME` and from there it loads `$SITE_LEDGER_HOME/config.json`. It
/// provides paths to other items that are either configurable or are expected in a certain
/// location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    spreadsheet_id: String,
}

impl Config {
    /// Creates the data directory, its subdirectories and:
    /// - Creates an initial `config.json` file using `sheet_url` along with default settings
    /// - Copies `service_account_file` into its default location in the data dir, readable only
    ///   by the owner.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/site-ledger`
    /// - `service_account_file` - The downloaded Google service-account key JSON.
    /// - `sheet_url` - The URL of the ledger spreadsheet, e.g.
    ///   https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    ///
    /// # Errors
    /// - Returns a `Config` error if the URL is not a spreadsheet URL or any file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        service_account_file: &Path,
        sheet_url: &str,
    ) -> Result<Self> {
        Self::create_inner(dir.into(), service_account_file, sheet_url)
            .await
            .pub_result(ErrorType::Config)
    }

    async fn create_inner(
        maybe_relative: PathBuf,
        service_account_file: &Path,
        sheet_url: &str,
    ) -> Res<Self> {
        // Fail before touching the disk if the URL is unusable.
        let spreadsheet_id = extract_spreadsheet_id(sheet_url)
            .context("Failed to extract the spreadsheet ID from the sheet URL")?;

        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the site-ledger home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;

        utils::copy_private(service_account_file, secrets.join(SERVICE_ACCOUNT_JSON))
            .await
            .context("Unable to store the service account key")?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            sheet_url: sheet_url.to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            secrets,
            config_path,
            config_file,
            spreadsheet_id,
        })
    }

    /// This will
    /// - validate that the home directory exists and that the config file exists
    /// - load the config file
    /// - validate that the secrets directory exists
    /// - return the loaded configuration object
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(maybe_relative: PathBuf) -> Res<Self> {
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The site-ledger home directory is missing, run 'siteledger init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let spreadsheet_id = extract_spreadsheet_id(&config_file.sheet_url)
            .context("Failed to extract the spreadsheet ID from the sheet URL")?;

        let secrets = root.join(SECRETS);
        if !secrets.is_dir() {
            bail!("The secrets directory is missing '{}'", secrets.display())
        }

        Ok(Self {
            root,
            secrets,
            config_path,
            config_file,
            spreadsheet_id,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn sheet_url(&self) -> &str {
        &self.config_file.sheet_url
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn projects_tab(&self) -> &str {
        &self.config_file.projects_tab
    }

    pub fn expenses_tab(&self) -> &str {
        &self.config_file.expenses_tab
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.config_file.cache_ttl_seconds)
    }

    /// Returns the stored `service_account_path` if it is absolute, otherwise resolves it relative
    /// to the home directory.
    pub fn service_account_path(&self) -> PathBuf {
        let p = self.config_file.service_account_path();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "site-ledger",
///   "config_version": 1,
///   "sheet_url": "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL",
///   "projects_tab": "Projects",
///   "expenses_tab": "Expenses",
///   "cache_ttl_seconds": 600,
///   "service_account_path": ".secrets/service_account.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "site-ledger"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// URL to the ledger spreadsheet
    sheet_url: String,

    /// Name of the tab holding projects
    #[serde(default = "default_projects_tab")]
    projects_tab: String,

    /// Name of the tab holding weekly expenses
    #[serde(default = "default_expenses_tab")]
    expenses_tab: String,

    /// How long a fetched copy of the spreadsheet is reused before it is fetched again
    #[serde(default = "default_cache_ttl_seconds")]
    cache_ttl_seconds: u64,

    /// Path to the service-account key (optional, relative to the home directory or absolute)
    /// Defaults to $SITE_LEDGER_HOME/.secrets/service_account.json if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    service_account_path: Option<PathBuf>,
}

fn default_projects_tab() -> String {
    PROJECTS.to_string()
}

fn default_expenses_tab() -> String {
    EXPENSES.to_string()
}

fn default_cache_ttl_seconds() -> u64 {
    CACHE_TTL_SECONDS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            sheet_url: String::new(),
            projects_tab: default_projects_tab(),
            expenses_tab: default_expenses_tab(),
            cache_ttl_seconds: CACHE_TTL_SECONDS,
            service_account_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from `path` and checks its `app_name`.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .context("Unable to load the config file")?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to `path` as pretty-printed JSON.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Gets the service-account key path, which may be relative to the home directory.
    fn service_account_path(&self) -> PathBuf {
        self.service_account_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(SERVICE_ACCOUNT_JSON))
    }
}

/// Extracts the spreadsheet ID from a Google Sheets URL, i.e. the path segment that follows `d`
/// in `https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/edit#gid=0`.
fn extract_spreadsheet_id(sheet_url: &str) -> Res<String> {
    let url = Url::parse(sheet_url).with_context(|| format!("'{sheet_url}' is not a URL"))?;
    let mut segments = url.path_segments().into_iter().flatten();
    while let Some(segment) = segments.next() {
        if segment == "d" {
            if let Some(id) = segments.next().filter(|id| !id.is_empty()) {
                return Ok(id.to_string());
            }
        }
    }
    bail!(
        "Invalid Google Sheets URL format. Expected: \
        https://docs.google.com/spreadsheets/d/SPREADSHEET_ID"
    )
}
