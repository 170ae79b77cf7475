//! These structs provide the CLI interface for the siteledger CLI.

use crate::Amount;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing::level_filters::LevelFilter;

/// siteledger: A command-line tool for tracking construction-project budgets.
///
/// Projects and their weekly expenses are kept in a Google spreadsheet with two tabs. This program
/// registers projects, records and corrects weekly expenses, and reports how much of each
/// project's budget has been spent.
///
/// The spreadsheet is accessed with a Google service account. Share the spreadsheet with the
/// service account's email address and run `siteledger init` with its key file.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration files.
    ///
    /// This is the first command you should run. You need two things beforehand:
    ///
    /// - The URL of the ledger spreadsheet, passed as --sheet-url. The spreadsheet needs a
    ///   projects tab with the headers id, name, initial_budget, start_date and an expenses tab
    ///   with the headers project_id, week_number, reference_date, amount.
    ///
    /// - A Google service-account key JSON file, passed as --service-account. The spreadsheet must
    ///   be shared with the service account's email address.
    Init(InitArgs),
    /// Register projects or list them.
    Project(ProjectArgs),
    /// Record, correct or list weekly expenses.
    Expense(ExpenseArgs),
    /// Show the budget, total spent and remaining budget of every project.
    Status,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber EnvFilter for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the configuration and service-account key are held. Defaults to
    /// ~/site-ledger
    #[arg(long, env = "SITE_LEDGER_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// (Not shown): Args for the `siteledger init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL to your ledger spreadsheet. It looks like this:
    /// https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    #[arg(long)]
    sheet_url: String,

    /// The path to your downloaded service-account key. This file will be copied to the default
    /// secrets location in the main data directory.
    #[arg(long)]
    service_account: PathBuf,
}

impl InitArgs {
    pub fn new(sheet_url: impl Into<String>, service_account: impl Into<PathBuf>) -> Self {
        Self {
            sheet_url: sheet_url.into(),
            service_account: service_account.into(),
        }
    }

    pub fn sheet_url(&self) -> &str {
        &self.sheet_url
    }

    pub fn service_account(&self) -> &Path {
        &self.service_account
    }
}

/// (Not shown): Args for the `siteledger project` command.
#[derive(Debug, Parser, Clone)]
pub struct ProjectArgs {
    #[command(subcommand)]
    command: ProjectCommand,
}

impl ProjectArgs {
    pub fn new(command: ProjectCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &ProjectCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProjectCommand {
    /// Register a new project. Its id is assigned automatically.
    Add(ProjectAddArgs),
    /// List every project and the id the next project will receive.
    List,
}

/// (Not shown): Args for the `siteledger project add` command.
#[derive(Debug, Parser, Clone)]
pub struct ProjectAddArgs {
    /// The project name.
    #[arg(long)]
    name: String,

    /// The initial budget, e.g. 150000, 150.000,00 or "R$ 150.000,00". Must be greater than zero.
    #[arg(long, allow_hyphen_values = true)]
    budget: Amount,

    /// The start date as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    start_date: Option<NaiveDate>,
}

impl ProjectAddArgs {
    pub fn new(name: impl Into<String>, budget: Amount, start_date: Option<NaiveDate>) -> Self {
        Self {
            name: name.into(),
            budget,
            start_date,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn budget(&self) -> Amount {
        self.budget
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }
}

/// (Not shown): Args for the `siteledger expense` command.
#[derive(Debug, Parser, Clone)]
pub struct ExpenseArgs {
    #[command(subcommand)]
    command: ExpenseCommand,
}

impl ExpenseArgs {
    pub fn new(command: ExpenseCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &ExpenseCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ExpenseCommand {
    /// Record the next week's expense for a project. The week number is assigned automatically.
    Add(ExpenseAddArgs),
    /// Correct the amount and date of an already recorded week.
    Update(ExpenseUpdateArgs),
    /// Show the expense history of a project, most recent week first.
    List(ExpenseListArgs),
}

/// (Not shown): Args for the `siteledger expense add` command.
#[derive(Debug, Parser, Clone)]
pub struct ExpenseAddArgs {
    /// The id of the project, e.g. 001.
    #[arg(long)]
    project_id: String,

    /// The amount spent in the week. Must be greater than zero.
    #[arg(long, allow_hyphen_values = true)]
    amount: Amount,

    /// The reference date of the week as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl ExpenseAddArgs {
    pub fn new(project_id: impl Into<String>, amount: Amount, date: Option<NaiveDate>) -> Self {
        Self {
            project_id: project_id.into(),
            amount,
            date,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

/// (Not shown): Args for the `siteledger expense update` command.
#[derive(Debug, Parser, Clone)]
pub struct ExpenseUpdateArgs {
    /// The id of the project, exactly as it appears in the spreadsheet, e.g. 001.
    #[arg(long)]
    project_id: String,

    /// The week number to correct.
    #[arg(long)]
    week: u32,

    /// The corrected amount. Zero is allowed, negative amounts are not.
    #[arg(long, allow_hyphen_values = true)]
    amount: Amount,

    /// The corrected reference date as YYYY-MM-DD. Defaults to the week's current date.
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl ExpenseUpdateArgs {
    pub fn new(
        project_id: impl Into<String>,
        week: u32,
        amount: Amount,
        date: Option<NaiveDate>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            week,
            amount,
            date,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

/// (Not shown): Args for the `siteledger expense list` command.
#[derive(Debug, Parser, Clone)]
pub struct ExpenseListArgs {
    /// The id of the project, e.g. 001.
    #[arg(long)]
    project_id: String,
}

impl ExpenseListArgs {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("site-ledger"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or SITE_LEDGER_HOME instead of relying on the default \
                home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("site-ledger")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("siteledger").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_expense_update_args() {
        let args = parse(&[
            "--home",
            "/tmp/ledger",
            "expense",
            "update",
            "--project-id",
            "001",
            "--week",
            "3",
            "--amount",
            "R$ 1.234,56",
            "--date",
            "2025-01-21",
        ]);
        assert_eq!(args.common().home().path(), Path::new("/tmp/ledger"));
        let Command::Expense(expense) = args.command() else {
            panic!("expected the expense command");
        };
        let ExpenseCommand::Update(update) = expense.command() else {
            panic!("expected the update subcommand");
        };
        assert_eq!(update.project_id(), "001");
        assert_eq!(update.week(), 3);
        assert_eq!(update.amount(), Amount::from_str("1234.56").unwrap());
        assert_eq!(update.date(), NaiveDate::from_ymd_opt(2025, 1, 21));
    }

    #[test]
    fn test_negative_amount_reaches_validation() {
        let args = parse(&["expense", "add", "--project-id", "001", "--amount", "-10"]);
        let Command::Expense(expense) = args.command() else {
            panic!("expected the expense command");
        };
        let ExpenseCommand::Add(add) = expense.command() else {
            panic!("expected the add subcommand");
        };
        assert!(add.amount().is_negative());
        assert_eq!(add.date(), None);
    }

    #[test]
    fn test_bad_amount_is_rejected() {
        let result = Args::try_parse_from([
            "siteledger",
            "project",
            "add",
            "--name",
            "Casa",
            "--budget",
            "lots",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_level() {
        let args = parse(&["--log-level", "debug", "status"]);
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        assert!(matches!(args.command(), Command::Status));
    }
}
