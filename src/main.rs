use clap::Parser;
use site_ledger::args::{Args, Command, ExpenseCommand, ProjectCommand};
use site_ledger::{commands, Config, Ledger, Mode, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) if e.error_type().is_warning() => {
            warn!("Nothing was written: {e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // This allows for testing the program without hitting the Google APIs. When
    // SITE_LEDGER_IN_TEST_MODE is set and non-zero in length, then the mode will be Mode::Test,
    // otherwise it will be Mode::Google.
    let mode = Mode::from_env();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.service_account(), init_args.sheet_url())
                .await?
                .print()
        }

        Command::Project(project_args) => {
            let mut ledger = open(home, mode).await?;
            match project_args.command() {
                ProjectCommand::Add(a) => {
                    commands::project_add(&mut ledger, a.name(), a.budget(), a.start_date())
                        .await?
                        .print()
                }
                ProjectCommand::List => commands::project_list(&mut ledger).await?.print(),
            }
        }

        Command::Expense(expense_args) => {
            let mut ledger = open(home, mode).await?;
            match expense_args.command() {
                ExpenseCommand::Add(a) => {
                    commands::expense_add(&mut ledger, a.project_id(), a.amount(), a.date())
                        .await?
                        .print()
                }
                ExpenseCommand::Update(a) => commands::expense_update(
                    &mut ledger,
                    a.project_id(),
                    a.week(),
                    a.amount(),
                    a.date(),
                )
                .await?
                .print(),
                ExpenseCommand::List(a) => commands::expense_list(&mut ledger, a.project_id())
                    .await?
                    .print(),
            }
        }

        Command::Status => {
            let mut ledger = open(home, mode).await?;
            commands::status(&mut ledger).await?.print()
        }
    };
    Ok(())
}

/// Loads the config and connects to the spreadsheet.
async fn open(home: &Path, mode: Mode) -> Result<Ledger> {
    let config = Config::load(home).await?;
    Ledger::open(&config, mode).await
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "site_ledger={level},{}={level}",
                env!("CARGO_BIN_NAME")
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
