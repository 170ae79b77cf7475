use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the data directory, its subdirectories and:
/// - Creates an initial `config.json` file using `sheet_url` along with default settings
/// - Copies `service_account_file` into its default location in the data dir.
///
/// # Arguments
/// - `home` - The directory that will be the root of data directory, e.g. `$HOME/site-ledger`
/// - `service_account_file` - The downloaded Google service-account key JSON. This will be copied
///   from the `service_account_file` path to its default location and name in the data directory.
/// - `sheet_url` - The URL of the ledger spreadsheet.
///   e.g.https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
///
/// # Errors
/// - Returns a `Config` error if any file operations fail.
pub async fn init(home: &Path, service_account_file: &Path, sheet_url: &str) -> Result<Out<()>> {
    let config = Config::create(home, service_account_file, sheet_url).await?;
    Ok(format!(
        "Successfully created the site-ledger directory and config at {}",
        config.root().display()
    )
    .into())
}
