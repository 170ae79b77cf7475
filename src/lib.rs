//! site-ledger: construction-project budgets kept in a Google spreadsheet.
//!
//! Projects and their weekly expenses live in two tabs of one spreadsheet. The `Ledger` reads
//! them through a short-lived `DatasetCache`, registers projects and expenses, corrects recorded
//! weeks in place and computes how much of each budget remains.

mod api;
pub mod args;
mod cache;
pub mod commands;
mod config;
mod error;
mod ledger;
pub mod model;
#[cfg(test)]
mod test;
mod utils;

pub use api::Mode;
pub use cache::DatasetCache;
pub use config::Config;
pub use error::{Error, ErrorType, Result};
pub use ledger::Ledger;
pub use model::Amount;
