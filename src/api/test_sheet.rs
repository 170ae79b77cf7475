//! Implements the `Sheet` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without using Google Sheets.

use crate::api::{Cell, Sheet};
use crate::error::Res;
use anyhow::{anyhow, bail, Context};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard};

/// Everything a `TestSheet` holds, plus counters so tests can observe how it was used.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub(crate) struct TestSheetState {
    /// Rows of each tab, keyed by tab name, header row first.
    pub(crate) tabs: HashMap<String, Vec<Vec<String>>>,
    /// Number of `get` calls served.
    pub(crate) reads: usize,
    /// Number of successful writes.
    pub(crate) writes: usize,
    /// When set, every write fails as if the remote service had rejected it.
    pub(crate) reject_writes: bool,
}

/// An implementation of the `Sheet` trait that does not use Google sheets. Clones share the same
/// state, which lets a test keep a handle to the data a `Gateway` is working on.
#[derive(Debug, Clone, Default)]
pub(crate) struct TestSheet {
    state: Arc<Mutex<TestSheetState>>,
}

impl TestSheet {
    /// Create a new `TestSheet` using `tabs`. The map key is tab name and the map value is the
    /// rows of the tab.
    pub(crate) fn new(tabs: HashMap<String, Vec<Vec<String>>>) -> Self {
        Self {
            state: Arc::new(Mutex::new(TestSheetState {
                tabs,
                ..TestSheetState::default()
            })),
        }
    }

    /// A `TestSheet` seeded with the sample data from this module under the given tab names.
    pub(crate) fn seeded(projects_tab: &str, expenses_tab: &str) -> Self {
        let mut tabs = HashMap::new();
        tabs.insert(projects_tab.to_string(), load_csv(PROJECT_DATA));
        tabs.insert(expenses_tab.to_string(), load_csv(EXPENSE_DATA));
        Self::new(tabs)
    }

    /// A copy of the current state.
    #[cfg(test)]
    pub(crate) fn state(&self) -> TestSheetState {
        self.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Replaces the current state.
    #[cfg(test)]
    pub(crate) fn set_state(&self, state: TestSheetState) {
        if let Ok(mut guard) = self.lock() {
            *guard = state;
        }
    }

    fn lock(&self) -> Res<MutexGuard<'_, TestSheetState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("The test sheet state lock is poisoned"))
    }
}

#[async_trait::async_trait]
impl Sheet for TestSheet {
    async fn get(&mut self, tab: &str) -> Res<Vec<Vec<String>>> {
        let mut state = self.lock()?;
        state.reads += 1;
        state
            .tabs
            .get(tab)
            .cloned()
            .with_context(|| format!("Tab '{tab}' not found"))
    }

    async fn append_row(&mut self, tab: &str, cells: &[Cell]) -> Res<()> {
        let mut state = self.lock()?;
        if state.reject_writes {
            bail!("The test sheet rejected the append to '{tab}'");
        }
        let rows = state
            .tabs
            .get_mut(tab)
            .with_context(|| format!("Tab '{tab}' not found"))?;
        rows.push(cells.iter().map(|c| c.to_string()).collect());
        state.writes += 1;
        Ok(())
    }

    async fn write_row(&mut self, tab: &str, row: usize, cells: &[Cell]) -> Res<()> {
        let mut state = self.lock()?;
        if state.reject_writes {
            bail!("The test sheet rejected the write to '{tab}' row {row}");
        }
        if row == 0 {
            bail!("Rows are one-based, row 0 does not exist");
        }
        let rows = state
            .tabs
            .get_mut(tab)
            .with_context(|| format!("Tab '{tab}' not found"))?;
        if rows.len() < row {
            rows.resize(row, Vec::new());
        }
        let target = &mut rows[row - 1];
        if target.len() < cells.len() {
            target.resize(cells.len(), String::new());
        }
        for (ix, cell) in cells.iter().enumerate() {
            target[ix] = cell.to_string();
        }
        state.writes += 1;
        Ok(())
    }
}

/// Loads data from a CSV-formatted string. The embedded seed data is known to be well-formed, a
/// malformed record is skipped.
fn load_csv(csv_data: &str) -> Vec<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false) // Ensure headers are treated as part of the data
        .from_reader(Cursor::new(csv_data.as_bytes()));

    rdr.records()
        .filter_map(|record| record.ok())
        .map(|record| record.iter().map(|field| field.to_string()).collect())
        .collect()
}

/// Seed project data.
const PROJECT_DATA: &str = r##"id,name,initial_budget,start_date
001,Casa Alpha,10000,2025-01-06
002,Galpão Industrial,250000,2025-02-03
003,Reforma Escritório,18500.50,2025-03-10
"##;

/// Seed expense data.
const EXPENSE_DATA: &str = r##"project_id,week_number,reference_date,amount
001,1,2025-01-06,500
001,2,2025-01-13,300
001,3,2025-01-20,1200
002,1,2025-02-03,32000
002,2,2025-02-10,28750.40
"##;
