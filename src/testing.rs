//! In-process stand-ins for the network and the clock, shared by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::data::SeriesSource;
use crate::data::cache::Clock;
use crate::domain::{SeriesId, SeriesTable};
use crate::error::FetchError;

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[derive(Debug, Default)]
struct FakeState {
    calls: HashMap<SeriesId, usize>,
    failures: HashMap<SeriesId, FetchError>,
    tables: HashMap<SeriesId, SeriesTable>,
}

/// Scripted `SeriesSource`: counts calls, fails on demand, and otherwise
/// returns either a configured table or two years of synthetic data.
#[derive(Debug, Clone, Default)]
pub struct FakeSource {
    state: Rc<RefCell<FakeState>>,
}

impl FakeSource {
    pub fn fail(&self, series: SeriesId, err: FetchError) {
        self.state.borrow_mut().failures.insert(series, err);
    }

    pub fn recover(&self, series: SeriesId) {
        self.state.borrow_mut().failures.remove(&series);
    }

    pub fn set_table(&self, table: SeriesTable) {
        self.state.borrow_mut().tables.insert(table.series, table);
    }

    pub fn calls(&self, series: SeriesId) -> usize {
        self.state.borrow().calls.get(&series).copied().unwrap_or(0)
    }
}

impl SeriesSource for FakeSource {
    fn fetch(&self, series: SeriesId) -> Result<SeriesTable, FetchError> {
        let mut state = self.state.borrow_mut();
        *state.calls.entry(series).or_insert(0) += 1;
        if let Some(err) = state.failures.get(&series) {
            return Err(err.clone());
        }
        if let Some(table) = state.tables.get(&series) {
            return Ok(table.clone());
        }
        Ok(synthetic_table(series, 2022, 24, 100.0))
    }
}

/// `months` consecutive monthly rows from January of `start_year`, growing 1% a month.
pub fn synthetic_table(series: SeriesId, start_year: i32, months: usize, base: f64) -> SeriesTable {
    let points = (0..months).map(|i| {
        let year = start_year + (i / 12) as i32;
        let month = (i % 12) as u32 + 1;
        let period = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
        (period, base * 1.01_f64.powi(i as i32))
    });
    SeriesTable::from_points(series, points)
}
