//! Shared domain types.
//!
//! These types are intentionally kept small and structured so that every stage
//! of the pipeline (fetch, cache, bounds, render, preview) talks about the same
//! records:
//!
//! - `SeriesId` is validated against the catalog at construction
//! - `Observation` is one month of one series, YoY included
//! - `SeriesTable` is the ordered history of one series

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;

use crate::data::catalog::{self, CATALOG};

/// Outlet-type code of one retail series (e.g. `"32"` for jewellery).
///
/// Only codes present in the catalog can be constructed, so holding a
/// `SeriesId` means the description lookup cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesId(&'static str);

impl SeriesId {
    /// Validate a raw code against the catalog.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        CATALOG
            .iter()
            .find(|(code, _)| *code == raw)
            .map(|(code, _)| SeriesId(*code))
    }

    /// Every catalog series, in display order.
    pub fn all() -> impl Iterator<Item = SeriesId> {
        CATALOG.iter().map(|(code, _)| SeriesId(*code))
    }

    pub fn code(self) -> &'static str {
        self.0
    }

    pub fn description(self) -> &'static str {
        catalog::describe(self)
    }

    /// Position in the catalog; used for ordering.
    pub fn position(self) -> usize {
        CATALOG
            .iter()
            .position(|(code, _)| *code == self.0)
            .unwrap_or(usize::MAX)
    }
}

impl Ord for SeriesId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.position().cmp(&other.position())
    }
}

impl PartialOrd for SeriesId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl FromStr for SeriesId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SeriesId::parse(s).ok_or_else(|| {
            format!("unknown series '{s}' (run `hkr catalog` for the list of codes)")
        })
    }
}

/// One monthly observation of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub series: SeriesId,
    /// First day of the observed month.
    pub period: NaiveDate,
    /// Volume index (one decimal place upstream).
    pub value: f64,
    /// Percent change versus the row twelve months earlier; absent for the
    /// first twelve rows of a history.
    pub yoy: Option<f64>,
}

/// Ordered monthly history of one series.
///
/// Rows are strictly increasing by period with no duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    pub series: SeriesId,
    rows: Vec<Observation>,
}

/// Number of rows between an observation and its year-ago comparison.
pub const YOY_LAG: usize = 12;

impl SeriesTable {
    /// Build a table from `(period, value)` pairs in any order.
    ///
    /// Periods are normalized to the first of the month, sorted, and
    /// de-duplicated (the last value seen for a month wins). YoY is derived
    /// here so every table carries it.
    pub fn from_points(series: SeriesId, points: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        let mut points: Vec<(NaiveDate, f64)> = points
            .into_iter()
            .map(|(d, v)| (month_start(d), v))
            .collect();
        // Stable sort keeps arrival order within a month so `dedup` can keep the last.
        points.sort_by_key(|(d, _)| *d);
        let mut deduped: Vec<(NaiveDate, f64)> = Vec::with_capacity(points.len());
        for (d, v) in points {
            match deduped.last_mut() {
                Some(last) if last.0 == d => last.1 = v,
                _ => deduped.push((d, v)),
            }
        }

        let values: Vec<f64> = deduped.iter().map(|(_, v)| *v).collect();
        let yoy = yoy_percent(&values, YOY_LAG);

        let rows = deduped
            .into_iter()
            .zip(yoy)
            .map(|((period, value), yoy)| Observation {
                series,
                period,
                value,
                yoy,
            })
            .collect();

        Self { series, rows }
    }

    pub fn empty(series: SeriesId) -> Self {
        Self {
            series,
            rows: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up the observation for a month (any day within the month matches).
    pub fn get(&self, period: NaiveDate) -> Option<&Observation> {
        let key = month_start(period);
        self.rows
            .binary_search_by_key(&key, |o| o.period)
            .ok()
            .map(|i| &self.rows[i])
    }

    /// The last `n` rows (fewer if the table is shorter).
    pub fn tail(&self, n: usize) -> &[Observation] {
        let start = self.rows.len().saturating_sub(n);
        &self.rows[start..]
    }

    pub fn first_period(&self) -> Option<NaiveDate> {
        self.rows.first().map(|o| o.period)
    }

    pub fn last_period(&self) -> Option<NaiveDate> {
        self.rows.last().map(|o| o.period)
    }

    /// `(decimal year, value)` pairs for plotting.
    pub fn volume_points(&self) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .map(|o| (decimal_year(o.period), o.value))
            .collect()
    }

    /// `(decimal year, yoy)` pairs for plotting, skipping absent YoY.
    pub fn yoy_points(&self) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .filter_map(|o| o.yoy.map(|y| (decimal_year(o.period), y)))
            .collect()
    }
}

/// Percent change over a positional lag: `(v[i] / v[i-lag] - 1) * 100`.
///
/// The first `lag` entries are `None`, as is any entry whose base is zero or
/// whose result is not finite.
pub fn yoy_percent(values: &[f64], lag: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if i < lag {
                return None;
            }
            let base = values[i - lag];
            if base == 0.0 {
                return None;
            }
            let pct = (v / base - 1.0) * 100.0;
            pct.is_finite().then_some(pct)
        })
        .collect()
}

/// Parse an upstream `YYYYMM` period into the first day of that month.
pub fn parse_period(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = raw[..4].parse().ok()?;
    let month: u32 = raw[4..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

pub fn month_start(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

/// Month position on a continuous year axis (`2024-01` → 2024.0, `2024-07` → 2024.5).
pub fn decimal_year(d: NaiveDate) -> f64 {
    d.year() as f64 + (d.month0() as f64) / 12.0
}

/// Padded y-range for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

impl AxisBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.max > self.min
    }
}

/// Shared ranges for the two chart kinds; `None` when there was nothing to scan.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SharedBounds {
    pub volume: Option<AxisBounds>,
    pub yoy: Option<AxisBounds>,
}

/// How the y-axis of a multi-series view is scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AxisMode {
    /// Each chart autoscales to its own data.
    #[default]
    Individual,
    /// Every chart uses the padded global range across all series.
    Common,
}

impl AxisMode {
    pub fn toggle(self) -> Self {
        match self {
            AxisMode::Individual => AxisMode::Common,
            AxisMode::Common => AxisMode::Individual,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            AxisMode::Individual => "Individual Y-Axis",
            AxisMode::Common => "Common Y-Axis",
        }
    }
}
