//! Global axis ranges for common-axis views.
//!
//! Volume ranges are padded by shrinking the minimum 10% and growing the
//! maximum 10%. YoY ranges pad by sign: an extreme on the "outside" of zero
//! (negative min, positive max) grows by 10% away from zero; an extreme on the
//! "inside" (non-negative min, non-positive max) shrinks by 10% toward zero.

use std::sync::Arc;

use crate::domain::{AxisBounds, SeriesTable, SharedBounds};

#[derive(Debug, Clone, Copy)]
struct Extremes {
    min: f64,
    max: f64,
}

impl Extremes {
    fn new() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn push(&mut self, v: f64) {
        if v.is_finite() {
            self.min = self.min.min(v);
            self.max = self.max.max(v);
        }
    }

    fn get(self) -> Option<(f64, f64)> {
        (self.min.is_finite() && self.max.is_finite()).then_some((self.min, self.max))
    }
}

/// Scan every value and every present YoY across `tables` and pad the result.
pub fn compute_bounds<'a, I>(tables: I) -> SharedBounds
where
    I: IntoIterator<Item = &'a SeriesTable>,
{
    let mut volume = Extremes::new();
    let mut yoy = Extremes::new();

    for table in tables {
        for row in table.rows() {
            volume.push(row.value);
            if let Some(y) = row.yoy {
                yoy.push(y);
            }
        }
    }

    SharedBounds {
        volume: volume.get().map(|(lo, hi)| pad_volume(lo, hi)),
        yoy: yoy.get().map(|(lo, hi)| pad_yoy(lo, hi)),
    }
}

/// Convenience for the cache's shared tables.
pub fn compute_bounds_shared<'a, I>(tables: I) -> SharedBounds
where
    I: IntoIterator<Item = &'a Arc<SeriesTable>>,
{
    compute_bounds(tables.into_iter().map(|t| t.as_ref()))
}

pub fn pad_volume(min: f64, max: f64) -> AxisBounds {
    widen_flat(min * 0.9, max * 1.1)
}

pub fn pad_yoy(min: f64, max: f64) -> AxisBounds {
    let lo = if min < 0.0 { min * 1.1 } else { min * 0.9 };
    let hi = if max > 0.0 { max * 1.1 } else { max * 0.9 };
    widen_flat(lo, hi)
}

/// A range with no span (flat data, or all zeros after padding) gets room
/// around its value so it still draws.
fn widen_flat(lo: f64, hi: f64) -> AxisBounds {
    if hi - lo < 1e-12 {
        let half = (lo.abs() * 0.05).max(1.0);
        return AxisBounds::new(lo - half, hi + half);
    }
    AxisBounds::new(lo, hi)
}

/// Autoscaled range for a single chart: 5% of the span on each side.
pub fn autoscale(values: impl IntoIterator<Item = f64>) -> Option<AxisBounds> {
    let mut ext = Extremes::new();
    for v in values {
        ext.push(v);
    }
    let (lo, hi) = ext.get()?;
    let pad = (hi - lo) * 0.05;
    Some(widen_flat(lo - pad, hi + pad))
}
