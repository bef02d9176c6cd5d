//! Series data: the catalog, the C&SD API client, and the fetch cache.

pub mod cache;
pub mod catalog;
pub mod censtatd;

pub use cache::{Clock, SeriesCache, SystemClock};
pub use censtatd::CenstatdClient;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{SeriesId, SeriesTable};
use crate::error::FetchError;

/// Result of fetching a batch of series, keyed (and therefore ordered) by id.
pub type FetchOutcomes = BTreeMap<SeriesId, Result<Arc<SeriesTable>, FetchError>>;

/// Anything that can produce the normalized table of one series.
///
/// The HTTP client is the production implementation; the cache and the batch
/// pipeline only depend on this trait.
pub trait SeriesSource {
    fn fetch(&self, series: SeriesId) -> Result<SeriesTable, FetchError>;
}
