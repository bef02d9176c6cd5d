//! C&SD statistics API integration for retail sales volume indices.
//!
//! One POST per series: the query selects the raw 1-decimal volume index of a
//! single outlet type from January 1979 onward. The response carries several
//! variants of the series; only the monthly index rows are kept.

use chrono::NaiveDate;
use log::{debug, info};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::data::SeriesSource;
use crate::domain::{SeriesId, SeriesTable, parse_period};
use crate::error::{AppError, FetchError};

const DATASET_ID: &str = "620-67003";
const START_PERIOD: &str = "197901";
const LANG: &str = "en";
const VALUE_TYPE_RAW_1DP_INDEX: &str = "Raw_1dp_idx_n";

/// The JSON document sent as the `query` form field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    cv: CategoryFilter,
    sv: ValueFilter,
    period: PeriodRange,
    id: &'static str,
    lang: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct CategoryFilter {
    #[serde(rename = "OUTLET_TYPE")]
    outlet_type: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct ValueFilter {
    #[serde(rename = "VOL_IDX_RS")]
    vol_idx_rs: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct PeriodRange {
    start: &'static str,
}

impl Query {
    pub fn for_series(series: SeriesId) -> Self {
        Self {
            cv: CategoryFilter {
                outlet_type: vec![series.code().to_string()],
            },
            sv: ValueFilter {
                vol_idx_rs: vec![VALUE_TYPE_RAW_1DP_INDEX],
            },
            period: PeriodRange { start: START_PERIOD },
            id: DATASET_ID,
            lang: LANG,
        }
    }

    pub fn to_json(&self) -> Result<String, FetchError> {
        serde_json::to_string(self).map_err(|e| FetchError::parse(format!("failed to encode query: {e}")))
    }
}

/// Blocking client for the C&SD `post.php` endpoint.
pub struct CenstatdClient {
    client: Client,
    api_url: String,
}

impl CenstatdClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::new(2, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    fn fetch_series(&self, series: SeriesId) -> Result<SeriesTable, FetchError> {
        let query = Query::for_series(series).to_json()?;
        debug!("POST {} query={query}", self.api_url);

        let resp = self
            .client
            .post(&self.api_url)
            .form(&[("query", query.as_str())])
            .send()?;

        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }

        let body = resp.text()?;
        let table = parse_response(series, &body)?;
        info!(
            "series {series}: {} monthly rows ({} .. {})",
            table.len(),
            table.first_period().map(|d| d.format("%Y-%m").to_string()).unwrap_or_else(|| "-".into()),
            table.last_period().map(|d| d.format("%Y-%m").to_string()).unwrap_or_else(|| "-".into()),
        );
        Ok(table)
    }
}

impl SeriesSource for CenstatdClient {
    fn fetch(&self, series: SeriesId) -> Result<SeriesTable, FetchError> {
        self.fetch_series(series)
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(rename = "dataSet")]
    data_set: Vec<ApiRecord>,
}

/// The subset of a `dataSet` record the pipeline consumes.
#[derive(Debug, Deserialize)]
struct ApiRecord {
    freq: String,
    #[serde(rename = "OUTLET_TYPEDesc")]
    outlet_type_desc: String,
    #[serde(rename = "svDesc")]
    sv_desc: String,
    period: String,
    #[serde(default)]
    figure: serde_json::Value,
}

impl ApiRecord {
    /// Monthly, not a total, and an index (not a value or percentage variant).
    fn is_monthly_index(&self) -> bool {
        !self.freq.contains('Y') && !self.outlet_type_desc.contains("Total") && self.sv_desc.contains("Index")
    }
}

/// Parse a raw response body into a normalized table for `series`.
///
/// Filtering can legitimately leave nothing behind; that is an empty table,
/// not an error.
pub fn parse_response(series: SeriesId, body: &str) -> Result<SeriesTable, FetchError> {
    let resp: ApiResponse = serde_json::from_str(body).map_err(|e| FetchError::parse(e.to_string()))?;

    let total = resp.data_set.len();
    let mut points: Vec<(NaiveDate, f64)> = Vec::new();
    for record in resp.data_set.iter().filter(|r| r.is_monthly_index()) {
        let period = parse_period(&record.period)
            .ok_or_else(|| FetchError::parse(format!("invalid period '{}'", record.period)))?;
        let Some(value) = parse_figure(&record.figure) else {
            continue;
        };
        points.push((period, value));
    }

    debug!("series {series}: kept {} of {total} records", points.len());
    Ok(SeriesTable::from_points(series, points))
}

/// Figures arrive as JSON numbers, occasionally as strings; blanks are skipped.
fn parse_figure(raw: &serde_json::Value) -> Option<f64> {
    let v = match raw {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    if v.is_finite() { Some(v) } else { None }
}
