use thiserror::Error;

/// Error surfaced by the `hkr` binary: a message plus the process exit code.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::new(4, err.to_string())
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::new(4, err.to_string())
    }
}

/// Failure to retrieve one series from the statistics API.
///
/// A fetch error only ever concerns the series it was raised for; batch callers
/// keep going with the remaining identifiers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// Connection failure or timeout.
    #[error("request failed{}: {message}", timeout_suffix(.timed_out))]
    Network { message: String, timed_out: bool },

    /// The API answered with a non-2xx status.
    #[error("request failed with status {0}")]
    Status(u16),

    /// Malformed JSON, a missing field, or an unparseable period.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

fn timeout_suffix(timed_out: &bool) -> &'static str {
    if *timed_out { " (timed out)" } else { "" }
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        FetchError::Network {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        FetchError::Parse(message.into())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return FetchError::Status(status.as_u16());
        }
        if err.is_decode() {
            return FetchError::Parse(err.to_string());
        }
        FetchError::Network {
            message: err.to_string(),
            timed_out: err.is_timeout(),
        }
    }
}

/// Failure to render the charts of one series.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RenderError {
    /// Filtering left no observations to plot.
    #[error("no observations to plot")]
    Empty,

    #[error("invalid axis bounds [{min}, {max}]")]
    InvalidBounds { min: f64, max: f64 },

    #[error("drawing failed: {0}")]
    Draw(String),
}
