use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("no table with id '{table_id}' on the page")]
    TableNotFound { table_id: String },

    /// The table exists but its layout is not the one we know how to read.
    #[error("malformed page: {0}")]
    MalformedPage(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("could not read settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors that only mean "no data for this page or day".
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Status { .. } | Error::TableNotFound { .. }
        )
    }
}
