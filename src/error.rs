use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreasuryError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid special levy ordinal {0}: must be greater than 12")]
    InvalidSpecialOrdinal(u32),

    #[error("Missing column name for '{0}'")]
    MissingColumnName(&'static str),

    #[error("Sheet has no header row")]
    MissingHeader,

    #[error("Fetch failed for sheet '{sheet}': {details}")]
    FetchFailed { sheet: String, details: String },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    HttpError(String),
}

#[cfg(feature = "sheets")]
impl From<reqwest::Error> for TreasuryError {
    fn from(err: reqwest::Error) -> Self {
        TreasuryError::HttpError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TreasuryError>;
