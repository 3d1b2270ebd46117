use std::{fmt::Display, num::ParseFloatError};

/// Custom Result type for irisdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for irisdb
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed user input: filter strings, request bodies, field values
    Parse(String),
    /// Assignment of a field the record type does not declare
    Schema(String),
    /// The database could not be opened
    Connect { path: String, cause: String },
    /// A statement failed while executing against the database
    Operation(String),
    /// A remote URL that cannot be fetched at all (bad syntax or scheme)
    InvalidUrl(String),
    /// A remote download failed (network error or non-success status)
    Fetch(String),
    /// Internal error (filesystem, task join, etc.)
    Internal(String),
}

impl Error {
    /// HTTP status code the error surfaces as at the request boundary
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Parse(_) | Error::Schema(_) | Error::Operation(_) | Error::InvalidUrl(_) => 400,
            Error::Connect { .. } | Error::Fetch(_) | Error::Internal(_) => 500,
        }
    }
}

impl From<ParseFloatError> for Error {
    fn from(value: ParseFloatError) -> Self {
        Error::Parse(value.to_string())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        Error::Operation(value.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::Parse(format!("invalid csv: {}", value))
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Parse(format!("invalid json: {}", value))
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_builder() {
            Error::InvalidUrl(value.to_string())
        } else {
            Error::Fetch(value.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Internal(value.to_string())
    }
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "parse error: {}", err),
            Error::Schema(err) => write!(f, "schema violation: {}", err),
            Error::Connect { path, cause } => {
                write!(f, "cannot open database {}: {}", path, cause)
            }
            Error::Operation(err) => write!(f, "sql error: {}", err),
            Error::InvalidUrl(err) => write!(f, "invalid url: {}", err),
            Error::Fetch(err) => write!(f, "download failed: {}", err),
            Error::Internal(err) => write!(f, "internal error: {}", err),
        }
    }
}
