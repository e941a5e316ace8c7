use std::path::PathBuf;

use crate::record::Table;

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("table `{0}` does not exist yet")]
    Missing(Table),
    #[error("unable to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to (de)serialize records: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Backend(Box::new(err))
    }
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        StoreError::Io { path: path.into(), source }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors returned by the request handlers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` is invalid: {reason}")]
    InvalidField { field: String, reason: String },
    #[error("ticket sequence `{0}` is exhausted")]
    SequenceExhausted(String),
    #[error("ticket number `{0}` is malformed")]
    MalformedTicketNumber(String),
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

impl Error {
    pub(crate) fn invalid<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        Error::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
