use std::path::PathBuf;

use deskio_core::StoreError;

#[derive(Debug, Clone)]
pub struct MultiResult<T, E> {
    ok: Vec<T>,
    err: Vec<E>,
}

impl<T, E> MultiResult<T, E> {
    /// Create a new [MultiResult]
    pub fn new() -> Self {
        Self {
            ok: Vec::new(),
            err: Vec::new(),
        }
    }
    /// Push an ok element
    pub fn push_ok(&mut self, t: T) {
        self.ok.push(t);
    }
    /// Push an err element
    pub fn push_err(&mut self, e: E) {
        self.err.push(e);
    }
    /// Push from a result 
    pub fn push(&mut self, res: Result<T, E>) {
        match res {
            Ok(v) => self.push_ok(v),
            Err(e) => self.push_err(e),
        }
    }
    /// Returns if there is at least one err element
    pub fn has_err(&self) -> bool {
        !self.err.is_empty()
    }
    /// Ok elements
    pub fn oks(&self) -> &[T] {
        &self.ok
    }
    /// Err elements
    pub fn errs(&self) -> &[E] {
        &self.err
    }
}
impl<T, E> Default for MultiResult<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("{} not found", .0.display())]
    NotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type FileResult<T> = Result<T, FileError>;

#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("line {0}: {1}")]
    Csv(usize, csv::Error),
    #[error("`{0}` is not a ticket number")]
    BadNumber(String),
    #[error("{ticket}: unknown ticket type `{kind}`")]
    BadType { ticket: String, kind: String },
    #[error("{ticket}: invalid timestamp `{value}`")]
    BadTimestamp { ticket: String, value: String },
    #[error("{0}: {1}")]
    Store(String, StoreError),
}
pub type TicketResult<T> = Result<T, TicketError>;
pub type TicketsResult<T> = MultiResult<T, TicketError>;

#[derive(Debug, thiserror::Error)]
pub enum RatingError {
    #[error("line {0}: {1}")]
    Csv(usize, csv::Error),
    #[error("line {0}: missing timestamp")]
    MissingTimestamp(usize),
    #[error("line {0}: {1}")]
    Invalid(usize, deskio_core::Error),
    #[error("line {0}: {1}")]
    Store(usize, StoreError),
}
pub type RatingsResult<T> = MultiResult<T, RatingError>;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("unable to read the source store: {0}")]
    Source(StoreError),
    #[error("unable to retire {}: {source}", .path.display())]
    Retire {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type MigrationResult<T> = Result<T, MigrationError>;
