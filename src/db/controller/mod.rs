pub mod rating;
pub mod ticket;

use deskio_core::StoreError;

#[derive(Debug)]
pub enum Error {
    SeaORM(sea_orm::DbErr),
    Custom(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::SeaORM(e) => write!(f, "database error: {}", e),
            Error::Custom(e) => f.write_str(e),
        }
    }
}

impl std::error::Error for Error {}

impl From<Error> for StoreError {
    fn from(e: Error) -> Self {
        StoreError::backend(e)
    }
}
