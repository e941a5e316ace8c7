//! Stockage en fichiers plats : un fichier JSON par table.

mod data;

use std::path::PathBuf;

use async_trait::async_trait;
use deskio_core::{Predicate, Rating, Record, RecordStore, StoreError, StoreResult, Table, Ticket};

pub use data::{Data, DataGuard};

pub struct FileStore {
    directory: PathBuf,
    tickets: Data<Ticket>,
    ratings: Data<Rating>,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        let directory = directory.into();
        Self {
            tickets: Data::new(&directory, Table::Tickets.name()),
            ratings: Data::new(&directory, Table::Ratings.name()),
            directory,
        }
    }
}

fn missing_as<T>(table: Table, records: Option<Vec<T>>) -> StoreResult<Vec<T>> {
    records.ok_or(StoreError::Missing(table))
}

#[async_trait]
impl RecordStore for FileStore {
    async fn init(&self) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| StoreError::io(&self.directory, e))?;
        if !self.tickets.exists().await {
            self.tickets.write().await?.commit().await?;
        }
        if !self.ratings.exists().await {
            self.ratings.write().await?.commit().await?;
        }
        Ok(())
    }

    async fn append(&self, record: &Record) -> StoreResult<()> {
        match record {
            Record::Ticket(ticket) => {
                let mut data = self.tickets.write().await?;
                data.push(ticket.clone());
                data.commit().await
            }
            Record::Rating(rating) => {
                let mut data = self.ratings.write().await?;
                data.push(rating.clone());
                data.commit().await
            }
        }
    }

    async fn scan(&self, table: Table, predicate: &Predicate) -> StoreResult<Vec<Record>> {
        let records: Vec<Record> = match table {
            Table::Tickets => missing_as(table, self.tickets.read().await?)?
                .into_iter()
                .map(Record::from)
                .collect(),
            Table::Ratings => missing_as(table, self.ratings.read().await?)?
                .into_iter()
                .map(Record::from)
                .collect(),
        };
        Ok(records.into_iter().filter(|r| predicate.matches(r)).collect())
    }
}
