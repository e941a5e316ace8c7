//! Import des anciennes données au démarrage.
//!
//! Deux sources : les CSV du premier kiosque (`tickets.csv`, `ratings.csv`) et un
//! stockage fichiers JSON à recopier dans le stockage courant. Chaque fichier importé
//! est renommé avec un `_` en tête pour ne pas être importé deux fois.

mod error;
mod legacy;

use std::path::{Path, PathBuf};

use deskio_core::{record, Rating, RecordStore, StoreError, Ticket};

use crate::{config::MigrationConfig, files::FileStore};
pub use error::*;

pub const LEGACY_TICKETS_FILE: &str = "tickets.csv";
pub const LEGACY_RATINGS_FILE: &str = "ratings.csv";

/// Ajoute `ticket` s'il n'existe pas encore. `Ok(None)` s'il était déjà là.
async fn from_ticket(store: &dyn RecordStore, ticket: Ticket) -> TicketResult<Option<String>> {
    match store.find_ticket(&ticket.ticket_number).await {
        Ok(Some(_)) => return Ok(None),
        Err(e) => return Err(TicketError::Store(ticket.ticket_number, e)),
        _ => (),
    }
    let number = ticket.ticket_number.clone();
    store
        .append(&ticket.into())
        .await
        .map_err(|e| TicketError::Store(number.clone(), e))?;
    Ok(Some(number))
}

async fn from_tickets(store: &dyn RecordStore, tickets: Vec<Ticket>) -> TicketsResult<Option<String>> {
    let mut results = MultiResult::new();
    for ticket in tickets {
        results.push(from_ticket(store, ticket).await);
    }
    results
}

async fn from_ratings(store: &dyn RecordStore, ratings: Vec<Rating>) -> RatingsResult<()> {
    let mut results = MultiResult::new();
    for (i, rating) in ratings.into_iter().enumerate() {
        results.push(store.append(&rating.into()).await.map_err(|e| RatingError::Store(i + 1, e)));
    }
    results
}

// the header is line 1 of a csv file
fn csv_line(index: usize) -> usize {
    index + 2
}

async fn from_legacy_tickets(store: &dyn RecordStore, path: &Path) -> FileResult<TicketsResult<Option<String>>> {
    if !path.is_file() {
        return Err(FileError::NotFound(path.to_path_buf()));
    }
    let mut reader = csv::Reader::from_path(path)?;
    let rows: Vec<_> = reader.deserialize::<legacy::LegacyTicket>().collect();
    let mut results = MultiResult::new();
    for (i, row) in rows.into_iter().enumerate() {
        let ticket = row
            .map_err(|e| TicketError::Csv(csv_line(i), e))
            .and_then(legacy::LegacyTicket::into_ticket);
        match ticket {
            Ok(ticket) => results.push(from_ticket(store, ticket).await),
            Err(e) => results.push_err(e),
        }
    }
    Ok(results)
}

async fn from_legacy_ratings(store: &dyn RecordStore, path: &Path) -> FileResult<RatingsResult<()>> {
    if !path.is_file() {
        return Err(FileError::NotFound(path.to_path_buf()));
    }
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let rows: Vec<_> = reader.records().collect();
    let mut results = MultiResult::new();
    for (i, row) in rows.into_iter().enumerate() {
        let line = csv_line(i);
        let fields = match row {
            Ok(row) => legacy::rating_fields(&headers, &row),
            Err(e) => {
                results.push_err(RatingError::Csv(line, e));
                continue;
            }
        };
        // an old rating without a date would be stamped with the import time
        if !fields.contains_key("timestamp") {
            results.push_err(RatingError::MissingTimestamp(line));
            continue;
        }
        let rating = match Rating::from_fields(fields, record::now()) {
            Ok(v) => v,
            Err(e) => {
                results.push_err(RatingError::Invalid(line, e));
                continue;
            }
        };
        results.push(store.append(&rating.into()).await.map_err(|e| RatingError::Store(line, e)));
    }
    Ok(results)
}

/// Renomme `path` en `_<nom>` dans le même dossier.
pub fn retire(path: &Path) -> MigrationResult<PathBuf> {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let new_path = path.with_file_name(format!("_{}", name));
    std::fs::rename(path, &new_path).map_err(|source| MigrationError::Retire {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(new_path)
}

#[derive(Debug)]
pub struct LegacyReport {
    pub tickets: FileResult<TicketsResult<Option<String>>>,
    pub ratings: FileResult<RatingsResult<()>>,
}

/// Importe `tickets.csv` et `ratings.csv` de `directory`.
///
/// Un fichier absent n'est pas une erreur fatale : il apparaît dans le rapport.
/// Un fichier lu est renommé, même si certaines lignes ont été refusées.
pub async fn import_legacy_csv(store: &dyn RecordStore, directory: &Path) -> MigrationResult<LegacyReport> {
    let tickets_path = directory.join(LEGACY_TICKETS_FILE);
    let tickets = from_legacy_tickets(store, &tickets_path).await;
    if tickets.is_ok() {
        retire(&tickets_path)?;
    }
    let ratings_path = directory.join(LEGACY_RATINGS_FILE);
    let ratings = from_legacy_ratings(store, &ratings_path).await;
    if ratings.is_ok() {
        retire(&ratings_path)?;
    }
    Ok(LegacyReport { tickets, ratings })
}

#[derive(Debug, Default)]
pub struct TransferReport {
    pub tickets: TicketsResult<Option<String>>,
    pub ratings: RatingsResult<()>,
}

fn missing_as_empty<T>(records: Result<Vec<T>, StoreError>) -> MigrationResult<Vec<T>> {
    match records {
        Ok(v) => Ok(v),
        Err(StoreError::Missing(_)) => Ok(Vec::new()),
        Err(e) => Err(MigrationError::Source(e)),
    }
}

/// Recopie tous les enregistrements de `source` dans `target`.
///
/// Les tickets déjà présents dans `target` sont ignorés, les notes sont toujours ajoutées.
pub async fn transfer(source: &dyn RecordStore, target: &dyn RecordStore) -> MigrationResult<TransferReport> {
    let tickets = missing_as_empty(source.all_tickets().await)?;
    let ratings = missing_as_empty(source.all_ratings().await)?;
    Ok(TransferReport {
        tickets: from_tickets(target, tickets).await,
        ratings: from_ratings(target, ratings).await,
    })
}

/// Recopie le stockage fichiers de `directory` dans `target` puis renomme ses fichiers.
pub async fn transfer_files(directory: &Path, target: &dyn RecordStore) -> MigrationResult<TransferReport> {
    let source = FileStore::new(directory);
    let report = transfer(&source, target).await?;
    for table in [deskio_core::Table::Tickets, deskio_core::Table::Ratings] {
        let path = directory.join(format!("{}.json", table.name()));
        if path.is_file() {
            retire(&path)?;
        }
    }
    Ok(report)
}

fn log_tickets(source: &Path, tickets: &TicketsResult<Option<String>>) {
    let imported = tickets.oks().iter().flatten().count();
    let skipped = tickets.oks().len() - imported;
    if tickets.has_err() {
        log_warn!(
            "{}: {} ticket(s) imported, {} already present, {} rejected",
            source.display(), imported, skipped, tickets.errs().len()
        );
    } else {
        log_info!("{}: {} ticket(s) imported, {} already present", source.display(), imported, skipped);
    }
    for e in tickets.errs() {
        log_warn!("{}: ticket not imported: {}", source.display(), e);
    }
}

fn log_ratings(source: &Path, ratings: &RatingsResult<()>) {
    if ratings.has_err() {
        log_warn!("{}: {} rating(s) imported, {} rejected", source.display(), ratings.oks().len(), ratings.errs().len());
    } else {
        log_info!("{}: {} rating(s) imported", source.display(), ratings.oks().len());
    }
    for e in ratings.errs() {
        log_warn!("{}: rating not imported: {}", source.display(), e);
    }
}

/// Lance les imports demandés par `config` et écrit leur bilan dans les logs.
pub async fn do_migration(store: &dyn RecordStore, config: &MigrationConfig) -> MigrationResult<()> {
    if let Some(directory) = &config.legacy_csv {
        let report = import_legacy_csv(store, directory).await?;
        match &report.tickets {
            Ok(tickets) => log_tickets(&directory.join(LEGACY_TICKETS_FILE), tickets),
            Err(e) => log_warn!("Legacy tickets skipped: {}", e),
        }
        match &report.ratings {
            Ok(ratings) => log_ratings(&directory.join(LEGACY_RATINGS_FILE), ratings),
            Err(e) => log_warn!("Legacy ratings skipped: {}", e),
        }
    }
    if let Some(directory) = &config.from_files {
        let report = transfer_files(directory, store).await?;
        log_tickets(directory, &report.tickets);
        log_ratings(directory, &report.ratings);
    }
    Ok(())
}
