//! Stockage relationnel (SQLite) des tickets et des notes.

pub mod controller;
pub mod model;

use async_trait::async_trait;
use deskio_core::{Predicate, Record, RecordStore, StoreError, StoreResult, Table};
use sea_orm::{ConnectionTrait, Database, DbConn, DbErr, Schema, TransactionTrait};

pub type IDType = i32;

pub async fn start_db(url: &str) -> Result<DbConn, DbErr> {
    let db = Database::connect(url).await?;
    check_tables(&db).await?;
    Ok(db)
}

async fn check_tables(db: &DbConn) -> Result<(), DbErr> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let transaction = db.begin().await?;

    transaction.execute(builder.build(schema.create_table_from_entity(model::ticket::Ticket).if_not_exists())).await?;
    transaction.execute(builder.build(schema.create_table_from_entity(model::rating::Rating).if_not_exists())).await?;
    transaction.commit().await?;

    Ok(())
}

/// [`RecordStore`] sur une base sea-orm.
///
/// La connexion est un pool : chaque opération emprunte une connexion et la rend.
pub struct DatabaseStore {
    db: DbConn,
}

impl DatabaseStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
    /// Connexion à `url` et création des tables.
    pub async fn connect(url: &str) -> Result<Self, DbErr> {
        start_db(url).await.map(Self::new)
    }
}

#[async_trait]
impl RecordStore for DatabaseStore {
    async fn init(&self) -> StoreResult<()> {
        check_tables(&self.db).await.map_err(StoreError::backend)
    }

    async fn append(&self, record: &Record) -> StoreResult<()> {
        match record {
            Record::Ticket(ticket) => controller::ticket::insert_ticket(&self.db, ticket).await?,
            Record::Rating(rating) => {
                controller::rating::insert_rating(&self.db, rating).await?;
            }
        }
        Ok(())
    }

    async fn scan(&self, table: Table, predicate: &Predicate) -> StoreResult<Vec<Record>> {
        let records = match table {
            Table::Tickets => controller::ticket::find_tickets(&self.db, predicate).await?
                .into_iter()
                .map(Record::from)
                .collect(),
            Table::Ratings => controller::rating::all_ratings(&self.db).await?
                .into_iter()
                .map(Record::from)
                .filter(|r| predicate.matches(r))
                .collect(),
        };
        Ok(records)
    }

    async fn last_ticket_number(&self, prefix: &str) -> StoreResult<Option<String>> {
        Ok(controller::ticket::last_ticket_number(&self.db, prefix).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use deskio_core::{
        record::{parse_timestamp, RatingLabel},
        ticket_number::next_ticket_number,
        Desk, Rating, Ticket, TicketKind,
    };
    use serde_json::json;

    use super::*;

    async fn store(dir: &tempfile::TempDir) -> DatabaseStore {
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("deskio.db").display());
        DatabaseStore::connect(&url).await.unwrap()
    }

    fn ticket(number: &str) -> Ticket {
        Ticket {
            ticket_number: number.to_string(),
            kind: TicketKind::Incident,
            affected_user: "alice".to_string(),
            host_name: "PC1".to_string(),
            short_description: "On Site Ticket".to_string(),
            description: "no boots".to_string(),
            timestamp: parse_timestamp("2024-04-02T08:00:00").unwrap(),
        }
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        store.append(&ticket("INC000001").into()).await.unwrap();
        store.init().await.unwrap();
        assert_eq!(store.all_tickets().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn tickets_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        store.append(&ticket("INC000001").into()).await.unwrap();
        assert_eq!(store.find_ticket("INC000001").await.unwrap(), Some(ticket("INC000001")));
        assert_eq!(store.find_ticket("INC000002").await.unwrap(), None);
        assert!(store.append(&ticket("INC000001").into()).await.is_err());
    }

    #[tokio::test]
    async fn last_number_uses_descending_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        for number in ["INC000002", "REQ000007", "INC000010", "INC000003", "inc000099", "INCX00001"] {
            store.append(&ticket(number).into()).await.unwrap();
        }
        assert_eq!(store.last_ticket_number("INC").await.unwrap().as_deref(), Some("INC000010"));
        assert_eq!(store.last_ticket_number("REQ").await.unwrap().as_deref(), Some("REQ000007"));
        assert_eq!(store.last_ticket_number("CHG").await.unwrap(), None);
        let inc: Vec<String> = store.tickets_with_prefix("INC").await.unwrap().into_iter().map(|t| t.ticket_number).collect();
        assert_eq!(inc, ["INC000002", "INC000010", "INC000003"]);
        assert_eq!(next_ticket_number(&store, "INC").await.unwrap().to_string(), "INC000011");
    }

    #[tokio::test]
    async fn ratings_keep_submitted_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        let mut rating = Rating::new(RatingLabel::Neutral, parse_timestamp("2024-04-02T08:00:00").unwrap());
        rating.extra.insert("kiosk".to_string(), json!("lobby"));
        store.append(&rating.clone().into()).await.unwrap();
        store.append(&Rating::new(RatingLabel::Sad, parse_timestamp("2024-04-03T08:00:00").unwrap()).into()).await.unwrap();
        let ratings = store.all_ratings().await.unwrap();
        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[0], rating);
        assert!(store.scan(Table::Ratings, &Predicate::TicketNumberPrefix("INC".into())).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ratings_keep_submitted_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        let received = parse_timestamp("2024-04-02T08:00:00").unwrap();
        let null_value = Rating::from_fields(json!({"rating": "happy", "value": null}).as_object().cloned().unwrap(), received).unwrap();
        let null_rating = Rating::from_fields(json!({"rating": null, "value": 2}).as_object().cloned().unwrap(), received).unwrap();
        let absent = Rating::from_fields(json!({"kiosk": "lobby"}).as_object().cloned().unwrap(), received).unwrap();
        for rating in [&null_value, &null_rating, &absent] {
            store.append(&rating.clone().into()).await.unwrap();
        }
        let ratings = store.all_ratings().await.unwrap();
        assert_eq!(ratings, vec![null_value, null_rating, absent]);
        assert_eq!(ratings[0].to_fields().get("value"), Some(&serde_json::Value::Null));
        assert!(!ratings[2].to_fields().contains_key("rating"));
    }

    #[tokio::test]
    async fn desk_over_database() {
        let dir = tempfile::tempdir().unwrap();
        let desk = Desk::new(Arc::new(store(&dir).await));
        let form = json!({"affected_user": "alice", "host_name": "PC1", "description": "no boots"});
        let form = form.as_object().unwrap();
        for n in 1..=3 {
            assert_eq!(desk.create_incident(form).await.unwrap().ticket_number, format!("INC{:06}", n));
        }
        let stored = desk.store().find_ticket("INC000002").await.unwrap().unwrap();
        assert_eq!(stored.kind, TicketKind::Incident);
        assert_eq!(stored.short_description, "On Site Ticket");
    }
}
