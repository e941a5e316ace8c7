use async_trait::async_trait;

use crate::{
    error::StoreResult,
    record::{Rating, Record, Table, Ticket},
    ticket_number::matches_prefix,
};

/// Filter applied by [`RecordStore::scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    All,
    /// Tickets whose number is the prefix followed by digits.
    TicketNumberPrefix(String),
    /// The ticket with exactly this number.
    TicketNumber(String),
}

impl Predicate {
    pub fn matches(&self, record: &Record) -> bool {
        match (self, record) {
            (Predicate::All, _) => true,
            (Predicate::TicketNumberPrefix(prefix), Record::Ticket(t)) => matches_prefix(&t.ticket_number, prefix),
            (Predicate::TicketNumber(number), Record::Ticket(t)) => &t.ticket_number == number,
            (_, Record::Rating(_)) => false,
        }
    }
}

/// Durable storage of tickets and ratings.
///
/// Implementations only have to append and scan. Records are returned in storage
/// order, which for tickets is their insertion order.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create the tables if they do not exist. Calling it twice is harmless.
    async fn init(&self) -> StoreResult<()>;
    /// Append one record without losing the ones already stored.
    async fn append(&self, record: &Record) -> StoreResult<()>;
    async fn scan(&self, table: Table, predicate: &Predicate) -> StoreResult<Vec<Record>>;

    async fn tickets_with_prefix(&self, prefix: &str) -> StoreResult<Vec<Ticket>> {
        let records = self.scan(Table::Tickets, &Predicate::TicketNumberPrefix(prefix.to_string())).await?;
        Ok(records.into_iter().filter_map(Record::into_ticket).collect())
    }
    async fn all_tickets(&self) -> StoreResult<Vec<Ticket>> {
        let records = self.scan(Table::Tickets, &Predicate::All).await?;
        Ok(records.into_iter().filter_map(Record::into_ticket).collect())
    }
    async fn all_ratings(&self) -> StoreResult<Vec<Rating>> {
        let records = self.scan(Table::Ratings, &Predicate::All).await?;
        Ok(records.into_iter().filter_map(Record::into_rating).collect())
    }
    async fn find_ticket(&self, ticket_number: &str) -> StoreResult<Option<Ticket>> {
        let records = self.scan(Table::Tickets, &Predicate::TicketNumber(ticket_number.to_string())).await?;
        Ok(records.into_iter().find_map(Record::into_ticket))
    }
    /// Latest number of the `prefix` sequence: the last matching ticket in storage order.
    async fn last_ticket_number(&self, prefix: &str) -> StoreResult<Option<String>> {
        Ok(self
            .tickets_with_prefix(prefix)
            .await?
            .into_iter()
            .map(|t| t.ticket_number)
            .last())
    }
}
