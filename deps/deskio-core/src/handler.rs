use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use serde_json::{Map, Value};

use crate::{
    error::Result,
    form::{TicketForm, INCIDENT_FORM, SERVICE_REQUEST_FORM},
    record::{self, Rating, Record, Ticket},
    store::RecordStore,
    ticket_number::next_ticket_number,
    LOG_TARGET,
};

pub const RATING_ACKNOWLEDGMENT: &str = "Thank you for your feedback!";

/// Request handlers of the kiosk.
///
/// Owns the store given at startup. Ticket numbers of one prefix are assigned under
/// a per-prefix lock held until the ticket is appended, so concurrent submissions
/// of this process never share a number. Other processes writing the same store are
/// not coordinated.
pub struct Desk {
    store: Arc<dyn RecordStore>,
    sequences: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl Desk {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            sequences: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    fn sequence_lock(&self, prefix: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut sequences = self.sequences.lock().unwrap_or_else(PoisonError::into_inner);
        sequences.entry(prefix.to_string()).or_default().clone()
    }

    /// Validate `fields` against `form`, number the ticket and append it.
    pub async fn create_ticket(&self, form: &TicketForm, fields: &Map<String, Value>) -> Result<Ticket> {
        let draft = form.validate(fields)?;
        let prefix = form.kind.prefix();
        let lock = self.sequence_lock(prefix);
        let _sequence = lock.lock().await;

        let number = next_ticket_number(self.store.as_ref(), prefix).await?;
        let ticket = Ticket {
            ticket_number: number.to_string(),
            kind: form.kind,
            affected_user: draft.affected_user,
            host_name: draft.host_name,
            short_description: draft.short_description,
            description: draft.description,
            timestamp: record::now(),
        };
        self.store.append(&Record::Ticket(ticket.clone())).await?;
        log::info!(target: LOG_TARGET, "{} {} created for {}", ticket.kind, ticket.ticket_number, ticket.affected_user);
        Ok(ticket)
    }

    pub async fn create_incident(&self, fields: &Map<String, Value>) -> Result<Ticket> {
        self.create_ticket(&INCIDENT_FORM, fields).await
    }

    pub async fn create_service_request(&self, fields: &Map<String, Value>) -> Result<Ticket> {
        self.create_ticket(&SERVICE_REQUEST_FORM, fields).await
    }

    /// Store the submitted mapping as a rating.
    pub async fn submit_rating(&self, fields: Map<String, Value>) -> Result<Rating> {
        let rating = Rating::from_fields(fields, record::now())?;
        self.store.append(&Record::Rating(rating.clone())).await?;
        log::info!(target: LOG_TARGET, "Rating received: {}", Value::Object(rating.to_fields()));
        Ok(rating)
    }
}
