//! # Core library of deskio
//!
//! This library holds the domain of the service-desk kiosk: the records it stores,
//! the way ticket numbers are assigned and the handlers turning a submitted form
//! into a stored record.
//!
//! ## Records and stores
//!
//! Two kinds of records exist: [`Ticket`] and [`Rating`]. They are persisted through
//! the [`RecordStore`] trait, which only knows how to append a record and scan a
//! table. The storage engines themselves (flat files, SQLite) live in the `deskio`
//! binary crate.
//!
//! ## Handlers
//!
//! [`Desk`] owns the injected store and serializes ticket numbering per prefix, so
//! two submissions of the same ticket type never receive the same number.
//!
//! ## Dashboard
//!
//! The [`dashboard`] module loads every rating and derives what the satisfaction
//! dashboard displays: distribution, daily counts and the value trend.

pub mod dashboard;
pub mod error;
pub mod form;
pub mod handler;
pub mod record;
pub mod store;
pub mod ticket_number;

pub use error::{Error, Result, StoreError, StoreResult};
pub use handler::Desk;
pub use record::{Rating, RatingLabel, Record, Table, Ticket, TicketKind};
pub use store::{Predicate, RecordStore};
pub use ticket_number::TicketNumber;

/// Log target shared by every deskio crate.
pub const LOG_TARGET: &str = "deskio";
