//! Ticket number assignment.
//!
//! A ticket number is a prefix followed by a zero-padded sequence, e.g. `INC000042`.
//! Every prefix owns an independent sequence starting at 1.

use std::fmt;

use crate::{
    error::{Error, Result},
    store::RecordStore,
    LOG_TARGET,
};

/// Width of the numeric part.
pub const DIGITS: usize = 6;
/// Last sequence that fits in [`DIGITS`] digits.
pub const MAX_SEQUENCE: u64 = 999_999;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicketNumber {
    prefix: String,
    sequence: u64,
}

/// Returns true when `number` is `prefix` followed only by decimal digits.
pub fn matches_prefix(number: &str, prefix: &str) -> bool {
    match number.strip_prefix(prefix) {
        Some(rest) => !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

impl TicketNumber {
    pub fn first<S: Into<String>>(prefix: S) -> Self {
        Self {
            prefix: prefix.into(),
            sequence: 1,
        }
    }
    pub fn new<S: Into<String>>(prefix: S, sequence: u64) -> Result<Self> {
        let prefix = prefix.into();
        if sequence > MAX_SEQUENCE {
            return Err(Error::SequenceExhausted(prefix));
        }
        Ok(Self { prefix, sequence })
    }
    /// Parse `number` as a member of the `prefix` sequence.
    pub fn parse(number: &str, prefix: &str) -> Option<Self> {
        if !matches_prefix(number, prefix) {
            return None;
        }
        let sequence = number[prefix.len()..].parse().ok()?;
        Some(Self {
            prefix: prefix.to_string(),
            sequence,
        })
    }
    /// The number following this one.
    ///
    /// The numeric part never grows past [`DIGITS`] digits: the successor of
    /// `999999` is an error rather than a wider or truncated number.
    pub fn successor(&self) -> Result<Self> {
        match self.sequence.checked_add(1) {
            Some(next) => Self::new(self.prefix.clone(), next),
            None => Err(Error::SequenceExhausted(self.prefix.clone())),
        }
    }
    /// The number to assign after `last`, the latest number of the sequence.
    pub fn next_after(prefix: &str, last: Option<&str>) -> Result<Self> {
        match last {
            None => Ok(Self::first(prefix)),
            Some(last) => Self::parse(last, prefix)
                .ok_or_else(|| Error::MalformedTicketNumber(last.to_string()))?
                .successor(),
        }
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:0width$}", self.prefix, self.sequence, width = DIGITS)
    }
}

/// Compute the next ticket number of `prefix` from what the store holds.
///
/// A store that cannot be read (not created yet, unreachable...) counts as empty.
/// No lock is taken here: see [`Desk`](crate::Desk) for serialized assignment.
pub async fn next_ticket_number(store: &dyn RecordStore, prefix: &str) -> Result<TicketNumber> {
    let last = match store.last_ticket_number(prefix).await {
        Ok(last) => last,
        Err(e) => {
            log::warn!(target: LOG_TARGET, "Unable to read sequence {}, starting from 1: {}", prefix, e);
            None
        }
    };
    TicketNumber::next_after(prefix, last.as_deref())
}
