use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Current local time, the way the kiosk stamps its records.
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Parse an ISO-8601 date-time, with or without offset.
///
/// With an offset, the wall-clock time of that offset is kept. A bare date is
/// midnight of that day.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::from_str(s)
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local()))
        .or_else(|| NaiveDate::from_str(s).ok().and_then(|d| d.and_hms_opt(0, 0, 0)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Tickets,
    Ratings,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Tickets => "tickets",
            Table::Ratings => "ratings",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ticket type. Each type owns its numbering sequence through its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketKind {
    #[serde(rename = "Incident")]
    Incident,
    #[serde(rename = "Service Request")]
    ServiceRequest,
}

impl TicketKind {
    pub fn prefix(self) -> &'static str {
        match self {
            TicketKind::Incident => "INC",
            TicketKind::ServiceRequest => "REQ",
        }
    }
    pub fn label(self) -> &'static str {
        match self {
            TicketKind::Incident => "Incident",
            TicketKind::ServiceRequest => "Service Request",
        }
    }
}

impl fmt::Display for TicketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TicketKind {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Incident" => Ok(TicketKind::Incident),
            "Service Request" => Ok(TicketKind::ServiceRequest),
            _ => Err(format!("unknown ticket type `{}`", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_number: String,
    #[serde(rename = "type")]
    pub kind: TicketKind,
    pub affected_user: String,
    pub host_name: String,
    pub short_description: String,
    pub description: String,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingLabel {
    Sad,
    Neutral,
    Happy,
}

impl RatingLabel {
    /// Value used for trend averaging.
    pub fn value(self) -> u8 {
        match self {
            RatingLabel::Sad => 1,
            RatingLabel::Neutral => 2,
            RatingLabel::Happy => 3,
        }
    }
    pub fn as_str(self) -> &'static str {
        match self {
            RatingLabel::Sad => "sad",
            RatingLabel::Neutral => "neutral",
            RatingLabel::Happy => "happy",
        }
    }
}

impl fmt::Display for RatingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RatingLabel {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "happy" => Ok(RatingLabel::Happy),
            "neutral" => Ok(RatingLabel::Neutral),
            "sad" => Ok(RatingLabel::Sad),
            _ => Err(format!("unknown rating `{}`", s)),
        }
    }
}

/// Keeps a `null` value as `Some(Value::Null)`. An absent key stays `None`.
fn present<'de, D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// One satisfaction submission.
///
/// `rating` and `value` are the keys the kiosk sends; anything else submitted with
/// them lands in `extra` untouched. `value` is kept as submitted and only coerced
/// to a number by the dashboard.
///
/// `None` means the key was not submitted. A submitted `null` is `Some(None)` for
/// `rating` and `Some(Value::Null)` for `value`, and is written back as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub rating: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub value: Option<Value>,
    pub timestamp: NaiveDateTime,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Rating {
    pub fn new(label: RatingLabel, timestamp: NaiveDateTime) -> Self {
        Self {
            rating: Some(Some(label.as_str().to_string())),
            value: Some(Value::from(label.value())),
            timestamp,
            extra: Map::new(),
        }
    }

    /// Build a rating from a submitted mapping.
    ///
    /// `timestamp` is taken from the mapping when present, otherwise `received_at`
    /// is used.
    pub fn from_fields(mut fields: Map<String, Value>, received_at: NaiveDateTime) -> Result<Self> {
        let rating = match fields.remove("rating") {
            None => None,
            Some(Value::Null) => Some(None),
            Some(Value::String(s)) => Some(Some(s)),
            Some(other) => return Err(Error::invalid("rating", format!("expected a string, got {}", other))),
        };
        let value = fields.remove("value");
        let timestamp = match fields.remove("timestamp") {
            None | Some(Value::Null) => received_at,
            Some(Value::String(s)) => parse_timestamp(&s)
                .ok_or_else(|| Error::invalid("timestamp", format!("`{}` is not an ISO-8601 date-time", s)))?,
            Some(other) => return Err(Error::invalid("timestamp", format!("expected a string, got {}", other))),
        };
        Ok(Self {
            rating,
            value,
            timestamp,
            extra: fields,
        })
    }

    /// The submitted label, if any.
    pub fn rating_str(&self) -> Option<&str> {
        self.rating.as_ref().and_then(Option::as_deref)
    }

    pub fn label(&self) -> Option<RatingLabel> {
        self.rating_str().and_then(|s| s.parse().ok())
    }

    /// The rating as a flat mapping, the way it was submitted plus its timestamp.
    pub fn to_fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Ticket(Ticket),
    Rating(Rating),
}

impl Record {
    pub fn into_ticket(self) -> Option<Ticket> {
        match self {
            Record::Ticket(t) => Some(t),
            Record::Rating(_) => None,
        }
    }
    pub fn into_rating(self) -> Option<Rating> {
        match self {
            Record::Rating(r) => Some(r),
            Record::Ticket(_) => None,
        }
    }
}

impl From<Ticket> for Record {
    fn from(t: Ticket) -> Self {
        Record::Ticket(t)
    }
}

impl From<Rating> for Record {
    fn from(r: Rating) -> Self {
        Record::Rating(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn ticket_kind_prefixes() {
        assert_eq!(TicketKind::Incident.prefix(), "INC");
        assert_eq!(TicketKind::ServiceRequest.prefix(), "REQ");
        assert_eq!("Service Request".parse::<TicketKind>(), Ok(TicketKind::ServiceRequest));
        assert_eq!(serde_json::to_value(TicketKind::ServiceRequest).unwrap(), json!("Service Request"));
    }

    #[test]
    fn rating_keeps_submitted_fields() {
        let received = parse_timestamp("2024-03-01T10:00:00").unwrap();
        let rating = Rating::from_fields(fields(json!({"rating": "happy", "value": 3, "kiosk": "lobby"})), received).unwrap();
        assert_eq!(rating.label(), Some(RatingLabel::Happy));
        assert_eq!(rating.timestamp, received);
        let stored = rating.to_fields();
        assert_eq!(stored["rating"], json!("happy"));
        assert_eq!(stored["value"], json!(3));
        assert_eq!(stored["kiosk"], json!("lobby"));
        assert!(stored.contains_key("timestamp"));
    }

    #[test]
    fn rating_keeps_submitted_nulls() {
        let submitted = fields(json!({"rating": "happy", "value": null, "kiosk": "lobby"}));
        let rating = Rating::from_fields(submitted.clone(), now()).unwrap();
        assert_eq!(rating.value, Some(Value::Null));
        let stored = rating.to_fields();
        for (key, value) in &submitted {
            assert_eq!(stored.get(key), Some(value), "submitted key `{}` lost", key);
        }

        let rating = Rating::from_fields(fields(json!({"rating": null})), now()).unwrap();
        assert_eq!(rating.label(), None);
        let stored = rating.to_fields();
        assert_eq!(stored.get("rating"), Some(&Value::Null));
        assert!(!stored.contains_key("value"));

        let reloaded: Rating = serde_json::from_value(Value::Object(stored)).unwrap();
        assert_eq!(reloaded, rating);
    }

    #[test]
    fn rating_uses_submitted_timestamp() {
        let received = parse_timestamp("2024-03-01T10:00:00").unwrap();
        let rating = Rating::from_fields(fields(json!({"rating": "sad", "timestamp": "2023-12-24T08:30:00.250"})), received).unwrap();
        assert_eq!(rating.timestamp, parse_timestamp("2023-12-24 08:30:00.250").unwrap());
    }

    #[test]
    fn rating_rejects_bad_types() {
        let received = now();
        assert!(matches!(
            Rating::from_fields(fields(json!({"rating": 3})), received),
            Err(Error::InvalidField { .. })
        ));
        assert!(matches!(
            Rating::from_fields(fields(json!({"rating": "happy", "timestamp": "yesterday"})), received),
            Err(Error::InvalidField { .. })
        ));
    }

    #[test]
    fn timestamps_with_offset() {
        let ts = parse_timestamp("2024-05-02T09:15:00+02:00").unwrap();
        assert_eq!(ts, parse_timestamp("2024-05-02T09:15:00").unwrap());
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2024-01-10"), parse_timestamp("2024-01-10T00:00:00"));
        assert_eq!(parse_timestamp("2024-02-30"), None);
    }
}
