//! Lignes des anciens fichiers CSV du kiosque.

use deskio_core::{record::parse_timestamp, Ticket, TicketKind};
use serde::Deserialize;
use serde_json::{Map, Number, Value};

use super::error::{TicketError, TicketResult};

lazy_static::lazy_static!(
    static ref RE_TICKET_NUMBER: regex::Regex = regex::Regex::new(r"^([A-Z]+)(\d{6})$").unwrap();
);

/// Ligne de `tickets.csv`
#[derive(Deserialize, Debug)]
pub struct LegacyTicket {
    pub ticket_number: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub affected_user: Option<String>,
    pub host_name: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub timestamp: Option<String>,
}

fn kind_from_prefix(prefix: &str) -> Option<TicketKind> {
    [TicketKind::Incident, TicketKind::ServiceRequest]
        .into_iter()
        .find(|kind| kind.prefix() == prefix)
}

impl LegacyTicket {
    pub fn into_ticket(self) -> TicketResult<Ticket> {
        let number = self.ticket_number.trim().to_string();
        let prefix = match RE_TICKET_NUMBER.captures(&number) {
            Some(captures) => captures[1].to_string(),
            None => return Err(TicketError::BadNumber(number)),
        };
        // the type column wins, the prefix covers rows written without it
        let kind = match self.kind.as_deref() {
            Some(kind) => kind.parse().map_err(|_| TicketError::BadType {
                ticket: number.clone(),
                kind: kind.to_string(),
            })?,
            None => kind_from_prefix(&prefix).ok_or_else(|| TicketError::BadType {
                ticket: number.clone(),
                kind: String::new(),
            })?,
        };
        let raw_timestamp = self.timestamp.unwrap_or_default();
        let timestamp = parse_timestamp(&raw_timestamp).ok_or_else(|| TicketError::BadTimestamp {
            ticket: number.clone(),
            value: raw_timestamp.clone(),
        })?;
        Ok(Ticket {
            ticket_number: number,
            kind,
            affected_user: self.affected_user.unwrap_or_default(),
            host_name: self.host_name.unwrap_or_default(),
            // written as submitted, the default was applied when the ticket was created
            short_description: self.short_description.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            timestamp,
        })
    }
}

/// `3`, `3.0` et `" 3 "` deviennent le nombre 3. Le reste est gardé en texte.
fn numeric(value: &str) -> Value {
    let trimmed = value.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::from(n);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::from(f as i64),
        Ok(f) => Number::from_f64(f).map(Value::Number).unwrap_or_else(|| Value::String(value.to_string())),
        Err(_) => Value::String(value.to_string()),
    }
}

/// Champs d'une ligne de `ratings.csv`, cellules vides exclues.
pub fn rating_fields(headers: &csv::StringRecord, row: &csv::StringRecord) -> Map<String, Value> {
    headers
        .iter()
        .zip(row.iter())
        .filter(|(_, cell)| !cell.is_empty())
        .map(|(key, cell)| {
            let value = if key == "value" { numeric(cell) } else { Value::String(cell.to_string()) };
            (key.to_string(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legacy(number: &str, kind: Option<&str>, timestamp: &str) -> LegacyTicket {
        LegacyTicket {
            ticket_number: number.to_string(),
            kind: kind.map(str::to_string),
            affected_user: Some("alice".to_string()),
            host_name: Some("PC1".to_string()),
            short_description: None,
            description: None,
            timestamp: Some(timestamp.to_string()),
        }
    }

    #[test]
    fn legacy_ticket() {
        let ticket = legacy("INC000004", Some("Incident"), "2024-01-10T11:22:33.123456").into_ticket().unwrap();
        assert_eq!(ticket.kind, TicketKind::Incident);
        assert_eq!(ticket.short_description, "");
        assert_eq!(ticket.description, "");

        let ticket = legacy("REQ000001", None, "2024-01-10T11:22:33").into_ticket().unwrap();
        assert_eq!(ticket.kind, TicketKind::ServiceRequest);
    }

    #[test]
    fn legacy_ticket_errors() {
        assert!(matches!(legacy("INC12", None, "2024-01-10T11:22:33").into_ticket(), Err(TicketError::BadNumber(_))));
        assert!(matches!(legacy("CHG000001", None, "2024-01-10T11:22:33").into_ticket(), Err(TicketError::BadType { .. })));
        assert!(matches!(legacy("INC000001", Some("Change"), "2024-01-10T11:22:33").into_ticket(), Err(TicketError::BadType { .. })));
        assert!(matches!(legacy("INC000001", None, "").into_ticket(), Err(TicketError::BadTimestamp { .. })));
    }

    #[test]
    fn rating_row() {
        let headers = csv::StringRecord::from(vec!["rating", "value", "timestamp", "kiosk"]);
        let row = csv::StringRecord::from(vec!["happy", "3.0", "2024-01-10T11:22:33", ""]);
        let fields = rating_fields(&headers, &row);
        assert_eq!(fields["value"], json!(3));
        assert_eq!(fields["rating"], json!("happy"));
        assert!(!fields.contains_key("kiosk"));
        assert_eq!(numeric("2.5"), json!(2.5));
        assert_eq!(numeric("n/a"), json!("n/a"));
    }
}
