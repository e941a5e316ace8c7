//! Field schemas of the ticket forms.
//!
//! A submitted form is a flat JSON object. Each form declares which source key feeds
//! which ticket field, and whether the key is required or falls back to a default.

use serde_json::{Map, Value};

use crate::{
    error::{Error, Result},
    record::TicketKind,
};

pub const DEFAULT_SHORT_DESCRIPTION: &str = "On Site Ticket";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketField {
    AffectedUser,
    HostName,
    ShortDescription,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Default(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub source: &'static str,
    pub target: TicketField,
    pub requirement: Requirement,
}

const fn required(source: &'static str, target: TicketField) -> FieldRule {
    FieldRule {
        source,
        target,
        requirement: Requirement::Required,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TicketForm {
    pub kind: TicketKind,
    pub rules: &'static [FieldRule],
}

const SHORT_DESCRIPTION: FieldRule = FieldRule {
    source: "short_description",
    target: TicketField::ShortDescription,
    requirement: Requirement::Default(DEFAULT_SHORT_DESCRIPTION),
};

pub const INCIDENT_FORM: TicketForm = TicketForm {
    kind: TicketKind::Incident,
    rules: &[
        required("affected_user", TicketField::AffectedUser),
        required("host_name", TicketField::HostName),
        SHORT_DESCRIPTION,
        required("description", TicketField::Description),
    ],
};

pub const SERVICE_REQUEST_FORM: TicketForm = TicketForm {
    kind: TicketKind::ServiceRequest,
    rules: &[
        required("request_is_for", TicketField::AffectedUser),
        required("host_name", TicketField::HostName),
        SHORT_DESCRIPTION,
        required("description", TicketField::Description),
    ],
};

/// Validated content of a ticket form, everything but the number and timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketDraft {
    pub affected_user: String,
    pub host_name: String,
    pub short_description: String,
    pub description: String,
}

impl TicketDraft {
    fn set(&mut self, field: TicketField, value: String) {
        match field {
            TicketField::AffectedUser => self.affected_user = value,
            TicketField::HostName => self.host_name = value,
            TicketField::ShortDescription => self.short_description = value,
            TicketField::Description => self.description = value,
        }
    }
}

impl TicketForm {
    /// Validate `fields` against the rules. Unknown keys are ignored, `null` is absent.
    pub fn validate(&self, fields: &Map<String, Value>) -> Result<TicketDraft> {
        let mut draft = TicketDraft::default();
        for rule in self.rules {
            let value = match (fields.get(rule.source), rule.requirement) {
                (Some(Value::String(s)), _) => s.clone(),
                (None | Some(Value::Null), Requirement::Default(default)) => default.to_string(),
                (None | Some(Value::Null), Requirement::Required) => return Err(Error::MissingField(rule.source)),
                (Some(other), _) => {
                    return Err(Error::invalid(rule.source, format!("expected a string, got {}", other)))
                }
            };
            draft.set(rule.target, value);
        }
        Ok(draft)
    }
}
