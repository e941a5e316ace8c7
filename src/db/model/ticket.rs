use sea_orm::entity::prelude::*;

pub use Entity as Ticket;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    /// Numéro du ticket, `<prefix><6 chiffres>`
    #[sea_orm(primary_key, auto_increment = false)]
    pub ticket_number: String,
    /// Type du ticket : `Incident` ou `Service Request`
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub affected_user: String,
    pub host_name: String,
    pub short_description: String,
    pub description: String,
    pub timestamp: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel 
{}

impl From<&deskio_core::Ticket> for ActiveModel {
    fn from(ticket: &deskio_core::Ticket) -> Self {
        Self {
            ticket_number: sea_orm::ActiveValue::Set(ticket.ticket_number.clone()),
            kind: sea_orm::ActiveValue::Set(ticket.kind.label().to_string()),
            affected_user: sea_orm::ActiveValue::Set(ticket.affected_user.clone()),
            host_name: sea_orm::ActiveValue::Set(ticket.host_name.clone()),
            short_description: sea_orm::ActiveValue::Set(ticket.short_description.clone()),
            description: sea_orm::ActiveValue::Set(ticket.description.clone()),
            timestamp: sea_orm::ActiveValue::Set(ticket.timestamp),
        }
    }
}

impl TryFrom<Model> for deskio_core::Ticket {
    type Error = String;
    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: model.kind.parse()?,
            ticket_number: model.ticket_number,
            affected_user: model.affected_user,
            host_name: model.host_name,
            short_description: model.short_description,
            description: model.description,
            timestamp: model.timestamp,
        })
    }
}
