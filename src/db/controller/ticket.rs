use deskio_core::{ticket_number::matches_prefix, Predicate, Ticket};
use sea_orm::{entity::*, query::*, sea_query::Expr, ConnectionTrait};

use crate::db::{controller::Error, model};

pub async fn insert_ticket<C: ConnectionTrait>(db: &C, ticket: &Ticket) -> Result<(), Error> {
    log_debug!("Saving ticket {}", ticket.ticket_number);
    model::ticket::Ticket::insert(model::ticket::ActiveModel::from(ticket))
        .exec_without_returning(db).await
        .map_err(Error::SeaORM)?;
    Ok(())
}

/// Tickets matching `predicate`, in insertion order.
pub async fn find_tickets<C: ConnectionTrait>(db: &C, predicate: &Predicate) -> Result<Vec<Ticket>, Error> {
    use model::ticket::Column;
    let mut query = model::ticket::Ticket::find();
    query = match predicate {
        Predicate::All => query,
        Predicate::TicketNumberPrefix(prefix) => query.filter(Column::TicketNumber.starts_with(prefix.as_str())),
        Predicate::TicketNumber(number) => query.filter(Column::TicketNumber.eq(number.as_str())),
    };
    let models = query
        .order_by_asc(Expr::cust("rowid"))
        .all(db).await
        .map_err(Error::SeaORM)?;
    let mut tickets = Vec::with_capacity(models.len());
    for model in models {
        let ticket = Ticket::try_from(model).map_err(Error::Custom)?;
        // LIKE ignore la casse avec SQLite
        if predicate.matches(&ticket.clone().into()) {
            tickets.push(ticket);
        }
    }
    Ok(tickets)
}

/// Plus grand numéro de la séquence `prefix`.
pub async fn last_ticket_number<C: ConnectionTrait>(db: &C, prefix: &str) -> Result<Option<String>, Error> {
    use model::ticket::Column;
    let numbers: Vec<String> = model::ticket::Ticket::find()
        .select_only()
        .column(Column::TicketNumber)
        .filter(Column::TicketNumber.starts_with(prefix))
        .order_by_desc(Column::TicketNumber)
        .into_tuple()
        .all(db).await
        .map_err(Error::SeaORM)?;
    Ok(numbers.into_iter().find(|number| matches_prefix(number, prefix)))
}
