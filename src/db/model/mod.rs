pub mod rating;
pub mod ticket;
