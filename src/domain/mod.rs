pub mod payload;
pub mod ticket;
