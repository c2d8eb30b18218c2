pub mod chat;
pub mod manager;
pub mod sales;
