pub mod chat;
pub mod todo;
