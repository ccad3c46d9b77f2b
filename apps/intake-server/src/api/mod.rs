pub mod chat;
pub mod events;
pub mod meta;
