pub mod chat;
pub mod health;
pub mod site;
pub mod track;
